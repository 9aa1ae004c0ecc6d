//! Blueprint replacement registry.
//!
//! When an achievement unlocks, it may swap one node of a mechanism's
//! blueprint grid. Only the swaps are persisted; the base blueprints are
//! content and come from the world definition.

use crate::records::ReplacedNodeSaveData;
use std::collections::BTreeMap;

/// (mechanism id, x, y) of a blueprint node.
type NodeKey = (String, i32, i32);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlueprintRegistry {
    replaced: BTreeMap<NodeKey, String>,
}

impl BlueprintRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `achievement_id` replaced the node at (x, y) of a
    /// mechanism's blueprint. A later replacement of the same node wins.
    pub fn replace_node(
        &mut self,
        mechanism_id:   impl Into<String>,
        achievement_id: impl Into<String>,
        x: i32,
        y: i32,
    ) {
        self.replaced.insert((mechanism_id.into(), x, y), achievement_id.into());
    }

    pub fn replacement_at(&self, mechanism_id: &str, x: i32, y: i32) -> Option<&str> {
        self.replaced
            .get(&(mechanism_id.to_string(), x, y))
            .map(String::as_str)
    }

    pub fn replaced_node_saves(&self) -> Vec<ReplacedNodeSaveData> {
        self.replaced
            .iter()
            .map(|((mechanism_id, x, y), achievement_id)| ReplacedNodeSaveData {
                mechanism_id:   mechanism_id.clone(),
                achievement_id: achievement_id.clone(),
                x: *x,
                y: *y,
            })
            .collect()
    }

    /// Replace the registry's contents with the loaded nodes.
    pub fn restore_replaced_nodes(&mut self, nodes: &[ReplacedNodeSaveData]) {
        self.replaced.clear();
        for node in nodes {
            let key = (node.mechanism_id.clone(), node.x, node.y);
            if self.replaced.contains_key(&key) {
                log::warn!(
                    "replaced node {}@({}, {}) listed twice, keeping the first",
                    node.mechanism_id, node.x, node.y
                );
                continue;
            }
            self.replaced.insert(key, node.achievement_id.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.replaced.len()
    }

    pub fn is_empty(&self) -> bool {
        self.replaced.is_empty()
    }
}
