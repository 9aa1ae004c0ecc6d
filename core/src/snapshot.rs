//! The aggregate save document: everything one slot holds.
//!
//! A document is rebuilt from scratch on every save and dropped once
//! written. Load reads it, reconciles it, and drops it again.

use crate::{
    progress::PlayerStats,
    records::{
        CollectableSaveData, LogSaveData, MechanismSaveData, ReplacedNodeSaveData,
        ResourceSaveData, SaveFlagSaveData,
    },
};
use serde::{Deserialize, Serialize};

/// Format version written into every document. Recorded, never migrated.
pub const SAVE_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(rename = "mechanismSaves")]
    pub mechanisms: Vec<MechanismSaveData>,
    #[serde(rename = "collectableSaves")]
    pub collectables: Vec<CollectableSaveData>,
    pub stats: PlayerStats,
    pub achievements: Vec<String>,
    #[serde(rename = "replacedNodes")]
    pub replaced_nodes: Vec<ReplacedNodeSaveData>,
    #[serde(rename = "resourceSaveData")]
    pub resources: Vec<ResourceSaveData>,
    #[serde(rename = "saveFlagSaves")]
    pub flags: Vec<SaveFlagSaveData>,
    #[serde(rename = "logSaves")]
    pub logs: Vec<LogSaveData>,
}

fn default_version() -> u32 {
    SAVE_VERSION
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            version:        SAVE_VERSION,
            mechanisms:     Vec::new(),
            collectables:   Vec::new(),
            stats:          PlayerStats::default(),
            achievements:   Vec::new(),
            replaced_nodes: Vec::new(),
            resources:      Vec::new(),
            flags:          Vec::new(),
            logs:           Vec::new(),
        }
    }
}

impl GameState {
    /// Number of per-entity records (mechanisms + collectables).
    pub fn entity_record_count(&self) -> usize {
        self.mechanisms.len() + self.collectables.len()
    }

    /// The first amount or statistic that JSON cannot carry (NaN or an
    /// infinity), named for the error message.
    pub fn first_non_finite(&self) -> Option<String> {
        let resource = self
            .resources
            .iter()
            .find(|r| !r.current_amount.is_finite())
            .map(|r| format!("resource {} amount {}", r.resource, r.current_amount));
        resource.or_else(|| {
            self.stats
                .iter()
                .find(|(_, value)| !value.is_finite())
                .map(|(stat, value)| format!("stat '{stat}' value {value}"))
        })
    }

    pub fn flag(&self, flag_id: &str) -> Option<&SaveFlagSaveData> {
        self.flags.iter().find(|f| f.flag_id == flag_id)
    }

    pub fn mechanism(&self, id: &str) -> Option<&MechanismSaveData> {
        self.mechanisms.iter().find(|m| m.id == id)
    }

    pub fn collectable(&self, id: &str) -> Option<&CollectableSaveData> {
        self.collectables.iter().find(|c| c.id == id)
    }
}
