//! Snapshot assembler: collects the live world into a fresh document.
//!
//! RULE: Read-only. The assembler only calls `save()` and record getters;
//! it never reaches into entity internals and never mutates the world.

use crate::{
    entity::Saveable,
    records::KeyedRecord,
    snapshot::GameState,
    world::LiveWorld,
};
use std::collections::HashSet;

pub fn assemble(world: &LiveWorld) -> GameState {
    let state = GameState {
        mechanisms:     collect_unique("mechanism", &world.mechanisms),
        collectables:   collect_unique("collectable", &world.collectables),
        stats:          world.stats.clone(),
        achievements:   world.achievements.completed(),
        replaced_nodes: world.blueprints.replaced_node_saves(),
        resources:      world.resources.records(),
        flags:          world.flags.records(),
        logs:           world.logs.records(),
        ..GameState::default()
    };

    log::debug!(
        "assembled snapshot: {} mechanisms, {} collectables, {} flags, {} logs",
        state.mechanisms.len(),
        state.collectables.len(),
        state.flags.len(),
        state.logs.len()
    );
    state
}

/// One record per entity, in world order. A second entity reusing an id
/// is a content bug: it is logged and left out so ids stay unique.
fn collect_unique<R: KeyedRecord>(label: &str, entities: &[Box<dyn Saveable<R>>]) -> Vec<R> {
    let mut seen = HashSet::new();
    let mut records = Vec::with_capacity(entities.len());
    for entity in entities {
        let record = entity.save();
        if seen.insert(record.record_id().to_string()) {
            records.push(record);
        } else {
            log::warn!("{label} id '{}' used by more than one entity, saving the first", record.record_id());
        }
    }
    records
}
