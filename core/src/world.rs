//! The live world: every piece of runtime state a save covers.
//!
//! One `LiveWorld` is owned by the host and passed by reference into
//! save, load and reconcile. There are no process-wide registries.

use crate::{
    blueprint::BlueprintRegistry,
    entity::{Collectable, Mechanism, Saveable},
    error::SaveResult,
    event::{EventBus, SaveEvent},
    flag_registry::{FlagRegistry, SaveFlag},
    progress::{AchievementBook, LogBook, PlayerStats},
    records::{CollectableSaveData, MechanismSaveData},
    resources::ResourcePool,
};

#[derive(Default)]
pub struct LiveWorld {
    pub mechanisms:   Vec<Mechanism>,
    pub collectables: Vec<Collectable>,
    pub resources:    ResourcePool,
    pub flags:        FlagRegistry,
    pub logs:         LogBook,
    pub achievements: AchievementBook,
    pub stats:        PlayerStats,
    pub blueprints:   BlueprintRegistry,
    /// Outbox for flag and resource changes; drained by the save system.
    pub bus:          EventBus,
    ready:            bool,
}

impl LiveWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_mechanism<M>(&mut self, mechanism: M)
    where
        M: Saveable<MechanismSaveData> + 'static,
    {
        self.mechanisms.push(Box::new(mechanism));
    }

    pub fn add_collectable<C>(&mut self, collectable: C)
    where
        C: Saveable<CollectableSaveData> + 'static,
    {
        self.collectables.push(Box::new(collectable));
    }

    pub fn register_flag(&mut self, flag: SaveFlag) -> SaveResult<()> {
        self.flags.register(flag)
    }

    /// Set a flag and, if it changed, queue a save request.
    pub fn set_flag(&mut self, id: &str, state: bool) -> bool {
        self.flags.set_flag(id, state, true, &mut self.bus)
    }

    /// Ask for a save on the next pump.
    pub fn request_save(&mut self) {
        self.bus.publish(SaveEvent::SaveRequested);
    }

    pub fn mechanism(&self, id: &str) -> Option<&dyn Saveable<MechanismSaveData>> {
        self.mechanisms.iter().find(|m| m.save_id() == id).map(|m| m.as_ref())
    }

    pub fn collectable(&self, id: &str) -> Option<&dyn Saveable<CollectableSaveData>> {
        self.collectables.iter().find(|c| c.save_id() == id).map(|c| c.as_ref())
    }

    pub fn entity_count(&self) -> usize {
        self.mechanisms.len() + self.collectables.len()
    }

    /// Signal that scene setup finished and loads may reconcile.
    pub fn mark_ready(&mut self) {
        self.ready = true;
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }
}

impl std::fmt::Debug for LiveWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveWorld")
            .field("mechanisms", &self.mechanisms.len())
            .field("collectables", &self.collectables.len())
            .field("flags", &self.flags.len())
            .field("ready", &self.ready)
            .finish()
    }
}
