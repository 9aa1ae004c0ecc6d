//! Flag registry: named boolean progress flags.
//!
//! RULE: A notifying state change publishes `FlagChanged` and nothing else.
//! The save system turns that event into a save; the registry never
//! persists anything itself.

use crate::{
    error::{SaveError, SaveResult},
    event::{EventBus, SaveEvent},
    records::SaveFlagSaveData,
};
use std::collections::{HashMap, HashSet};

/// A single progress flag. `owner` names whatever defined it and is only
/// used to report id collisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveFlag {
    pub id:    String,
    pub owner: String,
    is_set:    bool,
}

impl SaveFlag {
    pub fn new(id: impl Into<String>, owner: impl Into<String>) -> Self {
        Self {
            id:     id.into(),
            owner:  owner.into(),
            is_set: false,
        }
    }

    pub fn with_state(mut self, is_set: bool) -> Self {
        self.is_set = is_set;
        self
    }

    pub fn is_set(&self) -> bool {
        self.is_set
    }
}

/// What applying a document's flag records did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppliedFlags {
    /// Records naming no registered flag.
    pub stale:      usize,
    /// Records dropped because an earlier record had the same id.
    pub duplicates: usize,
}

/// Flags in registration order, indexed by id.
#[derive(Debug, Default)]
pub struct FlagRegistry {
    flags: Vec<SaveFlag>,
    index: HashMap<String, usize>,
}

impl FlagRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a flag. A second flag under an existing id is rejected:
    /// the collision is logged with both owners and the first flag stays.
    pub fn register(&mut self, flag: SaveFlag) -> SaveResult<()> {
        if let Some(&slot) = self.index.get(&flag.id) {
            let existing = &self.flags[slot];
            log::error!(
                "duplicate saveflag id '{}' between [{}] and [{}]",
                flag.id,
                existing.owner,
                flag.owner
            );
            return Err(SaveError::DuplicateFlag {
                id:             flag.id,
                existing_owner: existing.owner.clone(),
                new_owner:      flag.owner,
            });
        }
        self.index.insert(flag.id.clone(), self.flags.len());
        self.flags.push(flag);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&SaveFlag> {
        self.index.get(id).map(|&slot| &self.flags[slot])
    }

    pub fn is_set(&self, id: &str) -> Option<bool> {
        self.get(id).map(SaveFlag::is_set)
    }

    /// Set a flag's state. Unknown ids are ignored: the setter may run
    /// before the flag's owner has registered it.
    ///
    /// With `notify`, an actual change publishes `FlagChanged` on `bus`.
    /// Returns whether the state changed.
    pub fn set_flag(&mut self, id: &str, state: bool, notify: bool, bus: &mut EventBus) -> bool {
        let changed = self.set_silent(id, state);
        if changed && notify {
            bus.publish(SaveEvent::FlagChanged {
                flag_id: id.to_string(),
                is_set:  state,
            });
        }
        changed
    }

    /// Set a flag's state without publishing anything.
    pub fn set_silent(&mut self, id: &str, state: bool) -> bool {
        let Some(&slot) = self.index.get(id) else {
            log::trace!("set_flag: '{id}' not registered yet, ignored");
            return false;
        };
        let flag = &mut self.flags[slot];
        if flag.is_set == state {
            return false;
        }
        flag.is_set = state;
        true
    }

    /// Current state of every flag, in registration order.
    pub fn records(&self) -> Vec<SaveFlagSaveData> {
        self.flags
            .iter()
            .map(|f| SaveFlagSaveData {
                flag_id: f.id.clone(),
                is_set:  f.is_set,
            })
            .collect()
    }

    /// Apply loaded flag records through the silent path. A flag listed
    /// more than once takes its first record; later ones are counted.
    pub fn apply(&mut self, records: &[SaveFlagSaveData]) -> AppliedFlags {
        let mut applied = AppliedFlags::default();
        let mut seen = HashSet::with_capacity(records.len());
        for record in records {
            if !seen.insert(record.flag_id.as_str()) {
                log::warn!("flag record '{}' appears more than once, keeping the first", record.flag_id);
                applied.duplicates += 1;
            } else if self.index.contains_key(&record.flag_id) {
                self.set_silent(&record.flag_id, record.is_set);
            } else {
                log::debug!("flag record '{}' has no registered flag, dropped", record.flag_id);
                applied.stale += 1;
            }
        }
        applied
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SaveFlag> {
        self.flags.iter()
    }
}
