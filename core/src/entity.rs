//! The save capability and the entity kinds that implement it.
//!
//! RULE: `save()` and `load()` are pure data transfer. They touch only the
//! entity's own state and never ask for a save.

use crate::{
    error::{SaveError, SaveResult},
    records::{CollectableSaveData, MechanismSaveData},
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};

/// The contract every saveable world member fulfils for its record type.
pub trait Saveable<R>: Send {
    /// Stable kind name, used in log lines and errors.
    fn kind(&self) -> &'static str;

    /// The id assigned when the entity was defined.
    fn save_id(&self) -> &str;

    /// Current state as a record. Must not mutate the entity.
    fn save(&self) -> R;

    /// Apply a record to this entity. Applying the same record twice
    /// leaves the entity as applying it once.
    fn load(&mut self, record: &R) -> SaveResult<()>;
}

pub type Mechanism = Box<dyn Saveable<MechanismSaveData>>;
pub type Collectable = Box<dyn Saveable<CollectableSaveData>>;

/// Decode an entity's state blob, naming the entity on failure.
fn decode_state<T: DeserializeOwned>(kind: &'static str, id: &str, state: &Value) -> SaveResult<T> {
    T::deserialize(state).map_err(|e| SaveError::EntityLoad {
        kind,
        id:     id.to_string(),
        reason: e.to_string(),
    })
}

// ── Lever ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct LeverState {
    is_on: bool,
    value: f32,
}

/// A toggle lever. Only its resting position is persisted; the drag and
/// spring behaviour live in the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Lever {
    id:        String,
    pub is_on: bool,
    /// Normalised handle position in [0, 1].
    value:     f32,
}

impl Lever {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id:    id.into(),
            is_on: false,
            value: 0.0,
        }
    }

    pub fn switch(&mut self, on: bool) {
        self.is_on = on;
        self.value = if on { 1.0 } else { 0.0 };
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    /// Move the handle. Clamped to [0, 1]; a non-finite position is ignored.
    pub fn set_value(&mut self, value: f32) {
        if value.is_finite() {
            self.value = value.clamp(0.0, 1.0);
        }
    }
}

impl Saveable<MechanismSaveData> for Lever {
    fn kind(&self) -> &'static str { "lever" }

    fn save_id(&self) -> &str { &self.id }

    fn save(&self) -> MechanismSaveData {
        MechanismSaveData {
            id:    self.id.clone(),
            state: json!({ "is_on": self.is_on, "value": self.value }),
        }
    }

    fn load(&mut self, record: &MechanismSaveData) -> SaveResult<()> {
        let state: LeverState = decode_state(self.kind(), &self.id, &record.state)?;
        self.is_on = state.is_on;
        self.value = state.value;
        Ok(())
    }
}

// ── Door ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct DoorState {
    is_open: bool,
    locked:  bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Door {
    id:          String,
    pub is_open: bool,
    pub locked:  bool,
}

impl Door {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id:      id.into(),
            is_open: false,
            locked:  true,
        }
    }

    pub fn unlock(&mut self) {
        self.locked = false;
    }

    /// Open the door if it is unlocked. Returns whether it is open.
    pub fn open(&mut self) -> bool {
        if !self.locked {
            self.is_open = true;
        }
        self.is_open
    }
}

impl Saveable<MechanismSaveData> for Door {
    fn kind(&self) -> &'static str { "door" }

    fn save_id(&self) -> &str { &self.id }

    fn save(&self) -> MechanismSaveData {
        MechanismSaveData {
            id:    self.id.clone(),
            state: json!({ "is_open": self.is_open, "locked": self.locked }),
        }
    }

    fn load(&mut self, record: &MechanismSaveData) -> SaveResult<()> {
        let state: DoorState = decode_state(self.kind(), &self.id, &record.state)?;
        self.is_open = state.is_open;
        self.locked = state.locked;
        Ok(())
    }
}

// ── Floppy disk ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectableState {
    /// Lying in the world, not yet picked up.
    Available,
    /// Carried by the player.
    InInventory,
    /// Inserted into a reader and consumed.
    Trash,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct FloppyState {
    state: CollectableState,
}

/// A collectable floppy disk. Which mechanism data it unlocks is content;
/// only where the disk is in its lifecycle is saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FloppyDisk {
    id:        String,
    pub state: CollectableState,
}

impl FloppyDisk {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id:    id.into(),
            state: CollectableState::Available,
        }
    }

    pub fn set_state(&mut self, state: CollectableState) {
        self.state = state;
    }
}

impl Saveable<CollectableSaveData> for FloppyDisk {
    fn kind(&self) -> &'static str { "floppy" }

    fn save_id(&self) -> &str { &self.id }

    fn save(&self) -> CollectableSaveData {
        CollectableSaveData {
            id:    self.id.clone(),
            state: json!({ "state": self.state }),
        }
    }

    fn load(&mut self, record: &CollectableSaveData) -> SaveResult<()> {
        let saved: FloppyState = decode_state(self.kind(), &self.id, &record.state)?;
        self.state = saved.state;
        Ok(())
    }
}
