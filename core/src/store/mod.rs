//! Slot persistence: one JSON document per save slot.
//!
//! RULE: Only this module touches save files.
//! Callers hand over a `GameState` and get one back; they never see paths
//! beyond `slot_path()`.

mod atomic_io;
pub mod prefs;

pub use prefs::{format_last_save, PrefsStore};

use crate::{
    config::SaveConfig,
    error::{SaveError, SaveResult},
    snapshot::GameState,
};
use serde::ser::Error as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub struct SaveStore {
    root:      PathBuf,
    extension: String,
}

impl SaveStore {
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            root:      root.into(),
            extension: extension.into(),
        }
    }

    pub fn from_config(config: &SaveConfig) -> Self {
        Self::new(config.data_root.clone(), config.extension.clone())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/<slot>.<extension>`.
    pub fn slot_path(&self, slot: &str) -> SaveResult<PathBuf> {
        validate_slot_name(slot)?;
        Ok(self.root.join(format!("{slot}.{}", self.extension)))
    }

    pub fn exists(&self, slot: &str) -> SaveResult<bool> {
        Ok(self.slot_path(slot)?.is_file())
    }

    /// Serialize `state` and replace the slot's content with it.
    /// On failure the previous content of the slot is left as it was.
    ///
    /// A non-finite number would be written as `null` and the slot could
    /// never be read back, so such a document is refused before any I/O.
    pub fn write(&self, slot: &str, state: &GameState) -> SaveResult<PathBuf> {
        let path = self.slot_path(slot)?;
        if let Some(field) = state.first_non_finite() {
            log::error!("slot '{slot}' not written: {field} is not a finite number");
            return Err(SaveError::Serialization(serde_json::Error::custom(format!(
                "{field} is not a finite number"
            ))));
        }
        let json = serde_json::to_string_pretty(state)?;
        atomic_io::write_text_atomic(&path, &json).map_err(|source| SaveError::WriteFailed {
            slot: slot.to_string(),
            source,
        })?;
        log::debug!("wrote slot '{slot}' ({} bytes) to {}", json.len(), path.display());
        Ok(path)
    }

    /// Read and parse a slot. A missing slot is `SlotNotFound`; content that
    /// does not parse into a complete document is `Deserialization`.
    pub fn read(&self, slot: &str) -> SaveResult<GameState> {
        let path = self.slot_path(slot)?;
        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(SaveError::SlotNotFound { slot: slot.to_string() });
            }
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&json).map_err(|source| SaveError::Deserialization {
            slot: slot.to_string(),
            source,
        })
    }

    /// Remove a slot. Returns whether a file was removed.
    pub fn delete(&self, slot: &str) -> SaveResult<bool> {
        let path = self.slot_path(slot)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Names of every slot under the root, sorted. A missing root has none.
    pub fn list_slots(&self) -> SaveResult<Vec<String>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut slots = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            if path.extension().and_then(|e| e.to_str()) != Some(self.extension.as_str()) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if validate_slot_name(stem).is_ok() {
                    slots.push(stem.to_string());
                }
            }
        }
        slots.sort();
        Ok(slots)
    }
}

/// A slot name is a single non-hidden path component.
fn validate_slot_name(slot: &str) -> SaveResult<()> {
    let valid = !slot.is_empty()
        && !slot.starts_with('.')
        && !slot.contains(['/', '\\', '\0']);
    if valid {
        Ok(())
    } else {
        Err(SaveError::InvalidSlotName { slot: slot.to_string() })
    }
}
