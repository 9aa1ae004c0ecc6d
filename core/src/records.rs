//! Serializable save records.
//!
//! RULE: The serialized field names are the on-disk contract.
//! Renaming a Rust field is fine; renaming its `serde(rename)` is not.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One live mechanism's state. The blob is owned by the mechanism kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MechanismSaveData {
    pub id:    String,
    #[serde(default)]
    pub state: Value,
}

/// One live collectable's state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectableSaveData {
    pub id:    String,
    #[serde(default)]
    pub state: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceSaveData {
    pub resource:       i32,
    #[serde(rename = "currentAmount")]
    pub current_amount: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveFlagSaveData {
    #[serde(rename = "FlagID")]
    pub flag_id: String,
    #[serde(rename = "IsSet")]
    pub is_set:  bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogSaveData {
    #[serde(rename = "LogID")]
    pub log_id:            String,
    #[serde(rename = "IsComplete")]
    pub is_complete:       bool,
    #[serde(rename = "IsRead")]
    pub is_read:           bool,
    /// Completion time in milliseconds since the Unix epoch; 0 while incomplete.
    #[serde(rename = "TimeCompletedAt")]
    pub time_completed_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplacedNodeSaveData {
    #[serde(rename = "mechanismID")]
    pub mechanism_id:   String,
    #[serde(rename = "achievementID")]
    pub achievement_id: String,
    pub x: i32,
    pub y: i32,
}

/// A record that carries the id it is reconciled by.
pub trait KeyedRecord {
    fn record_id(&self) -> &str;
}

impl KeyedRecord for MechanismSaveData {
    fn record_id(&self) -> &str { &self.id }
}

impl KeyedRecord for CollectableSaveData {
    fn record_id(&self) -> &str { &self.id }
}

impl KeyedRecord for SaveFlagSaveData {
    fn record_id(&self) -> &str { &self.flag_id }
}

impl KeyedRecord for LogSaveData {
    fn record_id(&self) -> &str { &self.log_id }
}
