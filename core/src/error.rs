use thiserror::Error;

#[derive(Error, Debug)]
pub enum SaveError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Save slot '{slot}' not found")]
    SlotNotFound { slot: String },

    #[error("Save slot '{slot}' could not be parsed: {source}")]
    Deserialization {
        slot: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Writing save slot '{slot}' failed: {source}")]
    WriteFailed {
        slot: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid slot name '{slot}'")]
    InvalidSlotName { slot: String },

    #[error("Duplicate save flag id '{id}' between [{existing_owner}] and [{new_owner}]")]
    DuplicateFlag {
        id: String,
        existing_owner: String,
        new_owner: String,
    },

    #[error("A load of slot '{slot}' is already in flight")]
    LoadInFlight { slot: String },

    #[error("No load is pending")]
    NoPendingLoad,

    #[error("Loading {kind} '{id}' failed: {reason}")]
    EntityLoad {
        kind: &'static str,
        id: String,
        reason: String,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type SaveResult<T> = Result<T, SaveError>;
