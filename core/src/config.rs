use crate::types::Tick;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Save system settings. Every field has a default, so a config file only
/// needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveConfig {
    /// Directory holding one document per slot.
    pub data_root:        PathBuf,
    /// File extension of slot documents, without the dot.
    pub extension:        String,
    /// Slot used when a caller does not name one.
    pub default_slot:     String,
    /// Ticks a load waits after being scheduled.
    pub load_delay_ticks: Tick,
    /// Preference database path; in-memory when absent.
    pub prefs_db:         Option<PathBuf>,
}

impl Default for SaveConfig {
    fn default() -> Self {
        Self {
            data_root:        PathBuf::from("./saves"),
            extension:        "JSON".to_string(),
            default_slot:     "save".to_string(),
            load_delay_ticks: 0,
            prefs_db:         None,
        }
    }
}

impl SaveConfig {
    /// Load settings from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {}: {e}", path.display()))?;
        let config: SaveConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {}: {e}", path.display()))?;
        if config.extension.is_empty() || config.extension.contains('.') {
            anyhow::bail!("{}: extension must be non-empty and dot-free", path.display());
        }
        Ok(config)
    }

    /// Defaults rooted at `data_root`, for tests and tools.
    pub fn with_root(data_root: impl Into<PathBuf>) -> Self {
        Self {
            data_root: data_root.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("save_config.json");
        std::fs::write(&path, r#"{ "default_slot": "demoV3", "load_delay_ticks": 2 }"#).unwrap();

        let config = SaveConfig::load(&path).unwrap();
        assert_eq!(config.default_slot, "demoV3");
        assert_eq!(config.load_delay_ticks, 2);
        assert_eq!(config.extension, "JSON");
        assert_eq!(config.prefs_db, None);
    }

    #[test]
    fn rejects_dotted_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("save_config.json");
        std::fs::write(&path, r#"{ "extension": ".json" }"#).unwrap();
        assert!(SaveConfig::load(&path).is_err());
    }
}
