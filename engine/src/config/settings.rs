// Engine settings, loaded from a JSON file or taken from defaults
use crate::error::{EngineError, EngineResult};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct EngineSettings {
    /// Directory holding the history database.
    pub data_dir: PathBuf,
    pub history_db_file: String,
    /// Default tracing filter; `RUST_LOG` wins when set.
    pub log_level: String,
    /// Hour sent to the scoring service when the receipt time cannot be read.
    pub default_transaction_hour: u8,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            data_dir: PathBuf::from("."),
            history_db_file: "fraud_history.db".to_string(),
            log_level: "info".to_string(),
            default_transaction_hour: 12,
        }
    }
}

impl EngineSettings {
    pub fn load(path: &Path) -> EngineResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            EngineError::ConfigError(format!("Failed to read '{}': {}", path.display(), e))
        })?;
        let settings: EngineSettings = serde_json::from_str(&raw).map_err(|e| {
            EngineError::ConfigError(format!("Failed to parse '{}': {}", path.display(), e))
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Loads from `path` when given, otherwise returns the defaults.
    pub fn load_or_default(path: Option<&Path>) -> EngineResult<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.history_db_file.trim().is_empty() {
            return Err(EngineError::ConfigError("history_db_file must not be empty".to_string()));
        }
        if self.default_transaction_hour > 23 {
            return Err(EngineError::ConfigError(format!(
                "default_transaction_hour must be 0-23, got {}",
                self.default_transaction_hour
            )));
        }
        Ok(())
    }

    pub fn history_db_path(&self) -> PathBuf {
        self.data_dir.join(&self.history_db_file)
    }
}
