//! Logger configuration file support.
//!
//! Loads `linelog.toml` from a directory:
//!
//! ```toml
//! level = "info"
//! sink = "/var/log/app.log"
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::sink::STDERR;
use crate::{Level, LogError};

/// The config file name
pub const CONFIG_FILE_NAME: &str = "linelog.toml";

/// Construction-time logger settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggerConfig {
    /// Minimum level written
    pub level: Level,
    /// `stderr`, `stdout` or a file path
    pub sink: String,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: Level::default(),
            sink: STDERR.to_string(),
        }
    }
}

impl LoggerConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, LogError> {
        toml::from_str(content).map_err(|e| LogError::Config(e.to_string()))
    }

    /// Load configuration from `dir`.
    ///
    /// Returns:
    /// - `Ok(Some(config))` if the file exists and parses successfully
    /// - `Ok(None)` if the file does not exist
    /// - `Err(...)` if the file exists but cannot be read or parsed
    pub fn load(dir: &Path) -> Result<Option<Self>, LogError> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&config_path).map_err(|e| {
            LogError::Config(format!("Failed to read {}: {}", config_path.display(), e))
        })?;

        let config = toml::from_str(&content).map_err(|e| {
            LogError::Config(format!("Failed to parse {}: {}", config_path.display(), e))
        })?;

        Ok(Some(config))
    }
}
