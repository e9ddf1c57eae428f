//! Configuration types for flowlog.
//!
//! Configuration is loaded from a single YAML file (`flowlog.yaml`). Every
//! section has defaults, so an empty file yields an in-memory event log.
//!
//! ```yaml
//! event_log:
//!   enabled: true
//!   exclude: [ACTIVITY_STARTED]
//!   storage:
//!     backend: file
//!     directory: /var/lib/flowlog
//!     sync_on_append: true
//! ```

pub mod event_log;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub use event_log::{EventLogConfig, StorageBackend, StorageConfig};

/// Complete flowlog configuration loaded from file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlowlogConfig {
    /// Event log settings.
    #[serde(default)]
    pub event_log: EventLogConfig,
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl FlowlogConfig {
    /// Load configuration from a YAML file.
    ///
    /// A relative storage directory is resolved against the file's directory.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let mut config = Self::from_yaml(&content)?;

        let base_dir = path
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let directory = &config.event_log.storage.directory;
        if directory.is_relative() {
            config.event_log.storage.directory = base_dir.join(directory);
        }

        Ok(config)
    }

    /// Parse configuration from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        // serde_yaml rejects an empty document; treat it as all defaults.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let storage = &self.event_log.storage;
        if storage.backend == StorageBackend::File && storage.directory.as_os_str().is_empty() {
            return Err(ConfigError::Config(
                "event_log.storage.directory must be set for the file backend".to_string(),
            ));
        }
        Ok(())
    }
}
