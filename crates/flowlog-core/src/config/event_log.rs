//! Event log configuration.

use crate::event::EventKind;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the engine event log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogConfig {
    /// Whether events are written to the log at all.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Event kinds that are never logged, on top of the kinds the logger
    /// does not recognise.
    #[serde(default)]
    pub exclude: Vec<EventKind>,

    /// Storage backend configuration.
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Storage backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Storage backend type.
    #[serde(default)]
    pub backend: StorageBackend,

    /// Directory holding the log file (for file backend).
    #[serde(default = "default_directory")]
    pub directory: PathBuf,

    /// Whether to fsync the log file after every write.
    #[serde(default)]
    pub sync_on_append: bool,
}

/// Storage backend type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Keep entries in process memory.
    #[default]
    Memory,
    /// Append entries to a JSON Lines file.
    File,
}

impl Default for EventLogConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            exclude: Vec::new(),
            storage: StorageConfig::default(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            directory: default_directory(),
            sync_on_append: false,
        }
    }
}

impl EventLogConfig {
    /// Whether events of this kind are filtered out by configuration.
    pub fn is_excluded(&self, kind: EventKind) -> bool {
        self.exclude.contains(&kind)
    }
}

fn default_enabled() -> bool {
    true
}

fn default_directory() -> PathBuf {
    PathBuf::from("event-log")
}
