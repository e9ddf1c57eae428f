//! CLI command implementations for flowlog.

pub mod delete;
pub mod entries;

use anyhow::{Context, Result, bail};
use flowlog_audit::{EventLogger, FileStorage};
use flowlog_core::{EventLogConfig, FlowlogConfig, StorageBackend};
use std::path::PathBuf;
use std::sync::Arc;

/// Where the log to operate on lives.
#[derive(Debug, Clone)]
pub enum LogSource {
    /// A flowlog.yaml naming a file-backed log.
    Config(PathBuf),
    /// The log directory itself.
    Dir(PathBuf),
}

/// Open the file-backed log named by `source`.
pub fn open_logger(source: &LogSource) -> Result<EventLogger> {
    let (config, directory) = match source {
        LogSource::Config(path) => {
            let config = FlowlogConfig::from_file(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            if config.event_log.storage.backend != StorageBackend::File {
                bail!(
                    "{} configures the memory backend; only a file-backed log can be inspected",
                    path.display()
                );
            }
            let directory = config.event_log.storage.directory.clone();
            (config.event_log, directory)
        }
        LogSource::Dir(dir) => (EventLogConfig::default(), dir.clone()),
    };

    if !directory.join(FileStorage::FILE_NAME).exists() {
        bail!(
            "no event log found in {} (expected {})",
            directory.display(),
            FileStorage::FILE_NAME
        );
    }

    let storage = FileStorage::open(&directory, config.storage.sync_on_append)
        .with_context(|| format!("failed to open event log in {}", directory.display()))?;
    tracing::debug!(path = %storage.path().display(), "Event log opened");

    Ok(EventLogger::new(&config, Arc::new(storage)))
}
