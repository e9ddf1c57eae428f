//! Error types for the event log crate.

use thiserror::Error;

/// Errors that can occur while writing or reading the event log.
#[derive(Debug, Error)]
pub enum AuditError {
    /// Failed to initialize a storage backend.
    #[error("failed to initialize event log storage: {0}")]
    InitializationFailed(String),

    /// Storage error.
    #[error("storage error: {0}")]
    StorageError(String),

    /// A lock guarding storage state was poisoned.
    #[error("lock error: {0}")]
    LockError(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// A stored entry's data could not be decoded.
    #[error("failed to decode data of log entry {log_number}: {source}")]
    DeserializationError {
        log_number: u64,
        #[source]
        source: serde_json::Error,
    },

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl AuditError {
    pub(crate) fn lock<E: std::fmt::Display>(what: &str, err: E) -> Self {
        Self::LockError(format!("failed to acquire {what} lock: {err}"))
    }
}
