//! Event log storage backends.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::entry::{LogEntry, PendingEntry};
use crate::error::AuditError;
use async_trait::async_trait;
use flowlog_core::config::{StorageBackend, StorageConfig};
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;

/// Trait for event log storage backends.
///
/// Implementations assign log numbers on append. A number is published to
/// readers only after every lower number that will ever be visible has been
/// published.
#[async_trait]
pub trait LogStorage: Send + Sync {
    /// Assign the next log number and persist the entry.
    async fn append(&self, entry: PendingEntry) -> Result<LogEntry, AuditError>;

    /// Entries with a number greater than `after`, ascending, at most
    /// `max_results` of them.
    async fn query(
        &self,
        after: Option<u64>,
        max_results: Option<usize>,
    ) -> Result<Vec<LogEntry>, AuditError>;

    /// Remove one entry. Unknown numbers are ignored.
    async fn delete(&self, log_number: u64) -> Result<(), AuditError>;

    /// Highest number ever assigned, deleted entries included.
    async fn last_log_number(&self) -> Result<Option<u64>, AuditError>;
}

/// Create a storage backend based on configuration.
pub fn create_storage(config: &StorageConfig) -> Result<Arc<dyn LogStorage>, AuditError> {
    match config.backend {
        StorageBackend::Memory => Ok(Arc::new(MemoryStorage::new())),
        StorageBackend::File => Ok(Arc::new(FileStorage::open(
            &config.directory,
            config.sync_on_append,
        )?)),
    }
}

/// Shared range selection over an ordered index.
fn select(
    index: &BTreeMap<u64, LogEntry>,
    after: Option<u64>,
    max_results: Option<usize>,
) -> Vec<LogEntry> {
    let lower = match after {
        Some(n) => Bound::Excluded(n),
        None => Bound::Unbounded,
    };
    index
        .range((lower, Bound::Unbounded))
        .map(|(_, entry)| entry.clone())
        .take(max_results.unwrap_or(usize::MAX))
        .collect()
}
