//! In-process storage.

use super::{LogStorage, select};
use crate::entry::{LogEntry, PendingEntry};
use crate::error::AuditError;
use crate::sequencer::Sequencer;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::RwLock;

/// Keeps entries in memory. Contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<BTreeMap<u64, LogEntry>>,
    sequencer: Sequencer,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty storage whose first entry gets `last + 1`.
    pub fn starting_after(last: u64) -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
            sequencer: Sequencer::after(Some(last)),
        }
    }
}

#[async_trait]
impl LogStorage for MemoryStorage {
    async fn append(&self, entry: PendingEntry) -> Result<LogEntry, AuditError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| AuditError::lock("entries", e))?;

        let entry = entry.into_entry(self.sequencer.next());
        entries.insert(entry.log_number, entry.clone());
        Ok(entry)
    }

    async fn query(
        &self,
        after: Option<u64>,
        max_results: Option<usize>,
    ) -> Result<Vec<LogEntry>, AuditError> {
        let entries = self
            .entries
            .read()
            .map_err(|e| AuditError::lock("entries", e))?;
        Ok(select(&entries, after, max_results))
    }

    async fn delete(&self, log_number: u64) -> Result<(), AuditError> {
        self.entries
            .write()
            .map_err(|e| AuditError::lock("entries", e))?
            .remove(&log_number);
        Ok(())
    }

    async fn last_log_number(&self) -> Result<Option<u64>, AuditError> {
        Ok(self.sequencer.last())
    }
}
