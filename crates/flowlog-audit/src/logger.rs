//! Event logger.
//!
//! [`EventLogger`] listens to an engine's [`EventBus`] and turns each
//! relevant event into one log entry. It is also the read and delete
//! interface over the log it writes.

use std::sync::Arc;

use async_trait::async_trait;
use flowlog_core::{
    Clock, EngineEvent, EventBus, EventListener, EventLogConfig, Subscription, SystemClock,
};

use crate::entry::{LogEntry, PendingEntry};
use crate::error::AuditError;
use crate::extract::extract;
use crate::storage::{LogStorage, create_storage};

/// Converts engine events into log entries.
///
/// Holds no per-event state; concurrent events are ordered by the storage's
/// sequencer alone.
pub struct EventLogger {
    storage: Arc<dyn LogStorage>,
    clock: Arc<dyn Clock>,
    config: EventLogConfig,
}

impl std::fmt::Debug for EventLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventLogger")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl EventLogger {
    /// Create a logger writing to the given storage.
    pub fn new(config: &EventLogConfig, storage: Arc<dyn LogStorage>) -> Self {
        Self {
            storage,
            clock: Arc::new(SystemClock),
            config: config.clone(),
        }
    }

    /// Create a logger with the storage backend named in the configuration.
    pub fn from_config(config: &EventLogConfig) -> Result<Self, AuditError> {
        let storage = create_storage(&config.storage)?;
        Ok(Self::new(config, storage))
    }

    /// Stamp entries with this clock instead of wall-clock time.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Check if logging is enabled.
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn storage(&self) -> &Arc<dyn LogStorage> {
        &self.storage
    }

    /// Log one event.
    ///
    /// Returns the stored entry, or `None` when the event kind is not logged
    /// or has been excluded.
    pub async fn handle(&self, event: &EngineEvent) -> Result<Option<LogEntry>, AuditError> {
        let kind = event.kind();
        if !self.config.enabled || self.config.is_excluded(kind) {
            tracing::trace!(kind = %kind, "Event filtered by configuration");
            return Ok(None);
        }

        let Some(extraction) = extract(event) else {
            tracing::trace!(kind = %kind, "Event kind not logged");
            return Ok(None);
        };

        let pending = PendingEntry::builder(extraction.entry_type.as_str(), self.clock.now())
            .context(extraction.context)
            .fields(extraction.fields)
            .build()?;
        let entry = self.storage.append(pending).await?;

        tracing::debug!(
            log_number = entry.log_number,
            entry_type = %entry.entry_type,
            process_instance = ?entry.process_instance_id,
            "Event logged"
        );

        Ok(Some(entry))
    }

    /// Entries with a number greater than `after`, ascending, at most
    /// `max_results` of them.
    pub async fn get_log_entries(
        &self,
        after: Option<u64>,
        max_results: Option<usize>,
    ) -> Result<Vec<LogEntry>, AuditError> {
        self.storage.query(after, max_results).await
    }

    /// Remove one entry. Unknown numbers are ignored.
    pub async fn delete_log_entry(&self, log_number: u64) -> Result<(), AuditError> {
        self.storage.delete(log_number).await?;
        tracing::debug!(log_number, "Log entry deleted");
        Ok(())
    }

    /// Subscribe this logger to an engine's event bus.
    pub fn register(self: Arc<Self>, bus: &EventBus) -> Subscription {
        let subscription = bus.subscribe(self);
        tracing::info!(subscription = subscription.id(), "Event logger registered");
        subscription
    }
}

#[async_trait]
impl EventListener for EventLogger {
    fn name(&self) -> &str {
        "event-logger"
    }

    async fn on_event(&self, event: &EngineEvent) -> anyhow::Result<()> {
        self.handle(event).await?;
        Ok(())
    }
}
