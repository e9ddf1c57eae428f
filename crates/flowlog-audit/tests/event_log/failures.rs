//! Storage failures and subscription lifetime.

use super::common::*;
use async_trait::async_trait;
use flowlog_audit::{AuditError, LogEntry, LogStorage, MemoryStorage, PendingEntry};
use flowlog_core::{
    ActivityInfo, DispatchError, EngineEvent, EventBus, EventContext, EventKind, EventListener,
    EventLogConfig, EventPayload,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Memory storage whose operations can be made to fail.
#[derive(Default)]
struct FlakyStorage {
    inner: MemoryStorage,
    failing: AtomicBool,
    failing_queries: AtomicBool,
    failing_deletes: AtomicBool,
}

impl FlakyStorage {
    /// Fail appends.
    fn fail(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn fail_queries(&self, failing: bool) {
        self.failing_queries.store(failing, Ordering::SeqCst);
    }

    fn fail_deletes(&self, failing: bool) {
        self.failing_deletes.store(failing, Ordering::SeqCst);
    }
}

fn disk_error(flag: &AtomicBool) -> Result<(), AuditError> {
    if flag.load(Ordering::SeqCst) {
        return Err(AuditError::StorageError("disk full".to_string()));
    }
    Ok(())
}

#[async_trait]
impl LogStorage for FlakyStorage {
    async fn append(&self, entry: PendingEntry) -> Result<LogEntry, AuditError> {
        disk_error(&self.failing)?;
        self.inner.append(entry).await
    }

    async fn query(
        &self,
        after: Option<u64>,
        max_results: Option<usize>,
    ) -> Result<Vec<LogEntry>, AuditError> {
        disk_error(&self.failing_queries)?;
        self.inner.query(after, max_results).await
    }

    async fn delete(&self, log_number: u64) -> Result<(), AuditError> {
        disk_error(&self.failing_deletes)?;
        self.inner.delete(log_number).await
    }

    async fn last_log_number(&self) -> Result<Option<u64>, AuditError> {
        self.inner.last_log_number().await
    }
}

/// Listener that counts the events it sees.
#[derive(Default)]
struct CountingListener {
    seen: AtomicUsize,
}

#[async_trait]
impl EventListener for CountingListener {
    fn name(&self) -> &str {
        "counter"
    }

    async fn on_event(&self, _event: &EngineEvent) -> anyhow::Result<()> {
        self.seen.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn activity_completed() -> EventPayload {
    EventPayload::ActivityCompleted(ActivityInfo {
        id: "theStart".to_string(),
        ..Default::default()
    })
}

fn context() -> EventContext {
    EventContext::process(DEFINITION_ID, "pi-1").with_execution("pi-1")
}

// =============================================================================
// STORAGE FAILURES
// =============================================================================

#[tokio::test]
async fn test_storage_failure_reaches_publisher() {
    let storage = Arc::new(FlakyStorage::default());
    let engine = TestEngine::with_storage(&EventLogConfig::default(), storage.clone());
    storage.fail(true);

    let err = engine
        .publish(context(), activity_completed())
        .await
        .unwrap_err();

    let DispatchError::ListenerFailed {
        listener,
        kind,
        source,
    } = err;
    assert_eq!(listener, "event-logger");
    assert_eq!(kind, EventKind::ActivityCompleted);
    assert!(source.to_string().contains("disk full"));
    assert!(engine.entries().await.is_empty());
}

#[tokio::test]
async fn test_logging_resumes_after_failure() {
    let storage = Arc::new(FlakyStorage::default());
    let engine = TestEngine::with_storage(&EventLogConfig::default(), storage.clone());

    engine.publish(context(), activity_completed()).await.unwrap();
    storage.fail(true);
    assert!(engine.publish(context(), activity_completed()).await.is_err());
    storage.fail(false);
    engine.publish(context(), activity_completed()).await.unwrap();

    assert_eq!(numbers(&engine.entries().await), vec![1, 2]);
}

#[tokio::test]
async fn test_query_and_delete_failures_reach_caller() {
    let storage = Arc::new(FlakyStorage::default());
    let engine = TestEngine::with_storage(&EventLogConfig::default(), storage.clone());
    engine.publish(context(), activity_completed()).await.unwrap();

    storage.fail_queries(true);
    let err = engine.logger.get_log_entries(None, None).await.unwrap_err();
    assert!(matches!(err, AuditError::StorageError(_)));
    assert!(engine.logger.get_log_entries(Some(0), Some(1)).await.is_err());

    storage.fail_deletes(true);
    let err = engine.logger.delete_log_entry(1).await.unwrap_err();
    assert!(matches!(err, AuditError::StorageError(_)));

    storage.fail_queries(false);
    storage.fail_deletes(false);
    assert_eq!(numbers(&engine.entries().await), vec![1]);
}

#[tokio::test]
async fn test_failure_stops_later_listeners() {
    let storage = Arc::new(FlakyStorage::default());
    let engine = TestEngine::with_storage(&EventLogConfig::default(), storage.clone());
    let counter = Arc::new(CountingListener::default());
    let _counting = engine.bus.subscribe(counter.clone());

    engine.publish(context(), activity_completed()).await.unwrap();
    storage.fail(true);
    let _ = engine.publish(context(), activity_completed()).await;

    assert_eq!(counter.seen.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_unlogged_events_never_touch_storage() {
    let storage = Arc::new(FlakyStorage::default());
    let engine = TestEngine::with_storage(&EventLogConfig::default(), storage.clone());
    storage.fail(true);

    engine
        .publish(
            EventContext::default(),
            EventPayload::TimerFired {
                job_id: "job-1".to_string(),
            },
        )
        .await
        .unwrap();
    engine
        .publish(EventContext::default(), EventPayload::EngineClosed)
        .await
        .unwrap();
}

// =============================================================================
// SUBSCRIPTION LIFETIME
// =============================================================================

#[tokio::test]
async fn test_detached_logger_stops_logging() {
    let engine = TestEngine::new();
    let bus = engine.bus.clone();
    engine.publish(context(), activity_completed()).await.unwrap();

    let logger = engine.detach();
    assert_eq!(bus.listener_count(), 0);

    bus.publish(&EngineEvent::new(context(), activity_completed()))
        .await
        .unwrap();
    assert_eq!(logger.get_log_entries(None, None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_each_engine_has_its_own_listeners() {
    let first = TestEngine::new();
    let second = TestEngine::new();

    ParallelProcess::new("pi-1").start(&first).await.unwrap();

    assert_eq!(first.entries().await.len(), 15);
    assert!(second.entries().await.is_empty());

    let standalone = EventBus::new();
    assert_eq!(standalone.listener_count(), 0);
}
