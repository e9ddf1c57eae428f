//! File storage across restarts.

use super::common::*;
use flowlog_audit::{EventLogger, FileStorage, LogStorage, create_storage};
use flowlog_core::{EventKind, EventLogConfig, FlowlogConfig, StorageBackend};
use std::sync::Arc;
use tempfile::TempDir;

fn file_engine(dir: &TempDir) -> TestEngine {
    let storage: Arc<dyn LogStorage> = Arc::new(FileStorage::open(dir.path(), true).unwrap());
    TestEngine::with_storage(&EventLogConfig::default(), storage)
}

#[tokio::test]
async fn test_restart_between_phases() {
    let dir = TempDir::new().unwrap();
    let process = ParallelProcess::new("pi-1");

    {
        let engine = file_engine(&dir);
        process.start(&engine).await.unwrap();
        assert_eq!(engine.entries().await.len(), 15);
    }

    let engine = file_engine(&dir);
    assert_eq!(types(&engine.entries().await), START_PHASE);

    process.complete_tasks(&engine).await.unwrap();
    let entries = engine.entries().await;
    assert_eq!(numbers(&entries), (1..=28).collect::<Vec<_>>());
    assert_eq!(entries.last().unwrap().entry_type, "PROCESSINSTANCE_END");
}

#[tokio::test]
async fn test_replayed_entries_decode_identically() {
    let dir = TempDir::new().unwrap();
    let before = {
        let engine = file_engine(&dir);
        ParallelProcess::new("pi-1").run(&engine).await.unwrap();
        engine.entries().await
    };

    let after = file_engine(&dir).entries().await;
    assert_eq!(before, after);
    for (a, b) in before.iter().zip(&after) {
        assert_eq!(a.decode_data().unwrap(), b.decode_data().unwrap());
    }
}

#[tokio::test]
async fn test_deleted_numbers_are_not_reused_after_restart() {
    let dir = TempDir::new().unwrap();
    {
        let engine = file_engine(&dir);
        ParallelProcess::new("pi-1").run(&engine).await.unwrap();
        for entry in engine.entries().await {
            engine.logger.delete_log_entry(entry.log_number).await.unwrap();
        }
    }

    let engine = file_engine(&dir);
    assert!(engine.entries().await.is_empty());

    ParallelProcess::new("pi-2").start(&engine).await.unwrap();
    let entries = engine.entries().await;
    assert_eq!(numbers(&entries), (29..=43).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_logger_from_yaml_config() {
    let dir = TempDir::new().unwrap();
    let yaml = format!(
        r#"
event_log:
  exclude: [ACTIVITY_STARTED, SEQUENCEFLOW_TAKEN]
  storage:
    backend: file
    directory: {}
"#,
        dir.path().join("log").display()
    );
    let config = FlowlogConfig::from_yaml(&yaml).unwrap();
    assert_eq!(config.event_log.storage.backend, StorageBackend::File);
    assert!(config.event_log.is_excluded(EventKind::SequenceFlowTaken));

    {
        let engine =
            TestEngine::with_logger(EventLogger::from_config(&config.event_log).unwrap());
        ParallelProcess::new("pi-1").start(&engine).await.unwrap();
    }

    let storage = create_storage(&config.event_log.storage).unwrap();
    let entries = storage.query(None, None).await.unwrap();
    // 15 entries minus four activity starts and three flows
    assert_eq!(entries.len(), 8);
    assert!(
        entries
            .iter()
            .all(|e| e.entry_type != "ACTIVITY_STARTED" && e.entry_type != "SEQUENCEFLOW_TAKEN")
    );
}
