//! Concurrent publishers and readers.

use super::common::*;
use flowlog_audit::{FileStorage, LogEntry, LogStorage};
use flowlog_core::EventLogConfig;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tempfile::TempDir;

const INSTANCES: usize = 8;
const ENTRIES_PER_RUN: usize = START_PHASE.len() + COMPLETE_PHASE.len();

async fn run_instances(engine: Arc<TestEngine>) {
    let handles: Vec<_> = (0..INSTANCES)
        .map(|i| {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move {
                ParallelProcess::new(format!("pi-{i}"))
                    .run(&engine)
                    .await
                    .unwrap();
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap();
    }
}

fn assert_consecutive_and_per_instance_order(entries: &[LogEntry]) {
    let total = (INSTANCES * ENTRIES_PER_RUN) as u64;
    assert_eq!(numbers(entries), (1..=total).collect::<Vec<_>>());

    let mut per_instance: HashMap<&str, Vec<&str>> = HashMap::new();
    for entry in entries {
        let instance = entry.process_instance_id.as_deref().unwrap();
        per_instance
            .entry(instance)
            .or_default()
            .push(entry.entry_type.as_str());
    }

    let expected: Vec<&str> = START_PHASE.iter().chain(COMPLETE_PHASE.iter()).copied().collect();
    assert_eq!(per_instance.len(), INSTANCES);
    for (instance, seen) in per_instance {
        assert_eq!(seen, expected, "entries of {instance} out of order");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_instances_get_unique_consecutive_numbers() {
    let engine = Arc::new(TestEngine::new());

    run_instances(Arc::clone(&engine)).await;

    let entries = engine.entries().await;
    assert_consecutive_and_per_instance_order(&entries);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_instances_on_file_storage() {
    let dir = TempDir::new().unwrap();
    let storage: Arc<dyn LogStorage> = Arc::new(FileStorage::open(dir.path(), false).unwrap());
    let engine = Arc::new(TestEngine::with_storage(
        &EventLogConfig::default(),
        Arc::clone(&storage),
    ));

    run_instances(Arc::clone(&engine)).await;

    assert_consecutive_and_per_instance_order(&engine.entries().await);

    drop(engine);
    drop(storage);
    let reopened = FileStorage::open(dir.path(), false).unwrap();
    let replayed = reopened.query(None, None).await.unwrap();
    assert_consecutive_and_per_instance_order(&replayed);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_reader_never_sees_gaps_while_writers_run() {
    let engine = Arc::new(TestEngine::new());
    let done = Arc::new(AtomicBool::new(false));

    let reader = {
        let logger = Arc::clone(&engine.logger);
        let done = Arc::clone(&done);
        tokio::spawn(async move {
            let mut last = 0u64;
            loop {
                let finished = done.load(Ordering::SeqCst);
                let page = logger.get_log_entries(Some(last), None).await.unwrap();
                for entry in &page {
                    assert_eq!(entry.log_number, last + 1, "reader saw a gap");
                    last = entry.log_number;
                }
                if finished {
                    return last;
                }
                tokio::task::yield_now().await;
            }
        })
    };

    run_instances(Arc::clone(&engine)).await;
    done.store(true, Ordering::SeqCst);

    let last = reader.await.unwrap();
    assert_eq!(last, (INSTANCES * ENTRIES_PER_RUN) as u64);
}
