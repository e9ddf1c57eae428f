//! `flowlog delete` and `flowlog purge`.

use anyhow::Result;
use flowlog_audit::EventLogger;
use std::io::Write;

/// Entries removed per query while purging.
const PURGE_BATCH: usize = 500;

/// Delete one entry. Deleting a missing entry succeeds.
pub async fn delete(logger: &EventLogger, log_number: u64, out: &mut impl Write) -> Result<()> {
    logger.delete_log_entry(log_number).await?;
    writeln!(out, "✔ Deleted log entry {}", log_number)?;
    Ok(())
}

/// Delete every entry currently in the log.
pub async fn purge(logger: &EventLogger, out: &mut impl Write) -> Result<()> {
    let mut deleted = 0usize;
    let mut after = None;

    loop {
        let batch = logger.get_log_entries(after, Some(PURGE_BATCH)).await?;
        let Some(last) = batch.last() else {
            break;
        };
        after = Some(last.log_number);

        for entry in &batch {
            logger.delete_log_entry(entry.log_number).await?;
        }
        deleted += batch.len();
    }

    tracing::info!(deleted, "Event log purged");
    writeln!(out, "✔ Deleted {} log entries", deleted)?;
    Ok(())
}
