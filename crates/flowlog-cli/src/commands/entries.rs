//! `flowlog entries` and `flowlog show`.

use anyhow::{Result, bail};
use flowlog_audit::{EventLogger, LogEntry};
use std::io::Write;

/// Print entries after `after`, one line each.
pub async fn list(
    logger: &EventLogger,
    after: Option<u64>,
    limit: Option<usize>,
    decode: bool,
    out: &mut impl Write,
) -> Result<()> {
    let entries = logger.get_log_entries(after, limit).await?;

    for entry in &entries {
        writeln!(out, "{}", entry.to_log_line())?;
        if decode {
            write_data(entry, out, "    ")?;
        }
    }

    tracing::debug!(count = entries.len(), "Listed log entries");
    Ok(())
}

/// Print one entry and its decoded data.
pub async fn show(logger: &EventLogger, log_number: u64, out: &mut impl Write) -> Result<()> {
    let Some(entry) = find(logger, log_number).await? else {
        bail!("log entry {} not found", log_number);
    };

    writeln!(out, "{}", entry.to_log_line())?;
    write_data(&entry, out, "")?;
    Ok(())
}

async fn find(logger: &EventLogger, log_number: u64) -> Result<Option<LogEntry>> {
    let after = log_number.checked_sub(1);
    let entry = logger
        .get_log_entries(after, Some(1))
        .await?
        .into_iter()
        .next()
        .filter(|e| e.log_number == log_number);
    Ok(entry)
}

fn write_data(entry: &LogEntry, out: &mut impl Write, indent: &str) -> Result<()> {
    let data = entry.decode_data()?;
    let pretty = serde_json::to_string_pretty(&data)?;
    for line in pretty.lines() {
        writeln!(out, "{}{}", indent, line)?;
    }
    Ok(())
}
