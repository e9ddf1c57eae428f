//! File-backed storage.
//!
//! The log is a single JSON Lines file, `event-log.jsonl`, holding one record
//! per line:
//!
//! ```text
//! {"op":"append","entry":{"log_number":1,"type":"VARIABLE_CREATED",...}}
//! {"op":"delete","log_number":1}
//! ```
//!
//! Records are only ever appended. Opening the storage replays the file into
//! an in-memory index, so queries never touch the disk.
//!
//! Only newline-terminated records count. A partial record left at the end of
//! the file by an interrupted write is cut off when the log is opened, and a
//! failed write is rolled back to the previous length, so the next record
//! always starts on a fresh line.

use super::{LogStorage, select};
use crate::entry::{LogEntry, PendingEntry};
use crate::error::AuditError;
use crate::sequencer::Sequencer;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
enum Record {
    Append { entry: LogEntry },
    Delete { log_number: u64 },
}

/// JSON Lines storage in a directory.
pub struct FileStorage {
    path: PathBuf,
    sync_on_append: bool,
    /// Held for the whole of an append or delete; serializes writers.
    writer: Mutex<File>,
    index: RwLock<BTreeMap<u64, LogEntry>>,
    sequencer: Sequencer,
}

/// Result of replaying an existing log file.
struct Replay {
    index: BTreeMap<u64, LogEntry>,
    last: Option<u64>,
    skipped: usize,
    /// Bytes of an unterminated record cut from the end of the file.
    truncated: u64,
}

impl FileStorage {
    pub const FILE_NAME: &'static str = "event-log.jsonl";

    /// Open the log in `directory`, creating the directory and file as needed.
    pub fn open(directory: impl AsRef<Path>, sync_on_append: bool) -> Result<Self, AuditError> {
        let directory = directory.as_ref();
        fs::create_dir_all(directory).map_err(|e| {
            AuditError::InitializationFailed(format!(
                "cannot create {}: {}",
                directory.display(),
                e
            ))
        })?;

        let path = directory.join(Self::FILE_NAME);
        let replay = Self::replay(&path)?;

        let writer = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| {
                AuditError::InitializationFailed(format!("cannot open {}: {}", path.display(), e))
            })?;

        tracing::info!(
            path = %path.display(),
            entries = replay.index.len(),
            last_log_number = ?replay.last,
            skipped = replay.skipped,
            truncated = replay.truncated,
            "Opened event log"
        );

        Ok(Self {
            path,
            sync_on_append,
            writer: Mutex::new(writer),
            index: RwLock::new(replay.index),
            sequencer: Sequencer::after(replay.last),
        })
    }

    /// Path of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn replay(path: &Path) -> Result<Replay, AuditError> {
        let mut replay = Replay {
            index: BTreeMap::new(),
            last: None,
            skipped: 0,
            truncated: 0,
        };
        if !path.exists() {
            return Ok(replay);
        }

        let mut reader = BufReader::new(File::open(path)?);
        let mut buf = Vec::new();
        let mut complete = 0u64;
        let mut line_num = 0usize;
        loop {
            buf.clear();
            let read = reader.read_until(b'\n', &mut buf)?;
            if read == 0 {
                break;
            }
            if buf.last() != Some(&b'\n') {
                replay.truncated = read as u64;
                break;
            }
            complete += read as u64;
            line_num += 1;

            let line = buf.trim_ascii();
            if line.is_empty() {
                continue;
            }

            match serde_json::from_slice::<Record>(line) {
                Ok(Record::Append { entry }) => {
                    replay.last = replay.last.max(Some(entry.log_number));
                    replay.index.insert(entry.log_number, entry);
                }
                Ok(Record::Delete { log_number }) => {
                    replay.index.remove(&log_number);
                }
                Err(e) => {
                    replay.skipped += 1;
                    tracing::warn!(
                        path = %path.display(),
                        line = line_num,
                        error = %e,
                        "Skipping unreadable event log record"
                    );
                }
            }
        }

        if replay.truncated > 0 {
            tracing::warn!(
                path = %path.display(),
                offset = complete,
                bytes = replay.truncated,
                "Discarding unterminated record at end of event log"
            );
            let file = OpenOptions::new().write(true).open(path)?;
            file.set_len(complete)?;
            file.sync_data()?;
        }

        Ok(replay)
    }

    /// Append one record line. On failure the file is cut back to its
    /// previous length so a partial line never precedes the next record.
    fn write_record(&self, file: &mut File, record: &Record) -> Result<(), AuditError> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');

        let len = file.metadata()?.len();
        let written = file.write_all(&line).and_then(|()| {
            if self.sync_on_append {
                file.sync_data()
            } else {
                Ok(())
            }
        });

        if let Err(e) = written {
            if let Err(rollback) = file.set_len(len) {
                tracing::error!(
                    path = %self.path.display(),
                    length = len,
                    error = %rollback,
                    "Failed to roll back partial event log record"
                );
            }
            return Err(e.into());
        }
        Ok(())
    }
}

#[async_trait]
impl LogStorage for FileStorage {
    async fn append(&self, entry: PendingEntry) -> Result<LogEntry, AuditError> {
        let mut file = self
            .writer
            .lock()
            .map_err(|e| AuditError::lock("writer", e))?;

        let entry = entry.into_entry(self.sequencer.next());
        let record = Record::Append {
            entry: entry.clone(),
        };
        self.write_record(&mut file, &record)?;

        self.index
            .write()
            .map_err(|e| AuditError::lock("index", e))?
            .insert(entry.log_number, entry.clone());
        Ok(entry)
    }

    async fn query(
        &self,
        after: Option<u64>,
        max_results: Option<usize>,
    ) -> Result<Vec<LogEntry>, AuditError> {
        let index = self
            .index
            .read()
            .map_err(|e| AuditError::lock("index", e))?;
        Ok(select(&index, after, max_results))
    }

    async fn delete(&self, log_number: u64) -> Result<(), AuditError> {
        let mut file = self
            .writer
            .lock()
            .map_err(|e| AuditError::lock("writer", e))?;

        let present = self
            .index
            .read()
            .map_err(|e| AuditError::lock("index", e))?
            .contains_key(&log_number);
        if !present {
            return Ok(());
        }

        self.write_record(&mut file, &Record::Delete { log_number })?;
        self.index
            .write()
            .map_err(|e| AuditError::lock("index", e))?
            .remove(&log_number);
        Ok(())
    }

    async fn last_log_number(&self) -> Result<Option<u64>, AuditError> {
        Ok(self.sequencer.last())
    }
}
