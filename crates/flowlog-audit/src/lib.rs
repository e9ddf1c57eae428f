//! # flowlog-audit
//!
//! Durable, strictly ordered log of process engine events.
//!
//! This crate provides:
//! - The [`EventLogger`], a bus listener that turns engine events into log entries
//! - Per-type field extraction ([`extract`])
//! - Log number assignment ([`Sequencer`])
//! - Storage backends: in-memory and JSON Lines file ([`storage`])
//!
//! ## Entry Types
//!
//! | Entry Type | Logged for |
//! |------------|------------|
//! | `PROCESSINSTANCE_START` / `PROCESSINSTANCE_END` | Process instance started / completed |
//! | `ACTIVITY_*` | Activity started, completed, signaled, message or error received, compensated |
//! | `SEQUENCEFLOW_TAKEN` | A sequence flow was taken |
//! | `TASK_CREATED` / `TASK_ASSIGNED` / `TASK_COMPLETED` | User task lifecycle |
//! | `VARIABLE_CREATED` / `VARIABLE_UPDATED` / `VARIABLE_DELETED` | Process variable changes |
//!
//! Job, timer and engine lifecycle events are not logged.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use flowlog_audit::EventLogger;
//! use flowlog_core::{EventBus, FlowlogConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = FlowlogConfig::from_file("flowlog.yaml")?;
//! let logger = Arc::new(EventLogger::from_config(&config.event_log)?);
//!
//! let bus = EventBus::new();
//! let _subscription = Arc::clone(&logger).register(&bus);
//!
//! // ... the engine publishes events on `bus` ...
//!
//! for entry in logger.get_log_entries(None, Some(100)).await? {
//!     println!("{}", entry.to_log_line());
//! }
//! # Ok(())
//! # }
//! ```

pub mod entry;
pub mod error;
pub mod extract;
pub mod fields;
pub mod logger;
pub mod sequencer;
pub mod storage;

pub use entry::{EntryBuilder, FieldMap, LogEntry, PendingEntry};
pub use error::AuditError;
pub use extract::{ContextShape, EntryType, Extraction, extract};
pub use logger::EventLogger;
pub use sequencer::Sequencer;
pub use storage::{FileStorage, LogStorage, MemoryStorage, create_storage};
