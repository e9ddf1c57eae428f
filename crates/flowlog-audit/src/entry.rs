//! Log entry types.
//!
//! A [`PendingEntry`] is built from one engine event and becomes a
//! [`LogEntry`] once storage has assigned it a log number.

use chrono::{DateTime, Utc};
use flowlog_core::EventContext;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AuditError;

/// Decoded entry data: field name to value.
pub type FieldMap = serde_json::Map<String, Value>;

/// A stored event log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Unique, strictly increasing position in the log.
    pub log_number: u64,

    /// What happened, e.g. `TASK_CREATED` or `PROCESSINSTANCE_START`.
    #[serde(rename = "type")]
    pub entry_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process_definition_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process_instance_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,

    /// User the engine acted for when the event fired.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    /// When the logger handled the event, read from its clock before the
    /// entry was numbered. Entries from concurrent producers may carry
    /// timestamps out of log-number order; order by `log_number`.
    pub timestamp: DateTime<Utc>,

    /// JSON object text.
    pub data: String,
}

impl LogEntry {
    /// Decode the data blob.
    pub fn decode_data(&self) -> Result<FieldMap, AuditError> {
        serde_json::from_str(&self.data).map_err(|source| AuditError::DeserializationError {
            log_number: self.log_number,
            source,
        })
    }

    /// Format the entry as a human-readable log line.
    ///
    /// Format: `#N [timestamp] TYPE process=... instance=... [execution=...] [task=...] [user=...]`
    pub fn to_log_line(&self) -> String {
        let mut line = format!(
            "#{} [{}] {}",
            self.log_number,
            self.timestamp.format("%Y-%m-%dT%H:%M:%S%.3fZ"),
            self.entry_type,
        );

        let ids = [
            ("process", &self.process_definition_id),
            ("instance", &self.process_instance_id),
            ("execution", &self.execution_id),
            ("task", &self.task_id),
            ("user", &self.user_id),
        ];
        for (label, value) in ids {
            if let Some(value) = value {
                line.push_str(&format!(" {}={}", label, value));
            }
        }

        line
    }
}

/// An entry that has not been assigned a log number yet.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingEntry {
    pub entry_type: String,
    pub process_definition_id: Option<String>,
    pub process_instance_id: Option<String>,
    pub execution_id: Option<String>,
    pub task_id: Option<String>,
    pub user_id: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub data: String,
}

impl PendingEntry {
    /// Create a builder for an entry of the given type.
    pub fn builder(entry_type: impl Into<String>, timestamp: DateTime<Utc>) -> EntryBuilder {
        EntryBuilder::new(entry_type, timestamp)
    }

    /// Attach the log number assigned by storage.
    pub fn into_entry(self, log_number: u64) -> LogEntry {
        LogEntry {
            log_number,
            entry_type: self.entry_type,
            process_definition_id: self.process_definition_id,
            process_instance_id: self.process_instance_id,
            execution_id: self.execution_id,
            task_id: self.task_id,
            user_id: self.user_id,
            timestamp: self.timestamp,
            data: self.data,
        }
    }
}

/// Builder for pending entries.
#[derive(Debug)]
pub struct EntryBuilder {
    entry_type: String,
    context: EventContext,
    timestamp: DateTime<Utc>,
    fields: FieldMap,
}

impl EntryBuilder {
    /// Create a new builder with required fields.
    pub fn new(entry_type: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            entry_type: entry_type.into(),
            context: EventContext::default(),
            timestamp,
            fields: FieldMap::new(),
        }
    }

    /// Set all context identifiers and the acting user at once.
    pub fn context(mut self, context: EventContext) -> Self {
        self.context = context;
        self
    }

    /// Set the process definition ID.
    pub fn process_definition_id(mut self, id: impl Into<String>) -> Self {
        self.context.process_definition_id = Some(id.into());
        self
    }

    /// Set the process instance ID.
    pub fn process_instance_id(mut self, id: impl Into<String>) -> Self {
        self.context.process_instance_id = Some(id.into());
        self
    }

    /// Set the execution ID.
    pub fn execution_id(mut self, id: impl Into<String>) -> Self {
        self.context.execution_id = Some(id.into());
        self
    }

    /// Set the task ID.
    pub fn task_id(mut self, id: impl Into<String>) -> Self {
        self.context.task_id = Some(id.into());
        self
    }

    /// Set the acting user.
    pub fn user_id(mut self, id: impl Into<String>) -> Self {
        self.context.authenticated_user_id = Some(id.into());
        self
    }

    /// Add one data field.
    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Replace the data fields.
    pub fn fields(mut self, fields: FieldMap) -> Self {
        self.fields = fields;
        self
    }

    /// Build the pending entry, encoding the data fields.
    pub fn build(self) -> Result<PendingEntry, AuditError> {
        let data = serde_json::to_string(&self.fields)?;
        let context = self.context;

        Ok(PendingEntry {
            entry_type: self.entry_type,
            process_definition_id: context.process_definition_id,
            process_instance_id: context.process_instance_id,
            execution_id: context.execution_id,
            task_id: context.task_id,
            user_id: context.authenticated_user_id,
            timestamp: self.timestamp,
            data,
        })
    }
}
