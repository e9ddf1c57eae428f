//! Engine lifecycle events.
//!
//! The process engine publishes one [`EngineEvent`] per state change. Each
//! event pairs the execution context it happened in with a kind-specific
//! payload.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Kind of engine event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    // ===== Process instance =====
    ProcessInstanceStarted,
    ProcessInstanceCompleted,

    // ===== Activities =====
    ActivityStarted,
    ActivityCompleted,
    ActivitySignaled,
    ActivityMessageReceived,
    ActivityErrorReceived,
    ActivityCompensate,

    // ===== Flow =====
    #[serde(rename = "SEQUENCEFLOW_TAKEN")]
    SequenceFlowTaken,

    // ===== Tasks =====
    TaskCreated,
    TaskAssigned,
    TaskCompleted,

    // ===== Variables =====
    VariableCreated,
    VariableUpdated,
    VariableDeleted,

    // ===== Engine internals =====
    JobExecuted,
    TimerFired,
    EngineCreated,
    EngineClosed,
    Custom,
}

impl EventKind {
    /// Every kind, in declaration order.
    pub const ALL: [EventKind; 20] = [
        Self::ProcessInstanceStarted,
        Self::ProcessInstanceCompleted,
        Self::ActivityStarted,
        Self::ActivityCompleted,
        Self::ActivitySignaled,
        Self::ActivityMessageReceived,
        Self::ActivityErrorReceived,
        Self::ActivityCompensate,
        Self::SequenceFlowTaken,
        Self::TaskCreated,
        Self::TaskAssigned,
        Self::TaskCompleted,
        Self::VariableCreated,
        Self::VariableUpdated,
        Self::VariableDeleted,
        Self::JobExecuted,
        Self::TimerFired,
        Self::EngineCreated,
        Self::EngineClosed,
        Self::Custom,
    ];

    /// Upper-snake-case name, as written to log entries.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProcessInstanceStarted => "PROCESS_INSTANCE_STARTED",
            Self::ProcessInstanceCompleted => "PROCESS_INSTANCE_COMPLETED",
            Self::ActivityStarted => "ACTIVITY_STARTED",
            Self::ActivityCompleted => "ACTIVITY_COMPLETED",
            Self::ActivitySignaled => "ACTIVITY_SIGNALED",
            Self::ActivityMessageReceived => "ACTIVITY_MESSAGE_RECEIVED",
            Self::ActivityErrorReceived => "ACTIVITY_ERROR_RECEIVED",
            Self::ActivityCompensate => "ACTIVITY_COMPENSATE",
            Self::SequenceFlowTaken => "SEQUENCEFLOW_TAKEN",
            Self::TaskCreated => "TASK_CREATED",
            Self::TaskAssigned => "TASK_ASSIGNED",
            Self::TaskCompleted => "TASK_COMPLETED",
            Self::VariableCreated => "VARIABLE_CREATED",
            Self::VariableUpdated => "VARIABLE_UPDATED",
            Self::VariableDeleted => "VARIABLE_DELETED",
            Self::JobExecuted => "JOB_EXECUTED",
            Self::TimerFired => "TIMER_FIRED",
            Self::EngineCreated => "ENGINE_CREATED",
            Self::EngineClosed => "ENGINE_CLOSED",
            Self::Custom => "CUSTOM",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifiers of the execution an event happened in.
///
/// Every identifier is optional: engine-level events carry none, and a
/// partially populated context must never stop an event from being handled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process_definition_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process_instance_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,

    /// User the engine acted on behalf of when the event fired.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authenticated_user_id: Option<String>,
}

impl EventContext {
    /// Context scoped to a process instance.
    pub fn process(definition_id: impl Into<String>, instance_id: impl Into<String>) -> Self {
        Self {
            process_definition_id: Some(definition_id.into()),
            process_instance_id: Some(instance_id.into()),
            ..Default::default()
        }
    }

    /// Narrow the context to an execution.
    pub fn with_execution(mut self, execution_id: impl Into<String>) -> Self {
        self.execution_id = Some(execution_id.into());
        self
    }

    /// Narrow the context to a task.
    pub fn with_task(mut self, task_id: impl Into<String>) -> Self {
        self.task_id = Some(task_id.into());
        self
    }

    /// Attach the acting user.
    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.authenticated_user_id = Some(user_id.into());
        self
    }
}

/// A process instance as seen at start or end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessInstanceInfo {
    pub id: String,
    pub process_definition_id: String,
    /// Empty for the default tenant.
    #[serde(default)]
    pub tenant_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub business_key: Option<String>,
}

/// Descriptor of a BPMN activity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityInfo {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    /// BPMN element type, e.g. `userTask` or `parallelGateway`.
    #[serde(default)]
    pub activity_type: Option<String>,
    /// Behavior implementation that executed the activity.
    #[serde(default)]
    pub behavior_class: Option<String>,
}

/// A sequence flow between two activities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceFlowInfo {
    pub id: String,
    pub source: ActivityInfo,
    pub target: ActivityInfo,
}

/// Snapshot of a user task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskInfo {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    pub priority: i32,
    pub create_time: DateTime<Utc>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub form_key: Option<String>,
    #[serde(default)]
    pub process_definition_id: Option<String>,
    #[serde(default)]
    pub execution_id: Option<String>,
    #[serde(default)]
    pub tenant_id: String,
}

/// Typed value of a process variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum VariableValue {
    Null,
    String(String),
    Integer(i64),
    Double(f64),
    Boolean(bool),
    Date(DateTime<Utc>),
    Json(serde_json::Value),
}

impl VariableValue {
    /// Textual rendering of the value; `None` for null.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::String(s) => Some(s.clone()),
            Self::Integer(i) => Some(i.to_string()),
            Self::Double(d) => Some(d.to_string()),
            Self::Boolean(b) => Some(b.to_string()),
            Self::Date(d) => Some(d.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            Self::Json(v) => Some(v.to_string()),
        }
    }
}

impl From<&str> for VariableValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for VariableValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for VariableValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for VariableValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

/// A process variable change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableInfo {
    pub name: String,
    pub value: VariableValue,
}

/// Kind-specific payload of an engine event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum EventPayload {
    ProcessInstanceStarted(ProcessInstanceInfo),
    ProcessInstanceCompleted(ProcessInstanceInfo),

    ActivityStarted(ActivityInfo),
    ActivityCompleted(ActivityInfo),
    ActivitySignaled {
        activity: ActivityInfo,
        signal_name: Option<String>,
        signal_data: Option<serde_json::Value>,
    },
    ActivityMessageReceived {
        activity: ActivityInfo,
        message_name: Option<String>,
        message_data: Option<serde_json::Value>,
    },
    ActivityErrorReceived {
        activity: ActivityInfo,
        error_code: Option<String>,
    },
    ActivityCompensate(ActivityInfo),

    SequenceFlowTaken(SequenceFlowInfo),

    TaskCreated(TaskInfo),
    TaskAssigned(TaskInfo),
    TaskCompleted(TaskInfo),

    VariableCreated(VariableInfo),
    VariableUpdated(VariableInfo),
    VariableDeleted(VariableInfo),

    JobExecuted { job_id: String },
    TimerFired { job_id: String },
    EngineCreated,
    EngineClosed,
    Custom { name: String },
}

/// An event published by the process engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineEvent {
    #[serde(default)]
    pub context: EventContext,
    pub payload: EventPayload,
}

impl EngineEvent {
    pub fn new(context: EventContext, payload: EventPayload) -> Self {
        Self { context, payload }
    }

    /// Kind tag of the payload.
    pub fn kind(&self) -> EventKind {
        match &self.payload {
            EventPayload::ProcessInstanceStarted(_) => EventKind::ProcessInstanceStarted,
            EventPayload::ProcessInstanceCompleted(_) => EventKind::ProcessInstanceCompleted,
            EventPayload::ActivityStarted(_) => EventKind::ActivityStarted,
            EventPayload::ActivityCompleted(_) => EventKind::ActivityCompleted,
            EventPayload::ActivitySignaled { .. } => EventKind::ActivitySignaled,
            EventPayload::ActivityMessageReceived { .. } => EventKind::ActivityMessageReceived,
            EventPayload::ActivityErrorReceived { .. } => EventKind::ActivityErrorReceived,
            EventPayload::ActivityCompensate(_) => EventKind::ActivityCompensate,
            EventPayload::SequenceFlowTaken(_) => EventKind::SequenceFlowTaken,
            EventPayload::TaskCreated(_) => EventKind::TaskCreated,
            EventPayload::TaskAssigned(_) => EventKind::TaskAssigned,
            EventPayload::TaskCompleted(_) => EventKind::TaskCompleted,
            EventPayload::VariableCreated(_) => EventKind::VariableCreated,
            EventPayload::VariableUpdated(_) => EventKind::VariableUpdated,
            EventPayload::VariableDeleted(_) => EventKind::VariableDeleted,
            EventPayload::JobExecuted { .. } => EventKind::JobExecuted,
            EventPayload::TimerFired { .. } => EventKind::TimerFired,
            EventPayload::EngineCreated => EventKind::EngineCreated,
            EventPayload::EngineClosed => EventKind::EngineClosed,
            EventPayload::Custom { .. } => EventKind::Custom,
        }
    }
}
