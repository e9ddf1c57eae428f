//! Field extraction: which events become log entries, and with what fields.
//!
//! Every event kind maps to at most one [`EntryType`]. The mapping is an
//! exhaustive match, so adding a kind to the engine's event model forces a
//! decision here.
//!
//! | Entry type | Context ids | Data fields |
//! |---|---|---|
//! | `VARIABLE_*` | definition, instance | processDefinitionId, processInstanceId, valueString |
//! | `PROCESSINSTANCE_START` / `_END` | definition, instance | id, processDefinitionId, tenantId |
//! | `ACTIVITY_*` | + execution | activityId, processDefinitionId, processInstanceId, executionId, activityType, behaviorClass (+ signal/message/error details) |
//! | `SEQUENCEFLOW_TAKEN` | + execution | id, source/target activity id, name, type, behaviorClass |
//! | `TASK_CREATED` / `TASK_ASSIGNED` | + execution, task | id, name, assignee, createTime, priority, processDefinitionId, executionId, tenantId |
//! | `TASK_COMPLETED` | + execution, task | task fields + userId |
//!
//! A field whose source value is missing is left out of the data rather than
//! written as null.

use chrono::{DateTime, SecondsFormat, Utc};
use flowlog_core::{
    ActivityInfo, EngineEvent, EventContext, EventKind, EventPayload, ProcessInstanceInfo,
    SequenceFlowInfo, TaskInfo, VariableInfo,
};
use serde_json::Value;

use crate::entry::FieldMap;
use crate::fields;

/// Type of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryType {
    /// Synthetic bracket written when a process instance starts.
    ProcessInstanceStart,
    /// Synthetic bracket written when a process instance ends.
    ProcessInstanceEnd,
    ActivityStarted,
    ActivityCompleted,
    ActivitySignaled,
    ActivityMessageReceived,
    ActivityErrorReceived,
    ActivityCompensate,
    SequenceFlowTaken,
    TaskCreated,
    TaskAssigned,
    TaskCompleted,
    VariableCreated,
    VariableUpdated,
    VariableDeleted,
}

/// Which context identifiers an entry type carries.
///
/// Process definition and instance ids are always carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextShape {
    pub execution: bool,
    pub task: bool,
}

impl ContextShape {
    const PROCESS: Self = Self {
        execution: false,
        task: false,
    };
    const EXECUTION: Self = Self {
        execution: true,
        task: false,
    };
    const TASK: Self = Self {
        execution: true,
        task: true,
    };

    /// Keep only the identifiers this shape allows.
    pub fn apply(&self, context: EventContext) -> EventContext {
        EventContext {
            execution_id: context.execution_id.filter(|_| self.execution),
            task_id: context.task_id.filter(|_| self.task),
            ..context
        }
    }
}

impl EntryType {
    /// Entry type logged for an event kind, if the kind is logged at all.
    pub fn for_kind(kind: EventKind) -> Option<Self> {
        let entry_type = match kind {
            EventKind::ProcessInstanceStarted => Self::ProcessInstanceStart,
            EventKind::ProcessInstanceCompleted => Self::ProcessInstanceEnd,
            EventKind::ActivityStarted => Self::ActivityStarted,
            EventKind::ActivityCompleted => Self::ActivityCompleted,
            EventKind::ActivitySignaled => Self::ActivitySignaled,
            EventKind::ActivityMessageReceived => Self::ActivityMessageReceived,
            EventKind::ActivityErrorReceived => Self::ActivityErrorReceived,
            EventKind::ActivityCompensate => Self::ActivityCompensate,
            EventKind::SequenceFlowTaken => Self::SequenceFlowTaken,
            EventKind::TaskCreated => Self::TaskCreated,
            EventKind::TaskAssigned => Self::TaskAssigned,
            EventKind::TaskCompleted => Self::TaskCompleted,
            EventKind::VariableCreated => Self::VariableCreated,
            EventKind::VariableUpdated => Self::VariableUpdated,
            EventKind::VariableDeleted => Self::VariableDeleted,
            EventKind::JobExecuted
            | EventKind::TimerFired
            | EventKind::EngineCreated
            | EventKind::EngineClosed
            | EventKind::Custom => return None,
        };
        Some(entry_type)
    }

    /// Name written to the entry's `type`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProcessInstanceStart => "PROCESSINSTANCE_START",
            Self::ProcessInstanceEnd => "PROCESSINSTANCE_END",
            Self::ActivityStarted => EventKind::ActivityStarted.as_str(),
            Self::ActivityCompleted => EventKind::ActivityCompleted.as_str(),
            Self::ActivitySignaled => EventKind::ActivitySignaled.as_str(),
            Self::ActivityMessageReceived => EventKind::ActivityMessageReceived.as_str(),
            Self::ActivityErrorReceived => EventKind::ActivityErrorReceived.as_str(),
            Self::ActivityCompensate => EventKind::ActivityCompensate.as_str(),
            Self::SequenceFlowTaken => EventKind::SequenceFlowTaken.as_str(),
            Self::TaskCreated => EventKind::TaskCreated.as_str(),
            Self::TaskAssigned => EventKind::TaskAssigned.as_str(),
            Self::TaskCompleted => EventKind::TaskCompleted.as_str(),
            Self::VariableCreated => EventKind::VariableCreated.as_str(),
            Self::VariableUpdated => EventKind::VariableUpdated.as_str(),
            Self::VariableDeleted => EventKind::VariableDeleted.as_str(),
        }
    }

    pub fn context_shape(&self) -> ContextShape {
        match self {
            Self::ProcessInstanceStart
            | Self::ProcessInstanceEnd
            | Self::VariableCreated
            | Self::VariableUpdated
            | Self::VariableDeleted => ContextShape::PROCESS,
            Self::ActivityStarted
            | Self::ActivityCompleted
            | Self::ActivitySignaled
            | Self::ActivityMessageReceived
            | Self::ActivityErrorReceived
            | Self::ActivityCompensate
            | Self::SequenceFlowTaken => ContextShape::EXECUTION,
            Self::TaskCreated | Self::TaskAssigned | Self::TaskCompleted => ContextShape::TASK,
        }
    }
}

impl std::fmt::Display for EntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an event contributes to the log.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub entry_type: EntryType,
    /// Context identifiers, already narrowed to the entry type's shape.
    pub context: EventContext,
    pub fields: FieldMap,
}

/// Map an event to its entry type, context and data fields.
///
/// Returns `None` for kinds that are not logged.
pub fn extract(event: &EngineEvent) -> Option<Extraction> {
    let entry_type = EntryType::for_kind(event.kind())?;
    let mut context = event.context.clone();
    let mut data = Fields::default();

    match &event.payload {
        EventPayload::ProcessInstanceStarted(instance)
        | EventPayload::ProcessInstanceCompleted(instance) => {
            fill_from_instance(&mut context, instance);
            process_instance_fields(&mut data, instance);
        }
        EventPayload::ActivityStarted(activity)
        | EventPayload::ActivityCompleted(activity)
        | EventPayload::ActivityCompensate(activity) => {
            activity_fields(&mut data, &context, activity);
        }
        EventPayload::ActivitySignaled {
            activity,
            signal_name,
            signal_data,
        } => {
            activity_fields(&mut data, &context, activity);
            data.put_opt(fields::SIGNAL_NAME, signal_name.clone());
            data.put_opt(fields::SIGNAL_DATA, signal_data.clone());
        }
        EventPayload::ActivityMessageReceived {
            activity,
            message_name,
            message_data,
        } => {
            activity_fields(&mut data, &context, activity);
            data.put_opt(fields::MESSAGE_NAME, message_name.clone());
            data.put_opt(fields::MESSAGE_DATA, message_data.clone());
        }
        EventPayload::ActivityErrorReceived {
            activity,
            error_code,
        } => {
            activity_fields(&mut data, &context, activity);
            data.put_opt(fields::ERROR_CODE, error_code.clone());
        }
        EventPayload::SequenceFlowTaken(flow) => sequence_flow_fields(&mut data, flow),
        EventPayload::TaskCreated(task) | EventPayload::TaskAssigned(task) => {
            fill_from_task(&mut context, task);
            task_fields(&mut data, &context, task);
        }
        EventPayload::TaskCompleted(task) => {
            fill_from_task(&mut context, task);
            task_fields(&mut data, &context, task);
            data.put_opt(fields::USER_ID, context.authenticated_user_id.clone());
        }
        EventPayload::VariableCreated(variable)
        | EventPayload::VariableUpdated(variable)
        | EventPayload::VariableDeleted(variable) => {
            variable_fields(&mut data, &context, variable);
        }
        EventPayload::JobExecuted { .. }
        | EventPayload::TimerFired { .. }
        | EventPayload::EngineCreated
        | EventPayload::EngineClosed
        | EventPayload::Custom { .. } => return None,
    }

    Some(Extraction {
        entry_type,
        context: entry_type.context_shape().apply(context),
        fields: data.into_map(),
    })
}

/// Field map that drops missing values.
#[derive(Default)]
struct Fields {
    map: FieldMap,
}

impl Fields {
    fn put(&mut self, key: &str, value: impl Into<Value>) {
        self.map.insert(key.to_string(), value.into());
    }

    fn put_opt<V: Into<Value>>(&mut self, key: &str, value: Option<V>) {
        if let Some(value) = value {
            self.put(key, value);
        }
    }

    fn put_time(&mut self, key: &str, time: DateTime<Utc>) {
        self.put(key, time.to_rfc3339_opts(SecondsFormat::AutoSi, true));
    }

    fn into_map(self) -> FieldMap {
        self.map
    }
}

fn fill_from_instance(context: &mut EventContext, instance: &ProcessInstanceInfo) {
    context
        .process_definition_id
        .get_or_insert_with(|| instance.process_definition_id.clone());
    context
        .process_instance_id
        .get_or_insert_with(|| instance.id.clone());
}

fn fill_from_task(context: &mut EventContext, task: &TaskInfo) {
    if context.process_definition_id.is_none() {
        context.process_definition_id = task.process_definition_id.clone();
    }
    if context.execution_id.is_none() {
        context.execution_id = task.execution_id.clone();
    }
    context.task_id.get_or_insert_with(|| task.id.clone());
}

fn process_instance_fields(data: &mut Fields, instance: &ProcessInstanceInfo) {
    data.put(fields::ID, instance.id.clone());
    data.put(
        fields::PROCESS_DEFINITION_ID,
        instance.process_definition_id.clone(),
    );
    data.put(fields::TENANT_ID, instance.tenant_id.clone());
}

fn activity_fields(data: &mut Fields, context: &EventContext, activity: &ActivityInfo) {
    data.put(fields::ACTIVITY_ID, activity.id.clone());
    data.put_opt(
        fields::PROCESS_DEFINITION_ID,
        context.process_definition_id.clone(),
    );
    data.put_opt(
        fields::PROCESS_INSTANCE_ID,
        context.process_instance_id.clone(),
    );
    data.put_opt(fields::EXECUTION_ID, context.execution_id.clone());
    data.put_opt(fields::ACTIVITY_TYPE, activity.activity_type.clone());
    data.put_opt(fields::BEHAVIOR_CLASS, activity.behavior_class.clone());
}

fn sequence_flow_fields(data: &mut Fields, flow: &SequenceFlowInfo) {
    data.put(fields::ID, flow.id.clone());

    data.put(fields::SOURCE_ACTIVITY_ID, flow.source.id.clone());
    data.put_opt(fields::SOURCE_ACTIVITY_NAME, flow.source.name.clone());
    data.put_opt(fields::SOURCE_ACTIVITY_TYPE, flow.source.activity_type.clone());
    data.put_opt(
        fields::SOURCE_ACTIVITY_BEHAVIOR_CLASS,
        flow.source.behavior_class.clone(),
    );

    data.put(fields::TARGET_ACTIVITY_ID, flow.target.id.clone());
    data.put_opt(fields::TARGET_ACTIVITY_NAME, flow.target.name.clone());
    data.put_opt(fields::TARGET_ACTIVITY_TYPE, flow.target.activity_type.clone());
    data.put_opt(
        fields::TARGET_ACTIVITY_BEHAVIOR_CLASS,
        flow.target.behavior_class.clone(),
    );
}

fn task_fields(data: &mut Fields, context: &EventContext, task: &TaskInfo) {
    data.put(fields::ID, task.id.clone());
    data.put_opt(fields::NAME, task.name.clone());
    data.put_opt(fields::ASSIGNEE, task.assignee.clone());
    data.put_time(fields::CREATE_TIME, task.create_time);
    data.put(fields::PRIORITY, task.priority);
    data.put_opt(
        fields::PROCESS_DEFINITION_ID,
        context.process_definition_id.clone(),
    );
    data.put_opt(fields::EXECUTION_ID, context.execution_id.clone());
    data.put(fields::TENANT_ID, task.tenant_id.clone());
}

fn variable_fields(data: &mut Fields, context: &EventContext, variable: &VariableInfo) {
    data.put_opt(
        fields::PROCESS_DEFINITION_ID,
        context.process_definition_id.clone(),
    );
    data.put_opt(
        fields::PROCESS_INSTANCE_ID,
        context.process_instance_id.clone(),
    );
    data.put_opt(fields::VALUE_STRING, variable.value.to_text());
}
