//! # flowlog-core
//!
//! Types shared by every flowlog crate:
//!
//! - [`event`]: lifecycle events published by the process engine
//! - [`bus`]: the per-engine event bus listeners subscribe to
//! - [`clock`]: time source used to stamp log entries
//! - [`config`]: YAML configuration

pub mod bus;
pub mod clock;
pub mod config;
pub mod event;

pub use bus::{DispatchError, EventBus, EventListener, Subscription};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, EventLogConfig, FlowlogConfig, StorageBackend, StorageConfig};
pub use event::{
    ActivityInfo, EngineEvent, EventContext, EventKind, EventPayload, ProcessInstanceInfo,
    SequenceFlowInfo, TaskInfo, VariableInfo, VariableValue,
};
