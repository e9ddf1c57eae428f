//! Field names used in log entry data.

pub const ID: &str = "id";
pub const NAME: &str = "name";
pub const TENANT_ID: &str = "tenantId";
pub const BUSINESS_KEY: &str = "businessKey";
pub const USER_ID: &str = "userId";

pub const PROCESS_DEFINITION_ID: &str = "processDefinitionId";
pub const PROCESS_INSTANCE_ID: &str = "processInstanceId";
pub const EXECUTION_ID: &str = "executionId";

pub const ACTIVITY_ID: &str = "activityId";
pub const ACTIVITY_TYPE: &str = "activityType";
pub const BEHAVIOR_CLASS: &str = "behaviorClass";
pub const SIGNAL_NAME: &str = "signalName";
pub const SIGNAL_DATA: &str = "signalData";
pub const MESSAGE_NAME: &str = "messageName";
pub const MESSAGE_DATA: &str = "messageData";
pub const ERROR_CODE: &str = "errorCode";

pub const SOURCE_ACTIVITY_ID: &str = "sourceActivityId";
pub const SOURCE_ACTIVITY_NAME: &str = "sourceActivityName";
pub const SOURCE_ACTIVITY_TYPE: &str = "sourceActivityType";
pub const SOURCE_ACTIVITY_BEHAVIOR_CLASS: &str = "sourceActivityBehaviorClass";
pub const TARGET_ACTIVITY_ID: &str = "targetActivityId";
pub const TARGET_ACTIVITY_NAME: &str = "targetActivityName";
pub const TARGET_ACTIVITY_TYPE: &str = "targetActivityType";
pub const TARGET_ACTIVITY_BEHAVIOR_CLASS: &str = "targetActivityBehaviorClass";

pub const ASSIGNEE: &str = "assignee";
pub const CREATE_TIME: &str = "createTime";
pub const PRIORITY: &str = "priority";
// Task attributes deliberately kept out of task entries.
pub const DESCRIPTION: &str = "description";
pub const CATEGORY: &str = "category";
pub const OWNER: &str = "owner";
pub const DUE_DATE: &str = "dueDate";
pub const FORM_KEY: &str = "formKey";

pub const VALUE_STRING: &str = "valueString";
