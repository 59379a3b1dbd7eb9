mod manager;
mod messages;
mod summary;
mod wrapper;

pub use manager::{TaskManager, TaskManagerParams};
pub use messages::{TaskMessages, TaskOperation};
pub use summary::TaskSummary;
pub use wrapper::TaskWrapper;

use getset::{CopyGetters, Getters};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A user-visible background job, identified by its name and metadata.
#[derive(Getters, CopyGetters, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinishedTask {
    #[getset(get = "pub")]
    name: String,

    #[getset(get = "pub")]
    #[serde(default)]
    metadata: Value,

    #[getset(get_copy = "pub")]
    #[serde(default)]
    success: bool,

    #[getset(get = "pub")]
    #[serde(default)]
    exception: Option<Value>,
}

impl FinishedTask {
    pub fn new<S: Into<String>>(name: S, metadata: Value) -> Self {
        Self {
            name: name.into(),
            metadata,
            success: false,
            exception: None,
        }
    }

    pub(crate) fn succeeded(&mut self) {
        self.success = true;
        self.exception = None;
    }

    pub(crate) fn failed<S: Into<String>>(&mut self, detail: S) {
        self.success = false;
        self.exception = Some(serde_json::json!({ "detail": detail.into() }));
    }

    /// Human readable failure reason, if the backend gave one.
    pub fn exception_detail(&self) -> Option<String> {
        self.exception.as_ref().map(|exception| match exception {
            Value::Object(map) => map
                .get("detail")
                .and_then(Value::as_str)
                .map_or_else(|| exception.to_string(), str::to_string),
            Value::String(detail) => detail.clone(),
            other => other.to_string(),
        })
    }

    pub fn is_same_task(&self, name: &str, metadata: &Value) -> bool {
        self.name == name && &self.metadata == metadata
    }
}

#[derive(Getters, CopyGetters, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutingTask {
    #[getset(get = "pub")]
    name: String,

    #[getset(get = "pub")]
    #[serde(default)]
    metadata: Value,

    #[getset(get = "pub")]
    #[serde(default)]
    begin_time: Option<String>,

    #[getset(get_copy = "pub")]
    #[serde(default)]
    progress: Option<u8>,
}

impl ExecutingTask {
    pub fn new<S: Into<String>>(name: S, metadata: Value) -> Self {
        Self {
            name: name.into(),
            metadata,
            begin_time: Some(chrono::Utc::now().to_rfc3339()),
            progress: None,
        }
    }

    pub fn is_same_task(&self, name: &str, metadata: &Value) -> bool {
        self.name == name && &self.metadata == metadata
    }
}

impl From<&FinishedTask> for ExecutingTask {
    fn from(task: &FinishedTask) -> Self {
        Self::new(task.name.clone(), task.metadata.clone())
    }
}

/// Response of the dashboard task listing.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskList {
    #[serde(default)]
    pub executing_tasks: Vec<ExecutingTask>,
    #[serde(default)]
    pub finished_tasks: Vec<FinishedTask>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(json!({"detail": "boom"}), "boom")]
    #[case(json!("plain"), "plain")]
    #[case(json!({"code": 1}), "{\"code\":1}")]
    fn test_exception_detail(#[case] exception: Value, #[case] expected: &str) {
        let mut task = FinishedTask::new("t", json!({}));
        task.exception = Some(exception);
        assert_eq!(task.exception_detail().as_deref(), Some(expected));
    }

    #[test]
    fn test_task_identity_uses_name_and_metadata() {
        let task = FinishedTask::new("nvmeof/subsystem/create", json!({"nqn": "a"}));
        assert!(task.is_same_task("nvmeof/subsystem/create", &json!({"nqn": "a"})));
        assert!(!task.is_same_task("nvmeof/subsystem/create", &json!({"nqn": "b"})));
        assert!(!task.is_same_task("nvmeof/subsystem/delete", &json!({"nqn": "a"})));
    }

    #[test]
    fn test_failed_then_succeeded_clears_exception() {
        let mut task = FinishedTask::new("t", json!({}));
        task.failed("nope");
        assert!(!task.success());
        assert_eq!(task.exception_detail().as_deref(), Some("nope"));

        task.succeeded();
        assert!(task.success());
        assert_eq!(task.exception(), &None);
    }
}
