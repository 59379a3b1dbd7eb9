use serde_json::Value;

/// The verb forms used in task titles, e.g. "Creating", "Created", "create".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskOperation {
    pub running: &'static str,
    pub success: &'static str,
    pub failure: &'static str,
}

impl TaskOperation {
    pub const CREATE: Self = Self {
        running: "Creating",
        success: "Created",
        failure: "create",
    };

    pub const EXECUTE: Self = Self {
        running: "Executing",
        success: "Executed",
        failure: "execute",
    };
}

/// Titles shown while a task runs and once it settles.
pub struct TaskMessages;

impl TaskMessages {
    fn describe(name: &str, metadata: &Value) -> (TaskOperation, String) {
        match name {
            "nvmeof/subsystem/create" => {
                let nqn = metadata.get("nqn").and_then(Value::as_str).unwrap_or("");
                (TaskOperation::CREATE, format!("subsystem '{nqn}'"))
            }
            _ => (TaskOperation::EXECUTE, format!("task '{name}'")),
        }
    }

    pub fn running_title(name: &str, metadata: &Value) -> String {
        let (operation, involves) = Self::describe(name, metadata);
        format!("{} {involves}", operation.running)
    }

    pub fn success_title(name: &str, metadata: &Value) -> String {
        let (operation, involves) = Self::describe(name, metadata);
        format!("{} {involves}", operation.success)
    }

    pub fn error_title(name: &str, metadata: &Value) -> String {
        let (operation, involves) = Self::describe(name, metadata);
        format!("Failed to {} {involves}", operation.failure)
    }
}
