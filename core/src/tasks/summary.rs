use crate::tasks::ExecutingTask;
use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;

type TaskKey = (String, String);

fn key(name: &str, metadata: &Value) -> TaskKey {
    (name.to_string(), metadata.to_string())
}

/// Running tasks shown to the user while they execute in the background.
#[derive(Debug, Clone, Default)]
pub struct TaskSummary {
    running: Arc<DashMap<TaskKey, ExecutingTask>>,
}

impl TaskSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_running_task(&self, task: ExecutingTask) {
        self.running
            .insert(key(task.name(), task.metadata()), task);
    }

    pub fn remove(&self, name: &str, metadata: &Value) -> Option<ExecutingTask> {
        self.running
            .remove(&key(name, metadata))
            .map(|(_, task)| task)
    }

    pub fn running_tasks(&self) -> Vec<ExecutingTask> {
        self.running.iter().map(|item| item.value().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.running.len()
    }

    pub fn is_empty(&self) -> bool {
        self.running.is_empty()
    }
}
