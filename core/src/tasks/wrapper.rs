use crate::api::{ApiError, CallOutcome};
use crate::notifications::{Notification, NotificationKind, Notifier};
use crate::tasks::{ExecutingTask, FinishedTask, TaskManager, TaskMessages};
use std::sync::Arc;
use tracing::{debug, info};

/// Turns a backend call into a tracked, user-visible task.
#[derive(Clone)]
pub struct TaskWrapper {
    notifier: Arc<dyn Notifier>,
    manager: TaskManager,
}

impl TaskWrapper {
    pub fn new(notifier: Arc<dyn Notifier>, manager: TaskManager) -> Self {
        Self { notifier, manager }
    }

    pub fn manager(&self) -> &TaskManager {
        &self.manager
    }

    /// Awaits `call` and reports its outcome against `task`.
    ///
    /// A call the backend accepted for background execution completes
    /// right away; the task is then followed by the [`TaskManager`].
    pub async fn wrap_task_around_call<F>(
        &self,
        mut task: FinishedTask,
        call: F,
    ) -> Result<FinishedTask, ApiError>
    where
        F: Future<Output = Result<CallOutcome, ApiError>>,
    {
        debug!("Starting task '{}' {}", task.name(), task.metadata());

        match call.await {
            Ok(CallOutcome::Accepted) => {
                let title = TaskMessages::running_title(task.name(), task.metadata());
                info!("Task '{}' continues in the background", task.name());
                self.notifier.notify(
                    Notification::builder()
                        .kind(NotificationKind::Info)
                        .title(title)
                        .build(),
                );
                self.manager.track(ExecutingTask::from(&task));
                Ok(task)
            }
            Ok(CallOutcome::Finished) => {
                task.succeeded();
                self.notifier.notify(
                    Notification::builder()
                        .kind(NotificationKind::Success)
                        .title(TaskMessages::success_title(task.name(), task.metadata()))
                        .build(),
                );
                Ok(task)
            }
            Err(err) => {
                task.failed(err.to_string());
                self.notifier.notify(
                    Notification::builder()
                        .kind(NotificationKind::Error)
                        .title(TaskMessages::error_title(task.name(), task.metadata()))
                        .message(err.to_string())
                        .build(),
                );
                Err(err)
            }
        }
    }
}
