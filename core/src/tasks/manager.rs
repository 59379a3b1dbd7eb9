use crate::api::TaskApi;
use crate::notifications::{Notification, NotificationKind, Notifier};
use crate::tasks::{ExecutingTask, FinishedTask, TaskMessages, TaskSummary};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{debug, error, warn};
use typed_builder::TypedBuilder;

const MAX_POLL_FAILURES: usize = 5;

#[derive(TypedBuilder)]
pub struct TaskManagerParams {
    api: Arc<dyn TaskApi>,
    notifier: Arc<dyn Notifier>,
    #[builder(default)]
    summary: TaskSummary,
    #[builder(default = Duration::from_secs(2))]
    poll_interval: Duration,
    /// Upper bound on how long a single task is followed.
    #[builder(default = Duration::from_secs(600))]
    timeout: Duration,
}

/// Follows tasks the backend accepted until they finish.
#[derive(Clone)]
pub struct TaskManager {
    api: Arc<dyn TaskApi>,
    notifier: Arc<dyn Notifier>,
    summary: TaskSummary,
    poll_interval: Duration,
    timeout: Duration,
    join_set: Arc<Mutex<JoinSet<()>>>,
}

impl TaskManager {
    pub fn new(params: TaskManagerParams) -> Self {
        Self {
            api: params.api,
            notifier: params.notifier,
            summary: params.summary,
            poll_interval: params.poll_interval,
            timeout: params.timeout,
            join_set: Arc::default(),
        }
    }

    pub fn summary(&self) -> &TaskSummary {
        &self.summary
    }

    pub fn track(&self, task: ExecutingTask) {
        self.summary.add_running_task(task.clone());

        let api = self.api.clone();
        let notifier = self.notifier.clone();
        let summary = self.summary.clone();
        let poll_interval = self.poll_interval;
        let timeout = self.timeout;

        let Ok(mut join_set) = self.join_set.lock() else {
            error!("Failed to track task '{}': task set poisoned", task.name());
            return;
        };

        join_set.spawn(async move {
            let finished = tokio::time::timeout(
                timeout,
                poll_until_finished(api.as_ref(), &task, poll_interval),
            )
            .await
            .unwrap_or_else(|_| {
                warn!(
                    "Task '{}' did not finish within {:?}",
                    task.name(),
                    timeout
                );
                None
            });
            summary.remove(task.name(), task.metadata());

            match finished {
                Some(finished) if finished.success() => notifier.notify(
                    Notification::builder()
                        .kind(NotificationKind::Success)
                        .title(TaskMessages::success_title(task.name(), task.metadata()))
                        .build(),
                ),
                Some(finished) => {
                    let title = TaskMessages::error_title(task.name(), task.metadata());
                    notifier.notify(match finished.exception_detail() {
                        Some(detail) => Notification::builder()
                            .kind(NotificationKind::Error)
                            .title(title)
                            .message(detail)
                            .build(),
                        None => Notification::builder()
                            .kind(NotificationKind::Error)
                            .title(title)
                            .build(),
                    });
                }
                None => warn!("Lost track of task '{}'", task.name()),
            }
        });
    }

    /// Waits until every tracked task has settled.
    pub async fn join_all(&self) {
        let join_set = match self.join_set.lock() {
            Ok(mut join_set) => std::mem::take(&mut *join_set),
            Err(_) => {
                error!("Unable to join tracked tasks: task set poisoned");
                return;
            }
        };

        let _ = join_set.join_all().await;
    }
}

async fn poll_until_finished(
    api: &dyn TaskApi,
    task: &ExecutingTask,
    poll_interval: Duration,
) -> Option<FinishedTask> {
    let mut failures = 0;
    loop {
        tokio::time::sleep(poll_interval).await;

        match api.tasks(task.name()).await {
            Ok(list) => {
                failures = 0;
                if let Some(finished) = list
                    .finished_tasks
                    .into_iter()
                    .find(|t| t.is_same_task(task.name(), task.metadata()))
                {
                    return Some(finished);
                }

                if !list
                    .executing_tasks
                    .iter()
                    .any(|t| t.is_same_task(task.name(), task.metadata()))
                {
                    return None;
                }

                debug!("Task '{}' is still executing", task.name());
            }
            Err(err) => {
                warn!("Unable to poll task '{}': {}", task.name(), err);
                failures += 1;
                if failures >= MAX_POLL_FAILURES {
                    return None;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, MockTaskApi};
    use crate::notifications::MockNotifier;
    use crate::tasks::TaskList;
    use mockall::Sequence;
    use serde_json::{Value, json};

    fn executing(nqn: &str) -> ExecutingTask {
        ExecutingTask::new("nvmeof/subsystem/create", json!({ "nqn": nqn }))
    }

    fn finished(nqn: &str, exception: Option<Value>) -> FinishedTask {
        let mut task = FinishedTask::new("nvmeof/subsystem/create", json!({ "nqn": nqn }));
        match exception {
            Some(exception) => task.exception = Some(exception),
            None => task.succeeded(),
        }
        task
    }

    #[test_log::test(tokio::test(start_paused = true))]
    async fn test_stops_following_task_after_timeout() {
        let mut api = MockTaskApi::new();
        api.expect_tasks().returning(|_| {
            Ok(TaskList {
                executing_tasks: vec![executing("a")],
                finished_tasks: vec![],
            })
        });

        let mut notifier = MockNotifier::new();
        notifier.expect_notify().never();

        let manager = TaskManager::new(
            TaskManagerParams::builder()
                .api(Arc::new(api))
                .notifier(Arc::new(notifier))
                .poll_interval(Duration::from_secs(1))
                .timeout(Duration::from_secs(30))
                .build(),
        );
        let started = tokio::time::Instant::now();
        manager.track(executing("a"));
        manager.join_all().await;

        assert!(started.elapsed() >= Duration::from_secs(30));
        assert!(started.elapsed() < Duration::from_secs(32));
        assert!(manager.summary().is_empty());
    }

    fn manager(api: MockTaskApi, notifier: MockNotifier) -> TaskManager {
        TaskManager::new(
            TaskManagerParams::builder()
                .api(Arc::new(api))
                .notifier(Arc::new(notifier))
                .poll_interval(Duration::from_millis(100))
                .build(),
        )
    }

    #[test_log::test(tokio::test(start_paused = true))]
    async fn test_tracks_task_until_success() {
        let mut seq = Sequence::new();
        let mut api = MockTaskApi::new();
        api.expect_tasks()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                Ok(TaskList {
                    executing_tasks: vec![executing("a")],
                    finished_tasks: vec![],
                })
            });
        api.expect_tasks()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                Ok(TaskList {
                    executing_tasks: vec![],
                    finished_tasks: vec![finished("b", None), finished("a", None)],
                })
            });

        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .withf(|n| {
                n.kind() == NotificationKind::Success
                    && n.title() == "Created subsystem 'a'"
            })
            .times(1)
            .return_const(());

        let manager = manager(api, notifier);
        manager.track(executing("a"));
        assert_eq!(manager.summary().len(), 1);

        manager.join_all().await;
        assert!(manager.summary().is_empty());
    }

    #[test_log::test(tokio::test(start_paused = true))]
    async fn test_reports_failed_task() {
        let mut api = MockTaskApi::new();
        api.expect_tasks().returning(|_| {
            Ok(TaskList {
                executing_tasks: vec![],
                finished_tasks: vec![finished("a", Some(json!({"detail": "gateway down"})))],
            })
        });

        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .withf(|n| {
                n.kind() == NotificationKind::Error
                    && n.title() == "Failed to create subsystem 'a'"
                    && n.message().as_deref() == Some("gateway down")
            })
            .times(1)
            .return_const(());

        let manager = manager(api, notifier);
        manager.track(executing("a"));
        manager.join_all().await;
        assert!(manager.summary().is_empty());
    }

    #[test_log::test(tokio::test(start_paused = true))]
    async fn test_gives_up_after_repeated_poll_failures() {
        let mut api = MockTaskApi::new();
        api.expect_tasks()
            .times(MAX_POLL_FAILURES)
            .returning(|_| Err(ApiError::Transport("connection reset".into())));

        let mut notifier = MockNotifier::new();
        notifier.expect_notify().never();

        let manager = manager(api, notifier);
        manager.track(executing("a"));
        manager.join_all().await;
        assert!(manager.summary().is_empty());
    }

    #[test_log::test(tokio::test(start_paused = true))]
    async fn test_vanished_task_is_dropped_silently() {
        let mut api = MockTaskApi::new();
        api.expect_tasks()
            .times(1)
            .returning(|_| Ok(TaskList::default()));

        let mut notifier = MockNotifier::new();
        notifier.expect_notify().never();

        let manager = manager(api, notifier);
        manager.track(executing("a"));
        manager.join_all().await;
        assert!(manager.summary().is_empty());
    }
}
