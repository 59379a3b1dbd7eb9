use getset::{CopyGetters, Getters};
use strum::Display;
use tracing::{error, info};
use typed_builder::TypedBuilder;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum NotificationKind {
    Info,
    Success,
    Error,
}

#[derive(TypedBuilder, Getters, CopyGetters, Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    #[getset(get_copy = "pub")]
    kind: NotificationKind,

    #[getset(get = "pub")]
    #[builder(setter(into))]
    title: String,

    #[getset(get = "pub")]
    #[builder(default, setter(strip_option, into))]
    message: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Sends notifications to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        let message = notification.message().as_deref().unwrap_or_default();
        match notification.kind() {
            NotificationKind::Info | NotificationKind::Success => {
                info!(kind = %notification.kind(), "{} {}", notification.title(), message);
            }
            NotificationKind::Error => {
                error!(kind = %notification.kind(), "{} {}", notification.title(), message);
            }
        }
    }
}
