use anyhow::{Result, bail};
use async_trait::async_trait;
use nvmeof_core::api::{NvmeofApi, Subsystem};
use nvmeof_core::form::{FormError, SubsystemForm, SubsystemFormParams};
use nvmeof_core::navigation::{Navigator, Route};
use nvmeof_core::nqn::Nqn;
use nvmeof_core::notifications::{Notification, NotificationKind, Notifier, TracingNotifier};
use nvmeof_core::tasks::{TaskManager, TaskManagerParams, TaskWrapper};
use serde::Serialize;
use std::sync::Arc;
use tabled::{Table, Tabled};
use tracing::{debug, warn};

use super::Context;
use crate::cli::{OutputFormat, SubsystemCommand};
use crate::table_theme::{FlagFormatter, TableTheme};

pub async fn handle_subsystem_command(
    context: &Context,
    command: &SubsystemCommand,
    output: OutputFormat,
) -> Result<()> {
    match command {
        SubsystemCommand::Create {
            nqn,
            max_namespaces,
        } => {
            let nqn = nqn.as_ref().map(Nqn::as_str);
            create_subsystem(context, nqn, max_namespaces, output).await
        }
        SubsystemCommand::List => {
            let subsystems = context.client.list_subsystems().await?;
            print_subsystems(&subsystems, output)
        }
    }
}

async fn create_subsystem(
    context: &Context,
    nqn: Option<&str>,
    max_namespaces: &str,
    output: OutputFormat,
) -> Result<()> {
    let api = Arc::new(context.client.clone());
    let notifier = notifier_for(output);

    let manager = TaskManager::new(
        TaskManagerParams::builder()
            .api(api.clone())
            .notifier(notifier.clone())
            .poll_interval(context.config.task_poll_interval())
            .timeout(context.config.task_timeout())
            .build(),
    );

    let mut form = SubsystemForm::initialize(
        SubsystemFormParams::builder()
            .api(api.clone())
            .permissions(Arc::new(context.session.clone()))
            .task_wrapper(TaskWrapper::new(notifier, manager.clone()))
            .navigator(Arc::new(ListNavigator { api, output }))
            .debounce(context.config.debounce())
            .build(),
    );

    if !form.permission().create {
        bail!(
            "User '{}' is not allowed to create NVMe-oF subsystems",
            context.session.username
        );
    }

    if let Some(nqn) = nqn {
        form.set_nqn(nqn);
    }
    form.set_max_namespaces(max_namespaces);

    debug!(
        "{} {} {:?}",
        form.action(),
        form.resource(),
        form.request()
    );

    match form.submit().await {
        Ok(()) => {}
        Err(FormError::Invalid(errors)) => {
            for (field, errors) in &errors {
                for error in errors {
                    eprintln!("{field}: {error}");
                }
            }
            bail!("Subsystem was not created");
        }
        Err(err @ FormError::Submit(_)) => return Err(err.into()),
    }

    manager.join_all().await;
    Ok(())
}

/// Machine readable output keeps notifications in the log.
fn notifier_for(output: OutputFormat) -> Arc<dyn Notifier> {
    match output {
        OutputFormat::Table => Arc::new(ConsoleNotifier),
        OutputFormat::Json | OutputFormat::Yaml => Arc::new(TracingNotifier),
    }
}

/// Prints task notifications for the user.
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        let marker = match notification.kind() {
            NotificationKind::Info => "…",
            NotificationKind::Success => "✅",
            NotificationKind::Error => "❌",
        };

        match notification.message() {
            Some(message) => eprintln!("{marker} {}: {message}", notification.title()),
            None => eprintln!("{marker} {}", notification.title()),
        }
    }
}

/// Going back to the subsystem list means printing it.
struct ListNavigator {
    api: Arc<dyn NvmeofApi>,
    output: OutputFormat,
}

#[async_trait]
impl Navigator for ListNavigator {
    async fn navigate(&self, route: Route) {
        debug!("Navigating to {}", route.path());

        match self.api.list_subsystems().await {
            Ok(subsystems) => {
                if let Err(err) = print_subsystems(&subsystems, self.output) {
                    warn!("Unable to print subsystems: {}", err);
                }
            }
            Err(err) => warn!("Unable to list subsystems: {}", err),
        }
    }
}

#[derive(Debug, Clone, Serialize, Tabled)]
pub struct SubsystemRow {
    #[tabled(rename = "NQN")]
    pub nqn: String,
    #[tabled(rename = "Namespaces")]
    pub namespaces: String,
    #[tabled(rename = "Max Namespaces")]
    pub max_namespaces: String,
    #[tabled(rename = "HA")]
    pub enable_ha: String,
    #[tabled(rename = "Serial")]
    pub serial_number: String,
}

impl SubsystemRow {
    pub fn from_subsystem(subsystem: &Subsystem) -> Self {
        let or_dash = |value: Option<String>| value.unwrap_or_else(|| "-".to_string());

        Self {
            nqn: subsystem.nqn.clone(),
            namespaces: or_dash(subsystem.namespace_count.map(|n| n.to_string())),
            max_namespaces: or_dash(subsystem.max_namespaces.map(|n| n.to_string())),
            enable_ha: or_dash(subsystem.enable_ha.map(FlagFormatter::format)),
            serial_number: or_dash(subsystem.serial_number.clone()),
        }
    }
}

fn print_subsystems(subsystems: &[Subsystem], output: OutputFormat) -> Result<()> {
    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(subsystems)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(subsystems)?),
        OutputFormat::Table => {
            if subsystems.is_empty() {
                println!("No subsystems found");
            } else {
                let rows: Vec<_> = subsystems.iter().map(SubsystemRow::from_subsystem).collect();
                println!("{}", TableTheme::apply_default(Table::new(rows)));
            }
        }
    }
    Ok(())
}
