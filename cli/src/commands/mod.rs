pub mod subsystem;

use anyhow::Result;
use nvmeof_core::api::{DashboardClient, Session};
use nvmeof_core::config::ClientConfig;

use crate::cli::{Cli, Commands};

/// Everything a command needs once the user is logged in.
pub struct Context {
    pub client: DashboardClient,
    pub session: Session,
    pub config: ClientConfig,
}

/// Main command dispatcher
pub async fn handle_command(context: &Context, cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Subsystem { command } => {
            subsystem::handle_subsystem_command(context, command, cli.output).await?;
        }
    }

    Ok(())
}
