mod cli;
mod commands;
mod table_theme;

use anyhow::{Context as _, Result};
use clap::Parser;
use cli::Cli;
use commands::{Context, handle_command};
use nvmeof_core::api::DashboardClient;
use nvmeof_core::config::ClientConfig;
use nvmeof_core::instrumentation::init_instrumentation;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_instrumentation(if cli.verbose { "debug" } else { "info" });

    let config = match &cli.config {
        Some(path) => ClientConfig::from_file(path)?,
        None => ClientConfig::default(),
    }
    .with_url(cli.url.clone())
    .with_credentials(cli.username.clone(), cli.password.clone())
    .with_insecure(cli.insecure);

    let (Some(username), Some(password)) = (config.username(), config.password()) else {
        eprintln!("Dashboard credentials are required (--username/--password or NVMEOF_USERNAME/NVMEOF_PASSWORD)");
        std::process::exit(1);
    };

    let client = DashboardClient::from_config(&config)?;
    let (client, session) = client
        .login(username, password)
        .await
        .with_context(|| format!("Failed to log in to {}", client.base_url()))?;

    let context = Context {
        client,
        session,
        config,
    };

    handle_command(&context, &cli).await
}
