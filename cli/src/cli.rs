use clap::{Parser, Subcommand};
use nvmeof_core::nqn::Nqn;
use std::path::PathBuf;
use url::Url;

#[derive(Parser)]
#[command(
    name = "nvmeofctl",
    about = "Manage NVMe-oF subsystems through the storage dashboard",
    version,
    long_about = "A command-line tool for creating and inspecting NVMe over Fabrics subsystems exposed by the storage cluster dashboard."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Dashboard base URL, e.g. https://mgr.example.com:8443/
    #[arg(long, global = true, env = "NVMEOF_DASHBOARD_URL")]
    pub url: Option<Url>,

    /// Dashboard user name
    #[arg(short, long, global = true, env = "NVMEOF_USERNAME")]
    pub username: Option<String>,

    /// Dashboard password
    #[arg(long, global = true, env = "NVMEOF_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// YAML configuration file
    #[arg(short, long, global = true, env = "NVMEOF_CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Skip TLS certificate verification
    #[arg(long, global = true)]
    pub insecure: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "table")]
    pub output: OutputFormat,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Yaml,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Work with NVMe-oF subsystems
    Subsystem {
        #[command(subcommand)]
        command: SubsystemCommand,
    },
}

#[derive(Subcommand)]
pub enum SubsystemCommand {
    /// Create a subsystem
    Create {
        /// Subsystem NQN (defaults to a timestamped nqn.2001-07.com.ceph name)
        #[arg(long)]
        nqn: Option<Nqn>,
        /// Maximum number of namespaces; pass an empty value to leave it to the gateway
        #[arg(long, default_value = "256")]
        max_namespaces: String,
    },
    /// List subsystems
    List,
}
