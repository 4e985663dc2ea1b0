// Scorelink - live match score companion
// Main entry point

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use scorelink::cli::{commands, Cli, Command};
use scorelink::config::load_config_from;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        EnvFilter::new("scorelink=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("scorelink=info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Load configuration
    let config = load_config_from(cli.config.as_deref())?;

    match cli.command {
        Command::Watch => commands::watch(config).await,
        Command::Push(args) => commands::push(config, args).await,
        Command::Run(meta) => commands::run(config, meta).await,
    }
}
