pub mod cli;
pub mod config;
pub mod watcher;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use config::{load_config, WatchConfig};
use ledger_access_client::{CancelToken, GrpcClient};
use tokio::signal;

/// The main entry point for running the watcher.
/// This function handles CLI parsing, configuration, and the subscription.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    let Commands::Run(run_cmd) = cli.command;
    let config = load_config_from_cli(run_cmd)?;
    ledger_access_logger::init(&config.watch.log)?;
    tracing::info!("Configuration loaded: {:#?}", &config);
    run_watcher(config).await
}

/// Loads the watcher configuration based on the provided CLI command.
fn load_config_from_cli(run_cmd: cli::RunCmd) -> Result<WatchConfig> {
    let mut config = if let Some(config_path) = run_cmd.config {
        println!("Loading configuration from '{}'", &config_path);
        load_config(&config_path)?
    } else {
        println!("No config file provided, using default settings.");
        WatchConfig::default()
    };
    if let Some(height) = run_cmd.start_height {
        config.watch.stream.start_height = height;
    }
    Ok(config)
}

/// Connects, then watches until Ctrl+C cancels the subscription.
async fn run_watcher(config: WatchConfig) -> Result<()> {
    let client = GrpcClient::from_config(&config.client)
        .await
        .context("Failed to connect to the access node")?;

    let cancel = CancelToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Received Ctrl+C, cancelling the subscription...");
                shutdown.cancel();
            }
            Err(err) => tracing::error!(error = %err, "Failed to listen for shutdown signal."),
        }
    });

    let summary = watcher::watch(&client, &config.watch.stream, &cancel).await?;
    tracing::info!(
        values = summary.values,
        last_height = ?summary.last_height,
        "Shutdown complete."
    );
    Ok(())
}
