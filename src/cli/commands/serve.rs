//! Implementation of the default `repositories serve` command.

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;

use crate::adapters::http;
use crate::cli::types::ServeArgs;
use crate::domain::models::Config;
use crate::infrastructure::config::ConfigLoader;
use crate::infrastructure::logging::LoggerImpl;
use crate::infrastructure::setup::build_repository_service;

/// Resolve configuration: defaults, file, env, then flags.
pub fn resolve_config(args: &ServeArgs) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => ConfigLoader::load_with(path)?,
        None => ConfigLoader::load()?,
    };

    args.apply_to(&mut config);
    ConfigLoader::validate(&config).context("Invalid command-line overrides")?;
    Ok(config)
}

pub async fn execute(args: ServeArgs) -> Result<()> {
    let config = resolve_config(&args)?;
    let _logger = LoggerImpl::init(&config.logging).context("Failed to initialize logging")?;

    let service = build_repository_service(&config)?;

    let listener = TcpListener::bind(&config.server.addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.addr))?;

    http::serve(listener, service, shutdown_signal()).await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("received Ctrl-C, shutting down"),
        Err(err) => tracing::error!(error = %err, "failed to listen for Ctrl-C"),
    }
}
