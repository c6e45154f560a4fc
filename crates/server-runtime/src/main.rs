//! CIPA Vote server entry point.

use anyhow::{Context, Result};
use api_gateway::GatewayService;
use server_runtime::config::ServerConfig;
use server_runtime::build_state;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = ServerConfig::from_env().context("loading configuration")?;
    info!(
        host = %config.gateway.host,
        port = config.gateway.port,
        data_dir = ?config.storage.data_dir,
        "Starting CIPA Vote server"
    );

    let state = build_state(&config).context("opening election store")?;
    let gateway =
        GatewayService::new(config.gateway.clone(), state).context("configuring gateway")?;

    gateway
        .serve(shutdown_signal())
        .await
        .context("serving gateway")?;

    info!("Shutdown complete");
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    info!("Shutdown signal received");
}
