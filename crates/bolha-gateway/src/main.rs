//! `bolha-gateway` binary.
//!
//! Usage: `bolha-gateway [config.toml]` (or set `BOLHA_CONFIG`).

use anyhow::{Context, Result};
use bolha_gateway::{init_logging, GatewayConfig, GatewayService};
use std::path::PathBuf;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("BOLHA_CONFIG").map(PathBuf::from));

    let config =
        GatewayConfig::load(config_path.as_deref()).context("failed to load configuration")?;

    init_logging(&config.logging)?;
    if let Some(path) = &config_path {
        info!(path = %path.display(), "Configuration loaded");
    }

    let service = GatewayService::new(config).context("failed to start gateway")?;

    service
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
            info!("Shutdown signal received");
        })
        .await
        .context("gateway server failed")?;

    Ok(())
}
