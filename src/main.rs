//! Fezz Gateway server.
//!
//! Reads a JSON configuration from `FEZZ_GATEWAY_CONFIG` (default
//! `./gateway.json`) and serves until interrupted.

use fezz_gateway::prelude::*;
use tracing_subscriber::EnvFilter;

const CONFIG_ENV: &str = "FEZZ_GATEWAY_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "./gateway.json";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
    tracing::info!("Loading gateway configuration from {}", path);

    let config = GatewayConfig::from_file(&path)?;
    if config.routes.is_empty() {
        tracing::warn!("No routes configured; every request will fall through to 404");
    }

    let server = GatewayServer::from_config(config)?;

    tokio::select! {
        result = server.run() => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutting down");
            Ok(())
        }
    }
}
