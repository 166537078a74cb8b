//! checksync server
//!
//! Run with: cargo run
//!
//! Environment variables:
//! - CHECKSYNC_HOST: Bind address (default: 0.0.0.0)
//! - CHECKSYNC_PORT: Port number (default: 3000)
//! - RUST_LOG: Log level (default: info)
//!
//! Alerting backend (check sync is disabled without SEYREN_URL):
//! - SEYREN_URL: Base URL of the alerting backend (e.g., "http://seyren:8080")
//! - SEYREN_USERNAME / SEYREN_PASSWORD: Optional basic auth credentials
//! - SEYREN_TIMEOUT_SECS: Per-request timeout (default: none)
//! - CHECKSYNC_MAX_CONCURRENT_SYNCS: Sync passes allowed in flight (default: 4)

use checksync::api::{run_server, ServerConfig};
use checksync::sync::SyncConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "checksync=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let host = std::env::var("CHECKSYNC_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("CHECKSYNC_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);

    let config = ServerConfig {
        host,
        port,
        sync_config: SyncConfig::from_env(),
    };

    tracing::info!("checksync configuration:");
    tracing::info!("  Host: {}:{}", config.host, config.port);
    match config.sync_config.base_url.as_deref() {
        Some(url) => {
            tracing::info!("  Alerting backend: {}", url);
            tracing::info!(
                "  Max concurrent syncs: {}",
                config.sync_config.max_concurrent_syncs
            );
            if let Some(timeout) = config.sync_config.timeout {
                tracing::info!("  Request timeout: {:?}", timeout);
            }
        }
        None => tracing::info!("  Alerting backend: NOT CONFIGURED (check sync disabled)"),
    }

    run_server(config).await
}
