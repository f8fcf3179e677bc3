//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the gateway from validated configuration
//! - Validate the API key and load the method listing before serving
//! - Start background pieces (metrics, signal handler)
//! - Bind the listener and begin accepting traffic
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently
//! - Listener starts last (traffic only when ready)

use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::GatewayConfig;
use crate::error::{ConfigError, InitError, SchemaError};
use crate::gateway::Gateway;
use crate::http::HttpServer;
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals::spawn_signal_handler;
use crate::observability::metrics;

/// Fatal errors during startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("gateway initialization failed: {0}")]
    Init(#[from] InitError),

    #[error("no API key configured; set upstream.api_key or STEAM_API_KEY")]
    MissingApiKey,

    #[error("API key validation failed: {0}")]
    Configure(#[from] ConfigError),

    #[error("method listing could not be loaded: {0}")]
    Schema(#[from] SchemaError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(std::io::Error),
}

/// Build a gateway, validate its key and load the listing.
pub async fn bootstrap(config: &GatewayConfig) -> Result<Arc<Gateway>, StartupError> {
    let gateway = Gateway::from_config(config)?;

    if config.upstream.api_key.is_empty() {
        return Err(StartupError::MissingApiKey);
    }

    tracing::info!(upstream = %config.upstream.base_url, "Validating API key");
    gateway.configure(&config.upstream.api_key).await?;

    tracing::info!("Loading method listing");
    gateway.load_schema().await?;

    tracing::info!(
        state = %gateway.state(),
        methods = gateway.registry().method_count(),
        "Gateway ready"
    );
    Ok(Arc::new(gateway))
}

/// Run the whole service until a shutdown signal arrives.
pub async fn run(config: GatewayConfig) -> Result<(), StartupError> {
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let gateway = bootstrap(&config).await?;

    let listener = TcpListener::bind(&config.listener.bind_address)
        .await
        .map_err(|source| StartupError::Bind {
            address: config.listener.bind_address.clone(),
            source,
        })?;

    let shutdown = Shutdown::new();
    spawn_signal_handler(shutdown.clone());

    let server = HttpServer::new(config, gateway);
    server
        .run(listener, shutdown.subscribe())
        .await
        .map_err(StartupError::Serve)?;

    tracing::info!("Shutdown complete");
    Ok(())
}
