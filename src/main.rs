//! steam-gateway
//!
//! HTTP gateway in front of the Steam Web API.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client ──▶ http server ──▶ gateway ──▶ registry (validate)
//!                                   │
//!                                   ▼
//!                              cache layer ──hit──▶ response
//!                                   │ miss
//!                                   ▼
//!                              scheduler (1 req/s, busy cooldown)
//!                                   │
//!                                   ▼
//!                              transport ──▶ api.steampowered.com
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use steam_gateway::config::loader::{apply_env, load_config};
use steam_gateway::config::GatewayConfig;
use steam_gateway::lifecycle::startup;
use steam_gateway::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "steam-gateway", version)]
#[command(about = "Rate-limited, caching gateway for the Steam Web API", long_about = None)]
struct Args {
    /// Path to the TOML configuration file. Defaults apply when omitted.
    #[arg(short, long, env = "STEAM_GATEWAY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => match load_config(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("failed to load {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => GatewayConfig::default(),
    };
    let config = apply_env(config);

    init_logging(&config.observability.log_level);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.base_url,
        dispatch_interval_ms = config.scheduler.dispatch_interval_ms,
        cache_enabled = config.cache.enabled,
        "steam-gateway starting"
    );

    match startup::run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Fatal startup error");
            ExitCode::FAILURE
        }
    }
}
