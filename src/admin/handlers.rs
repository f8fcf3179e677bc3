use axum::{extract::State, Json};
use serde::Serialize;

use crate::cache::CacheStats;
use crate::gateway::GatewayState;
use crate::http::server::AppState;

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub state: GatewayState,
    pub methods: usize,
    pub upstream: String,
}

#[derive(Debug, Serialize)]
pub struct CacheStatus {
    pub enabled: bool,
    pub entries: Option<usize>,
    #[serde(flatten)]
    pub stats: CacheStats,
}

#[derive(Debug, Serialize)]
pub struct SchedulerStatus {
    pub busy: bool,
    pub busy_remaining_secs: f64,
    pub queued: usize,
    pub dispatch_interval_ms: u64,
    pub busy_cooldown_secs: u64,
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        state: state.gateway.state(),
        methods: state.gateway.registry().method_count(),
        upstream: state.config.upstream.base_url.clone(),
    })
}

pub async fn get_cache(State(state): State<AppState>) -> Json<CacheStatus> {
    Json(CacheStatus {
        enabled: state.config.cache.enabled,
        entries: state.gateway.cache_entries().await,
        stats: state.gateway.cache_stats(),
    })
}

pub async fn get_scheduler(State(state): State<AppState>) -> Json<SchedulerStatus> {
    let scheduler = state.gateway.scheduler();
    let remaining = scheduler.busy_remaining();
    let settings = scheduler.settings();

    Json(SchedulerStatus {
        busy: remaining.is_some(),
        busy_remaining_secs: remaining.map_or(0.0, |d| d.as_secs_f64()),
        queued: scheduler.queued(),
        dispatch_interval_ms: settings.dispatch_interval.as_millis() as u64,
        busy_cooldown_secs: settings.busy_cooldown.as_secs(),
    })
}
