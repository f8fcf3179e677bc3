//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, timeout, compression)
//! - Translate `/api/{interface}/{method}/{version}` requests into gateway calls
//! - Report readiness on `/health`
//! - Mount the admin API when enabled
//! - Serve until the shutdown signal fires

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{compression::CompressionLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::admin;
use crate::config::GatewayConfig;
use crate::error::CallError;
use crate::gateway::Gateway;
use crate::http::request::{
    make_request_span, propagate_request_id_layer, set_request_id_layer, RequestIdExt,
};
use crate::http::response::ApiError;

/// Query parameter that disables the cache for one request. Never forwarded.
pub const NOCACHE_PARAM: &str = "nocache";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<Gateway>,
    pub config: Arc<GatewayConfig>,
}

/// HTTP front end of the gateway.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(config: GatewayConfig, gateway: Arc<Gateway>) -> Self {
        let state = AppState {
            gateway,
            config: Arc::new(config),
        };
        let router = Self::build_router(state);
        Self { router }
    }

    /// The fully layered router, for serving or driving in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(state: AppState) -> Router {
        let request_timeout = Duration::from_secs(state.config.listener.request_timeout_secs);

        let mut router = Router::new()
            .route("/api/{interface}/{method}/{version}", get(api_handler))
            .route("/health", get(health_handler));

        if state.config.admin.enabled {
            router = router.merge(admin::admin_routes(state.clone()));
        }

        router
            .fallback(fallback_handler)
            .with_state(state)
            .layer(CompressionLayer::new())
            .layer(TimeoutLayer::new(request_timeout))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
            .layer(set_request_id_layer())
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// `GET /api/{interface}/{method}/{version}`: forward to the gateway.
async fn api_handler(
    State(state): State<AppState>,
    Path((interface, method, version)): Path<(String, String, String)>,
    Query(mut params): Query<BTreeMap<String, String>>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let allow_cache = !is_truthy(params.remove(NOCACHE_PARAM).as_deref());

    tracing::debug!(
        request_id = %headers.request_id(),
        interface = %interface,
        method = %method,
        version = %version,
        allow_cache,
        "API request"
    );

    match state
        .gateway
        .call(&interface, &method, &version, params, allow_cache)
        .await
    {
        Ok(value) => Ok(Json(value)),
        Err(e) => {
            let cooldown = match e {
                CallError::Busy => Some(
                    state
                        .gateway
                        .scheduler()
                        .busy_remaining()
                        .unwrap_or(state.gateway.scheduler().settings().busy_cooldown),
                ),
                _ => None,
            };
            Err(ApiError::from_call(&e, cooldown))
        }
    }
}

fn is_truthy(value: Option<&str>) -> bool {
    matches!(value, Some("1") | Some("true") | Some("yes"))
}

/// `GET /health`: 200 once the gateway can serve calls.
async fn health_handler(State(state): State<AppState>) -> Response {
    let gateway_state = state.gateway.state();
    let status = if gateway_state.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(json!({ "status": gateway_state }))).into_response()
}

async fn fallback_handler() -> ApiError {
    ApiError::not_found()
}
