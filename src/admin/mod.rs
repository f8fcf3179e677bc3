//! Admin API: read-only gateway introspection behind a bearer token.

pub mod auth;
pub mod handlers;

use axum::{middleware, routing::get, Router};

use self::auth::admin_auth_middleware;
use self::handlers::*;
use crate::http::server::AppState;

pub fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/cache", get(get_cache))
        .route("/admin/scheduler", get(get_scheduler))
        .route_layer(middleware::from_fn_with_state(state, admin_auth_middleware))
}
