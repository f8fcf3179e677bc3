//! Error responses.
//!
//! # Design Decisions
//! - Every error body has the same shape: `{"message": ..., "error": {}}`
//! - Caller mistakes map to 4xx, remote trouble to 502/503/504
//! - Busy responses carry `Retry-After` so clients can back off

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::time::Duration;

use crate::error::CallError;

/// HTTP status for a failed call.
pub fn status_for(err: &CallError) -> StatusCode {
    match err {
        CallError::NotReady | CallError::Busy => StatusCode::SERVICE_UNAVAILABLE,
        CallError::InvalidVersion(_) | CallError::MissingParameter(_) => StatusCode::BAD_REQUEST,
        CallError::MethodNotFound { .. } => StatusCode::NOT_FOUND,
        CallError::UpstreamTimeout => StatusCode::GATEWAY_TIMEOUT,
        CallError::InvalidApiKey
        | CallError::UnexpectedUpstreamStatus(_)
        | CallError::MalformedResponse(_)
        | CallError::Upstream(_) => StatusCode::BAD_GATEWAY,
    }
}

/// An error rendered as a JSON response.
#[derive(Debug, Clone)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    retry_after: Option<u64>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            retry_after: None,
        }
    }

    /// Map a call failure. `cooldown` feeds `Retry-After` for busy responses.
    pub fn from_call(err: &CallError, cooldown: Option<Duration>) -> Self {
        let mut api_error = Self::new(status_for(err), err.to_string());
        if matches!(err, CallError::Busy) {
            // Whole seconds, rounded up, never zero.
            let secs = cooldown.map_or(1, |d| d.as_secs() + u64::from(d.subsec_nanos() > 0));
            api_error.retry_after = Some(secs.max(1));
        }
        api_error
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "Not Found")
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Unauthorized")
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "message": self.message,
            "error": {},
        }));
        let mut response = (self.status, body).into_response();
        if let Some(secs) = self.retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}
