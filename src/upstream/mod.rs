//! Remote API transport subsystem.
//!
//! # Data Flow
//! ```text
//! scheduler worker (one call at a time)
//!     → Transport::get(url)
//!     → client.rs (reqwest GET with per-attempt timeout)
//!     → RawResponse { status, body }
//! ```
//!
//! # Design Decisions
//! - No policy here: no retries, no caching, no status interpretation
//! - Every outbound call has a deadline
//! - Timeouts are distinct from other transport failures

pub mod client;

use async_trait::async_trait;
use thiserror::Error;

pub use client::HttpTransport;

/// Status code and body of a completed outbound call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

/// Errors raised while performing an outbound call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The call did not complete within its deadline.
    #[error("upstream request timed out")]
    Timeout,

    /// Connection, protocol or body read failure.
    #[error("upstream request failed: {0}")]
    Request(String),

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Build(String),
}

/// A single outbound HTTP GET.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> Result<RawResponse, TransportError>;
}
