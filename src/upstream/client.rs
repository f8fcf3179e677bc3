//! HTTP transport backed by reqwest.
//!
//! # Responsibilities
//! - Perform one GET against the remote API
//! - Apply a bounded timeout per attempt
//! - Read the whole body as text

use async_trait::async_trait;
use std::time::Duration;

use crate::upstream::{RawResponse, Transport, TransportError};

/// Reqwest-based transport.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    timeout_duration: Duration,
}

impl HttpTransport {
    /// Create a new transport with the given per-attempt timeout.
    pub fn new(timeout_duration: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout_duration)
            .user_agent(concat!("steam-gateway/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::Build(e.to_string()))?;

        Ok(Self {
            client,
            timeout_duration,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<RawResponse, TransportError> {
        let response = self.client.get(url).send().await.map_err(classify)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(classify)?;

        Ok(RawResponse { status, body })
    }
}

fn classify(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Request(e.without_url().to_string())
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("timeout", &self.timeout_duration)
            .finish()
    }
}
