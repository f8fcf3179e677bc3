//! Error taxonomy for the gateway.
//!
//! # Design Decisions
//! - One enum per operation family: configure, schema load, validation, call
//! - Busy and timeout stay distinct so callers can retry on their own terms
//! - Errors carry enough detail to correct the request (missing parameter name)

use thiserror::Error;

use crate::registry::VersionError;
use crate::scheduler::SchedulerError;
use crate::upstream::TransportError;

/// Errors from `Gateway::configure`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The remote rejected the key.
    #[error("Invalid API Key")]
    InvalidApiKey,

    /// The probe answered with a status other than 200 or 401.
    #[error("Unexpected HTTP response code \"{0}\"")]
    UnexpectedUpstreamStatus(u16),

    /// The probe could not be completed.
    #[error("validation endpoint unreachable: {0}")]
    Upstream(#[from] SchedulerError),
}

/// Errors from loading the method listing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchemaError {
    /// No API key has been configured yet.
    #[error("gateway is not configured with an API key")]
    NotConfigured,

    /// The listing payload does not have the expected shape.
    #[error("Bad format of API listing data: {0}")]
    MalformedListing(String),

    #[error("Invalid API Key")]
    InvalidApiKey,

    #[error("Unexpected HTTP response code \"{0}\"")]
    UnexpectedUpstreamStatus(u16),

    #[error("listing request failed: {0}")]
    Upstream(#[from] SchedulerError),
}

/// Errors from checking a request against the registry.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("The Steam API method specified does not exist: {interface}/{method}/v{version}")]
    UnknownMethod {
        interface: String,
        method: String,
        version: String,
    },

    #[error("Missing required parameter: \"{0}\"")]
    MissingParameter(String),
}

/// Errors from `Gateway::call`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CallError {
    /// Configure and schema load have not both succeeded yet.
    #[error("gateway is not ready: API key and method listing must be loaded first")]
    NotReady,

    #[error(transparent)]
    InvalidVersion(#[from] VersionError),

    #[error("The Steam API method specified does not exist: {interface}/{method}/v{version}")]
    MethodNotFound {
        interface: String,
        method: String,
        version: String,
    },

    #[error("Missing required parameter: \"{0}\"")]
    MissingParameter(String),

    #[error("Invalid API Key")]
    InvalidApiKey,

    #[error("Unexpected HTTP response code \"{0}\"")]
    UnexpectedUpstreamStatus(u16),

    /// A 200 response whose body is not JSON.
    #[error("malformed upstream response: {0}")]
    MalformedResponse(String),

    /// The remote signaled overload recently; retry after the cooldown.
    #[error("upstream service is busy, retry later")]
    Busy,

    #[error("upstream request timed out")]
    UpstreamTimeout,

    /// Any other transport failure.
    #[error("upstream error: {0}")]
    Upstream(String),
}

impl From<ValidationError> for CallError {
    fn from(e: ValidationError) -> Self {
        match e {
            ValidationError::UnknownMethod { interface, method, version } => {
                CallError::MethodNotFound { interface, method, version }
            }
            ValidationError::MissingParameter(name) => CallError::MissingParameter(name),
        }
    }
}

impl From<SchedulerError> for CallError {
    fn from(e: SchedulerError) -> Self {
        match e {
            SchedulerError::Busy => CallError::Busy,
            SchedulerError::UpstreamTimeout => CallError::UpstreamTimeout,
            SchedulerError::Upstream(detail) => CallError::Upstream(detail),
            SchedulerError::Stopped => CallError::Upstream("request scheduler stopped".to_string()),
        }
    }
}

impl CallError {
    /// Whether the same request may succeed if retried later.
    pub fn is_retriable(&self) -> bool {
        matches!(self, CallError::Busy | CallError::UpstreamTimeout | CallError::NotReady)
    }

    /// Short stable label, used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            CallError::NotReady => "not_ready",
            CallError::InvalidVersion(_) => "invalid_version",
            CallError::MethodNotFound { .. } => "method_not_found",
            CallError::MissingParameter(_) => "missing_parameter",
            CallError::InvalidApiKey => "invalid_api_key",
            CallError::UnexpectedUpstreamStatus(_) => "unexpected_status",
            CallError::MalformedResponse(_) => "malformed_response",
            CallError::Busy => "busy",
            CallError::UpstreamTimeout => "timeout",
            CallError::Upstream(_) => "upstream_error",
        }
    }
}

/// Errors while constructing a gateway.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("invalid upstream base URL: {0}")]
    BaseUrl(#[from] url::ParseError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}
