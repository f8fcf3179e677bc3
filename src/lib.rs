//! Gateway for the Steam Web API.
//!
//! Learns the set of callable methods from the remote listing, validates
//! requests against it, caches successful responses and paces every
//! outbound call through a single rate-limited queue.

pub mod admin;
pub mod cache;
pub mod config;
pub mod error;
pub mod gateway;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod registry;
pub mod scheduler;
pub mod upstream;

pub use config::schema::GatewayConfig;
pub use error::{CallError, ConfigError, SchemaError};
pub use gateway::{Gateway, GatewayState};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
