//! HTTP front end subsystem.
//!
//! # Data Flow
//! ```text
//! inbound request
//!     → request.rs (assign/propagate request ID, span)
//!     → server.rs (route: /api, /health, /admin, fallback)
//!     → gateway call
//!     → response.rs (error → status code + JSON body)
//!     → send to client (gzip when accepted)
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestIdExt, X_REQUEST_ID};
pub use response::ApiError;
pub use server::{AppState, HttpServer};
