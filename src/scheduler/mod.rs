//! Outbound request scheduling subsystem.
//!
//! # Data Flow
//! ```text
//! enqueue(url)
//!     → busy cooldown active? → fail fast with Busy (no queue, no network)
//!     → FIFO channel (non-blocking push)
//!     → single worker task:
//!         wait until last_dispatch + dispatch_interval
//!         → Transport::get under timeout
//!         → overload status? → start cooldown, reply Busy
//!         → reply to caller via oneshot
//! ```
//!
//! # Design Decisions
//! - Exactly one call in flight, process-wide, across all callers
//! - Fixed spacing between dispatch starts regardless of remote latency
//! - No automatic retries; Busy and timeout are surfaced to the caller
//! - A failing or timed-out call never stalls the queue

pub mod queue;
pub mod state;

use thiserror::Error;

pub use queue::{RequestScheduler, SchedulerSettings};
pub use state::SchedulerState;

/// Errors surfaced by the scheduler.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchedulerError {
    /// The remote signaled overload; retry after the cooldown.
    #[error("upstream service is busy")]
    Busy,

    /// The outbound call did not complete within its deadline.
    #[error("upstream request timed out")]
    UpstreamTimeout,

    /// Any other transport failure.
    #[error("upstream request failed: {0}")]
    Upstream(String),

    /// The worker task is gone.
    #[error("request scheduler stopped")]
    Stopped,
}
