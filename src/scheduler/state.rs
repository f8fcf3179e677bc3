//! Dispatch timing state.
//!
//! # Responsibilities
//! - Remember when the last dispatch started
//! - Remember until when the remote asked us to back off
//!
//! Uses `tokio::time::Instant` so paused-clock tests can drive it.

use std::time::Duration;
use tokio::time::Instant;

/// Timing state shared between the scheduler handle and its worker.
#[derive(Debug, Default, Clone)]
pub struct SchedulerState {
    last_dispatch: Option<Instant>,
    busy_until: Option<Instant>,
}

impl SchedulerState {
    /// True while the overload cooldown has not elapsed.
    pub fn is_busy(&self, now: Instant) -> bool {
        self.busy_until.is_some_and(|until| now < until)
    }

    /// Time left in the cooldown window, if any.
    pub fn busy_remaining(&self, now: Instant) -> Option<Duration> {
        self.busy_until
            .filter(|until| now < *until)
            .map(|until| until - now)
    }

    /// Start a cooldown window at `now`.
    pub fn mark_busy(&mut self, now: Instant, cooldown: Duration) {
        self.busy_until = Some(now + cooldown);
    }

    /// Earliest instant the next dispatch may start.
    pub fn next_slot(&self, interval: Duration) -> Option<Instant> {
        self.last_dispatch.map(|last| last + interval)
    }

    pub fn record_dispatch(&mut self, now: Instant) {
        self.last_dispatch = Some(now);
    }
}
