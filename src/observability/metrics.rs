//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define gateway metrics (calls, cache efficiency, outbound dispatches)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `gateway_calls_total` (counter): calls by method path, outcome
//! - `gateway_call_duration_seconds` (histogram): end-to-end call latency
//! - `gateway_cache_events_total` (counter): hit, miss, store, store_error
//! - `gateway_upstream_dispatches_total` (counter): dispatches by outcome
//! - `gateway_upstream_duration_seconds` (histogram): remote round trip
//! - `gateway_busy_rejections_total` (counter): fast-fails during cooldown
//! - `gateway_queue_depth` (gauge): jobs waiting for the worker
//! - `gateway_registry_methods` (gauge): methods in the current schema
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed
//! - Labels stay bounded: method paths come from the learned schema only

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record the outcome of one gateway call.
pub fn record_call(path: &str, outcome: &'static str, start: Instant) {
    counter!("gateway_calls_total", "path" => path.to_string(), "outcome" => outcome).increment(1);
    histogram!("gateway_call_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}

/// Record a cache event (hit, miss, store, store_error).
pub fn record_cache(event: &'static str) {
    counter!("gateway_cache_events_total", "event" => event).increment(1);
}

/// Record one outbound dispatch.
pub fn record_dispatch(outcome: &'static str, elapsed: Duration) {
    counter!("gateway_upstream_dispatches_total", "outcome" => outcome).increment(1);
    histogram!("gateway_upstream_duration_seconds").record(elapsed.as_secs_f64());
}

/// Record a call rejected because of the overload cooldown.
pub fn record_busy_rejection() {
    counter!("gateway_busy_rejections_total").increment(1);
}

pub fn record_queue_depth(depth: usize) {
    gauge!("gateway_queue_depth").set(depth as f64);
}

pub fn record_registry_size(methods: usize) {
    gauge!("gateway_registry_methods").set(methods as f64);
}
