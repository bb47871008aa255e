//! Metrics collection and exposition.
//!
//! # Metrics
//! - `dispatch_requests_total` (counter): dispatched requests by method, status
//! - `dispatch_request_duration_seconds` (histogram): end-to-end dispatch latency
//! - `dispatch_resolution_cache_total` (counter): resolution cache lookups by result
//! - `dispatch_hooks_loaded` (gauge): size of the loaded hook list
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op, so tests need no setup
//! - Prometheus exposition is opt-in from the binary

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one completed dispatch.
pub fn record_dispatch(method: &str, status: u16, start: Instant) {
    counter!(
        "dispatch_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("dispatch_request_duration_seconds", "method" => method.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_resolution_cache(hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    counter!("dispatch_resolution_cache_total", "result" => result).increment(1);
}

pub fn record_hooks_loaded(count: usize) {
    gauge!("dispatch_hooks_loaded").set(count as f64);
}
