//! Metrics collection and exposition.
//!
//! # Metrics
//! - `service_requests_total` (counter): requests by method, path, status
//! - `service_request_duration_seconds` (histogram): latency distribution
//! - `service_cache_lookups_total` (counter): cache outcomes by result

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and exposition endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(err) => tracing::error!(error = %err, "Failed to start metrics endpoint"),
    }
}

/// Record one handled request.
pub fn record_request(method: &str, path: &str, status: u16, start: Instant) {
    counter!(
        "service_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string(),
    )
    .increment(1);
    histogram!(
        "service_request_duration_seconds",
        "method" => method.to_string(),
        "path" => path.to_string(),
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record a cache lookup outcome.
pub fn record_cache_lookup(hit: bool) {
    counter!(
        "service_cache_lookups_total",
        "result" => if hit { "hit" } else { "miss" },
    )
    .increment(1);
}
