//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): requests by route and status
//! - `proxy_request_duration_seconds` (histogram): latency by route

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

pub use metrics_exporter_prometheus::BuildError as MetricsError;

/// Install the Prometheus recorder and serve it on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), MetricsError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;

    describe_counter!("proxy_requests_total", "Total proxied requests by route and status");
    describe_histogram!(
        "proxy_request_duration_seconds",
        "Time from request receipt to response, in seconds"
    );

    tracing::info!(address = %addr, "Prometheus metrics endpoint started");
    Ok(())
}

/// Record one completed request.
pub fn record_request(route: &'static str, status: u16, start_time: Instant) {
    counter!("proxy_requests_total", "route" => route, "status" => status.to_string()).increment(1);
    histogram!("proxy_request_duration_seconds", "route" => route)
        .record(start_time.elapsed().as_secs_f64());
}
