//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by method, status
//! - `gateway_request_duration_seconds` (histogram): latency by method
//! - `gateway_upstream_requests_total` (counter): upstream calls by
//!   operation, status
//!
//! Recording without an installed exporter is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    let method = method.to_string();
    counter!(
        "gateway_requests_total",
        "method" => method.clone(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("gateway_request_duration_seconds", "method" => method)
        .record(start.elapsed().as_secs_f64());
}

/// `status` is the upstream status code, or `transport_error` when no
/// response arrived.
pub fn record_upstream_request(operation: &'static str, status: &str) {
    counter!(
        "gateway_upstream_requests_total",
        "operation" => operation,
        "status" => status.to_string()
    )
    .increment(1);
}

/// Middleware recording request count and latency.
pub async fn track_requests(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let response = next.run(request).await;
    record_request(method.as_str(), response.status().as_u16(), start);
    response
}
