//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by route class and status
//! - `gateway_request_duration_seconds` (histogram): latency by route class
//! - `gateway_rate_limited_total` (counter): rejected by the rate limiter
//! - `gateway_access_denied_total` (counter): static requests denied
//! - `gateway_rate_limiter_clients` (gauge): clients tracked by the limiter
//! - `gateway_artifacts_stored` (gauge): records held by the artifact store
//! - `gateway_sweep_removed_total` (counter): entries reclaimed, by store
//!
//! Recording is a no-op until [`init_metrics`] installs the exporter, so
//! tests and metric-less deployments pay nothing.

use std::net::SocketAddr;
use std::time::Instant;

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Route class used as a label; keeps label cardinality fixed.
pub fn route_class(path: &str) -> &'static str {
    if path == "/api" || path.starts_with("/api/") {
        "api"
    } else {
        "static"
    }
}

pub fn record_request(route: &'static str, status: u16, start: Instant) {
    metrics::counter!("gateway_requests_total", "route" => route, "status" => status.to_string())
        .increment(1);
    metrics::histogram!("gateway_request_duration_seconds", "route" => route)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_rate_limited() {
    metrics::counter!("gateway_rate_limited_total").increment(1);
}

pub fn record_access_denied() {
    metrics::counter!("gateway_access_denied_total").increment(1);
}

pub fn record_rate_limiter_clients(count: usize) {
    metrics::gauge!("gateway_rate_limiter_clients").set(count as f64);
}

pub fn record_artifacts_stored(count: usize) {
    metrics::gauge!("gateway_artifacts_stored").set(count as f64);
}

pub fn record_sweep(store: &'static str, removed: usize) {
    metrics::counter!("gateway_sweep_removed_total", "store" => store).increment(removed as u64);
}

/// Middleware counting every response by route class and status.
pub async fn track_requests(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let route = route_class(request.uri().path());
    let response = next.run(request).await;
    record_request(route, response.status().as_u16(), start);
    response
}
