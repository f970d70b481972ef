use axum::{
    body::Body,
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use std::time::Instant;

use crate::metrics::{global_metrics, API_REQUESTS_TOTAL, API_REQUEST_DURATION};

/// Axum middleware that records request metrics into [`global_metrics`].
///
/// - `api_requests_total{method,path,status}` counter
/// - `api_request_duration_seconds` histogram
///
/// `path` is the route template (`/api/invoices/{id}`) when the router has
/// matched one, so per-id URLs do not create a series each.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());
    let start = Instant::now();

    let response = next.run(request).await;

    let status = response.status().as_u16().to_string();
    let m = global_metrics();
    m.increment_counter(
        API_REQUESTS_TOTAL,
        &[("method", &method), ("path", &path), ("status", &status)],
    );
    m.record_histogram(API_REQUEST_DURATION, start.elapsed().as_secs_f64());

    response
}
