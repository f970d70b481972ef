use axum::{
    body::Body,
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use tracing::Instrument;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// 32 hex characters (128 bits), usable as an OpenTelemetry trace id.
pub fn generate_trace_id() -> String {
    Uuid::new_v4().as_simple().to_string()
}

/// 16 hex characters (64 bits).
pub fn generate_span_id() -> String {
    Uuid::new_v4().as_simple().to_string()[..16].to_string()
}

/// Reuse the caller's `x-request-id` or mint one, run the request inside an
/// `http_request` span, and echo the id on the response.
pub async fn request_id_middleware(mut request: Request<Body>, next: Next) -> Response {
    let header = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .and_then(|s| HeaderValue::from_str(s).ok().map(|v| (s.to_string(), v)));
    let (request_id, value) = match header {
        Some(pair) => pair,
        None => {
            let id = generate_trace_id();
            let value = HeaderValue::from_str(&id)
                .unwrap_or_else(|_| HeaderValue::from_static("unknown"));
            (id, value)
        }
    };
    request.headers_mut().insert(REQUEST_ID_HEADER, value.clone());

    let span = tracing::info_span!(
        "http_request",
        trace_id = %request_id,
        method = %request.method(),
        path = %request.uri().path(),
    );

    let mut response = async move {
        tracing::debug!("processing request");
        next.run(request).await
    }
    .instrument(span)
    .await;

    response.headers_mut().insert(REQUEST_ID_HEADER, value);
    response
}

/// Span for a named background operation plus its trace id.
pub fn create_operation_span(operation: &str) -> (tracing::Span, String) {
    let trace_id = generate_trace_id();
    let span = tracing::info_span!(
        "operation",
        trace_id = %trace_id,
        span_id = %generate_span_id(),
        operation = %operation,
    );
    (span, trace_id)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
