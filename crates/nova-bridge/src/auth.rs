//! Optional API key guard for the Nova HTTP API.
//!
//! A configured key must arrive as `x-api-key: <key>` or
//! `Authorization: Bearer <key>`. Without a key the API is open.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, Response},
    response::IntoResponse,
};
use subtle::ConstantTimeEq;
use tower::{Layer, Service};

use crate::api_error::ApiError;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Compare two secrets without leaking where they differ.
pub fn secrets_match(provided: &str, expected: &str) -> bool {
    provided.as_bytes().ct_eq(expected.as_bytes()).into()
}

/// The key presented by the client, header first, then bearer token.
fn presented_key(headers: &HeaderMap) -> Option<&str> {
    if let Some(key) = headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok()) {
        return Some(key);
    }
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

/// Decide whether a request may reach the router.
///
/// Preflights (`OPTIONS`) are always let through so CORS can answer them.
pub fn authorize(method: &Method, headers: &HeaderMap, expected: &str) -> Result<(), ApiError> {
    if method == Method::OPTIONS {
        return Ok(());
    }
    match presented_key(headers) {
        Some(key) if secrets_match(key, expected) => Ok(()),
        _ => Err(ApiError::Unauthorized("unauthorized".into())),
    }
}

/// Wraps a service with [`ApiKeyService`]; `None` disables the check.
#[derive(Clone)]
pub struct ApiKeyLayer {
    key: Option<Arc<str>>,
}

impl ApiKeyLayer {
    pub fn new(key: Option<String>) -> Self {
        Self {
            key: key.map(Arc::from),
        }
    }
}

impl<S> Layer<S> for ApiKeyLayer {
    type Service = ApiKeyService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ApiKeyService {
            inner,
            key: self.key.clone(),
        }
    }
}

#[derive(Clone)]
pub struct ApiKeyService<S> {
    inner: S,
    key: Option<Arc<str>>,
}

type BoxFuture<T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send>>;

impl<S> Service<Request<Body>> for ApiKeyService<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response<Body>;
    type Error = S::Error;
    type Future = BoxFuture<Self::Response, Self::Error>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let verdict = match self.key.as_deref() {
            Some(expected) => authorize(req.method(), req.headers(), expected),
            None => Ok(()),
        };
        if let Err(rejection) = verdict {
            tracing::debug!(method = %req.method(), path = %req.uri().path(), "missing or wrong API key");
            return Box::pin(async move { Ok(rejection.into_response()) });
        }

        // Take the readied service and leave a fresh clone behind.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        Box::pin(async move { inner.call(req).await })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
