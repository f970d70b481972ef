//! HTTP surface of the Nova platform.
//!
//! Serves the mock dataset, the agent catalog and the client state over a
//! JSON REST API built on axum.

pub mod api_error;
pub mod auth;
pub mod http_api;
