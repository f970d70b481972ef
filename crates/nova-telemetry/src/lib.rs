//! Observability for the Nova Platform services.
//!
//! - **Logging**: human-readable or JSON output via `tracing-subscriber`
//! - **Metrics**: counters, gauges and histograms with Prometheus and JSON export
//! - **Middleware**: Axum layers for request metrics and `x-request-id` correlation

pub mod logging;
pub mod metrics;
pub mod middleware;
pub mod tracing_setup;
