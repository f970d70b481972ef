// ---------------------------------------------------------------------------
// HTTP API module directory
// ---------------------------------------------------------------------------
//
// One sub-module per resource. This file owns the Axum router and the
// middleware shared by every route.

mod agent_metrics;
mod agents;
mod analytics;
mod catalog;
mod customers;
mod invoices;
mod metrics;
mod misc;
mod session;
mod settings;
pub mod state;
#[cfg(test)]
mod tests;
pub mod types;

pub use state::{ApiState, LoginCredentials};

pub use self::router::{api_router, api_router_with_auth};

// ---------------------------------------------------------------------------
// Simulated backend latency
// ---------------------------------------------------------------------------

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use nova_telemetry::metrics::{global_metrics, MOCK_LATENCY_DURATION};

/// Delay every `/api/` response by the configured mock latency.
pub(crate) async fn mock_latency_middleware(
    State(state): State<Arc<ApiState>>,
    request: Request,
    next: Next,
) -> Response {
    if !state.latency.is_zero() && request.uri().path().starts_with("/api/") {
        tokio::time::sleep(state.latency).await;
        global_metrics().record_histogram(MOCK_LATENCY_DURATION, state.latency.as_secs_f64());
    }
    next.run(request).await
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

mod router {
    use axum::{
        middleware as axum_middleware,
        routing::{get, patch, post},
        Router,
    };
    use std::sync::Arc;
    use tower_http::cors::CorsLayer;

    use nova_telemetry::middleware::metrics_middleware;
    use nova_telemetry::tracing_setup::request_id_middleware;

    use super::state::ApiState;
    use super::*;
    use crate::auth::ApiKeyLayer;

    /// Build the API router without authentication (development mode).
    pub fn api_router(state: Arc<ApiState>) -> Router {
        api_router_with_auth(state, None, vec![])
    }

    /// Build the API router with optional API key authentication.
    ///
    /// * `api_key` -- `Some(key)` requires the key on every request.
    /// * `allowed_origins` -- CORS origins accepted besides localhost.
    pub fn api_router_with_auth(
        state: Arc<ApiState>,
        api_key: Option<String>,
        allowed_origins: Vec<String>,
    ) -> Router {
        Router::new()
            .route("/api/status", get(misc::get_status))
            // Invoices
            .route("/api/invoices", get(invoices::list_invoices))
            .route("/api/invoices/{id}", get(invoices::get_invoice))
            .route("/api/invoices/{id}/stage", patch(invoices::update_stage))
            .route("/api/invoices/{id}/advance", post(invoices::advance_invoice))
            // Customers
            .route("/api/customers", get(customers::list_customers))
            .route("/api/customers/{id}", get(customers::get_customer))
            .route("/api/customers/{id}/action", post(customers::record_action))
            // Agent metrics
            .route("/api/metrics", get(agent_metrics::list_metrics))
            .route("/api/agent-metrics", get(agent_metrics::list_metrics))
            .route("/api/metrics/summary", get(agent_metrics::metrics_summary))
            .route("/api/metrics/export", get(agent_metrics::export_metrics))
            // Agents
            .route("/api/agents", get(agents::list_agents))
            .route("/api/agents/financials", get(agents::financials))
            .route(
                "/api/agents/invoice-processor/workflow",
                get(agents::invoice_workflow),
            )
            .route(
                "/api/agents/customer-insights/analysis",
                get(agents::customer_insights),
            )
            .route("/api/agents/{id}", get(agents::get_agent))
            .route("/api/overview", get(agents::overview))
            // Analytics and reference data
            .route("/api/analytics", get(analytics::get_analytics))
            .route("/api/countries", get(analytics::list_countries))
            // Catalog and roadmap
            .route("/api/catalog", get(catalog::list_catalog))
            .route("/api/catalog/functions", get(catalog::list_functions))
            .route("/api/catalog/{id}", get(catalog::get_catalog_agent))
            .route("/api/roadmap", get(catalog::get_roadmap))
            // Client state
            .route(
                "/api/settings",
                get(settings::get_settings)
                    .put(settings::put_settings)
                    .patch(settings::patch_settings),
            )
            .route("/api/session/login", post(session::login))
            .route("/api/session/logout", post(session::logout))
            // Telemetry
            .route("/internal/metrics", get(metrics::get_metrics_prometheus))
            .route("/internal/metrics/json", get(metrics::get_metrics_json))
            .layer(axum_middleware::from_fn_with_state(
                state.clone(),
                mock_latency_middleware,
            ))
            .layer(axum_middleware::from_fn(metrics_middleware))
            .layer(axum_middleware::from_fn(request_id_middleware))
            .layer(ApiKeyLayer::new(api_key))
            .layer(
                CorsLayer::new()
                    .allow_origin(tower_http::cors::AllowOrigin::predicate(
                        move |origin: &axum::http::HeaderValue,
                              _request_parts: &axum::http::request::Parts| {
                            let Ok(origin_str) = origin.to_str() else {
                                return false;
                            };
                            is_local_origin(origin_str)
                                || allowed_origins.iter().any(|allowed| origin_str == allowed)
                        },
                    ))
                    .allow_methods([
                        axum::http::Method::GET,
                        axum::http::Method::POST,
                        axum::http::Method::PUT,
                        axum::http::Method::PATCH,
                        axum::http::Method::OPTIONS,
                    ])
                    .allow_headers([
                        axum::http::header::CONTENT_TYPE,
                        axum::http::header::AUTHORIZATION,
                        axum::http::HeaderName::from_static(crate::auth::API_KEY_HEADER),
                    ])
                    .allow_credentials(true),
            )
            .with_state(state)
    }

    fn is_local_origin(origin: &str) -> bool {
        ["http://localhost", "http://127.0.0.1", "https://localhost", "https://127.0.0.1"]
            .iter()
            .any(|host| {
                origin
                    .strip_prefix(host)
                    .is_some_and(|rest| rest.is_empty() || rest.starts_with(':'))
            })
    }
}
