use axum::{extract::State, Json};
use std::sync::Arc;

use nova_api_types::StatusResponse;

use super::state::ApiState;

/// GET /api/status -- server health and dataset sizes.
pub(crate) async fn get_status(State(state): State<Arc<ApiState>>) -> Json<StatusResponse> {
    let invoices = state.invoices.read().await.len();
    let customers = state.customers.read().await.len();
    let metrics = state.metrics.read().await.len();
    Json(StatusResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        customers,
        invoices,
        metrics,
        catalog_agents: state.catalog.len(),
        auth_required: state.auth_required,
    })
}
