use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;

use nova_api_types::CustomerActionRequest;
use nova_core::query::{CustomerFilter, CustomerParams};
use nova_core::types::{Customer, CustomerAction};

use super::state::ApiState;
use super::types::{CustomerActionResponse, CustomerDetail};
use crate::api_error::ApiError;

/// GET /api/customers -- list customers matching the query filter.
///
/// **Query:** `country`, `status` (`active` / `at_risk`), `name` and `region`
/// (substrings), `minScore`/`maxScore` (inclusive).
pub(crate) async fn list_customers(
    State(state): State<Arc<ApiState>>,
    Query(params): Query<CustomerParams>,
) -> Result<Json<Vec<Customer>>, ApiError> {
    let filter = CustomerFilter::from_params(&params)?;
    let customers = state.customers.read().await;
    Ok(Json(filter.apply(&customers).into_iter().cloned().collect()))
}

/// GET /api/customers/{id} -- one customer, its credit classification and
/// every invoice issued to it.
pub(crate) async fn get_customer(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
) -> Result<Json<CustomerDetail>, ApiError> {
    let customer = {
        let customers = state.customers.read().await;
        let Some(customer) = customers.iter().find(|c| c.id == id) else {
            return Err(ApiError::NotFound("customer not found".into()));
        };
        customer.clone()
    };
    let invoices = state
        .invoices
        .read()
        .await
        .iter()
        .filter(|inv| inv.customer_id == id)
        .cloned()
        .collect();
    Ok(Json(CustomerDetail::new(customer, invoices)))
}

/// POST /api/customers/{id}/action -- record a follow-up action.
///
/// `Trigger Close Order` also clears the customer's pending orders.
/// **Response:** 200 with the history entry and updated customer, 400 for an
/// unknown action, 404 for an unknown customer.
pub(crate) async fn record_action(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
    Json(req): Json<CustomerActionRequest>,
) -> Result<Json<CustomerActionResponse>, ApiError> {
    let action: CustomerAction = req.action.parse()?;
    let user = req.user.unwrap_or_else(|| state.credentials.username.clone());

    let mut customers = state.customers.write().await;
    let Some(customer) = customers.iter_mut().find(|c| c.id == id) else {
        return Err(ApiError::NotFound("customer not found".into()));
    };
    let item = customer.apply_action(action, user, req.notes, chrono::Utc::now());
    tracing::info!(customer_id = %id, %action, "customer action recorded");

    Ok(Json(CustomerActionResponse {
        action: item,
        customer: customer.clone(),
    }))
}
