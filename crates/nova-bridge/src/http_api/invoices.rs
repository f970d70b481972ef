use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;

use nova_api_types::{AdvanceRequest, StageUpdateRequest};
use nova_core::query::{InvoiceFilter, InvoiceParams};
use nova_core::types::{Invoice, InvoiceStage, StageChange};

use nova_telemetry::metrics::global_metrics;

use super::state::ApiState;
use super::types::{InvoiceDetail, StageUpdateResponse};
use crate::api_error::ApiError;

pub(crate) const STAGE_TRANSITIONS_TOTAL: &str = "invoice_stage_transitions_total";

/// User recorded on timeline entries when the request names none.
const DEFAULT_USER: &str = "system";

/// GET /api/invoices -- list invoices matching the query filter.
///
/// **Query:** `status`, `stage`, `customer` (substring), `country`,
/// `from`/`to` (or `dateFrom`/`dateTo`) on the issue date.
/// **Response:** 200 with an array of invoices, 400 on an invalid filter.
pub(crate) async fn list_invoices(
    State(state): State<Arc<ApiState>>,
    Query(params): Query<InvoiceParams>,
) -> Result<Json<Vec<Invoice>>, ApiError> {
    let filter = InvoiceFilter::from_params(&params)?;
    let invoices = state.invoices.read().await;
    Ok(Json(filter.apply(&invoices).into_iter().cloned().collect()))
}

/// GET /api/invoices/{id} -- one invoice with its derived status, risk level
/// and next stage.
pub(crate) async fn get_invoice(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
) -> Result<Json<InvoiceDetail>, ApiError> {
    let invoices = state.invoices.read().await;
    let Some(invoice) = invoices.iter().find(|inv| inv.id == id) else {
        return Err(ApiError::NotFound("invoice not found".into()));
    };
    Ok(Json(InvoiceDetail::from(invoice.clone())))
}

/// PATCH /api/invoices/{id}/stage -- move an invoice to a named stage.
///
/// The target must be the current stage (no-op) or the one right after it;
/// anything else is rejected with 409 and leaves the invoice untouched.
/// The check and the mutation happen under one write lock.
pub(crate) async fn update_stage(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
    Json(req): Json<StageUpdateRequest>,
) -> Result<Json<StageUpdateResponse>, ApiError> {
    let target: InvoiceStage = req.stage.parse()?;
    let user = req.user.as_deref().unwrap_or(DEFAULT_USER);

    let mut invoices = state.invoices.write().await;
    let Some(invoice) = invoices.iter_mut().find(|inv| inv.id == id) else {
        return Err(ApiError::NotFound("invoice not found".into()));
    };
    let change = invoice.move_to(target, user, chrono::Utc::now())?;
    log_change(&id, change);

    Ok(Json(StageUpdateResponse {
        changed: change != StageChange::Unchanged,
        invoice: InvoiceDetail::from(invoice.clone()),
    }))
}

/// POST /api/invoices/{id}/advance -- move an invoice one stage forward.
///
/// Paid invoices are returned unchanged with `changed: false`. The body is
/// optional.
pub(crate) async fn advance_invoice(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
    body: Option<Json<AdvanceRequest>>,
) -> Result<Json<StageUpdateResponse>, ApiError> {
    let req = body.map(|Json(r)| r).unwrap_or_default();
    let user = req.user.as_deref().unwrap_or(DEFAULT_USER);

    let mut invoices = state.invoices.write().await;
    let Some(invoice) = invoices.iter_mut().find(|inv| inv.id == id) else {
        return Err(ApiError::NotFound("invoice not found".into()));
    };
    let change = invoice.advance(user, chrono::Utc::now());
    log_change(&id, change);

    Ok(Json(StageUpdateResponse {
        changed: change != StageChange::Unchanged,
        invoice: InvoiceDetail::from(invoice.clone()),
    }))
}

fn log_change(id: &str, change: StageChange) {
    if let StageChange::Advanced { from, to } = change {
        tracing::info!(invoice_id = %id, %from, %to, "invoice stage advanced");
        global_metrics().increment_counter(STAGE_TRANSITIONS_TOTAL, &[("to", &to.to_string())]);
    }
}
