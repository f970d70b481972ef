use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

use nova_core::analytics::{invoice_summary, InvoiceSummary};
use nova_core::locale::{Country, COUNTRIES};
use nova_core::query::{InvoiceFilter, InvoiceParams};
use nova_core::types::Customer;

use super::state::ApiState;
use crate::api_error::ApiError;

/// GET /api/analytics -- invoice KPIs over the filtered invoices.
///
/// **Query:** the invoice filter (`from`, `to`, `country`, ...). A country
/// filter also narrows the customers counted towards receivables.
pub(crate) async fn get_analytics(
    State(state): State<Arc<ApiState>>,
    Query(params): Query<InvoiceParams>,
) -> Result<Json<InvoiceSummary>, ApiError> {
    let filter = InvoiceFilter::from_params(&params)?;
    let invoices = state.invoices.read().await;
    let customers = state.customers.read().await;
    let customers: Vec<Customer> = match filter.country.as_deref() {
        Some(country) => customers
            .iter()
            .filter(|c| c.country.eq_ignore_ascii_case(country))
            .cloned()
            .collect(),
        None => customers.clone(),
    };
    Ok(Json(invoice_summary(filter.apply(&invoices), &customers)))
}

/// GET /api/countries -- supported countries with currency and languages.
pub(crate) async fn list_countries() -> Json<&'static [Country]> {
    Json(&COUNTRIES[..])
}
