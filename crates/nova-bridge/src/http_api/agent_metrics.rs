use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use nova_core::analytics::{metrics_csv, summarize_metrics, MetricSummary};
use nova_core::query::{MetricFilter, MetricParams};
use nova_core::types::AgentMetric;

use super::state::ApiState;
use crate::api_error::ApiError;

pub(crate) const CSV_FILENAME: &str = "agent-metrics.csv";

/// GET /api/metrics -- agent metric samples matching the query filter.
///
/// Also served as `/api/agent-metrics`.
/// **Query:** `agent`, `country` (`all` means no filter), `from`/`to` or
/// `dateFrom`/`dateTo`.
pub(crate) async fn list_metrics(
    State(state): State<Arc<ApiState>>,
    Query(params): Query<MetricParams>,
) -> Result<Json<Vec<AgentMetric>>, ApiError> {
    let filter = MetricFilter::from_params(&params)?;
    let metrics = state.metrics.read().await;
    Ok(Json(filter.apply(&metrics).into_iter().cloned().collect()))
}

/// GET /api/metrics/summary -- per-agent aggregates over the filtered samples.
pub(crate) async fn metrics_summary(
    State(state): State<Arc<ApiState>>,
    Query(params): Query<MetricParams>,
) -> Result<Json<Vec<MetricSummary>>, ApiError> {
    let filter = MetricFilter::from_params(&params)?;
    let metrics = state.metrics.read().await;
    Ok(Json(summarize_metrics(filter.apply(&metrics))))
}

/// GET /api/metrics/export -- the filtered samples as a CSV attachment.
pub(crate) async fn export_metrics(
    State(state): State<Arc<ApiState>>,
    Query(params): Query<MetricParams>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = MetricFilter::from_params(&params)?;
    let body = {
        let metrics = state.metrics.read().await;
        metrics_csv(filter.apply(&metrics))
    };
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{CSV_FILENAME}\""),
            ),
        ],
        body,
    ))
}
