use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use std::sync::Arc;

use nova_api_types::AgentSummary;
use nova_core::analytics::{customer_analysis, recent_documents, stage_breakdown, CustomerAnalysis};
use nova_core::mock_data::{seed_for, MockDataGenerator, OverviewSeries};
use nova_core::roadmap::{agent_financials, AgentFinancials};

use super::state::ApiState;
use super::types::{agent_summaries, AgentDetail, OverviewQuery, WorkflowResponse};
use crate::api_error::ApiError;

const RECENT_DOCUMENTS: usize = 5;
const HISTORY_MONTHS: u32 = 12;

fn history_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or_default()
}

/// GET /api/agents -- the operational agent summaries.
pub(crate) async fn list_agents() -> Json<Vec<AgentSummary>> {
    Json(agent_summaries())
}

/// GET /api/agents/{id} -- summary plus twelve months of volume and
/// performance history. The history is seeded from the agent id, so it is
/// stable across requests.
pub(crate) async fn get_agent(Path(id): Path<String>) -> Result<Json<AgentDetail>, ApiError> {
    let Some(summary) = agent_summaries().into_iter().find(|a| a.id == id) else {
        return Err(ApiError::NotFound("agent not found".into()));
    };
    let mut generator = MockDataGenerator::new(seed_for(&id));
    let monthly_metrics = generator.monthly_series(history_start(), HISTORY_MONTHS);
    let performance_history = generator.performance_history(history_start(), HISTORY_MONTHS);
    Ok(Json(AgentDetail {
        summary,
        monthly_metrics,
        performance_history,
    }))
}

/// GET /api/agents/invoice-processor/workflow -- invoices per stage and the
/// most recently issued documents.
pub(crate) async fn invoice_workflow(State(state): State<Arc<ApiState>>) -> Json<WorkflowResponse> {
    let invoices = state.invoices.read().await;
    Json(WorkflowResponse {
        stages: stage_breakdown(&invoices),
        recent_documents: recent_documents(&invoices, RECENT_DOCUMENTS),
    })
}

/// GET /api/agents/customer-insights/analysis -- top customers, risk buckets
/// and credit trends.
pub(crate) async fn customer_insights(
    State(state): State<Arc<ApiState>>,
) -> Json<CustomerAnalysis> {
    let customers = state.customers.read().await;
    Json(customer_analysis(&customers, state.seed))
}

/// GET /api/agents/financials -- monthly cost/savings curve and cost split.
pub(crate) async fn financials() -> Json<AgentFinancials> {
    Json(agent_financials())
}

/// GET /api/overview -- dashboard series for `?agent=` (default `all`).
pub(crate) async fn overview(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<OverviewQuery>,
) -> Json<OverviewSeries> {
    let agent = query
        .agent
        .as_deref()
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .unwrap_or("all");
    let mut generator = MockDataGenerator::new(state.seed ^ seed_for(agent));
    Json(generator.overview(agent))
}
