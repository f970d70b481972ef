use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;

use nova_core::catalog::{CatalogAgent, BUSINESS_FUNCTIONS};
use nova_core::facets::{split_list, CatalogFilter};
use nova_core::roadmap::{build_report, RoadmapFilter, RoadmapReport};

use super::state::ApiState;
use super::types::{CatalogListResponse, CatalogQuery};
use crate::api_error::ApiError;

/// GET /api/catalog -- catalog agents narrowed by the function and country
/// facets.
///
/// **Query:** `functions=a,b` (any selected function is a substring of the
/// agent's business function) and `countries=DE,FR` (agent serves any
/// selected country). Catalog order is preserved.
pub(crate) async fn list_catalog(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<CatalogQuery>,
) -> Json<CatalogListResponse> {
    let filter = CatalogFilter {
        functions: split_list(query.functions.as_deref()),
        countries: split_list(query.countries.as_deref()),
    };
    let agents: Vec<CatalogAgent> = filter
        .apply(state.catalog.agents())
        .into_iter()
        .cloned()
        .collect();
    Json(CatalogListResponse {
        total: state.catalog.len(),
        filter,
        agents,
    })
}

/// GET /api/catalog/functions -- the canonical business functions.
pub(crate) async fn list_functions() -> Json<Vec<&'static str>> {
    Json(BUSINESS_FUNCTIONS.to_vec())
}

/// GET /api/catalog/{id} -- one catalog agent.
pub(crate) async fn get_catalog_agent(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
) -> Result<Json<CatalogAgent>, ApiError> {
    state
        .catalog
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("catalog agent not found".into()))
}

/// GET /api/roadmap -- ROI-ranked roadmap of coming-soon agents.
///
/// **Query:** `function` (exact; `All` or empty means every function) and
/// `search` (case-insensitive name substring).
pub(crate) async fn get_roadmap(
    State(state): State<Arc<ApiState>>,
    Query(filter): Query<RoadmapFilter>,
) -> Json<RoadmapReport> {
    Json(build_report(state.catalog, &filter))
}
