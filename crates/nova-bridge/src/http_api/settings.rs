use axum::{extract::State, Json};
use std::sync::Arc;

use nova_core::settings::{ClientState, ClientStatePatch};

use super::state::ApiState;
use crate::api_error::ApiError;

/// GET /api/settings -- the current client state (login flag, profile and
/// locale settings).
pub(crate) async fn get_settings(State(state): State<Arc<ApiState>>) -> Json<ClientState> {
    Json(state.client_state.read().await.clone())
}

/// PUT /api/settings -- replace the client state.
///
/// **Request Body:** complete `ClientState`; omitted sections take their
/// defaults. **Response:** 200 with the saved state, 400 if it fails
/// validation, 500 if it cannot be written.
pub(crate) async fn put_settings(
    State(state): State<Arc<ApiState>>,
    Json(next): Json<ClientState>,
) -> Result<Json<ClientState>, ApiError> {
    let mut current = state.client_state.write().await;
    state.state_store.save(&next)?;
    *current = next.clone();
    Ok(Json(next))
}

/// PATCH /api/settings -- partially update the client state.
///
/// A new `settings.country` re-derives currency and language unless the
/// same patch sets them explicitly. The update is all-or-nothing.
pub(crate) async fn patch_settings(
    State(state): State<Arc<ApiState>>,
    Json(patch): Json<ClientStatePatch>,
) -> Result<Json<ClientState>, ApiError> {
    let mut current = state.client_state.write().await;
    let mut next = current.clone();
    next.apply_patch(patch)?;
    state.state_store.save(&next)?;
    tracing::debug!(country = %next.settings.country, language = %next.settings.language, "client settings updated");
    *current = next.clone();
    Ok(Json(next))
}
