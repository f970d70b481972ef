use axum::{extract::State, Json};
use std::sync::Arc;

use nova_api_types::{LoginRequest, SessionResponse};

use super::state::ApiState;
use crate::api_error::ApiError;
use crate::auth::secrets_match;

/// POST /api/session/login -- demo login against the configured credentials.
///
/// **Response:** 200 with the session, 401 "Invalid username or password".
pub(crate) async fn login(
    State(state): State<Arc<ApiState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let creds = &state.credentials;
    // Evaluate both so a wrong username costs the same as a wrong password.
    let user_ok = secrets_match(&req.username, &creds.username);
    let pass_ok = secrets_match(&req.password, &creds.password);
    if !(user_ok && pass_ok) {
        tracing::warn!(username = %req.username, "failed login attempt");
        return Err(ApiError::Unauthorized("Invalid username or password".into()));
    }

    let mut current = state.client_state.write().await;
    let mut next = current.clone();
    next.login();
    state.state_store.save(&next)?;
    *current = next;
    tracing::info!(username = %req.username, "user logged in");

    Ok(Json(SessionResponse {
        logged_in: true,
        username: Some(req.username),
    }))
}

/// POST /api/session/logout -- clear the logged-in flag.
pub(crate) async fn logout(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<SessionResponse>, ApiError> {
    let mut current = state.client_state.write().await;
    let mut next = current.clone();
    next.logout();
    state.state_store.save(&next)?;
    *current = next;

    Ok(Json(SessionResponse {
        logged_in: false,
        username: None,
    }))
}
