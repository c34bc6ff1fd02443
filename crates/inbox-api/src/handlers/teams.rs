//! Team HTTP handlers.

use axum::{extract::State, http::StatusCode, Json};
use tracing::info;

use inbox_core::CreateTeamRequest;

use crate::{ApiError, AppState, RequireAuth};

/// Create a team owned by the caller.
///
/// Needs a session but not an active team. The caller's active team is left
/// unchanged; switching is a separate `PATCH /api/v1/users/me`.
///
/// # Returns
/// - 201 Created with `{ "id": "<uuid>" }`
/// - 400 Bad Request for a short name or unknown currency
pub async fn create_team(
    State(state): State<AppState>,
    auth: RequireAuth,
    Json(req): Json<CreateTeamRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    req.validate()?;
    let team = state.teams.create(auth.session.user_id, &req).await?;
    info!(
        subsystem = "api",
        op = "create_team",
        team_id = %team.id,
        user_id = %auth.session.user_id,
        "Team created"
    );
    Ok((StatusCode::CREATED, Json(serde_json::json!({ "id": team.id }))))
}
