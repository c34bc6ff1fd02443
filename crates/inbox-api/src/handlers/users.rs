//! Current-user handlers.

use axum::{extract::State, Json};

use inbox_core::{UpdateUserRequest, User};

use crate::{ApiError, AppState, RequireAuth};

pub async fn get_me(
    State(state): State<AppState>,
    auth: RequireAuth,
) -> Result<Json<User>, ApiError> {
    let user = state.users.get(auth.session.user_id).await?;
    Ok(Json(user))
}

/// Update the current user. Setting `team_id` switches the active team and
/// requires membership (403 otherwise, with the user left unchanged).
pub async fn update_me(
    State(state): State<AppState>,
    auth: RequireAuth,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<User>, ApiError> {
    req.validate()?;
    let user = state.users.update(auth.session.user_id, &req).await?;
    Ok(Json(user))
}
