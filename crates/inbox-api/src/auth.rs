//! Authentication and tenant extractors.
//!
//! `RequireAuth` resolves the bearer token to a session. Handlers that touch
//! team-owned data take a [`TeamScope`] instead, which additionally requires
//! an active team; without one the request is rejected before the handler
//! runs.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use tracing::debug;

use inbox_core::{Session, TeamScope};

use crate::error::ApiError;
use crate::state::AppState;

/// Extractor for requests that must carry a valid session.
#[derive(Debug, Clone)]
pub struct RequireAuth {
    pub session: Session,
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[async_trait]
impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))?;

        match state.sessions.resolve(token).await? {
            Some(session) => Ok(RequireAuth { session }),
            None => {
                debug!(subsystem = "api", component = "auth", "Unknown bearer token");
                Err(ApiError::Unauthorized("Invalid token".to_string()))
            }
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for TeamScope {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireAuth { session } = RequireAuth::from_request_parts(parts, state).await?;
        session
            .team_scope()
            .ok_or_else(|| ApiError::Forbidden("No active team".to_string()))
    }
}
