//! Document tag and tag assignment handlers.

use axum::{extract::State, http::StatusCode, Json};
use tracing::info;

use inbox_core::{CreateDocumentTagRequest, DocumentTag, DocumentTagAssignmentRequest, TeamScope};

use crate::{ApiError, AppState};

/// The team's tag catalog, ordered by name.
pub async fn list_document_tags(
    State(state): State<AppState>,
    scope: TeamScope,
) -> Result<Json<Vec<DocumentTag>>, ApiError> {
    let tags = state.document_tags.list(&scope).await?;
    Ok(Json(tags))
}

/// Create a tag.
///
/// # Returns
/// - 201 Created with the tag
/// - 400 Bad Request for an empty or overlong name
/// - 409 Conflict if a tag with the same slug exists in the team
pub async fn create_document_tag(
    State(state): State<AppState>,
    scope: TeamScope,
    Json(req): Json<CreateDocumentTagRequest>,
) -> Result<(StatusCode, Json<DocumentTag>), ApiError> {
    req.validate()?;
    let tag = state.document_tags.create(&scope, &req).await?;
    info!(
        subsystem = "api",
        op = "create_document_tag",
        team_id = %scope.team_id,
        tag_id = %tag.id,
        "Document tag created"
    );
    Ok((StatusCode::CREATED, Json(tag)))
}

/// Tag a document. Repeating an existing link still succeeds.
pub async fn create_assignment(
    State(state): State<AppState>,
    scope: TeamScope,
    Json(req): Json<DocumentTagAssignmentRequest>,
) -> Result<(StatusCode, Json<DocumentTagAssignmentRequest>), ApiError> {
    state.document_tags.assign(&scope, req).await?;
    Ok((StatusCode::CREATED, Json(req)))
}

/// Untag a document. Removing a missing link still succeeds.
pub async fn delete_assignment(
    State(state): State<AppState>,
    scope: TeamScope,
    Json(req): Json<DocumentTagAssignmentRequest>,
) -> Result<StatusCode, ApiError> {
    state.document_tags.unassign(&scope, req).await?;
    Ok(StatusCode::NO_CONTENT)
}
