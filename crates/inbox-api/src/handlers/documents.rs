//! Document HTTP handlers.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use inbox_core::{Document, DocumentFilter, Page, TeamScope};

use crate::{ApiError, AppState};

/// List documents with their tag assignments, newest first.
pub async fn list_documents(
    State(state): State<AppState>,
    scope: TeamScope,
    Query(filter): Query<DocumentFilter>,
) -> Result<Json<Page<Document>>, ApiError> {
    let page = state.documents.list(&scope, &filter).await?;
    Ok(Json(page))
}

pub async fn get_document(
    State(state): State<AppState>,
    scope: TeamScope,
    Path(id): Path<Uuid>,
) -> Result<Json<Document>, ApiError> {
    let doc = state.documents.get(&scope, id).await?;
    Ok(Json(doc))
}
