//! Inbox HTTP handlers.
//!
//! Items are always read and written through the caller's [`TeamScope`];
//! ids owned by another team answer exactly like missing ids.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::info;
use uuid::Uuid;

use inbox_core::{
    validate_attachments, BatchHandle, InboxFilter, InboxItem, MatchTransactionRequest, Page,
    ProcessAttachmentInput, SearchInboxRequest, TeamScope, UpdateInboxRequest,
};
use inbox_jobs::{ProcessAttachment, ProcessAttachmentPayload};

use crate::{ApiError, AppState};

/// List inbox items for the active team.
///
/// # Query Parameters
/// - `cursor`: opaque cursor from a previous page (optional)
/// - `page_size`: 1..=100, default 20
/// - `q`: free-text filter (optional)
/// - `status`: `new`, `processing`, `pending` or `archived` (optional)
/// - `order`: `asc` or `desc` by creation time, default `desc`
///
/// # Returns
/// - 200 OK with `{ data, meta }`
/// - 400 Bad Request for an invalid cursor or page size
pub async fn list_inbox(
    State(state): State<AppState>,
    scope: TeamScope,
    Query(filter): Query<InboxFilter>,
) -> Result<Json<Page<InboxItem>>, ApiError> {
    let page = state.inbox.list(&scope, &filter).await?;
    Ok(Json(page))
}

/// Free-text search, at most `limit` (default 10) results.
///
/// # Returns
/// - 200 OK with an array of items
/// - 400 Bad Request if `limit` is outside 1..=100
pub async fn search_inbox(
    State(state): State<AppState>,
    scope: TeamScope,
    Query(req): Query<SearchInboxRequest>,
) -> Result<Json<Vec<InboxItem>>, ApiError> {
    let limit = req.limit()?;
    let items = state.inbox.search(&scope, &req.query, limit).await?;
    Ok(Json(items))
}

/// Get one inbox item.
///
/// # Returns
/// - 200 OK with the item
/// - 404 Not Found if missing, deleted or owned by another team
pub async fn get_inbox_item(
    State(state): State<AppState>,
    scope: TeamScope,
    Path(id): Path<Uuid>,
) -> Result<Json<InboxItem>, ApiError> {
    let item = state.inbox.get(&scope, id).await?;
    Ok(Json(item))
}

/// Partially update an inbox item; absent fields are left untouched.
///
/// # Returns
/// - 200 OK with the updated item
/// - 400 Bad Request on validation failure
/// - 404 Not Found
pub async fn update_inbox_item(
    State(state): State<AppState>,
    scope: TeamScope,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateInboxRequest>,
) -> Result<Json<InboxItem>, ApiError> {
    req.validate()?;
    let item = state.inbox.update(&scope, id, &req).await?;
    Ok(Json(item))
}

/// Delete an inbox item.
///
/// # Returns
/// - 200 OK with the deleted item
/// - 404 Not Found, including for an item already deleted
pub async fn delete_inbox_item(
    State(state): State<AppState>,
    scope: TeamScope,
    Path(id): Path<Uuid>,
) -> Result<Json<InboxItem>, ApiError> {
    let item = state.inbox.delete(&scope, id).await?;
    info!(
        subsystem = "api",
        op = "delete",
        team_id = %scope.team_id,
        inbox_id = %id,
        "Inbox item deleted"
    );
    Ok(Json(item))
}

/// Match an inbox item to a transaction, replacing any previous match.
///
/// # Returns
/// - 200 OK with the updated item
/// - 404 Not Found if the item or the transaction is not in the team
pub async fn match_transaction(
    State(state): State<AppState>,
    scope: TeamScope,
    Path(id): Path<Uuid>,
    Json(req): Json<MatchTransactionRequest>,
) -> Result<Json<InboxItem>, ApiError> {
    let item = state
        .inbox
        .match_transaction(&scope, id, req.transaction_id)
        .await?;
    Ok(Json(item))
}

/// Clear the matched transaction. Unmatching an unmatched item succeeds.
pub async fn unmatch_transaction(
    State(state): State<AppState>,
    scope: TeamScope,
    Path(id): Path<Uuid>,
) -> Result<Json<InboxItem>, ApiError> {
    let item = state.inbox.unmatch_transaction(&scope, id).await?;
    Ok(Json(item))
}

/// Queue one `process-attachment` run per attachment.
///
/// The caller's team id is merged into every payload and the whole array is
/// submitted as a single batch. The response acknowledges the enqueue only.
///
/// # Returns
/// - 202 Accepted with `{ batch_id, runs }`; `runs` is empty for an empty array
/// - 400 Bad Request on validation failure
/// - 500 Internal Server Error if the queue rejects the batch
pub async fn process_attachments(
    State(state): State<AppState>,
    scope: TeamScope,
    Json(items): Json<Vec<ProcessAttachmentInput>>,
) -> Result<(StatusCode, Json<BatchHandle>), ApiError> {
    validate_attachments(&items)?;
    let payloads = items
        .into_iter()
        .map(|input| ProcessAttachmentPayload::scoped(&scope, input))
        .collect();
    let handle = state
        .tasks
        .batch_trigger::<ProcessAttachment>(&scope, payloads)
        .await?;
    Ok((StatusCode::ACCEPTED, Json(handle)))
}
