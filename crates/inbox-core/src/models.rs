//! Core data models for the inbox service.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::currency::is_known_currency;
use crate::defaults;
use crate::error::{Error, Result};

// =============================================================================
// PAGINATION
// =============================================================================

/// Sort direction for listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Cursor metadata returned with every page.
///
/// The cursor is an opaque string; callers pass `cursor` back unchanged to
/// fetch the following page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub cursor: Option<String>,
    pub has_previous_page: bool,
    pub has_next_page: bool,
}

/// A page of results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Page<T> {
    /// Build a page from rows fetched with `limit + 1` so the extra row only
    /// signals that another page exists.
    pub fn from_overfetch(mut rows: Vec<T>, offset: i64, limit: i64) -> Self {
        let has_next_page = rows.len() as i64 > limit;
        rows.truncate(limit.max(0) as usize);
        let cursor = has_next_page.then(|| (offset + limit).to_string());
        Self {
            data: rows,
            meta: PageMeta {
                cursor,
                has_previous_page: offset > 0,
                has_next_page,
            },
        }
    }
}

/// Decode a page cursor into a row offset.
pub fn parse_cursor(cursor: Option<&str>) -> Result<i64> {
    match cursor {
        None => Ok(0),
        Some(raw) if raw.trim().is_empty() => Ok(0),
        Some(raw) => raw
            .trim()
            .parse::<i64>()
            .ok()
            .filter(|n| *n >= 0)
            .ok_or_else(|| Error::InvalidInput(format!("Invalid cursor '{}'", raw))),
    }
}

/// Validate an optional page size, applying the default.
pub fn resolve_page_size(page_size: Option<i64>) -> Result<i64> {
    let size = page_size.unwrap_or(defaults::PAGE_LIMIT);
    if !(1..=defaults::PAGE_LIMIT_MAX).contains(&size) {
        return Err(Error::InvalidInput(format!(
            "page_size must be between 1 and {}",
            defaults::PAGE_LIMIT_MAX
        )));
    }
    Ok(size)
}

// =============================================================================
// TENANCY
// =============================================================================

/// An authenticated session as resolved from a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: Uuid,
    /// Active team, `None` until the user creates or joins one.
    pub team_id: Option<Uuid>,
}

impl Session {
    /// The tenant scope for this session, if a team is active.
    pub fn team_scope(&self) -> Option<TeamScope> {
        self.team_id.map(|team_id| TeamScope {
            team_id,
            user_id: self.user_id,
        })
    }
}

/// The tenant every team-owned read and write is filtered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TeamScope {
    pub team_id: Uuid,
    pub user_id: Uuid,
}

impl TeamScope {
    pub fn new(team_id: Uuid, user_id: Uuid) -> Self {
        Self { team_id, user_id }
    }
}

// =============================================================================
// INBOX
// =============================================================================

/// Lifecycle state of an inbox item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InboxStatus {
    #[default]
    New,
    Processing,
    Pending,
    Archived,
    /// Soft-deleted; invisible to every read.
    Deleted,
}

impl InboxStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InboxStatus::New => "new",
            InboxStatus::Processing => "processing",
            InboxStatus::Pending => "pending",
            InboxStatus::Archived => "archived",
            InboxStatus::Deleted => "deleted",
        }
    }
}

impl fmt::Display for InboxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InboxStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "new" => Ok(InboxStatus::New),
            "processing" => Ok(InboxStatus::Processing),
            "pending" => Ok(InboxStatus::Pending),
            "archived" => Ok(InboxStatus::Archived),
            "deleted" => Ok(InboxStatus::Deleted),
            other => Err(Error::InvalidInput(format!(
                "Unknown inbox status '{}'",
                other
            ))),
        }
    }
}

/// An incoming document awaiting reconciliation against a bank transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboxItem {
    pub id: Uuid,
    pub team_id: Uuid,
    pub display_name: Option<String>,
    pub file_name: Option<String>,
    pub file_path: Option<String>,
    pub content_type: Option<String>,
    pub size: Option<i64>,
    pub amount: Option<f64>,
    pub currency: Option<String>,
    pub website: Option<String>,
    pub sender_email: Option<String>,
    pub description: Option<String>,
    pub status: InboxStatus,
    /// At most one matched transaction; matching overwrites, unmatching clears.
    pub transaction_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied by the ingestion collaborator when an item arrives.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewInboxItem {
    pub display_name: Option<String>,
    pub file_name: Option<String>,
    pub file_path: Option<String>,
    pub content_type: Option<String>,
    pub size: Option<i64>,
    pub amount: Option<f64>,
    pub currency: Option<String>,
    pub website: Option<String>,
    pub sender_email: Option<String>,
    pub description: Option<String>,
    pub status: Option<InboxStatus>,
}

/// Optional filters for listing inbox items.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InboxFilter {
    pub cursor: Option<String>,
    pub page_size: Option<i64>,
    /// Free-text filter over the searchable fields.
    pub q: Option<String>,
    pub status: Option<InboxStatus>,
    pub order: Option<SortOrder>,
}

impl InboxFilter {
    /// Validate and resolve `(offset, limit)`.
    pub fn window(&self) -> Result<(i64, i64)> {
        if self.status == Some(InboxStatus::Deleted) {
            return Err(Error::InvalidInput(
                "Deleted inbox items cannot be listed".to_string(),
            ));
        }
        Ok((
            parse_cursor(self.cursor.as_deref())?,
            resolve_page_size(self.page_size)?,
        ))
    }

    /// Trimmed, non-empty text filter.
    pub fn query_text(&self) -> Option<&str> {
        self.q.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }
}

/// Free-text inbox search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchInboxRequest {
    pub query: String,
    pub limit: Option<i64>,
}

impl SearchInboxRequest {
    /// Effective result bound, defaulting to ten.
    pub fn limit(&self) -> Result<i64> {
        let limit = self.limit.unwrap_or(defaults::SEARCH_LIMIT);
        if !(1..=defaults::PAGE_LIMIT_MAX).contains(&limit) {
            return Err(Error::InvalidInput(format!(
                "limit must be between 1 and {}",
                defaults::PAGE_LIMIT_MAX
            )));
        }
        Ok(limit)
    }
}

/// Partial update of an inbox item. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateInboxRequest {
    pub status: Option<InboxStatus>,
    pub display_name: Option<String>,
}

impl UpdateInboxRequest {
    pub fn validate(&self) -> Result<()> {
        if self.status == Some(InboxStatus::Deleted) {
            return Err(Error::InvalidInput(
                "Use delete to remove an inbox item".to_string(),
            ));
        }
        if let Some(name) = &self.display_name {
            if name.trim().is_empty() {
                return Err(Error::InvalidInput(
                    "display_name cannot be empty".to_string(),
                ));
            }
            if name.chars().count() > defaults::DISPLAY_NAME_MAX_LEN {
                return Err(Error::InvalidInput(format!(
                    "display_name must be {} characters or less",
                    defaults::DISPLAY_NAME_MAX_LEN
                )));
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.display_name.is_none()
    }
}

/// Match an inbox item to a bank transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchTransactionRequest {
    pub transaction_id: Uuid,
}

/// One attachment to run through background processing.
///
/// Wire shape is `{filePath, mimetype, size}`; `file_path` is also accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessAttachmentInput {
    #[serde(alias = "file_path")]
    pub file_path: String,
    pub mimetype: String,
    pub size: i64,
}

impl ProcessAttachmentInput {
    pub fn validate(&self) -> Result<()> {
        if self.file_path.trim().is_empty() {
            return Err(Error::InvalidInput("filePath cannot be empty".to_string()));
        }
        if self.mimetype.trim().is_empty() {
            return Err(Error::InvalidInput("mimetype cannot be empty".to_string()));
        }
        if self.size < 0 {
            return Err(Error::InvalidInput("size cannot be negative".to_string()));
        }
        Ok(())
    }
}

/// Validate a whole `processAttachments` request body.
pub fn validate_attachments(items: &[ProcessAttachmentInput]) -> Result<()> {
    if items.len() > defaults::ATTACHMENT_BATCH_MAX {
        return Err(Error::InvalidInput(format!(
            "At most {} attachments per batch",
            defaults::ATTACHMENT_BATCH_MAX
        )));
    }
    items.iter().try_for_each(ProcessAttachmentInput::validate)
}

// =============================================================================
// BANK TRANSACTIONS
// =============================================================================

/// A bank transaction an inbox item can be matched against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankTransaction {
    pub id: Uuid,
    pub team_id: Uuid,
    pub name: String,
    pub amount: f64,
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

/// Transaction as delivered by the bank sync collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTransaction {
    pub name: String,
    pub amount: f64,
    pub currency: String,
}

// =============================================================================
// DOCUMENTS & TAGS
// =============================================================================

/// A team-scoped label documents can be tagged with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentTag {
    pub id: Uuid,
    pub team_id: Uuid,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
}

/// Link between a document and one of its tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentTagAssignment {
    pub document_tag: DocumentTag,
}

/// A stored document with its tag assignments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub team_id: Uuid,
    pub name: String,
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
    pub document_tag_assignments: Vec<DocumentTagAssignment>,
}

/// Document as delivered by the vault upload collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDocument {
    pub name: String,
    pub title: Option<String>,
}

/// Optional filters for listing documents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentFilter {
    pub cursor: Option<String>,
    pub page_size: Option<i64>,
    pub q: Option<String>,
}

impl DocumentFilter {
    pub fn window(&self) -> Result<(i64, i64)> {
        Ok((
            parse_cursor(self.cursor.as_deref())?,
            resolve_page_size(self.page_size)?,
        ))
    }

    pub fn query_text(&self) -> Option<&str> {
        self.q.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }
}

/// Request to create a document tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDocumentTagRequest {
    pub name: String,
}

impl CreateDocumentTagRequest {
    pub fn validate(&self) -> Result<()> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(Error::InvalidInput("Tag name cannot be empty".to_string()));
        }
        if name.chars().count() > defaults::TAG_NAME_MAX_LEN {
            return Err(Error::InvalidInput(format!(
                "Tag name must be {} characters or less",
                defaults::TAG_NAME_MAX_LEN
            )));
        }
        if slugify(name).is_empty() {
            return Err(Error::InvalidInput(
                "Tag name must contain at least one letter or digit".to_string(),
            ));
        }
        Ok(())
    }
}

/// Identifies one document ↔ tag link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentTagAssignmentRequest {
    pub tag_id: Uuid,
    pub document_id: Uuid,
}

/// Lower-case, hyphen-separated slug of a tag name.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

// =============================================================================
// TEAMS & USERS
// =============================================================================

/// Role a user holds within a team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamRole {
    Owner,
    Member,
}

impl TeamRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            TeamRole::Owner => "owner",
            TeamRole::Member => "member",
        }
    }
}

/// A tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: Uuid,
    pub name: String,
    pub base_currency: String,
    pub created_at: DateTime<Utc>,
}

/// Request to create a team.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTeamRequest {
    pub name: String,
    pub base_currency: String,
}

impl CreateTeamRequest {
    pub fn validate(&self) -> Result<()> {
        let len = self.name.trim().chars().count();
        if len < defaults::TEAM_NAME_MIN_LEN {
            return Err(Error::InvalidInput(format!(
                "Team name must be at least {} characters.",
                defaults::TEAM_NAME_MIN_LEN
            )));
        }
        if len > defaults::TEAM_NAME_MAX_LEN {
            return Err(Error::InvalidInput(format!(
                "Team name must be {} characters or less.",
                defaults::TEAM_NAME_MAX_LEN
            )));
        }
        if !is_known_currency(&self.base_currency) {
            return Err(Error::InvalidInput(format!(
                "Unsupported base currency '{}'",
                self.base_currency
            )));
        }
        Ok(())
    }
}

/// An application user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    /// Active team; switching teams rewrites this field.
    pub team_id: Option<Uuid>,
}

/// User as provisioned by the auth collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub full_name: Option<String>,
}

/// Partial update of the current user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    /// Switch the active team. The user must be a member.
    pub team_id: Option<Uuid>,
    pub full_name: Option<String>,
}

impl UpdateUserRequest {
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.full_name {
            if name.trim().is_empty() {
                return Err(Error::InvalidInput("full_name cannot be empty".to_string()));
            }
        }
        Ok(())
    }
}

// =============================================================================
// JOBS
// =============================================================================

/// Status of a queued background job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Cancelled => "cancelled",
        }
    }

    /// Convert a stored status string; unknown values read as pending.
    pub fn parse(s: &str) -> Self {
        match s {
            "running" => JobStatus::Running,
            "completed" => JobStatus::Completed,
            "failed" => JobStatus::Failed,
            "cancelled" => JobStatus::Cancelled,
            _ => JobStatus::Pending,
        }
    }
}

/// A job waiting in (or drained from) the queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub batch_id: Uuid,
    pub task_id: String,
    pub team_id: Uuid,
    pub status: JobStatus,
    pub payload: JsonValue,
    pub created_at: DateTime<Utc>,
}

/// Handle of one enqueued run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunHandle {
    pub id: Uuid,
}

/// Acknowledgment that a batch was accepted by the queue.
///
/// This says nothing about execution: the runs are merely enqueued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchHandle {
    pub batch_id: Uuid,
    pub runs: Vec<RunHandle>,
}

impl BatchHandle {
    /// Acknowledgment for an empty submission; nothing reached the queue.
    pub fn empty(batch_id: Uuid) -> Self {
        Self {
            batch_id,
            runs: Vec::new(),
        }
    }
}
