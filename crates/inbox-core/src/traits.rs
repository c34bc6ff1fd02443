//! Repository traits.
//!
//! Every team-owned read and write takes a [`TeamScope`]; implementations
//! must filter by `scope.team_id` on every statement so rows owned by another
//! team behave exactly like missing rows.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// INBOX
// =============================================================================

/// Repository for inbox items.
#[async_trait]
pub trait InboxRepository: Send + Sync {
    /// Store a newly ingested item.
    async fn insert(&self, scope: &TeamScope, item: NewInboxItem) -> Result<InboxItem>;

    /// List visible items, newest first unless `filter.order` says otherwise.
    async fn list(&self, scope: &TeamScope, filter: &InboxFilter) -> Result<Page<InboxItem>>;

    /// Fetch one item. Missing, deleted and foreign items are all
    /// `Error::InboxNotFound`.
    async fn get(&self, scope: &TeamScope, id: Uuid) -> Result<InboxItem>;

    /// Free-text search over the searchable fields, at most `limit` rows.
    async fn search(&self, scope: &TeamScope, query: &str, limit: i64)
        -> Result<Vec<InboxItem>>;

    /// Apply a partial update; only provided fields change.
    async fn update(
        &self,
        scope: &TeamScope,
        id: Uuid,
        req: &UpdateInboxRequest,
    ) -> Result<InboxItem>;

    /// Soft-delete an item and return it as deleted.
    async fn delete(&self, scope: &TeamScope, id: Uuid) -> Result<InboxItem>;

    /// Point the item at `transaction_id`, replacing any previous match.
    ///
    /// The transaction must belong to the same team.
    async fn match_transaction(
        &self,
        scope: &TeamScope,
        id: Uuid,
        transaction_id: Uuid,
    ) -> Result<InboxItem>;

    /// Clear the matched transaction. Clearing an unmatched item succeeds.
    async fn unmatch_transaction(&self, scope: &TeamScope, id: Uuid) -> Result<InboxItem>;
}

// =============================================================================
// TRANSACTIONS
// =============================================================================

/// Repository for bank transactions.
#[async_trait]
pub trait TransactionRepository: Send + Sync {
    async fn insert(&self, scope: &TeamScope, tx: NewTransaction) -> Result<BankTransaction>;

    /// Whether the transaction exists in the caller's team.
    async fn exists(&self, scope: &TeamScope, id: Uuid) -> Result<bool>;
}

// =============================================================================
// DOCUMENTS
// =============================================================================

/// Repository for vault documents.
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    async fn insert(&self, scope: &TeamScope, doc: NewDocument) -> Result<Document>;

    /// List documents with their tag assignments, newest first.
    async fn list(&self, scope: &TeamScope, filter: &DocumentFilter) -> Result<Page<Document>>;

    /// Fetch one document with its tag assignments.
    async fn get(&self, scope: &TeamScope, id: Uuid) -> Result<Document>;
}

/// Repository for document tags and their assignments.
#[async_trait]
pub trait DocumentTagRepository: Send + Sync {
    /// The team's tag catalog, ordered by name.
    async fn list(&self, scope: &TeamScope) -> Result<Vec<DocumentTag>>;

    /// Create a tag; a duplicate slug in the same team is rejected.
    async fn create(&self, scope: &TeamScope, req: &CreateDocumentTagRequest)
        -> Result<DocumentTag>;

    /// Link a tag to a document. Re-linking is a no-op.
    async fn assign(&self, scope: &TeamScope, req: DocumentTagAssignmentRequest) -> Result<()>;

    /// Remove a link. Removing a missing link is a no-op.
    async fn unassign(&self, scope: &TeamScope, req: DocumentTagAssignmentRequest) -> Result<()>;
}

// =============================================================================
// TEAMS, USERS, SESSIONS
// =============================================================================

/// Repository for teams and memberships.
#[async_trait]
pub trait TeamRepository: Send + Sync {
    /// Create a team with `owner` as its first member.
    ///
    /// Does not change the owner's active team.
    async fn create(&self, owner: Uuid, req: &CreateTeamRequest) -> Result<Team>;

    async fn get(&self, id: Uuid) -> Result<Team>;

    async fn is_member(&self, team_id: Uuid, user_id: Uuid) -> Result<bool>;
}

/// Repository for application users.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn insert(&self, user: NewUser) -> Result<User>;

    async fn get(&self, id: Uuid) -> Result<User>;

    /// Apply a partial update. Switching to a team the user is not a member
    /// of is `Error::Forbidden` and leaves the user unchanged.
    async fn update(&self, id: Uuid, req: &UpdateUserRequest) -> Result<User>;
}

/// Resolves bearer tokens to sessions.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Issue a new opaque token for `user_id`.
    async fn create(&self, user_id: Uuid) -> Result<String>;

    /// Resolve a token. The active team is read at resolve time, so a team
    /// switch is visible on the next request.
    async fn resolve(&self, token: &str) -> Result<Option<Session>>;
}

// =============================================================================
// JOBS
// =============================================================================

/// Durable queue the background runner drains.
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Enqueue every payload under one batch, atomically.
    ///
    /// Returns one run id per payload, in input order.
    async fn enqueue_batch(
        &self,
        batch_id: Uuid,
        task_id: &str,
        team_id: Uuid,
        payloads: Vec<JsonValue>,
    ) -> Result<Vec<Uuid>>;

    /// Every run enqueued under `batch_id`, in submission order.
    async fn list_batch(&self, batch_id: Uuid) -> Result<Vec<Job>>;
}
