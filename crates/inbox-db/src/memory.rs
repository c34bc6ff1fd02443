//! In-process store implementing every repository trait.
//!
//! Tenancy rules match the PostgreSQL repositories: every team-owned lookup
//! filters by `scope.team_id`, deleted inbox items are invisible, and
//! assignments are keyed by `(document_id, tag_id)`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let store = MemoryStore::new();
//! let (user, token) = store.seed_user("ada@example.com").await?;
//! ```

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use inbox_core::*;

use crate::sessions::generate_token;

#[derive(Default)]
struct State {
    teams: HashMap<Uuid, Team>,
    members: HashMap<(Uuid, Uuid), TeamRole>,
    users: HashMap<Uuid, User>,
    sessions: HashMap<String, Uuid>,
    transactions: HashMap<Uuid, BankTransaction>,
    inbox: Vec<InboxItem>,
    documents: Vec<Document>,
    tags: Vec<DocumentTag>,
    assignments: BTreeSet<(Uuid, Uuid)>,
    jobs: Vec<Job>,
    fail_enqueue: Option<String>,
}

/// Shared in-memory store. Clones share state.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| Error::Internal("memory store lock poisoned".to_string()))
    }

    /// Make every subsequent `enqueue_batch` fail with `message`.
    pub fn fail_enqueue(&self, message: impl Into<String>) -> Result<()> {
        self.state()?.fail_enqueue = Some(message.into());
        Ok(())
    }

    /// Every job in the queue, in submission order.
    pub fn queued_jobs(&self) -> Result<Vec<Job>> {
        Ok(self.state()?.jobs.clone())
    }

    /// Create a user with a session token.
    pub async fn seed_user(&self, email: &str) -> Result<(User, String)> {
        let user = UserRepository::insert(
            self,
            NewUser {
                email: email.to_string(),
                full_name: None,
            },
        )
        .await?;
        let token = SessionRepository::create(self, user.id).await?;
        Ok((user, token))
    }

    /// Create a team owned by `user` and make it the user's active team.
    pub async fn seed_team(&self, user: &User, name: &str) -> Result<TeamScope> {
        let team = TeamRepository::create(
            self,
            user.id,
            &CreateTeamRequest {
                name: name.to_string(),
                base_currency: defaults::DEFAULT_CURRENCY.to_string(),
            },
        )
        .await?;
        UserRepository::update(
            self,
            user.id,
            &UpdateUserRequest {
                team_id: Some(team.id),
                full_name: None,
            },
        )
        .await?;
        Ok(TeamScope::new(team.id, user.id))
    }
}

fn visible<'a>(state: &'a mut State, scope: &TeamScope, id: Uuid) -> Result<&'a mut InboxItem> {
    state
        .inbox
        .iter_mut()
        .find(|i| i.id == id && i.team_id == scope.team_id && i.status != InboxStatus::Deleted)
        .ok_or(Error::InboxNotFound(id))
}

fn text_matches(item: &InboxItem, needle: &str) -> bool {
    let needle = needle.to_lowercase();
    let amount = item.amount.map(|a| a.to_string());
    let found = [
        item.display_name.as_deref(),
        item.file_name.as_deref(),
        item.description.as_deref(),
        item.website.as_deref(),
        item.sender_email.as_deref(),
        item.currency.as_deref(),
        amount.as_deref(),
    ]
    .into_iter()
    .flatten()
    .any(|field| field.to_lowercase().contains(&needle));
    found
}

/// Order by `(created_at, id)`, like the SQL ordering.
fn sort_items<T>(
    items: &mut [T],
    order: SortOrder,
    key: impl Fn(&T) -> (chrono::DateTime<Utc>, Uuid),
) {
    items.sort_by(|a, b| {
        let ord = key(a).cmp(&key(b));
        match order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });
}

fn paginate<T>(items: Vec<T>, offset: i64, limit: i64) -> Page<T> {
    let rows: Vec<T> = items
        .into_iter()
        .skip(offset as usize)
        .take(limit as usize + 1)
        .collect();
    Page::from_overfetch(rows, offset, limit)
}

fn with_assignments(state: &State, mut doc: Document) -> Document {
    let mut tags: Vec<DocumentTag> = state
        .assignments
        .iter()
        .filter(|(document_id, _)| *document_id == doc.id)
        .filter_map(|(_, tag_id)| state.tags.iter().find(|t| t.id == *tag_id).cloned())
        .collect();
    tags.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
    doc.document_tag_assignments = tags
        .into_iter()
        .map(|document_tag| DocumentTagAssignment { document_tag })
        .collect();
    doc
}

fn check_link_scope(
    state: &State,
    scope: &TeamScope,
    req: &DocumentTagAssignmentRequest,
) -> Result<()> {
    if !state
        .documents
        .iter()
        .any(|d| d.id == req.document_id && d.team_id == scope.team_id)
    {
        return Err(Error::NotFound(format!("Document {}", req.document_id)));
    }
    if !state
        .tags
        .iter()
        .any(|t| t.id == req.tag_id && t.team_id == scope.team_id)
    {
        return Err(Error::NotFound(format!("Document tag {}", req.tag_id)));
    }
    Ok(())
}

#[async_trait]
impl InboxRepository for MemoryStore {
    async fn insert(&self, scope: &TeamScope, item: NewInboxItem) -> Result<InboxItem> {
        let row = InboxItem {
            id: new_v7(),
            team_id: scope.team_id,
            display_name: item.display_name,
            file_name: item.file_name,
            file_path: item.file_path,
            content_type: item.content_type,
            size: item.size,
            amount: item.amount,
            currency: item.currency,
            website: item.website,
            sender_email: item.sender_email,
            description: item.description,
            status: item.status.unwrap_or_default(),
            transaction_id: None,
            created_at: Utc::now(),
        };
        self.state()?.inbox.push(row.clone());
        Ok(row)
    }

    async fn list(&self, scope: &TeamScope, filter: &InboxFilter) -> Result<Page<InboxItem>> {
        let (offset, limit) = filter.window()?;
        let state = self.state()?;
        let mut items: Vec<InboxItem> = state
            .inbox
            .iter()
            .filter(|i| i.team_id == scope.team_id)
            .filter(|i| match filter.status {
                Some(status) => i.status == status,
                None => i.status != InboxStatus::Deleted,
            })
            .filter(|i| filter.query_text().map_or(true, |q| text_matches(i, q)))
            .cloned()
            .collect();
        sort_items(&mut items, filter.order.unwrap_or_default(), |i| {
            (i.created_at, i.id)
        });
        Ok(paginate(items, offset, limit))
    }

    async fn get(&self, scope: &TeamScope, id: Uuid) -> Result<InboxItem> {
        let mut state = self.state()?;
        visible(&mut state, scope, id).map(|item| item.clone())
    }

    async fn search(
        &self,
        scope: &TeamScope,
        query: &str,
        limit: i64,
    ) -> Result<Vec<InboxItem>> {
        let state = self.state()?;
        let needle = query.trim();
        let mut items: Vec<InboxItem> = state
            .inbox
            .iter()
            .filter(|i| i.team_id == scope.team_id && i.status != InboxStatus::Deleted)
            .filter(|i| needle.is_empty() || text_matches(i, needle))
            .cloned()
            .collect();
        sort_items(&mut items, SortOrder::Desc, |i| (i.created_at, i.id));
        items.truncate(limit.max(0) as usize);
        Ok(items)
    }

    async fn update(
        &self,
        scope: &TeamScope,
        id: Uuid,
        req: &UpdateInboxRequest,
    ) -> Result<InboxItem> {
        req.validate()?;
        let mut state = self.state()?;
        let item = visible(&mut state, scope, id)?;
        if let Some(status) = req.status {
            item.status = status;
        }
        if let Some(name) = &req.display_name {
            item.display_name = Some(name.clone());
        }
        Ok(item.clone())
    }

    async fn delete(&self, scope: &TeamScope, id: Uuid) -> Result<InboxItem> {
        let mut state = self.state()?;
        let item = visible(&mut state, scope, id)?;
        item.status = InboxStatus::Deleted;
        item.transaction_id = None;
        Ok(item.clone())
    }

    async fn match_transaction(
        &self,
        scope: &TeamScope,
        id: Uuid,
        transaction_id: Uuid,
    ) -> Result<InboxItem> {
        let mut state = self.state()?;
        let in_team = state
            .transactions
            .get(&transaction_id)
            .is_some_and(|t| t.team_id == scope.team_id);
        if !in_team {
            visible(&mut state, scope, id)?;
            return Err(Error::NotFound(format!("Transaction {}", transaction_id)));
        }
        let item = visible(&mut state, scope, id)?;
        item.transaction_id = Some(transaction_id);
        Ok(item.clone())
    }

    async fn unmatch_transaction(&self, scope: &TeamScope, id: Uuid) -> Result<InboxItem> {
        let mut state = self.state()?;
        let item = visible(&mut state, scope, id)?;
        item.transaction_id = None;
        Ok(item.clone())
    }
}

#[async_trait]
impl TransactionRepository for MemoryStore {
    async fn insert(&self, scope: &TeamScope, tx: NewTransaction) -> Result<BankTransaction> {
        let row = BankTransaction {
            id: new_v7(),
            team_id: scope.team_id,
            name: tx.name,
            amount: tx.amount,
            currency: tx.currency,
            created_at: Utc::now(),
        };
        self.state()?.transactions.insert(row.id, row.clone());
        Ok(row)
    }

    async fn exists(&self, scope: &TeamScope, id: Uuid) -> Result<bool> {
        Ok(self
            .state()?
            .transactions
            .get(&id)
            .is_some_and(|t| t.team_id == scope.team_id))
    }
}

#[async_trait]
impl DocumentRepository for MemoryStore {
    async fn insert(&self, scope: &TeamScope, doc: NewDocument) -> Result<Document> {
        let row = Document {
            id: new_v7(),
            team_id: scope.team_id,
            name: doc.name,
            title: doc.title,
            created_at: Utc::now(),
            document_tag_assignments: Vec::new(),
        };
        self.state()?.documents.push(row.clone());
        Ok(row)
    }

    async fn list(&self, scope: &TeamScope, filter: &DocumentFilter) -> Result<Page<Document>> {
        let (offset, limit) = filter.window()?;
        let state = self.state()?;
        let needle = filter.query_text().map(str::to_lowercase);
        let mut docs: Vec<Document> = state
            .documents
            .iter()
            .filter(|d| d.team_id == scope.team_id)
            .filter(|d| {
                needle.as_deref().map_or(true, |q| {
                    d.name.to_lowercase().contains(q)
                        || d.title.as_deref().is_some_and(|t| t.to_lowercase().contains(q))
                })
            })
            .cloned()
            .collect();
        sort_items(&mut docs, SortOrder::Desc, |d| (d.created_at, d.id));
        let mut page = paginate(docs, offset, limit);
        page.data = page
            .data
            .into_iter()
            .map(|d| with_assignments(&state, d))
            .collect();
        Ok(page)
    }

    async fn get(&self, scope: &TeamScope, id: Uuid) -> Result<Document> {
        let state = self.state()?;
        let doc = state
            .documents
            .iter()
            .find(|d| d.id == id && d.team_id == scope.team_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Document {}", id)))?;
        Ok(with_assignments(&state, doc))
    }
}

#[async_trait]
impl DocumentTagRepository for MemoryStore {
    async fn list(&self, scope: &TeamScope) -> Result<Vec<DocumentTag>> {
        let mut tags: Vec<DocumentTag> = self
            .state()?
            .tags
            .iter()
            .filter(|t| t.team_id == scope.team_id)
            .cloned()
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(tags)
    }

    async fn create(
        &self,
        scope: &TeamScope,
        req: &CreateDocumentTagRequest,
    ) -> Result<DocumentTag> {
        req.validate()?;
        let name = req.name.trim();
        let slug = slugify(name);
        let mut state = self.state()?;
        if state
            .tags
            .iter()
            .any(|t| t.team_id == scope.team_id && t.slug == slug)
        {
            return Err(Error::Conflict(format!("Tag '{}' already exists", slug)));
        }
        let tag = DocumentTag {
            id: new_v7(),
            team_id: scope.team_id,
            name: name.to_string(),
            slug,
            created_at: Utc::now(),
        };
        state.tags.push(tag.clone());
        Ok(tag)
    }

    async fn assign(&self, scope: &TeamScope, req: DocumentTagAssignmentRequest) -> Result<()> {
        let mut state = self.state()?;
        check_link_scope(&state, scope, &req)?;
        state.assignments.insert((req.document_id, req.tag_id));
        Ok(())
    }

    async fn unassign(
        &self,
        scope: &TeamScope,
        req: DocumentTagAssignmentRequest,
    ) -> Result<()> {
        let mut state = self.state()?;
        check_link_scope(&state, scope, &req)?;
        state.assignments.remove(&(req.document_id, req.tag_id));
        Ok(())
    }
}

#[async_trait]
impl TeamRepository for MemoryStore {
    async fn create(&self, owner: Uuid, req: &CreateTeamRequest) -> Result<Team> {
        req.validate()?;
        let mut state = self.state()?;
        if !state.users.contains_key(&owner) {
            return Err(Error::NotFound(format!("User {}", owner)));
        }
        let team = Team {
            id: new_v7(),
            name: req.name.trim().to_string(),
            base_currency: req.base_currency.clone(),
            created_at: Utc::now(),
        };
        state.teams.insert(team.id, team.clone());
        state.members.insert((team.id, owner), TeamRole::Owner);
        Ok(team)
    }

    async fn get(&self, id: Uuid) -> Result<Team> {
        self.state()?
            .teams
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Team {}", id)))
    }

    async fn is_member(&self, team_id: Uuid, user_id: Uuid) -> Result<bool> {
        Ok(self.state()?.members.contains_key(&(team_id, user_id)))
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert(&self, user: NewUser) -> Result<User> {
        let mut state = self.state()?;
        if state.users.values().any(|u| u.email == user.email) {
            return Err(Error::Conflict(format!(
                "Email '{}' already registered",
                user.email
            )));
        }
        let row = User {
            id: new_v7(),
            email: user.email,
            full_name: user.full_name,
            team_id: None,
        };
        state.users.insert(row.id, row.clone());
        Ok(row)
    }

    async fn get(&self, id: Uuid) -> Result<User> {
        self.state()?
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("User {}", id)))
    }

    async fn update(&self, id: Uuid, req: &UpdateUserRequest) -> Result<User> {
        req.validate()?;
        let mut state = self.state()?;
        if let Some(team_id) = req.team_id {
            if !state.members.contains_key(&(team_id, id)) {
                return Err(Error::Forbidden("Not a member of this team".to_string()));
            }
        }
        let user = state
            .users
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound(format!("User {}", id)))?;
        if let Some(team_id) = req.team_id {
            user.team_id = Some(team_id);
        }
        if let Some(name) = &req.full_name {
            user.full_name = Some(name.clone());
        }
        Ok(user.clone())
    }
}

#[async_trait]
impl SessionRepository for MemoryStore {
    async fn create(&self, user_id: Uuid) -> Result<String> {
        let token = generate_token();
        self.state()?.sessions.insert(token.clone(), user_id);
        Ok(token)
    }

    async fn resolve(&self, token: &str) -> Result<Option<Session>> {
        let state = self.state()?;
        Ok(state
            .sessions
            .get(token)
            .and_then(|user_id| state.users.get(user_id))
            .map(|user| Session {
                user_id: user.id,
                team_id: user.team_id,
            }))
    }
}

#[async_trait]
impl JobRepository for MemoryStore {
    async fn enqueue_batch(
        &self,
        batch_id: Uuid,
        task_id: &str,
        team_id: Uuid,
        payloads: Vec<JsonValue>,
    ) -> Result<Vec<Uuid>> {
        let mut state = self.state()?;
        if let Some(message) = &state.fail_enqueue {
            return Err(Error::Job(message.clone()));
        }
        let now = Utc::now();
        let jobs: Vec<Job> = payloads
            .into_iter()
            .map(|payload| Job {
                id: new_v7(),
                batch_id,
                task_id: task_id.to_string(),
                team_id,
                status: JobStatus::Pending,
                payload,
                created_at: now,
            })
            .collect();
        let ids = jobs.iter().map(|j| j.id).collect();
        state.jobs.extend(jobs);
        Ok(ids)
    }

    async fn list_batch(&self, batch_id: Uuid) -> Result<Vec<Job>> {
        Ok(self
            .state()?
            .jobs
            .iter()
            .filter(|j| j.batch_id == batch_id)
            .cloned()
            .collect())
    }
}
