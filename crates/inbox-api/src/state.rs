//! Shared application state.

use std::sync::Arc;

use inbox_core::{
    DocumentRepository, DocumentTagRepository, InboxRepository, JobRepository, SessionRepository,
    TeamRepository, UserRepository,
};
use inbox_db::Database;
use inbox_jobs::TaskClient;

/// Repositories and the task client, shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub inbox: Arc<dyn InboxRepository>,
    pub documents: Arc<dyn DocumentRepository>,
    pub document_tags: Arc<dyn DocumentTagRepository>,
    pub teams: Arc<dyn TeamRepository>,
    pub users: Arc<dyn UserRepository>,
    pub sessions: Arc<dyn SessionRepository>,
    pub tasks: TaskClient,
}

impl AppState {
    /// State backed by PostgreSQL.
    pub fn from_database(db: &Database) -> Self {
        Self {
            inbox: db.inbox.clone(),
            documents: db.documents.clone(),
            document_tags: db.document_tags.clone(),
            teams: db.teams.clone(),
            users: db.users.clone(),
            sessions: db.sessions.clone(),
            tasks: TaskClient::new(db.jobs.clone()),
        }
    }

    /// State backed by a single store implementing every repository.
    pub fn with_store<S>(store: S) -> Self
    where
        S: InboxRepository
            + DocumentRepository
            + DocumentTagRepository
            + TeamRepository
            + UserRepository
            + SessionRepository
            + JobRepository
            + 'static,
    {
        let store = Arc::new(store);
        Self {
            inbox: store.clone(),
            documents: store.clone(),
            document_tags: store.clone(),
            teams: store.clone(),
            users: store.clone(),
            sessions: store.clone(),
            tasks: TaskClient::new(store),
        }
    }
}
