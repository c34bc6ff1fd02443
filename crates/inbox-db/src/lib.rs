//! # inbox-db
//!
//! PostgreSQL database layer for the inbox matching service.
//!
//! This crate provides:
//! - Connection pool management
//! - Team-scoped repository implementations for every core entity
//! - The job queue backing background task dispatch
//! - An in-memory store with the same semantics (feature `memory`)
//!
//! ## Example
//!
//! ```rust,ignore
//! use inbox_db::{Database, InboxRepository, InboxFilter};
//!
//! let db = Database::connect("postgres://localhost/inbox").await?;
//! let page = db.inbox.list(&scope, &InboxFilter::default()).await?;
//! ```

use std::sync::Arc;

pub mod document_tags;
pub mod documents;
pub mod inbox;
pub mod jobs;
#[cfg(feature = "memory")]
pub mod memory;
pub mod pool;
pub mod sessions;
pub mod teams;
pub mod transactions;
pub mod users;

// Re-export core types
pub use inbox_core::*;

pub use document_tags::PgDocumentTagRepository;
pub use documents::PgDocumentRepository;
pub use inbox::PgInboxRepository;
pub use jobs::PgJobRepository;
#[cfg(feature = "memory")]
pub use memory::MemoryStore;
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};
pub use sessions::PgSessionRepository;
pub use teams::PgTeamRepository;
pub use transactions::PgTransactionRepository;
pub use users::PgUserRepository;

/// Escape LIKE/ILIKE wildcard characters (`%`, `_`, `\`) in user input.
pub fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Combined database context with all repositories.
#[derive(Clone)]
pub struct Database {
    pub pool: sqlx::Pool<sqlx::Postgres>,
    pub inbox: Arc<PgInboxRepository>,
    pub transactions: Arc<PgTransactionRepository>,
    pub documents: Arc<PgDocumentRepository>,
    pub document_tags: Arc<PgDocumentTagRepository>,
    pub teams: Arc<PgTeamRepository>,
    pub users: Arc<PgUserRepository>,
    pub sessions: Arc<PgSessionRepository>,
    pub jobs: Arc<PgJobRepository>,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            inbox: Arc::new(PgInboxRepository::new(pool.clone())),
            transactions: Arc::new(PgTransactionRepository::new(pool.clone())),
            documents: Arc::new(PgDocumentRepository::new(pool.clone())),
            document_tags: Arc::new(PgDocumentTagRepository::new(pool.clone())),
            teams: Arc::new(PgTeamRepository::new(pool.clone())),
            users: Arc::new(PgUserRepository::new(pool.clone())),
            sessions: Arc::new(PgSessionRepository::new(pool.clone())),
            jobs: Arc::new(PgJobRepository::new(pool.clone())),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }
}
