//! Inbox repository implementation.

use std::time::Instant;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres, QueryBuilder, Row};
use tracing::{debug, info, instrument, Span};
use uuid::Uuid;

use inbox_core::{
    logging, new_v7, Error, InboxFilter, InboxItem, InboxRepository, InboxStatus, NewInboxItem, Page,
    Result, TeamScope, UpdateInboxRequest,
};

use crate::escape_like;

const INBOX_COLUMNS: &str = "id, team_id, display_name, file_name, file_path, content_type, \
     size, amount, currency, website, sender_email, description, status, transaction_id, \
     created_at";

/// PostgreSQL implementation of InboxRepository.
pub struct PgInboxRepository {
    pool: Pool<Postgres>,
}

impl PgInboxRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    fn parse_row(row: sqlx::postgres::PgRow) -> Result<InboxItem> {
        let status: String = row.get("status");
        Ok(InboxItem {
            id: row.get("id"),
            team_id: row.get("team_id"),
            display_name: row.get("display_name"),
            file_name: row.get("file_name"),
            file_path: row.get("file_path"),
            content_type: row.get("content_type"),
            size: row.get("size"),
            amount: row.get("amount"),
            currency: row.get("currency"),
            website: row.get("website"),
            sender_email: row.get("sender_email"),
            description: row.get("description"),
            status: status.parse()?,
            transaction_id: row.get("transaction_id"),
            created_at: row.get("created_at"),
        })
    }

    /// Append the shared free-text predicate over the searchable columns.
    fn push_text_match(qb: &mut QueryBuilder<'_, Postgres>, text: &str) {
        let pattern = format!("%{}%", escape_like(text));
        qb.push(" AND (");
        let columns = [
            "display_name",
            "file_name",
            "description",
            "website",
            "sender_email",
            "currency",
            "amount::text",
        ];
        for (i, column) in columns.iter().enumerate() {
            if i > 0 {
                qb.push(" OR ");
            }
            qb.push(format!("{} ILIKE ", column));
            qb.push_bind(pattern.clone());
        }
        qb.push(")");
    }

    async fn transaction_exists(&self, scope: &TeamScope, transaction_id: Uuid) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM bank_transaction WHERE id = $1 AND team_id = $2)",
        )
        .bind(transaction_id)
        .bind(scope.team_id)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(exists)
    }
}

#[async_trait]
impl InboxRepository for PgInboxRepository {
    #[instrument(skip(self, item), fields(subsystem = "database", component = "inbox", op = "insert", team_id = %scope.team_id))]
    async fn insert(&self, scope: &TeamScope, item: NewInboxItem) -> Result<InboxItem> {
        let id = new_v7();
        let status = item.status.unwrap_or_default();
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO inbox (id, team_id, display_name, file_name, file_path, content_type,
                               size, amount, currency, website, sender_email, description,
                               status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING {INBOX_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(scope.team_id)
        .bind(item.display_name)
        .bind(item.file_name)
        .bind(item.file_path)
        .bind(item.content_type)
        .bind(item.size)
        .bind(item.amount)
        .bind(item.currency)
        .bind(item.website)
        .bind(item.sender_email)
        .bind(item.description)
        .bind(status.as_str())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Self::parse_row(row)
    }

    #[instrument(skip(self, filter), fields(subsystem = "database", component = "inbox", op = "list", team_id = %scope.team_id, result_count = tracing::field::Empty))]
    async fn list(&self, scope: &TeamScope, filter: &InboxFilter) -> Result<Page<InboxItem>> {
        let start = Instant::now();
        let (offset, limit) = filter.window()?;

        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {INBOX_COLUMNS} FROM inbox WHERE team_id = "
        ));
        qb.push_bind(scope.team_id);
        match filter.status {
            Some(status) => {
                qb.push(" AND status = ");
                qb.push_bind(status.as_str());
            }
            None => {
                qb.push(" AND status <> 'deleted'");
            }
        }
        if let Some(text) = filter.query_text() {
            Self::push_text_match(&mut qb, text);
        }
        let order = filter.order.unwrap_or_default().as_sql();
        qb.push(format!(" ORDER BY created_at {order}, id {order} LIMIT "));
        qb.push_bind(limit + 1);
        qb.push(" OFFSET ");
        qb.push_bind(offset);

        let rows = qb
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;
        let items = rows
            .into_iter()
            .map(Self::parse_row)
            .collect::<Result<Vec<_>>>()?;

        Span::current().record(logging::RESULT_COUNT, items.len() as u64);
        debug!(
            duration_ms = start.elapsed().as_millis() as u64,
            "Inbox page fetched"
        );
        Ok(Page::from_overfetch(items, offset, limit))
    }

    #[instrument(skip(self), fields(subsystem = "database", component = "inbox", op = "get", team_id = %scope.team_id))]
    async fn get(&self, scope: &TeamScope, id: Uuid) -> Result<InboxItem> {
        let row = sqlx::query(&format!(
            "SELECT {INBOX_COLUMNS} FROM inbox \
             WHERE id = $1 AND team_id = $2 AND status <> 'deleted'"
        ))
        .bind(id)
        .bind(scope.team_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?
        .ok_or(Error::InboxNotFound(id))?;

        Self::parse_row(row)
    }

    #[instrument(skip(self, query), fields(subsystem = "database", component = "inbox", op = "search", team_id = %scope.team_id, result_count = tracing::field::Empty))]
    async fn search(
        &self,
        scope: &TeamScope,
        query: &str,
        limit: i64,
    ) -> Result<Vec<InboxItem>> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {INBOX_COLUMNS} FROM inbox WHERE team_id = "
        ));
        qb.push_bind(scope.team_id);
        qb.push(" AND status <> 'deleted'");
        let text = query.trim();
        if !text.is_empty() {
            Self::push_text_match(&mut qb, text);
        }
        qb.push(" ORDER BY created_at DESC, id DESC LIMIT ");
        qb.push_bind(limit);

        let rows = qb
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;
        let items = rows
            .into_iter()
            .map(Self::parse_row)
            .collect::<Result<Vec<_>>>()?;
        Span::current().record(logging::RESULT_COUNT, items.len() as u64);
        debug!("Inbox search complete");
        Ok(items)
    }

    #[instrument(skip(self, req), fields(subsystem = "database", component = "inbox", op = "update", team_id = %scope.team_id))]
    async fn update(
        &self,
        scope: &TeamScope,
        id: Uuid,
        req: &UpdateInboxRequest,
    ) -> Result<InboxItem> {
        req.validate()?;
        let row = sqlx::query(&format!(
            r#"
            UPDATE inbox
            SET status = COALESCE($3, status),
                display_name = COALESCE($4, display_name)
            WHERE id = $1 AND team_id = $2 AND status <> 'deleted'
            RETURNING {INBOX_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(scope.team_id)
        .bind(req.status.map(|s| s.as_str()))
        .bind(req.display_name.as_deref())
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?
        .ok_or(Error::InboxNotFound(id))?;

        info!(inbox_id = %id, "Inbox item updated");
        Self::parse_row(row)
    }

    #[instrument(skip(self), fields(subsystem = "database", component = "inbox", op = "delete", team_id = %scope.team_id))]
    async fn delete(&self, scope: &TeamScope, id: Uuid) -> Result<InboxItem> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE inbox
            SET status = $3, transaction_id = NULL
            WHERE id = $1 AND team_id = $2 AND status <> 'deleted'
            RETURNING {INBOX_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(scope.team_id)
        .bind(InboxStatus::Deleted.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?
        .ok_or(Error::InboxNotFound(id))?;

        info!(inbox_id = %id, "Inbox item deleted");
        Self::parse_row(row)
    }

    #[instrument(skip(self), fields(subsystem = "database", component = "inbox", op = "match_transaction", team_id = %scope.team_id))]
    async fn match_transaction(
        &self,
        scope: &TeamScope,
        id: Uuid,
        transaction_id: Uuid,
    ) -> Result<InboxItem> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE inbox
            SET transaction_id = $3
            WHERE id = $1 AND team_id = $2 AND status <> 'deleted'
              AND EXISTS (SELECT 1 FROM bank_transaction WHERE id = $3 AND team_id = $2)
            RETURNING {INBOX_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(scope.team_id)
        .bind(transaction_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        let Some(row) = row else {
            if !self.transaction_exists(scope, transaction_id).await? {
                return Err(Error::NotFound(format!("Transaction {}", transaction_id)));
            }
            return Err(Error::InboxNotFound(id));
        };

        info!(inbox_id = %id, transaction_id = %transaction_id, "Inbox item matched");
        Self::parse_row(row)
    }

    #[instrument(skip(self), fields(subsystem = "database", component = "inbox", op = "unmatch_transaction", team_id = %scope.team_id))]
    async fn unmatch_transaction(&self, scope: &TeamScope, id: Uuid) -> Result<InboxItem> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE inbox
            SET transaction_id = NULL
            WHERE id = $1 AND team_id = $2 AND status <> 'deleted'
            RETURNING {INBOX_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(scope.team_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?
        .ok_or(Error::InboxNotFound(id))?;

        info!(inbox_id = %id, "Inbox item unmatched");
        Self::parse_row(row)
    }
}
