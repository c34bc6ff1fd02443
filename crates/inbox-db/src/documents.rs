//! Document repository implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres, QueryBuilder, Row};
use tracing::{debug, instrument};
use uuid::Uuid;

use inbox_core::{
    new_v7, Document, DocumentFilter, DocumentRepository, DocumentTagAssignment, Error,
    NewDocument, Page, Result, TeamScope,
};

use crate::document_tags::parse_tag_row;
use crate::escape_like;

/// PostgreSQL implementation of DocumentRepository.
pub struct PgDocumentRepository {
    pool: Pool<Postgres>,
}

impl PgDocumentRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    fn parse_row(row: &sqlx::postgres::PgRow) -> Document {
        Document {
            id: row.get("id"),
            team_id: row.get("team_id"),
            name: row.get("name"),
            title: row.get("title"),
            created_at: row.get("created_at"),
            document_tag_assignments: Vec::new(),
        }
    }

    /// Load tag assignments for every document in one query.
    async fn attach_assignments(&self, scope: &TeamScope, docs: &mut [Document]) -> Result<()> {
        if docs.is_empty() {
            return Ok(());
        }
        let ids: Vec<Uuid> = docs.iter().map(|d| d.id).collect();
        let rows = sqlx::query(
            r#"
            SELECT a.document_id, t.id, t.team_id, t.name, t.slug, t.created_at
            FROM document_tag_assignment a
            JOIN document_tag t ON t.id = a.tag_id
            WHERE a.document_id = ANY($1) AND a.team_id = $2
            ORDER BY t.name, t.id
            "#,
        )
        .bind(&ids)
        .bind(scope.team_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        let mut by_doc: HashMap<Uuid, Vec<DocumentTagAssignment>> = HashMap::new();
        for row in &rows {
            by_doc
                .entry(row.get("document_id"))
                .or_default()
                .push(DocumentTagAssignment {
                    document_tag: parse_tag_row(row),
                });
        }
        for doc in docs.iter_mut() {
            doc.document_tag_assignments = by_doc.remove(&doc.id).unwrap_or_default();
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentRepository for PgDocumentRepository {
    async fn insert(&self, scope: &TeamScope, doc: NewDocument) -> Result<Document> {
        let row = sqlx::query(
            r#"
            INSERT INTO document (id, team_id, name, title, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, team_id, name, title, created_at
            "#,
        )
        .bind(new_v7())
        .bind(scope.team_id)
        .bind(&doc.name)
        .bind(&doc.title)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(Self::parse_row(&row))
    }

    #[instrument(skip(self, filter), fields(subsystem = "database", component = "documents", op = "list", team_id = %scope.team_id))]
    async fn list(&self, scope: &TeamScope, filter: &DocumentFilter) -> Result<Page<Document>> {
        let (offset, limit) = filter.window()?;
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT id, team_id, name, title, created_at FROM document WHERE team_id = ",
        );
        qb.push_bind(scope.team_id);
        if let Some(text) = filter.query_text() {
            let pattern = format!("%{}%", escape_like(text));
            qb.push(" AND (name ILIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" OR title ILIKE ");
            qb.push_bind(pattern);
            qb.push(")");
        }
        qb.push(" ORDER BY created_at DESC, id DESC LIMIT ");
        qb.push_bind(limit + 1);
        qb.push(" OFFSET ");
        qb.push_bind(offset);

        let rows = qb
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;
        let docs: Vec<Document> = rows.iter().map(Self::parse_row).collect();
        debug!(result_count = docs.len(), "Document page fetched");

        let mut page = Page::from_overfetch(docs, offset, limit);
        self.attach_assignments(scope, &mut page.data).await?;
        Ok(page)
    }

    async fn get(&self, scope: &TeamScope, id: Uuid) -> Result<Document> {
        let row = sqlx::query(
            "SELECT id, team_id, name, title, created_at FROM document \
             WHERE id = $1 AND team_id = $2",
        )
        .bind(id)
        .bind(scope.team_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?
        .ok_or_else(|| Error::NotFound(format!("Document {}", id)))?;

        let mut doc = Self::parse_row(&row);
        self.attach_assignments(scope, std::slice::from_mut(&mut doc))
            .await?;
        Ok(doc)
    }
}
