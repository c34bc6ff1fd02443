//! Document tag repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres, Row};
use tracing::{info, instrument};

use inbox_core::{
    new_v7, slugify, CreateDocumentTagRequest, DocumentTag, DocumentTagAssignmentRequest,
    DocumentTagRepository, Error, Result, TeamScope,
};

/// PostgreSQL implementation of DocumentTagRepository.
pub struct PgDocumentTagRepository {
    pool: Pool<Postgres>,
}

impl PgDocumentTagRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Both ends of an assignment must live in the caller's team.
    async fn check_link_scope(
        &self,
        scope: &TeamScope,
        req: &DocumentTagAssignmentRequest,
    ) -> Result<()> {
        let (document_ok, tag_ok): (bool, bool) = sqlx::query_as(
            r#"
            SELECT
                EXISTS(SELECT 1 FROM document WHERE id = $1 AND team_id = $3),
                EXISTS(SELECT 1 FROM document_tag WHERE id = $2 AND team_id = $3)
            "#,
        )
        .bind(req.document_id)
        .bind(req.tag_id)
        .bind(scope.team_id)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        if !document_ok {
            return Err(Error::NotFound(format!("Document {}", req.document_id)));
        }
        if !tag_ok {
            return Err(Error::NotFound(format!("Document tag {}", req.tag_id)));
        }
        Ok(())
    }
}

/// Parse a `document_tag` row.
pub(crate) fn parse_tag_row(row: &sqlx::postgres::PgRow) -> DocumentTag {
    DocumentTag {
        id: row.get("id"),
        team_id: row.get("team_id"),
        name: row.get("name"),
        slug: row.get("slug"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl DocumentTagRepository for PgDocumentTagRepository {
    async fn list(&self, scope: &TeamScope) -> Result<Vec<DocumentTag>> {
        let rows = sqlx::query(
            "SELECT id, team_id, name, slug, created_at FROM document_tag \
             WHERE team_id = $1 ORDER BY name, id",
        )
        .bind(scope.team_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(parse_tag_row).collect())
    }

    #[instrument(skip(self, req), fields(subsystem = "database", component = "document_tags", op = "create", team_id = %scope.team_id))]
    async fn create(
        &self,
        scope: &TeamScope,
        req: &CreateDocumentTagRequest,
    ) -> Result<DocumentTag> {
        req.validate()?;
        let name = req.name.trim();
        let row = sqlx::query(
            r#"
            INSERT INTO document_tag (id, team_id, name, slug, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, team_id, name, slug, created_at
            "#,
        )
        .bind(new_v7())
        .bind(scope.team_id)
        .bind(name)
        .bind(slugify(name))
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        let tag = parse_tag_row(&row);
        info!(tag_id = %tag.id, slug = %tag.slug, "Document tag created");
        Ok(tag)
    }

    #[instrument(skip(self), fields(subsystem = "database", component = "document_tags", op = "assign", team_id = %scope.team_id))]
    async fn assign(&self, scope: &TeamScope, req: DocumentTagAssignmentRequest) -> Result<()> {
        self.check_link_scope(scope, &req).await?;
        sqlx::query(
            r#"
            INSERT INTO document_tag_assignment (document_id, tag_id, team_id, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(req.document_id)
        .bind(req.tag_id)
        .bind(scope.team_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(())
    }

    #[instrument(skip(self), fields(subsystem = "database", component = "document_tags", op = "unassign", team_id = %scope.team_id))]
    async fn unassign(
        &self,
        scope: &TeamScope,
        req: DocumentTagAssignmentRequest,
    ) -> Result<()> {
        self.check_link_scope(scope, &req).await?;
        sqlx::query(
            "DELETE FROM document_tag_assignment \
             WHERE document_id = $1 AND tag_id = $2 AND team_id = $3",
        )
        .bind(req.document_id)
        .bind(req.tag_id)
        .bind(scope.team_id)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(())
    }
}
