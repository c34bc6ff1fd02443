//! Bearer token sessions.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use inbox_core::{Error, Result, Session, SessionRepository};

/// Prefix on every issued token, so leaked tokens are recognisable.
pub const TOKEN_PREFIX: &str = "inbox_";

/// Generate a fresh opaque bearer token.
pub fn generate_token() -> String {
    format!("{}{}", TOKEN_PREFIX, Uuid::new_v4().simple())
}

/// PostgreSQL implementation of SessionRepository.
pub struct PgSessionRepository {
    pool: Pool<Postgres>,
}

impl PgSessionRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for PgSessionRepository {
    async fn create(&self, user_id: Uuid) -> Result<String> {
        let token = generate_token();
        sqlx::query("INSERT INTO api_session (token, user_id, created_at) VALUES ($1, $2, $3)")
            .bind(&token)
            .bind(user_id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(token)
    }

    async fn resolve(&self, token: &str) -> Result<Option<Session>> {
        let row = sqlx::query(
            r#"
            SELECT s.user_id, u.team_id
            FROM api_session s
            JOIN app_user u ON u.id = s.user_id
            WHERE s.token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(|row| Session {
            user_id: row.get("user_id"),
            team_id: row.get("team_id"),
        }))
    }
}
