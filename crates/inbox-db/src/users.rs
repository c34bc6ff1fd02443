//! User repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres, Row};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use inbox_core::{new_v7, Error, NewUser, Result, UpdateUserRequest, User, UserRepository};

/// PostgreSQL implementation of UserRepository.
pub struct PgUserRepository {
    pool: Pool<Postgres>,
}

impl PgUserRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    fn parse_row(row: &sqlx::postgres::PgRow) -> User {
        User {
            id: row.get("id"),
            email: row.get("email"),
            full_name: row.get("full_name"),
            team_id: row.get("team_id"),
        }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn insert(&self, user: NewUser) -> Result<User> {
        let row = sqlx::query(
            r#"
            INSERT INTO app_user (id, email, full_name, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, full_name, team_id
            "#,
        )
        .bind(new_v7())
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(Self::parse_row(&row))
    }

    async fn get(&self, id: Uuid) -> Result<User> {
        let row = sqlx::query("SELECT id, email, full_name, team_id FROM app_user WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?
            .ok_or_else(|| Error::NotFound(format!("User {}", id)))?;
        Ok(Self::parse_row(&row))
    }

    #[instrument(skip(self, req), fields(subsystem = "database", component = "users", op = "update", user_id = %id))]
    async fn update(&self, id: Uuid, req: &UpdateUserRequest) -> Result<User> {
        req.validate()?;
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        if let Some(team_id) = req.team_id {
            let member: bool = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM team_member WHERE team_id = $1 AND user_id = $2)",
            )
            .bind(team_id)
            .bind(id)
            .fetch_one(&mut *tx)
            .await
            .map_err(Error::Database)?;
            if !member {
                warn!(team_id = %team_id, "Team switch rejected: not a member");
                return Err(Error::Forbidden("Not a member of this team".to_string()));
            }
        }

        let row = sqlx::query(
            r#"
            UPDATE app_user
            SET team_id = COALESCE($2, team_id),
                full_name = COALESCE($3, full_name)
            WHERE id = $1
            RETURNING id, email, full_name, team_id
            "#,
        )
        .bind(id)
        .bind(req.team_id)
        .bind(req.full_name.as_deref())
        .fetch_optional(&mut *tx)
        .await
        .map_err(Error::Database)?
        .ok_or_else(|| Error::NotFound(format!("User {}", id)))?;

        tx.commit().await.map_err(Error::Database)?;
        let user = Self::parse_row(&row);
        if req.team_id.is_some() {
            info!(team_id = ?user.team_id, "Active team switched");
        }
        Ok(user)
    }
}
