//! Team repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres, Row};
use tracing::{info, instrument};
use uuid::Uuid;

use inbox_core::{new_v7, CreateTeamRequest, Error, Result, Team, TeamRepository, TeamRole};

/// PostgreSQL implementation of TeamRepository.
pub struct PgTeamRepository {
    pool: Pool<Postgres>,
}

impl PgTeamRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    fn parse_row(row: &sqlx::postgres::PgRow) -> Team {
        Team {
            id: row.get("id"),
            name: row.get("name"),
            base_currency: row.get("base_currency"),
            created_at: row.get("created_at"),
        }
    }
}

#[async_trait]
impl TeamRepository for PgTeamRepository {
    #[instrument(skip(self, req), fields(subsystem = "database", component = "teams", op = "create", user_id = %owner))]
    async fn create(&self, owner: Uuid, req: &CreateTeamRequest) -> Result<Team> {
        req.validate()?;
        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let row = sqlx::query(
            r#"
            INSERT INTO team (id, name, base_currency, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, base_currency, created_at
            "#,
        )
        .bind(new_v7())
        .bind(req.name.trim())
        .bind(&req.base_currency)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(Error::Database)?;
        let team = Self::parse_row(&row);

        sqlx::query(
            "INSERT INTO team_member (team_id, user_id, role, created_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(team.id)
        .bind(owner)
        .bind(TeamRole::Owner.as_str())
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(Error::Database)?;

        tx.commit().await.map_err(Error::Database)?;
        info!(team_id = %team.id, "Team created");
        Ok(team)
    }

    async fn get(&self, id: Uuid) -> Result<Team> {
        let row = sqlx::query("SELECT id, name, base_currency, created_at FROM team WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?
            .ok_or_else(|| Error::NotFound(format!("Team {}", id)))?;
        Ok(Self::parse_row(&row))
    }

    async fn is_member(&self, team_id: Uuid, user_id: Uuid) -> Result<bool> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM team_member WHERE team_id = $1 AND user_id = $2)",
        )
        .bind(team_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)
    }
}
