//! Job queue repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value as JsonValue;
use sqlx::{Pool, Postgres, Row};
use tracing::{debug, instrument};
use uuid::Uuid;

use inbox_core::{new_v7, Error, Job, JobRepository, JobStatus, Result};

/// PostgreSQL implementation of JobRepository.
pub struct PgJobRepository {
    pool: Pool<Postgres>,
}

impl PgJobRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    fn parse_job_row(row: &sqlx::postgres::PgRow) -> Job {
        Job {
            id: row.get("id"),
            batch_id: row.get("batch_id"),
            task_id: row.get("task_id"),
            team_id: row.get("team_id"),
            status: JobStatus::parse(row.get("status")),
            payload: row.get("payload"),
            created_at: row.get("created_at"),
        }
    }
}

#[async_trait]
impl JobRepository for PgJobRepository {
    #[instrument(skip(self, payloads), fields(subsystem = "database", component = "jobs", op = "enqueue_batch", item_count = payloads.len()))]
    async fn enqueue_batch(
        &self,
        batch_id: Uuid,
        task_id: &str,
        team_id: Uuid,
        payloads: Vec<JsonValue>,
    ) -> Result<Vec<Uuid>> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        let mut ids = Vec::with_capacity(payloads.len());

        for (position, payload) in payloads.into_iter().enumerate() {
            let id = new_v7();
            sqlx::query(
                r#"
                INSERT INTO job_queue (id, batch_id, position, task_id, team_id, status, payload, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(id)
            .bind(batch_id)
            .bind(position as i32)
            .bind(task_id)
            .bind(team_id)
            .bind(JobStatus::Pending.as_str())
            .bind(payload)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;
            ids.push(id);
        }

        tx.commit().await.map_err(Error::Database)?;
        debug!(result_count = ids.len(), "Batch enqueued");
        Ok(ids)
    }

    async fn list_batch(&self, batch_id: Uuid) -> Result<Vec<Job>> {
        let rows = sqlx::query(
            r#"
            SELECT id, batch_id, task_id, team_id, status, payload, created_at
            FROM job_queue
            WHERE batch_id = $1
            ORDER BY position
            "#,
        )
        .bind(batch_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(Self::parse_job_row).collect())
    }
}
