//! Bank transaction repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres, Row};
use tracing::instrument;
use uuid::Uuid;

use inbox_core::{
    new_v7, BankTransaction, Error, NewTransaction, Result, TeamScope, TransactionRepository,
};

/// PostgreSQL implementation of TransactionRepository.
pub struct PgTransactionRepository {
    pool: Pool<Postgres>,
}

impl PgTransactionRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionRepository for PgTransactionRepository {
    #[instrument(skip(self, tx), fields(subsystem = "database", component = "transactions", op = "insert", team_id = %scope.team_id))]
    async fn insert(&self, scope: &TeamScope, tx: NewTransaction) -> Result<BankTransaction> {
        let row = sqlx::query(
            r#"
            INSERT INTO bank_transaction (id, team_id, name, amount, currency, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, team_id, name, amount, currency, created_at
            "#,
        )
        .bind(new_v7())
        .bind(scope.team_id)
        .bind(&tx.name)
        .bind(tx.amount)
        .bind(&tx.currency)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(BankTransaction {
            id: row.get("id"),
            team_id: row.get("team_id"),
            name: row.get("name"),
            amount: row.get("amount"),
            currency: row.get("currency"),
            created_at: row.get("created_at"),
        })
    }

    async fn exists(&self, scope: &TeamScope, id: Uuid) -> Result<bool> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM bank_transaction WHERE id = $1 AND team_id = $2)",
        )
        .bind(id)
        .bind(scope.team_id)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)
    }
}
