//! Settled Steam top-up records

use sqlx::PgPool;
use chrono::Utc;
use crate::utils::errors::WayfisError;

#[derive(Clone)]
#[derive(Debug)]
pub struct SteamTopUpRepository {
    pool: PgPool,
}

impl SteamTopUpRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record a settled payment; `false` when it was recorded before
    pub async fn record(&self, payment_id: &str, user_id: i64, amount: i64) -> Result<bool, WayfisError> {
        let result = sqlx::query(
            r#"
            INSERT INTO steam_topups (payment_id, user_id, amount, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (payment_id) DO NOTHING
            "#
        )
        .bind(payment_id)
        .bind(user_id)
        .bind(amount)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn count_for_payment(&self, payment_id: &str) -> Result<i64, WayfisError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM steam_topups WHERE payment_id = $1")
            .bind(payment_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }
}
