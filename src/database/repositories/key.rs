//! License key repository implementation
//!
//! A key moves from free to used exactly once. The `*_with` variants run on a
//! caller-provided connection so settlement can reserve a key inside the same
//! transaction that marks the order paid.

use sqlx::{PgConnection, PgPool};
use chrono::Utc;
use crate::database::connection::map_unique_violation;
use crate::models::key::LicenseKey;
use crate::utils::errors::WayfisError;

#[derive(Clone)]
#[derive(Debug)]
pub struct KeyRepository {
    pool: PgPool,
}

impl KeyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Add a free key to a product's pool
    pub async fn add_key(&self, product_id: i64, value: &str) -> Result<LicenseKey, WayfisError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(WayfisError::InvalidInput("key value must not be empty".to_string()));
        }

        let result = sqlx::query_as::<_, LicenseKey>(
            r#"
            INSERT INTO keys (product_id, value, created_at)
            VALUES ($1, $2, $3)
            RETURNING id, product_id, value, used, used_at, order_id, created_at
            "#
        )
        .bind(product_id)
        .bind(value)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await;

        result.map_err(|e| {
            let missing_product = matches!(&e, sqlx::Error::Database(db) if db.is_foreign_key_violation());
            if missing_product {
                WayfisError::not_found("Product", product_id)
            } else {
                map_unique_violation(e, || WayfisError::DuplicateKey(value.to_string()))
            }
        })
    }

    /// Peek at a free key without locking it
    pub async fn find_free_key(&self, product_id: i64) -> Result<Option<LicenseKey>, WayfisError> {
        let key = sqlx::query_as::<_, LicenseKey>(
            r#"
            SELECT id, product_id, value, used, used_at, order_id, created_at
            FROM keys
            WHERE product_id = $1 AND used = FALSE
            ORDER BY id
            LIMIT 1
            "#
        )
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(key)
    }

    /// Lock one free key for the current transaction, skipping keys other
    /// transactions already hold
    pub async fn find_free_key_with(conn: &mut PgConnection, product_id: i64) -> Result<Option<LicenseKey>, WayfisError> {
        let key = sqlx::query_as::<_, LicenseKey>(
            r#"
            SELECT id, product_id, value, used, used_at, order_id, created_at
            FROM keys
            WHERE product_id = $1 AND used = FALSE
            ORDER BY id
            LIMIT 1
            FOR UPDATE SKIP LOCKED
            "#
        )
        .bind(product_id)
        .fetch_optional(conn)
        .await?;

        Ok(key)
    }

    /// Bind a free key to an order outside any wider transaction
    pub async fn reserve(&self, key_id: i64, order_id: i64) -> Result<(), WayfisError> {
        let mut conn = self.pool.acquire().await?;
        Self::reserve_with(&mut conn, key_id, order_id).await
    }

    /// Conditional update; fails with `AlreadyUsed` when the key was taken first
    pub async fn reserve_with(conn: &mut PgConnection, key_id: i64, order_id: i64) -> Result<(), WayfisError> {
        let result = sqlx::query(
            "UPDATE keys SET used = TRUE, used_at = $3, order_id = $2 WHERE id = $1 AND used = FALSE"
        )
        .bind(key_id)
        .bind(order_id)
        .bind(Utc::now())
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(WayfisError::AlreadyUsed { key_id });
        }

        Ok(())
    }

    /// Keys of one product, or of every product
    pub async fn list_keys(&self, product_id: Option<i64>) -> Result<Vec<LicenseKey>, WayfisError> {
        let keys = sqlx::query_as::<_, LicenseKey>(
            r#"
            SELECT id, product_id, value, used, used_at, order_id, created_at
            FROM keys
            WHERE $1::BIGINT IS NULL OR product_id = $1
            ORDER BY id
            "#
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(keys)
    }

    pub async fn find_by_order(&self, order_id: i64) -> Result<Option<LicenseKey>, WayfisError> {
        let key = sqlx::query_as::<_, LicenseKey>(
            "SELECT id, product_id, value, used, used_at, order_id, created_at FROM keys WHERE order_id = $1"
        )
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(key)
    }

    pub async fn count_free(&self, product_id: i64) -> Result<i64, WayfisError> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM keys WHERE product_id = $1 AND used = FALSE"
        )
        .bind(product_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }
}
