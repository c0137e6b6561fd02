//! Wallet ledger repository implementation
//!
//! `users.balance` always equals the sum of the user's ledger rows: every
//! balance change and its ledger row are written in one transaction.

use sqlx::PgPool;
use chrono::Utc;
use crate::models::wallet::{WalletTransaction, TransactionKind, AdjustOutcome};
use crate::utils::errors::WayfisError;

#[derive(Clone)]
#[derive(Debug)]
pub struct WalletRepository {
    pool: PgPool,
}

impl WalletRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_balance(&self, user_id: i64) -> Result<i64, WayfisError> {
        let balance: Option<(i64,)> = sqlx::query_as("SELECT balance FROM users WHERE telegram_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        balance
            .map(|(balance,)| balance)
            .ok_or_else(|| WayfisError::not_found("User", user_id))
    }

    /// Apply a signed change to a user's balance and record it in the ledger.
    ///
    /// A withdrawal larger than the balance fails with `InsufficientFunds` and
    /// changes nothing. When `payment_id` has already been recorded the call
    /// does nothing and reports `AdjustOutcome::Duplicate`.
    pub async fn adjust_balance(
        &self,
        user_id: i64,
        delta: i64,
        description: &str,
        payment_id: Option<&str>,
    ) -> Result<AdjustOutcome, WayfisError> {
        if delta == 0 {
            return Err(WayfisError::InvalidAmount("amount must not be zero".to_string()));
        }

        let mut tx = self.pool.begin().await?;

        let locked: Option<(i64,)> = sqlx::query_as(
            "SELECT balance FROM users WHERE telegram_id = $1 FOR UPDATE"
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let (balance,) = locked.ok_or_else(|| WayfisError::not_found("User", user_id))?;

        if let Some(payment_id) = payment_id {
            let seen: Option<(i64,)> = sqlx::query_as(
                "SELECT id FROM wallet_transactions WHERE payment_id = $1"
            )
            .bind(payment_id)
            .fetch_optional(&mut *tx)
            .await?;

            if seen.is_some() {
                tx.rollback().await?;
                return Ok(AdjustOutcome::Duplicate { balance });
            }
        }

        let new_balance = balance
            .checked_add(delta)
            .ok_or_else(|| WayfisError::InvalidAmount("amount is too large".to_string()))?;

        if new_balance < 0 {
            return Err(WayfisError::InsufficientFunds { balance, requested: -delta });
        }

        sqlx::query(
            r#"
            INSERT INTO wallet_transactions (user_id, amount, kind, description, payment_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#
        )
        .bind(user_id)
        .bind(delta)
        .bind(TransactionKind::for_delta(delta).as_str())
        .bind(description)
        .bind(payment_id)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        let (balance,): (i64,) = sqlx::query_as(
            "UPDATE users SET balance = balance + $2, updated_at = $3 WHERE telegram_id = $1 RETURNING balance"
        )
        .bind(user_id)
        .bind(delta)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(AdjustOutcome::Applied { balance })
    }

    /// Ledger rows of a user, oldest first
    pub async fn list_transactions(&self, user_id: i64) -> Result<Vec<WalletTransaction>, WayfisError> {
        let transactions = sqlx::query_as::<_, WalletTransaction>(
            r#"
            SELECT id, user_id, amount, kind, description, payment_id, created_at
            FROM wallet_transactions
            WHERE user_id = $1
            ORDER BY created_at ASC, id ASC
            "#
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(transactions)
    }

    /// Sum of the user's ledger rows
    pub async fn ledger_total(&self, user_id: i64) -> Result<i64, WayfisError> {
        let total: (i64,) = sqlx::query_as(
            "SELECT COALESCE(SUM(amount), 0)::BIGINT FROM wallet_transactions WHERE user_id = $1"
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(total.0)
    }
}
