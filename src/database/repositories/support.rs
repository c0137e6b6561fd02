//! Support message repository implementation

use sqlx::PgPool;
use chrono::Utc;
use crate::models::support::{SupportMessage, MessageSender};
use crate::utils::errors::WayfisError;

#[derive(Clone)]
#[derive(Debug)]
pub struct SupportRepository {
    pool: PgPool,
}

impl SupportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append a message to an order's transcript
    pub async fn save_message(&self, order_id: i64, sender: MessageSender, text: &str) -> Result<SupportMessage, WayfisError> {
        let message = sqlx::query_as::<_, SupportMessage>(
            r#"
            INSERT INTO support_messages (order_id, sender, text, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, order_id, sender, text, created_at
            "#
        )
        .bind(order_id)
        .bind(sender.as_str())
        .bind(text)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(message)
    }

    /// Full transcript in chronological order
    pub async fn history(&self, order_id: i64) -> Result<Vec<SupportMessage>, WayfisError> {
        let messages = sqlx::query_as::<_, SupportMessage>(
            r#"
            SELECT id, order_id, sender, text, created_at
            FROM support_messages
            WHERE order_id = $1
            ORDER BY created_at ASC, id ASC
            "#
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }
}
