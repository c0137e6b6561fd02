//! User repository implementation

use sqlx::PgPool;
use chrono::Utc;
use crate::models::user::{User, CreateUserRequest};
use crate::state::ConversationState;
use crate::utils::errors::WayfisError;

#[derive(Clone)]
#[derive(Debug)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the user on first contact, or refresh the profile fields of an existing one
    pub async fn register_or_get(&self, request: CreateUserRequest) -> Result<User, WayfisError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (telegram_id, username, display_name, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            ON CONFLICT (telegram_id) DO UPDATE
            SET username = COALESCE(EXCLUDED.username, users.username),
                display_name = COALESCE(EXCLUDED.display_name, users.display_name),
                updated_at = EXCLUDED.updated_at
            RETURNING id, telegram_id, username, display_name, balance, conversation_state, created_at, updated_at
            "#
        )
        .bind(request.telegram_id)
        .bind(request.username)
        .bind(request.display_name)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find user by Telegram ID
    pub async fn find_by_telegram_id(&self, telegram_id: i64) -> Result<Option<User>, WayfisError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, telegram_id, username, display_name, balance, conversation_state, created_at, updated_at FROM users WHERE telegram_id = $1"
        )
        .bind(telegram_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Current conversation state; unknown users are idle
    pub async fn get_conversation_state(&self, telegram_id: i64) -> Result<ConversationState, WayfisError> {
        let row: Option<(String,)> = sqlx::query_as(
            "SELECT conversation_state FROM users WHERE telegram_id = $1"
        )
        .bind(telegram_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some((state,)) => ConversationState::try_from(state)
                .map_err(|e| WayfisError::Database(sqlx::Error::Decode(Box::new(e)))),
            None => Ok(ConversationState::Idle),
        }
    }

    pub async fn set_conversation_state(&self, telegram_id: i64, state: ConversationState) -> Result<(), WayfisError> {
        let result = sqlx::query(
            "UPDATE users SET conversation_state = $2, updated_at = $3 WHERE telegram_id = $1"
        )
        .bind(telegram_id)
        .bind(state.as_str())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(WayfisError::not_found("User", telegram_id));
        }

        Ok(())
    }
}
