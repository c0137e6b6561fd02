//! Support chat message model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use super::UnknownVariant;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SupportMessage {
    pub id: i64,
    pub order_id: i64,
    #[sqlx(try_from = "String")]
    pub sender: MessageSender,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageSender {
    User,
    Admin,
}

impl MessageSender {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageSender::User => "user",
            MessageSender::Admin => "admin",
        }
    }
}

impl TryFrom<String> for MessageSender {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "user" => Ok(MessageSender::User),
            "admin" => Ok(MessageSender::Admin),
            _ => Err(UnknownVariant { kind: "message sender", value }),
        }
    }
}
