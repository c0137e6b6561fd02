//! Order model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use super::UnknownVariant;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Order {
    pub id: i64,
    /// Telegram id of the buyer
    pub user_id: i64,
    pub product_id: i64,
    #[sqlx(try_from = "String")]
    pub status: OrderStatus,
    pub payment_id: Option<String>,
    pub key_value: Option<String>,
    #[sqlx(try_from = "String")]
    pub support_status: SupportStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Order lifecycle: `pending` moves to `paid` or `canceled` once and never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Paid,
    Canceled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Canceled => "canceled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, OrderStatus::Pending)
    }
}

impl TryFrom<String> for OrderStatus {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "paid" => Ok(OrderStatus::Paid),
            "canceled" => Ok(OrderStatus::Canceled),
            _ => Err(UnknownVariant { kind: "order status", value }),
        }
    }
}

/// Per-order help chat lifecycle, independent of payment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupportStatus {
    None,
    Open,
    Closed,
}

impl SupportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SupportStatus::None => "none",
            SupportStatus::Open => "open",
            SupportStatus::Closed => "closed",
        }
    }
}

impl TryFrom<String> for SupportStatus {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "none" => Ok(SupportStatus::None),
            "open" => Ok(SupportStatus::Open),
            "closed" => Ok(SupportStatus::Closed),
            _ => Err(UnknownVariant { kind: "support status", value }),
        }
    }
}

/// Partial update of the mutable order fields
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateOrderRequest {
    pub status: Option<OrderStatus>,
    pub payment_id: Option<String>,
    pub key_value: Option<String>,
    pub support_status: Option<SupportStatus>,
}

/// Open support thread as listed in the admin inbox
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SupportThread {
    pub order_id: i64,
    pub user_id: i64,
    pub product_name: String,
    pub key_value: Option<String>,
    pub last_message: Option<String>,
    pub created_at: DateTime<Utc>,
}
