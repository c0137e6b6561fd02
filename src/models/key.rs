//! License key model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// A license key from a product's pool.
///
/// `used` is true exactly when `order_id` is set; the table enforces it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LicenseKey {
    pub id: i64,
    pub product_id: i64,
    pub value: String,
    pub used: bool,
    pub used_at: Option<DateTime<Utc>>,
    pub order_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}
