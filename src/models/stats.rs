//! Storefront statistics model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Counters shown on the admin dashboard; money in minor units
#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
pub struct StorefrontStats {
    pub total_orders: i64,
    pub paid_orders: i64,
    pub total_revenue: i64,
    pub today_revenue: i64,
    pub month_revenue: i64,
    pub users: i64,
    pub free_keys: i64,
    pub open_chats: i64,
}

impl StorefrontStats {
    /// Share of orders that were paid, as a whole percentage
    pub fn success_rate(&self) -> u32 {
        if self.total_orders <= 0 {
            return 0;
        }
        ((self.paid_orders as f64 / self.total_orders as f64) * 100.0).round() as u32
    }
}
