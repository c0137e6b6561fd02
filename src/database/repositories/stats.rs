//! Storefront statistics queries

use sqlx::PgPool;
use crate::models::stats::StorefrontStats;
use crate::utils::errors::WayfisError;

#[derive(Clone)]
#[derive(Debug)]
pub struct StatsRepository {
    pool: PgPool,
}

impl StatsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Order, revenue, stock and support counters in one round trip
    pub async fn storefront_stats(&self) -> Result<StorefrontStats, WayfisError> {
        let stats = sqlx::query_as::<_, StorefrontStats>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM orders) AS total_orders,
                (SELECT COUNT(*) FROM orders WHERE status = 'paid') AS paid_orders,
                (SELECT COALESCE(SUM(p.price), 0)::BIGINT FROM orders o
                    JOIN products p ON p.id = o.product_id
                    WHERE o.status = 'paid') AS total_revenue,
                (SELECT COALESCE(SUM(p.price), 0)::BIGINT FROM orders o
                    JOIN products p ON p.id = o.product_id
                    WHERE o.status = 'paid' AND o.updated_at >= date_trunc('day', NOW())) AS today_revenue,
                (SELECT COALESCE(SUM(p.price), 0)::BIGINT FROM orders o
                    JOIN products p ON p.id = o.product_id
                    WHERE o.status = 'paid' AND o.updated_at >= NOW() - INTERVAL '1 month') AS month_revenue,
                (SELECT COUNT(*) FROM users) AS users,
                (SELECT COUNT(*) FROM keys WHERE used = FALSE) AS free_keys,
                (SELECT COUNT(*) FROM orders WHERE support_status = 'open') AS open_chats
            "#
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(stats)
    }
}
