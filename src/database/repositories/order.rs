//! Order repository implementation

use sqlx::{PgConnection, PgPool};
use chrono::Utc;
use crate::models::order::{Order, OrderStatus, SupportStatus, UpdateOrderRequest, SupportThread};
use crate::utils::errors::WayfisError;

#[derive(Clone)]
#[derive(Debug)]
pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new pending order
    pub async fn create(&self, user_id: i64, product_id: i64) -> Result<Order, WayfisError> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (user_id, product_id, created_at, updated_at)
            VALUES ($1, $2, $3, $3)
            RETURNING id, user_id, product_id, status, payment_id, key_value, support_status, created_at, updated_at
            "#
        )
        .bind(user_id)
        .bind(product_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(order)
    }

    /// Find order by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Order>, WayfisError> {
        let order = sqlx::query_as::<_, Order>(
            "SELECT id, user_id, product_id, status, payment_id, key_value, support_status, created_at, updated_at FROM orders WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// Partially update an order; absent fields are left unchanged
    pub async fn update(&self, id: i64, request: UpdateOrderRequest) -> Result<Order, WayfisError> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            UPDATE orders
            SET status = COALESCE($2, status),
                payment_id = COALESCE($3, payment_id),
                key_value = COALESCE($4, key_value),
                support_status = COALESCE($5, support_status),
                updated_at = $6
            WHERE id = $1
            RETURNING id, user_id, product_id, status, payment_id, key_value, support_status, created_at, updated_at
            "#
        )
        .bind(id)
        .bind(request.status.map(|s| s.as_str()))
        .bind(request.payment_id)
        .bind(request.key_value)
        .bind(request.support_status.map(|s| s.as_str()))
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        order.ok_or_else(|| WayfisError::not_found("Order", id))
    }

    pub async fn set_payment_id(&self, id: i64, payment_id: &str) -> Result<Order, WayfisError> {
        self.update(id, UpdateOrderRequest {
            payment_id: Some(payment_id.to_string()),
            ..Default::default()
        }).await
    }

    pub async fn set_support_status(&self, id: i64, status: SupportStatus) -> Result<Order, WayfisError> {
        self.update(id, UpdateOrderRequest {
            support_status: Some(status),
            ..Default::default()
        }).await
    }

    /// Lock the order row for the rest of the transaction
    pub async fn lock_with(conn: &mut PgConnection, id: i64) -> Result<Option<Order>, WayfisError> {
        let order = sqlx::query_as::<_, Order>(
            "SELECT id, user_id, product_id, status, payment_id, key_value, support_status, created_at, updated_at FROM orders WHERE id = $1 FOR UPDATE"
        )
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(order)
    }

    /// Move a pending order to paid with its delivered key.
    ///
    /// Returns false when the order was no longer pending.
    pub async fn mark_paid_with(conn: &mut PgConnection, id: i64, key_value: &str) -> Result<bool, WayfisError> {
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET status = $2, key_value = $3, updated_at = $4
            WHERE id = $1 AND status = 'pending'
            "#
        )
        .bind(id)
        .bind(OrderStatus::Paid.as_str())
        .bind(key_value)
        .bind(Utc::now())
        .execute(conn)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Mark a pending order as reported to the operator for lacking a key.
    ///
    /// Returns true only for the first call on that order.
    pub async fn flag_undeliverable_with(conn: &mut PgConnection, id: i64) -> Result<bool, WayfisError> {
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET undeliverable_alerted = TRUE, updated_at = $2
            WHERE id = $1 AND status = 'pending' AND undeliverable_alerted = FALSE
            "#
        )
        .bind(id)
        .bind(Utc::now())
        .execute(conn)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Move a pending order to canceled; returns false when it was no longer pending
    pub async fn mark_canceled(&self, id: i64) -> Result<bool, WayfisError> {
        let result = sqlx::query(
            "UPDATE orders SET status = $2, updated_at = $3 WHERE id = $1 AND status = 'pending'"
        )
        .bind(id)
        .bind(OrderStatus::Canceled.as_str())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// The user's most recent order with an open support thread
    pub async fn find_open_support_order_for_user(&self, user_id: i64) -> Result<Option<Order>, WayfisError> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, user_id, product_id, status, payment_id, key_value, support_status, created_at, updated_at
            FROM orders
            WHERE user_id = $1 AND support_status = 'open'
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            "#
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// Orders of a user, newest first
    pub async fn list_for_user(&self, user_id: i64) -> Result<Vec<Order>, WayfisError> {
        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, user_id, product_id, status, payment_id, key_value, support_status, created_at, updated_at
            FROM orders
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            "#
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// Open support threads for the admin inbox, newest first
    pub async fn list_open_support_threads(&self) -> Result<Vec<SupportThread>, WayfisError> {
        let threads = sqlx::query_as::<_, SupportThread>(
            r#"
            SELECT o.id AS order_id, o.user_id, p.name AS product_name, o.key_value,
                   (SELECT m.text FROM support_messages m
                    WHERE m.order_id = o.id
                    ORDER BY m.created_at DESC, m.id DESC
                    LIMIT 1) AS last_message,
                   o.created_at
            FROM orders o
            JOIN products p ON p.id = o.product_id
            WHERE o.support_status = 'open'
            ORDER BY o.created_at DESC, o.id DESC
            "#
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(threads)
    }
}
