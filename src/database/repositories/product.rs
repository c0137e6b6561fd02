//! Product repository implementation

use sqlx::PgPool;
use chrono::Utc;
use crate::models::product::{Product, ProductListing, CreateProductRequest};
use crate::utils::errors::WayfisError;

#[derive(Clone)]
#[derive(Debug)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new product
    pub async fn create(&self, request: CreateProductRequest) -> Result<Product, WayfisError> {
        if request.price <= 0 {
            return Err(WayfisError::InvalidAmount("product price must be positive".to_string()));
        }

        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (name, price, description, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, price, description, enabled, created_at
            "#
        )
        .bind(request.name)
        .bind(request.price)
        .bind(request.description)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(product)
    }

    /// Find product by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Product>, WayfisError> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT id, name, price, description, enabled, created_at FROM products WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Enabled products with the number of free keys left for each
    pub async fn list_active_with_stock(&self) -> Result<Vec<ProductListing>, WayfisError> {
        let products = sqlx::query_as::<_, ProductListing>(
            r#"
            SELECT p.id, p.name, p.price, p.description, p.enabled, p.created_at,
                   COUNT(k.id) AS free_keys
            FROM products p
            LEFT JOIN keys k ON k.product_id = p.id AND k.used = FALSE
            WHERE p.enabled = TRUE
            GROUP BY p.id
            ORDER BY p.id
            "#
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    pub async fn set_enabled(&self, id: i64, enabled: bool) -> Result<(), WayfisError> {
        let result = sqlx::query("UPDATE products SET enabled = $2 WHERE id = $1")
            .bind(id)
            .bind(enabled)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(WayfisError::not_found("Product", id));
        }

        Ok(())
    }

    /// Count total products
    pub async fn count(&self) -> Result<i64, WayfisError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }
}
