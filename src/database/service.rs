//! Database service layer
//!
//! This module provides a high-level interface to database operations

use crate::database::{
    DatabasePool, UserRepository, ProductRepository, KeyRepository, OrderRepository,
    SupportRepository, WalletRepository, StatsRepository, SteamTopUpRepository,
};
use crate::models::*;
use crate::utils::errors::WayfisError;

#[derive(Debug, Clone)]
pub struct DatabaseService {
    pool: DatabasePool,
    pub users: UserRepository,
    pub products: ProductRepository,
    pub keys: KeyRepository,
    pub orders: OrderRepository,
    pub support: SupportRepository,
    pub wallet: WalletRepository,
    pub stats: StatsRepository,
    pub steam_topups: SteamTopUpRepository,
}

impl DatabaseService {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            products: ProductRepository::new(pool.clone()),
            keys: KeyRepository::new(pool.clone()),
            orders: OrderRepository::new(pool.clone()),
            support: SupportRepository::new(pool.clone()),
            wallet: WalletRepository::new(pool.clone()),
            stats: StatsRepository::new(pool.clone()),
            steam_topups: SteamTopUpRepository::new(pool.clone()),
            pool,
        }
    }

    pub fn pool(&self) -> &DatabasePool {
        &self.pool
    }

    /// Register a user on first contact with the bot
    pub async fn register_user(&self, telegram_id: i64, username: Option<String>, display_name: Option<String>) -> Result<User, WayfisError> {
        let request = CreateUserRequest {
            telegram_id,
            username,
            display_name,
        };

        self.users.register_or_get(request).await
    }

    /// Seed one demo product with a key when the catalogue is empty
    pub async fn seed_demo_data(&self) -> Result<bool, WayfisError> {
        if self.products.count().await? > 0 {
            return Ok(false);
        }

        let product = self.products.create(CreateProductRequest {
            name: "Windows 11 Pro".to_string(),
            price: crate::utils::helpers::rubles(1999),
            description: Some("Retail license key".to_string()),
        }).await?;

        self.keys.add_key(product.id, "DEMO-XXXXX-XXXXX-XXXXX-XXXXX").await?;

        tracing::info!(product_id = product.id, "Seeded demo product");
        Ok(true)
    }
}
