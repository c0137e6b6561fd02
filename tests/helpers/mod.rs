//! Test helpers module
//!
//! Postgres test databases, mock YooKassa and Telegram servers, and a test
//! context that wires them into a real [`ServiceFactory`].

#![allow(dead_code)]

pub mod database_helper;
pub mod gateway_mock;
pub mod telegram_mock;
pub mod test_data;

pub use database_helper::*;
pub use gateway_mock::*;
pub use telegram_mock::*;
pub use test_data::*;

use teloxide::Bot;
use wayfis::database::DatabaseService;
use wayfis::services::ServiceFactory;

/// Everything an end-to-end service test needs
pub struct TestContext {
    pub database: TestDatabase,
    pub gateway: GatewayMock,
    pub telegram: TelegramMockServer,
    pub services: ServiceFactory,
}

impl TestContext {
    /// `None` when no Postgres is reachable; callers skip the test
    pub async fn new() -> Option<Self> {
        let database = TestDatabase::new().await?;
        let gateway = GatewayMock::new().await;
        let telegram = TelegramMockServer::new().await;
        telegram.setup_default_mocks().await;

        let settings = test_settings(&gateway.api_url());
        let bot = Bot::new(test_bot_token()).set_api_url(telegram.api_url());
        let services = ServiceFactory::new(bot, &settings, DatabaseService::new(database.pool.clone()))
            .expect("Failed to build services");

        Some(Self {
            database,
            gateway,
            telegram,
            services,
        })
    }
}

/// Build a [`TestContext`] or return early from the test
#[macro_export]
macro_rules! require_context {
    () => {
        match $crate::helpers::TestContext::new().await {
            Some(ctx) => ctx,
            None => {
                eprintln!("skipping: no Postgres available (set TEST_DATABASE_URL or run Docker)");
                return;
            }
        }
    };
}
