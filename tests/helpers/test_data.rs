//! Test data builders

use wayfis::config::Settings;
use wayfis::models::{CreateProductRequest, Product, User};
use wayfis::services::ServiceFactory;
use wayfis::utils::helpers::rubles;

use super::ADMIN_CHAT_ID;

pub fn test_bot_token() -> String {
    "1234567890:AAFakeTokenForWayfisTests_abcdefghij".to_string()
}

/// Default settings pointed at the mock gateway
pub fn test_settings(gateway_url: &str) -> Settings {
    let mut settings = Settings::default();
    settings.bot.token = test_bot_token();
    settings.bot.admin_chat_id = ADMIN_CHAT_ID;
    settings.payment.api_url = gateway_url.to_string();
    settings.payment.shop_id = "test_shop".to_string();
    settings.payment.secret_key = "test_secret".to_string();
    settings.payment.return_url = "https://t.me/wayfis_bot".to_string();
    settings.payment.timeout_seconds = 1;
    settings.admin.login = "admin".to_string();
    settings.admin.password = "secret".to_string();
    settings
}

pub async fn create_user(services: &ServiceFactory, telegram_id: i64) -> User {
    services.db
        .register_user(telegram_id, Some(format!("user{}", telegram_id)), Some("Test User".to_string()))
        .await
        .expect("Failed to register user")
}

/// A product priced in whole rubles with the given free keys
pub async fn create_product(services: &ServiceFactory, name: &str, price_rubles: i64, keys: &[&str]) -> Product {
    let product = services.db.products
        .create(CreateProductRequest {
            name: name.to_string(),
            price: rubles(price_rubles),
            description: None,
        })
        .await
        .expect("Failed to create product");

    for key in keys {
        services.db.keys.add_key(product.id, key).await.expect("Failed to add key");
    }

    product
}
