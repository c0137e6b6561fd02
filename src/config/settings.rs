//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use serde::{Deserialize, Serialize};

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub bot: BotConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub payment: PaymentConfig,
    pub topup: TopUpConfig,
    pub admin: AdminConfig,
    pub logging: LoggingConfig,
    pub features: FeaturesConfig,
}

/// Telegram bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BotConfig {
    pub token: String,
    /// Chat that receives operator alerts (tickets, Steam top-ups)
    pub admin_chat_id: i64,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// Redis configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RedisConfig {
    pub url: String,
    pub prefix: String,
    pub ttl_seconds: u64,
}

/// Payment gateway (YooKassa) configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaymentConfig {
    pub api_url: String,
    pub shop_id: String,
    pub secret_key: String,
    pub return_url: String,
    pub currency: String,
    pub timeout_seconds: u64,
}

/// Top-up limits and fees
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TopUpConfig {
    /// Minimum top-up in whole rubles
    pub min_amount: i64,
    /// Commission added on top of a Steam top-up charge
    pub steam_fee_percent: u32,
}

/// Admin web configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AdminConfig {
    pub bind_addr: String,
    pub login: String,
    pub password: String,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file_path: String,
}

/// Feature flags configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FeaturesConfig {
    pub admin_web: bool,
    pub seed_demo_data: bool,
}

impl Settings {
    /// Load settings from configuration file and environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        let defaults = Settings::default();

        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&defaults)?)
            .add_source(config::File::with_name("config").required(false))
            .add_source(
                config::Environment::with_prefix("WAYFIS")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::WayfisError> {
        super::validation::validate_settings(self)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bot: BotConfig {
                token: String::new(),
                admin_chat_id: 0,
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/wayfis".to_string(),
                max_connections: 10,
                min_connections: 1,
            },
            redis: RedisConfig {
                url: "redis://localhost:6379".to_string(),
                prefix: "wayfis:".to_string(),
                ttl_seconds: 43200,
            },
            payment: PaymentConfig {
                api_url: "https://api.yookassa.ru/v3".to_string(),
                shop_id: String::new(),
                secret_key: String::new(),
                return_url: "https://t.me/".to_string(),
                currency: "RUB".to_string(),
                timeout_seconds: 10,
            },
            topup: TopUpConfig {
                min_amount: 100,
                steam_fee_percent: 7,
            },
            admin: AdminConfig {
                bind_addr: "0.0.0.0:3000".to_string(),
                login: String::new(),
                password: String::new(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file_path: "logs".to_string(),
            },
            features: FeaturesConfig {
                admin_web: true,
                seed_demo_data: false,
            },
        }
    }
}
