//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use crate::utils::errors::{WayfisError, Result};
use super::Settings;

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_bot_config(&settings.bot)?;
    validate_database_config(&settings.database)?;
    validate_redis_config(&settings.redis)?;
    validate_payment_config(&settings.payment)?;
    validate_topup_config(&settings.topup)?;
    validate_logging_config(&settings.logging)?;

    if settings.features.admin_web {
        validate_admin_config(&settings.admin)?;
    }

    Ok(())
}

/// Validate bot configuration
fn validate_bot_config(config: &super::BotConfig) -> Result<()> {
    if config.token.is_empty() {
        return Err(WayfisError::Config(
            "Bot token is required".to_string()
        ));
    }

    if config.admin_chat_id == 0 {
        return Err(WayfisError::Config(
            "Admin chat ID must be configured".to_string()
        ));
    }

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(WayfisError::Config(
            "Database URL is required".to_string()
        ));
    }

    if config.max_connections == 0 {
        return Err(WayfisError::Config(
            "Max connections must be greater than 0".to_string()
        ));
    }

    if config.min_connections > config.max_connections {
        return Err(WayfisError::Config(
            "Min connections cannot be greater than max connections".to_string()
        ));
    }

    Ok(())
}

/// Validate Redis configuration
fn validate_redis_config(config: &super::RedisConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(WayfisError::Config(
            "Redis URL is required".to_string()
        ));
    }

    if config.ttl_seconds == 0 {
        return Err(WayfisError::Config(
            "Session TTL must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate payment gateway configuration
fn validate_payment_config(config: &super::PaymentConfig) -> Result<()> {
    url::Url::parse(&config.api_url).map_err(|e| {
        WayfisError::Config(format!("Invalid payment API URL: {}", e))
    })?;

    url::Url::parse(&config.return_url).map_err(|e| {
        WayfisError::Config(format!("Invalid payment return URL: {}", e))
    })?;

    if config.shop_id.is_empty() || config.secret_key.is_empty() {
        return Err(WayfisError::Config(
            "Payment shop ID and secret key are required".to_string()
        ));
    }

    if config.currency.len() != 3 {
        return Err(WayfisError::Config(
            format!("Invalid currency code: {}", config.currency)
        ));
    }

    if config.timeout_seconds == 0 {
        return Err(WayfisError::Config(
            "Payment timeout must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate top-up configuration
fn validate_topup_config(config: &super::TopUpConfig) -> Result<()> {
    if config.min_amount <= 0 {
        return Err(WayfisError::Config(
            "Minimum top-up amount must be positive".to_string()
        ));
    }

    if config.steam_fee_percent > 100 {
        return Err(WayfisError::Config(
            "Steam fee cannot exceed 100%".to_string()
        ));
    }

    Ok(())
}

/// Validate admin web configuration
fn validate_admin_config(config: &super::AdminConfig) -> Result<()> {
    config.bind_addr.parse::<std::net::SocketAddr>().map_err(|_| {
        WayfisError::Config(format!("Invalid admin bind address: {}", config.bind_addr))
    })?;

    if config.login.is_empty() || config.password.is_empty() {
        return Err(WayfisError::Config(
            "Admin login and password are required".to_string()
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(WayfisError::Config(
            "Log level is required".to_string()
        ));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(WayfisError::Config(
            format!("Invalid log level: {}. Valid levels: {:?}", config.level, valid_levels)
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn valid_settings() -> Settings {
        let mut settings = Settings::default();
        settings.bot.token = "12345:token".to_string();
        settings.bot.admin_chat_id = 555;
        settings.payment.shop_id = "shop".to_string();
        settings.payment.secret_key = "secret".to_string();
        settings.admin.login = "admin".to_string();
        settings.admin.password = "hunter2".to_string();
        settings
    }

    #[test]
    fn test_valid_settings_pass() {
        assert!(validate_settings(&valid_settings()).is_ok());
    }

    #[test]
    fn test_missing_gateway_credentials_rejected() {
        let mut settings = valid_settings();
        settings.payment.secret_key.clear();
        assert_matches!(validate_settings(&settings), Err(WayfisError::Config(_)));
    }

    #[test]
    fn test_fee_over_hundred_percent_rejected() {
        let mut settings = valid_settings();
        settings.topup.steam_fee_percent = 150;
        assert_matches!(validate_settings(&settings), Err(WayfisError::Config(_)));
    }

    #[test]
    fn test_admin_credentials_only_required_with_admin_web() {
        let mut settings = valid_settings();
        settings.admin.password.clear();
        assert!(validate_settings(&settings).is_err());

        settings.features.admin_web = false;
        assert!(validate_settings(&settings).is_ok());
    }

    #[test]
    fn test_unknown_log_level_rejected() {
        let mut settings = valid_settings();
        settings.logging.level = "verbose".to_string();
        assert_matches!(validate_settings(&settings), Err(WayfisError::Config(_)));
    }
}
