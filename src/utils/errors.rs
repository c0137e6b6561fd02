//! Error handling for Wayfis
//!
//! This module defines the main error types used throughout the application
//! and provides a unified error handling strategy.

use thiserror::Error;

/// Main error type for Wayfis application
#[derive(Error, Debug)]
pub enum WayfisError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Telegram API error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    #[error("Payment gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Product {product_id} is out of stock")]
    OutOfStock { product_id: i64 },

    #[error("Key {key_id} is already used")]
    AlreadyUsed { key_id: i64 },

    #[error("Insufficient funds: balance {balance}, requested {requested}")]
    InsufficientFunds { balance: i64, requested: i64 },

    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Payment gateway specific errors
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Gateway returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Gateway request timed out")]
    Timeout,

    #[error("Gateway request failed: {0}")]
    Request(String),

    #[error("Invalid gateway response: {0}")]
    InvalidResponse(String),
}

/// Result type alias for Wayfis operations
pub type Result<T> = std::result::Result<T, WayfisError>;

/// Result type alias for gateway operations
pub type GatewayResult<T> = std::result::Result<T, GatewayError>;

impl WayfisError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        WayfisError::NotFound { entity, id: id.to_string() }
    }

    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            WayfisError::Database(_) => false,
            WayfisError::Migration(_) => false,
            WayfisError::Telegram(_) => true,
            WayfisError::Gateway(_) => true,
            WayfisError::Config(_) => false,
            WayfisError::PermissionDenied(_) => false,
            WayfisError::NotFound { .. } => false,
            WayfisError::OutOfStock { .. } => true,
            WayfisError::AlreadyUsed { .. } => true,
            WayfisError::InsufficientFunds { .. } => false,
            WayfisError::DuplicateKey(_) => false,
            WayfisError::InvalidAmount(_) => false,
            WayfisError::Redis(_) => true,
            WayfisError::Serialization(_) => false,
            WayfisError::Io(_) => true,
            WayfisError::Authentication(_) => false,
            WayfisError::InvalidInput(_) => false,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            WayfisError::Database(_) => ErrorSeverity::Critical,
            WayfisError::Migration(_) => ErrorSeverity::Critical,
            WayfisError::Config(_) => ErrorSeverity::Critical,
            WayfisError::PermissionDenied(_) => ErrorSeverity::Warning,
            WayfisError::Authentication(_) => ErrorSeverity::Warning,
            WayfisError::AlreadyUsed { .. } => ErrorSeverity::Warning,
            WayfisError::NotFound { .. }
            | WayfisError::OutOfStock { .. }
            | WayfisError::InsufficientFunds { .. }
            | WayfisError::DuplicateKey(_)
            | WayfisError::InvalidAmount(_)
            | WayfisError::InvalidInput(_) => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }

    /// Short message safe to show to a shop customer.
    ///
    /// Gateway and infrastructure failures never leak their details here;
    /// callers log the full error before replying.
    pub fn user_message(&self) -> String {
        match self {
            WayfisError::NotFound { entity, .. } => format!("❌ {} not found", entity),
            WayfisError::OutOfStock { .. } => "❌ Out of stock".to_string(),
            WayfisError::AlreadyUsed { .. } => {
                "❌ The key is no longer available, please contact support".to_string()
            }
            WayfisError::InsufficientFunds { .. } => "❌ Insufficient funds in your wallet".to_string(),
            WayfisError::InvalidAmount(reason) => format!("❌ Invalid amount: {}", reason),
            WayfisError::InvalidInput(reason) => format!("❌ {}", reason),
            WayfisError::PermissionDenied(_) | WayfisError::Authentication(_) => {
                "❌ Access denied".to_string()
            }
            WayfisError::Gateway(_) => "⚠️ Payment error. Please try again later.".to_string(),
            _ => "⚠️ Something went wrong. Please try again later.".to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_errors_hide_details_from_users() {
        let err = WayfisError::Gateway(GatewayError::Status {
            status: 401,
            body: "{\"code\":\"invalid_credentials\"}".to_string(),
        });

        let message = err.user_message();
        assert!(!message.contains("invalid_credentials"));
        assert!(!message.contains("401"));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_domain_errors_are_informational() {
        assert_eq!(WayfisError::OutOfStock { product_id: 1 }.severity(), ErrorSeverity::Info);
        assert_eq!(WayfisError::InvalidAmount("zero".into()).severity(), ErrorSeverity::Info);
        assert_eq!(WayfisError::Config("x".into()).severity(), ErrorSeverity::Critical);
    }

    #[test]
    fn test_not_found_message_names_entity() {
        let err = WayfisError::not_found("Order", 42);
        assert_eq!(err.to_string(), "Order not found: 42");
        assert_eq!(err.user_message(), "❌ Order not found");
    }
}
