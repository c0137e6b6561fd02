//! Wayfis Telegram storefront
//!
//! A Telegram bot that sells license keys and wallet/Steam top-ups paid
//! through YooKassa, with a small admin web for the key pool, support chat
//! and statistics.

pub mod config;
pub mod handlers;
pub mod services;
pub mod models;
pub mod database;
pub mod state;
pub mod utils;
pub mod web;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{WayfisError, Result};

// Re-export main components for easy access
pub use database::DatabaseService;
pub use services::ServiceFactory;
pub use state::ConversationState;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
