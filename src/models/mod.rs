//! Data models module
//!
//! This module contains all data structures persisted by the shop

pub mod user;
pub mod product;
pub mod key;
pub mod order;
pub mod support;
pub mod wallet;
pub mod stats;

// Re-export commonly used models
pub use user::{User, CreateUserRequest};
pub use product::{Product, ProductListing, CreateProductRequest};
pub use key::LicenseKey;
pub use order::{Order, OrderStatus, SupportStatus, UpdateOrderRequest, SupportThread};
pub use support::{SupportMessage, MessageSender};
pub use wallet::{WalletTransaction, TransactionKind, AdjustOutcome};
pub use stats::StorefrontStats;

/// A stored text value that does not match any known enum variant
#[derive(Debug, thiserror::Error)]
#[error("unknown {kind} value: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}
