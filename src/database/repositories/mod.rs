//! Database repositories module
//!
//! This module contains all repository implementations for data access

pub mod user;
pub mod product;
pub mod key;
pub mod order;
pub mod support;
pub mod wallet;
pub mod stats;
pub mod steam;

// Re-export repositories
pub use user::UserRepository;
pub use product::ProductRepository;
pub use key::KeyRepository;
pub use order::OrderRepository;
pub use support::SupportRepository;
pub use wallet::WalletRepository;
pub use stats::StatsRepository;
pub use steam::SteamTopUpRepository;
