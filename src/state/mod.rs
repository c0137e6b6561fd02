//! Conversation state management
//!
//! Tracks which free-text reply the bot is waiting for from each user.

pub mod conversation;

pub use conversation::ConversationState;
