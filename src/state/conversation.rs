//! Per-user conversation state
//!
//! The bot asks for a free-text reply in a handful of places (an amount, a
//! support question). Which reply is expected is persisted on the user row
//! so it survives restarts and is shared by every handler.

use serde::{Deserialize, Serialize};
use crate::models::UnknownVariant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationState {
    #[default]
    Idle,
    AwaitingSteamAmount,
    AwaitingWalletAmount,
    AwaitingWithdrawAmount,
    AwaitingSupportMessage,
}

impl ConversationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversationState::Idle => "idle",
            ConversationState::AwaitingSteamAmount => "awaiting_steam_amount",
            ConversationState::AwaitingWalletAmount => "awaiting_wallet_amount",
            ConversationState::AwaitingWithdrawAmount => "awaiting_withdraw_amount",
            ConversationState::AwaitingSupportMessage => "awaiting_support_message",
        }
    }

    /// Whether the next text message is expected to be a ruble amount
    pub fn awaits_amount(&self) -> bool {
        matches!(
            self,
            ConversationState::AwaitingSteamAmount
                | ConversationState::AwaitingWalletAmount
                | ConversationState::AwaitingWithdrawAmount
        )
    }
}

impl TryFrom<String> for ConversationState {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "idle" => Ok(ConversationState::Idle),
            "awaiting_steam_amount" => Ok(ConversationState::AwaitingSteamAmount),
            "awaiting_wallet_amount" => Ok(ConversationState::AwaitingWalletAmount),
            "awaiting_withdraw_amount" => Ok(ConversationState::AwaitingWithdrawAmount),
            "awaiting_support_message" => Ok(ConversationState::AwaitingSupportMessage),
            _ => Err(UnknownVariant { kind: "conversation state", value }),
        }
    }
}
