//! Message handlers module
//!
//! Handles reply-keyboard menu buttons and free-text input. Free text is
//! interpreted through the user's stored [`ConversationState`].

use teloxide::{Bot, types::Message, prelude::*};
use tracing::debug;
use crate::handlers::commands::{help, shop, wallet};
use crate::handlers::keyboards::{self, MenuButton};
use crate::handlers::{register, report_error};
use crate::services::ServiceFactory;
use crate::state::ConversationState;
use crate::utils::errors::{Result, WayfisError};
use crate::utils::helpers::{parse_user_amount, MINOR_UNITS};

/// Smallest withdrawal, in whole rubles
const MIN_WITHDRAWAL: i64 = 1;

/// Handle incoming text messages
pub async fn handle_message(bot: Bot, msg: Message, services: ServiceFactory) -> Result<()> {
    let user = msg.from.as_ref().ok_or_else(|| {
        WayfisError::InvalidInput("No user in message".to_string())
    })?;
    let Some(text) = msg.text() else {
        return Ok(());
    };

    let user_id = user.id.0 as i64;
    let chat_id = msg.chat.id;

    debug!(user_id = user_id, chat_id = ?chat_id, "Processing message");

    register(&services, user).await?;

    if let Some(button) = MenuButton::from_text(text) {
        services.db.users.set_conversation_state(user_id, ConversationState::Idle).await?;
        return handle_menu_button(&bot, &msg, &services, button).await;
    }

    let state = services.db.users.get_conversation_state(user_id).await?;
    let min_rubles = services.topup.min_amount() / MINOR_UNITS;

    let result = match state {
        ConversationState::AwaitingWalletAmount => {
            match take_amount(&services, user_id, text, min_rubles).await {
                Ok(amount) => wallet::start_wallet_topup(&bot, chat_id, &services, user_id, amount).await,
                Err(e) => Err(e),
            }
        }
        ConversationState::AwaitingSteamAmount => {
            match take_amount(&services, user_id, text, min_rubles).await {
                Ok(amount) => wallet::start_steam_topup(&bot, chat_id, &services, user_id, amount).await,
                Err(e) => Err(e),
            }
        }
        ConversationState::AwaitingWithdrawAmount => {
            match take_amount(&services, user_id, text, MIN_WITHDRAWAL).await {
                Ok(amount) => wallet::withdraw(&bot, chat_id, &services, user_id, amount).await,
                Err(e) => Err(e),
            }
        }
        ConversationState::AwaitingSupportMessage => {
            help::submit_ticket(&bot, chat_id, &services, user, text).await
        }
        ConversationState::Idle => handle_free_text(&bot, &msg, &services, user_id, text).await,
    };

    if let Err(e) = result {
        report_error(&bot, chat_id, &e).await?;

        if state.awaits_amount() && matches!(e, WayfisError::InvalidAmount(_)) {
            bot.send_message(chat_id, "Send the amount again, or go back to the menu to cancel.")
                .reply_markup(keyboards::back_to_menu())
                .await?;
        }
    }

    Ok(())
}

/// Parse a typed amount and leave the prompt; a rejected amount keeps it open
async fn take_amount(services: &ServiceFactory, user_id: i64, text: &str, min_rubles: i64) -> Result<i64> {
    let amount = parse_user_amount(text, min_rubles)?;
    services.db.users.set_conversation_state(user_id, ConversationState::Idle).await?;
    Ok(amount)
}

async fn handle_menu_button(bot: &Bot, msg: &Message, services: &ServiceFactory, button: MenuButton) -> Result<()> {
    let chat_id = msg.chat.id;
    let user = msg.from.as_ref().ok_or_else(|| {
        WayfisError::InvalidInput("No user in message".to_string())
    })?;
    let user_id = user.id.0 as i64;

    match button {
        MenuButton::Shop => shop::show_products(bot, chat_id, services).await,
        MenuButton::SteamTopUp => wallet::prompt_steam_topup(bot, chat_id, services, user_id).await,
        MenuButton::Profile => wallet::show_profile(bot, chat_id, services, user).await,
        MenuButton::Wallet => wallet::show_wallet(bot, chat_id, services, user_id).await,
        MenuButton::Help => help::handle_help(bot, chat_id, services, user_id).await,
    }
}

/// Text outside any prompt goes to the user's open support thread, if any
async fn handle_free_text(bot: &Bot, msg: &Message, services: &ServiceFactory, user_id: i64, text: &str) -> Result<()> {
    match services.support.post_user_message(user_id, text).await? {
        Some(message) => {
            debug!(user_id = user_id, order_id = message.order_id, "Relayed message to support thread");
            bot.send_message(msg.chat.id, "✅ Message sent to support!").await?;
        }
        None => {
            bot.send_message(msg.chat.id, "Use the menu buttons below 👇")
                .reply_markup(keyboards::main_menu())
                .await?;
        }
    }
    Ok(())
}
