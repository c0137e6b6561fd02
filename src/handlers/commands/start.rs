//! Start and menu handlers

use teloxide::{Bot, types::{ChatId, Message}, prelude::*};
use tracing::info;
use crate::handlers::{keyboards, register};
use crate::services::ServiceFactory;
use crate::state::ConversationState;
use crate::utils::errors::{Result, WayfisError};

/// Handle /start: register the user and show the main menu
pub async fn handle_start(bot: &Bot, msg: &Message, services: &ServiceFactory) -> Result<()> {
    let user = msg.from.as_ref().ok_or_else(|| {
        WayfisError::InvalidInput("No user in message".to_string())
    })?;

    let registered = register(services, user).await?;
    services.db.users.set_conversation_state(registered.telegram_id, ConversationState::Idle).await?;

    info!(user_id = registered.telegram_id, "User started the bot");

    bot.send_message(msg.chat.id, "👋 Welcome to the shop!\n\nChoose an action:")
        .reply_markup(keyboards::main_menu())
        .await?;

    Ok(())
}

/// Show the main menu and drop any pending input
pub async fn handle_menu(bot: &Bot, chat_id: ChatId, services: &ServiceFactory, user_id: i64) -> Result<()> {
    services.db.users.set_conversation_state(user_id, ConversationState::Idle).await?;

    bot.send_message(chat_id, "📋 Main menu:\n\nChoose an action:")
        .reply_markup(keyboards::main_menu())
        .await?;

    Ok(())
}
