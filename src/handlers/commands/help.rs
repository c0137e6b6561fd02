//! Help screen and general support tickets

use teloxide::{Bot, types::ChatId, prelude::*, utils::command::BotCommands};
use crate::handlers::keyboards;
use crate::handlers::commands::Command;
use crate::services::ServiceFactory;
use crate::state::ConversationState;
use crate::utils::errors::Result;

/// Support screen with the ticket button
pub async fn handle_help(bot: &Bot, chat_id: ChatId, services: &ServiceFactory, user_id: i64) -> Result<()> {
    services.db.users.set_conversation_state(user_id, ConversationState::Idle).await?;

    let text = format!(
        "🆘 Support\n\n\
         If something went wrong, press the button below to contact support. \
         An administrator will get back to you shortly.\n\n\
         For a problem with a purchased key, use the \"I need help\" button under the key.\n\n{}",
        Command::descriptions()
    );

    bot.send_message(chat_id, text)
        .reply_markup(keyboards::help())
        .await?;

    Ok(())
}

/// Ask for the ticket text
pub async fn prompt_ticket(bot: &Bot, chat_id: ChatId, services: &ServiceFactory, user_id: i64) -> Result<()> {
    services.db.users.set_conversation_state(user_id, ConversationState::AwaitingSupportMessage).await?;

    bot.send_message(chat_id, "✍️ Describe your problem in one message:")
        .reply_markup(keyboards::back_to_menu())
        .await?;

    Ok(())
}

/// Forward the typed ticket to the operator
pub async fn submit_ticket(
    bot: &Bot,
    chat_id: ChatId,
    services: &ServiceFactory,
    user: &teloxide::types::User,
    text: &str,
) -> Result<()> {
    let user_id = user.id.0 as i64;

    services.support
        .submit_ticket(user_id, &user.full_name(), user.username.as_deref(), text)
        .await?;
    services.db.users.set_conversation_state(user_id, ConversationState::Idle).await?;

    bot.send_message(chat_id, "✅ Your request has been sent to support. Please wait for a reply.")
        .reply_markup(keyboards::back_to_menu())
        .await?;

    Ok(())
}
