//! Bot handlers module
//!
//! This module contains all Telegram bot handlers organized by type:
//! - Command handlers for bot commands
//! - Callback handlers for inline keyboard interactions
//! - Message handlers for menu buttons and free-text replies

pub mod commands;
pub mod callbacks;
pub mod messages;
pub mod keyboards;

use teloxide::{Bot, types::ChatId, prelude::*};
use tracing::{error, info, warn};
use crate::models::User;
use crate::services::ServiceFactory;
use crate::utils::errors::{ErrorSeverity, Result, WayfisError};

/// Register (or refresh) the Telegram user behind an update
pub(crate) async fn register(services: &ServiceFactory, user: &teloxide::types::User) -> Result<User> {
    services.db
        .register_user(
            user.id.0 as i64,
            user.username.clone(),
            Some(user.full_name()),
        )
        .await
}

/// Log an error at its severity and show the customer its short message
pub(crate) async fn report_error(bot: &Bot, chat_id: ChatId, err: &WayfisError) -> Result<()> {
    log_handler_error(err);
    bot.send_message(chat_id, err.user_message()).await?;
    Ok(())
}

pub(crate) fn log_handler_error(err: &WayfisError) {
    match err.severity() {
        ErrorSeverity::Info => info!(error = %err, "Request rejected"),
        ErrorSeverity::Warning => warn!(error = %err, "Request failed"),
        ErrorSeverity::Error | ErrorSeverity::Critical => error!(error = %err, severity = %err.severity(), "Handler error"),
    }
}
