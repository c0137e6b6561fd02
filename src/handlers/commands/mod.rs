//! Command handlers module
//!
//! Bot commands plus the screens reachable from the main menu.

pub mod start;
pub mod help;
pub mod shop;
pub mod wallet;

use teloxide::{Bot, types::Message, utils::command::BotCommands};
use crate::utils::errors::{Result, WayfisError};
use crate::services::ServiceFactory;

/// All available bot commands
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Wayfis shop commands:")]
pub enum Command {
    #[command(description = "Open the shop")]
    Start,
    #[command(description = "Show the main menu")]
    Menu,
    #[command(description = "Contact support")]
    Help,
}

/// Main command dispatcher
pub async fn handle_command(bot: Bot, msg: Message, cmd: Command, services: ServiceFactory) -> Result<()> {
    let user = msg.from.as_ref().ok_or_else(|| {
        WayfisError::InvalidInput("No user in message".to_string())
    })?;
    let user_id = user.id.0 as i64;

    match cmd {
        Command::Start => start::handle_start(&bot, &msg, &services).await,
        Command::Menu => start::handle_menu(&bot, msg.chat.id, &services, user_id).await,
        Command::Help => help::handle_help(&bot, msg.chat.id, &services, user_id).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands_parse() {
        assert_eq!(Command::parse("/start", "wayfis_bot").unwrap(), Command::Start);
        assert_eq!(Command::parse("/menu", "wayfis_bot").unwrap(), Command::Menu);
        assert!(Command::parse("/events", "wayfis_bot").is_err());
    }
}
