//! Callback query handlers module
//!
//! Inline button payloads are short `action:argument` strings parsed into
//! [`CallbackAction`] and routed to the shop, wallet and support screens.

use teloxide::{Bot, types::{CallbackQuery, ChatId, InlineKeyboardMarkup, MessageId, ParseMode}, prelude::*};
use tracing::{debug, warn};
use crate::handlers::commands::{help, shop, start, wallet};
use crate::handlers::{log_handler_error, register};
use crate::services::ServiceFactory;
use crate::utils::errors::Result;

/// Everything an inline button can ask for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackAction {
    Products,
    Buy(i64),
    Check(i64),
    CheckWallet(String),
    CheckSteam(String),
    Close(i64),
    Help(i64),
    WalletTopUp,
    WalletWithdraw,
    Ticket,
    Menu,
}

impl CallbackAction {
    pub fn parse(data: &str) -> Option<Self> {
        let parts: Vec<&str> = data.split(':').collect();

        match parts.as_slice() {
            ["products"] => Some(CallbackAction::Products),
            ["buy", product_id] => parse_id(product_id).map(CallbackAction::Buy),
            ["check", order_id] => parse_id(order_id).map(CallbackAction::Check),
            ["check_wallet", payment_id] => parse_payment_id(payment_id).map(CallbackAction::CheckWallet),
            ["check_steam", payment_id] => parse_payment_id(payment_id).map(CallbackAction::CheckSteam),
            ["close", order_id] => parse_id(order_id).map(CallbackAction::Close),
            ["help", order_id] => parse_id(order_id).map(CallbackAction::Help),
            ["wallet", "topup"] => Some(CallbackAction::WalletTopUp),
            ["wallet", "withdraw"] => Some(CallbackAction::WalletWithdraw),
            ["ticket"] => Some(CallbackAction::Ticket),
            ["menu"] => Some(CallbackAction::Menu),
            _ => None,
        }
    }

    pub fn to_data(&self) -> String {
        match self {
            CallbackAction::Products => "products".to_string(),
            CallbackAction::Buy(id) => format!("buy:{}", id),
            CallbackAction::Check(id) => format!("check:{}", id),
            CallbackAction::CheckWallet(payment_id) => format!("check_wallet:{}", payment_id),
            CallbackAction::CheckSteam(payment_id) => format!("check_steam:{}", payment_id),
            CallbackAction::Close(id) => format!("close:{}", id),
            CallbackAction::Help(id) => format!("help:{}", id),
            CallbackAction::WalletTopUp => "wallet:topup".to_string(),
            CallbackAction::WalletWithdraw => "wallet:withdraw".to_string(),
            CallbackAction::Ticket => "ticket".to_string(),
            CallbackAction::Menu => "menu".to_string(),
        }
    }
}

fn parse_id(value: &str) -> Option<i64> {
    value.parse::<i64>().ok().filter(|id| *id > 0)
}

fn parse_payment_id(value: &str) -> Option<String> {
    let valid = !value.is_empty() && value.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
    valid.then(|| value.to_string())
}

/// Where a callback came from
#[derive(Debug, Clone)]
pub struct CallbackContext {
    pub user_id: i64,
    pub chat_id: ChatId,
    pub message_id: Option<MessageId>,
}

impl CallbackContext {
    /// Replace the message the button was on, or send a new one if it is gone
    pub async fn show(&self, bot: &Bot, text: String, keyboard: Option<InlineKeyboardMarkup>) -> Result<()> {
        match self.message_id {
            Some(message_id) => {
                let request = bot
                    .edit_message_text(self.chat_id, message_id, text)
                    .parse_mode(ParseMode::Html);
                match keyboard {
                    Some(keyboard) => request.reply_markup(keyboard).await?,
                    None => request.await?,
                };
            }
            None => {
                let request = bot.send_message(self.chat_id, text).parse_mode(ParseMode::Html);
                match keyboard {
                    Some(keyboard) => request.reply_markup(keyboard).await?,
                    None => request.await?,
                };
            }
        }
        Ok(())
    }
}

/// Main callback query dispatcher
pub async fn handle_callback_query(bot: Bot, query: CallbackQuery, services: ServiceFactory) -> Result<()> {
    let user_id = query.from.id.0 as i64;
    let ctx = CallbackContext {
        user_id,
        chat_id: query.message.as_ref().map(|m| m.chat().id).unwrap_or(ChatId(user_id)),
        message_id: query.message.as_ref().map(|m| m.id()),
    };

    let Some(action) = query.data.as_deref().and_then(CallbackAction::parse) else {
        warn!(user_id = user_id, data = ?query.data, "Unknown callback data");
        bot.answer_callback_query(query.id.clone()).await?;
        return Ok(());
    };

    debug!(user_id = user_id, action = ?action, "Routing callback");

    let notice = match route(&bot, &ctx, &query, &services, action).await {
        Ok(notice) => notice,
        Err(e) => {
            log_handler_error(&e);
            Some(e.user_message())
        }
    };

    let answer = bot.answer_callback_query(query.id.clone());
    match notice {
        Some(text) => answer.text(text).await?,
        None => answer.await?,
    };

    Ok(())
}

/// Run the action; `Some(text)` is shown as a short popup notice
async fn route(
    bot: &Bot,
    ctx: &CallbackContext,
    query: &CallbackQuery,
    services: &ServiceFactory,
    action: CallbackAction,
) -> Result<Option<String>> {
    register(services, &query.from).await?;

    match action {
        CallbackAction::Products => {
            shop::show_products(bot, ctx.chat_id, services).await?;
            Ok(None)
        }
        CallbackAction::Buy(product_id) => shop::buy(bot, ctx, services, product_id).await,
        CallbackAction::Check(order_id) => shop::check(bot, ctx, services, order_id).await,
        CallbackAction::CheckWallet(payment_id) => wallet::check_wallet_topup(bot, ctx, services, &payment_id).await,
        CallbackAction::CheckSteam(payment_id) => wallet::check_steam_topup(bot, ctx, services, &payment_id).await,
        CallbackAction::Close(order_id) => shop::close_support(bot, ctx, services, order_id).await,
        CallbackAction::Help(order_id) => shop::open_support(bot, ctx, services, order_id).await,
        CallbackAction::WalletTopUp => {
            wallet::prompt_wallet_topup(bot, ctx.chat_id, services, ctx.user_id).await?;
            Ok(None)
        }
        CallbackAction::WalletWithdraw => {
            wallet::prompt_withdraw(bot, ctx.chat_id, services, ctx.user_id).await?;
            Ok(None)
        }
        CallbackAction::Ticket => {
            help::prompt_ticket(bot, ctx.chat_id, services, ctx.user_id).await?;
            Ok(None)
        }
        CallbackAction::Menu => {
            start::handle_menu(bot, ctx.chat_id, services, ctx.user_id).await?;
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_actions() {
        assert_eq!(CallbackAction::parse("buy:3"), Some(CallbackAction::Buy(3)));
        assert_eq!(CallbackAction::parse("check:17"), Some(CallbackAction::Check(17)));
        assert_eq!(
            CallbackAction::parse("check_wallet:2d1b9a3c-000f-5000-9000-1b8c2f3e4d5a"),
            Some(CallbackAction::CheckWallet("2d1b9a3c-000f-5000-9000-1b8c2f3e4d5a".to_string()))
        );
        assert_eq!(CallbackAction::parse("wallet:withdraw"), Some(CallbackAction::WalletWithdraw));
        assert_eq!(CallbackAction::parse("menu"), Some(CallbackAction::Menu));
    }

    #[test]
    fn test_parse_rejects_malformed_data() {
        assert_eq!(CallbackAction::parse("buy:abc"), None);
        assert_eq!(CallbackAction::parse("buy:-1"), None);
        assert_eq!(CallbackAction::parse("buy"), None);
        assert_eq!(CallbackAction::parse("check_steam:"), None);
        assert_eq!(CallbackAction::parse("check_steam:a b"), None);
        assert_eq!(CallbackAction::parse("lang:en"), None);
    }

    #[test]
    fn test_data_round_trip() {
        let actions = [
            CallbackAction::Products,
            CallbackAction::Buy(1),
            CallbackAction::Check(2),
            CallbackAction::CheckWallet("abc-123".to_string()),
            CallbackAction::CheckSteam("def-456".to_string()),
            CallbackAction::Close(3),
            CallbackAction::Help(4),
            CallbackAction::WalletTopUp,
            CallbackAction::WalletWithdraw,
            CallbackAction::Ticket,
            CallbackAction::Menu,
        ];

        for action in actions {
            assert_eq!(CallbackAction::parse(&action.to_data()), Some(action));
        }
    }
}
