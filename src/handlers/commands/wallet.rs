//! Profile, wallet and top-up screens

use teloxide::{Bot, types::{ChatId, ParseMode}, prelude::*, utils::html};
use crate::handlers::callbacks::{CallbackAction, CallbackContext};
use crate::handlers::commands::shop::confirmation_url;
use crate::handlers::{keyboards, register};
use crate::models::TransactionKind;
use crate::services::{ServiceFactory, SteamTopUpOutcome, WalletTopUpOutcome};
use crate::state::ConversationState;
use crate::utils::errors::Result;
use crate::utils::helpers::{format_rub, format_timestamp, rubles};

const RECENT_TRANSACTIONS: usize = 5;

pub async fn show_profile(bot: &Bot, chat_id: ChatId, services: &ServiceFactory, user: &teloxide::types::User) -> Result<()> {
    let profile = register(services, user).await?;
    let orders = services.db.orders.list_for_user(profile.telegram_id).await?;

    let text = format!(
        "👤 Your profile:\nID: {}\nName: {}\nUsername: @{}\nRegistered: {}\nBalance: {}\nOrders: {}",
        profile.telegram_id,
        html::escape(profile.display_name.as_deref().unwrap_or("-")),
        html::escape(profile.username.as_deref().unwrap_or("not set")),
        format_timestamp(profile.created_at),
        format_rub(profile.balance),
        orders.len()
    );

    bot.send_message(chat_id, text)
        .parse_mode(ParseMode::Html)
        .reply_markup(keyboards::back_to_menu())
        .await?;

    Ok(())
}

pub async fn show_wallet(bot: &Bot, chat_id: ChatId, services: &ServiceFactory, user_id: i64) -> Result<()> {
    let balance = services.db.wallet.get_balance(user_id).await?;
    let transactions = services.db.wallet.list_transactions(user_id).await?;

    let mut text = format!("💼 Your wallet\nBalance: {}", format_rub(balance));

    if !transactions.is_empty() {
        text.push_str("\n\nRecent operations:");
        for tx in transactions.iter().rev().take(RECENT_TRANSACTIONS) {
            let sign = match tx.kind {
                TransactionKind::Deposit => "+",
                TransactionKind::Withdrawal => "-",
            };
            text.push_str(&format!("\n{} {}{}", tx.created_at.format("%d.%m %H:%M"), sign, format_rub(tx.amount.abs())));
        }
    }

    bot.send_message(chat_id, text)
        .reply_markup(keyboards::wallet())
        .await?;

    Ok(())
}

pub async fn prompt_wallet_topup(bot: &Bot, chat_id: ChatId, services: &ServiceFactory, user_id: i64) -> Result<()> {
    services.db.users.set_conversation_state(user_id, ConversationState::AwaitingWalletAmount).await?;

    bot.send_message(
        chat_id,
        format!(
            "💼 Wallet top-up\n\nEnter the amount in rubles (minimum {}):",
            format_rub(services.topup.min_amount())
        ),
    )
    .reply_markup(keyboards::back_to_menu())
    .await?;

    Ok(())
}

pub async fn prompt_withdraw(bot: &Bot, chat_id: ChatId, services: &ServiceFactory, user_id: i64) -> Result<()> {
    let balance = services.db.wallet.get_balance(user_id).await?;
    services.db.users.set_conversation_state(user_id, ConversationState::AwaitingWithdrawAmount).await?;

    bot.send_message(
        chat_id,
        format!("📤 Withdrawal\n\nBalance: {}\nEnter the amount in rubles:", format_rub(balance)),
    )
    .reply_markup(keyboards::back_to_menu())
    .await?;

    Ok(())
}

pub async fn prompt_steam_topup(bot: &Bot, chat_id: ChatId, services: &ServiceFactory, user_id: i64) -> Result<()> {
    services.db.users.set_conversation_state(user_id, ConversationState::AwaitingSteamAmount).await?;

    let fees = services.topup.fees();
    let example = fees.steam_quote(rubles(1000))?;

    bot.send_message(
        chat_id,
        format!(
            "💰 Steam Wallet top-up\n\n\
             Enter the amount to credit in rubles (minimum {}).\n\
             Commission: {}%\n\n\
             Example: {} on Steam costs {}",
            format_rub(services.topup.min_amount()),
            fees.steam_fee_percent,
            format_rub(example.amount),
            format_rub(example.charge)
        ),
    )
    .reply_markup(keyboards::back_to_menu())
    .await?;

    Ok(())
}

/// Create a wallet top-up payment for an amount the user typed
pub async fn start_wallet_topup(bot: &Bot, chat_id: ChatId, services: &ServiceFactory, user_id: i64, amount: i64) -> Result<()> {
    let checkout = services.topup.start_wallet_topup(user_id, amount).await?;
    let url = confirmation_url(&checkout.confirmation_url)?;

    bot.send_message(chat_id, format!("💳 Pay for the wallet top-up:\nAmount: {}", format_rub(checkout.charge)))
        .reply_markup(keyboards::checkout(url, CallbackAction::CheckWallet(checkout.payment_id)))
        .await?;

    Ok(())
}

/// Create a Steam top-up payment for an amount the user typed
pub async fn start_steam_topup(bot: &Bot, chat_id: ChatId, services: &ServiceFactory, user_id: i64, amount: i64) -> Result<()> {
    let (quote, checkout) = services.topup.start_steam_topup(user_id, amount).await?;
    let url = confirmation_url(&checkout.confirmation_url)?;

    bot.send_message(
        chat_id,
        format!(
            "💳 Pay for the Steam top-up:\nCredit: {}\nCommission: {}\nTotal: {}",
            format_rub(quote.amount),
            format_rub(quote.commission),
            format_rub(quote.charge)
        ),
    )
    .reply_markup(keyboards::checkout(url, CallbackAction::CheckSteam(checkout.payment_id)))
    .await?;

    Ok(())
}

pub async fn withdraw(bot: &Bot, chat_id: ChatId, services: &ServiceFactory, user_id: i64, amount: i64) -> Result<()> {
    let balance = services.topup.withdraw(user_id, amount).await?;

    bot.send_message(
        chat_id,
        format!("✅ Withdrawal of {} accepted.\nNew balance: {}", format_rub(amount), format_rub(balance)),
    )
    .reply_markup(keyboards::back_to_menu())
    .await?;

    Ok(())
}

pub async fn check_wallet_topup(bot: &Bot, ctx: &CallbackContext, services: &ServiceFactory, payment_id: &str) -> Result<Option<String>> {
    match services.topup.check_wallet_topup(ctx.user_id, payment_id).await? {
        WalletTopUpOutcome::Credited { amount, balance } => {
            ctx.show(
                bot,
                format!("✅ Wallet topped up!\n\nAmount: {}\nNew balance: {}", format_rub(amount), format_rub(balance)),
                Some(keyboards::back_to_menu()),
            )
            .await?;
            Ok(None)
        }
        WalletTopUpOutcome::AlreadyCredited { balance } => {
            Ok(Some(format!("✅ Already credited. Balance: {}", format_rub(balance))))
        }
        WalletTopUpOutcome::NotSettled { .. } => {
            Ok(Some("⏳ Payment is not completed yet. Try again in a minute.".to_string()))
        }
        WalletTopUpOutcome::Canceled => {
            ctx.show(bot, "❌ The top-up payment was canceled.".to_string(), Some(keyboards::back_to_menu())).await?;
            Ok(None)
        }
    }
}

pub async fn check_steam_topup(bot: &Bot, ctx: &CallbackContext, services: &ServiceFactory, payment_id: &str) -> Result<Option<String>> {
    match services.topup.check_steam_topup(ctx.user_id, payment_id).await? {
        SteamTopUpOutcome::Settled { quote } => {
            ctx.show(
                bot,
                format!(
                    "✅ Steam Wallet top-up paid!\n\nAmount: {}\nCommission: {}\n\n\
                     An operator will credit your Steam account shortly.",
                    format_rub(quote.amount),
                    format_rub(quote.commission)
                ),
                Some(keyboards::back_to_menu()),
            )
            .await?;
            Ok(None)
        }
        SteamTopUpOutcome::AlreadyProcessed { quote } => {
            ctx.show(
                bot,
                format!(
                    "✅ This Steam Wallet top-up of {} is already paid.\n\n\
                     An operator is crediting your Steam account.",
                    format_rub(quote.amount)
                ),
                Some(keyboards::back_to_menu()),
            )
            .await?;
            Ok(None)
        }
        SteamTopUpOutcome::NotSettled { .. } => {
            Ok(Some("⏳ Payment is not completed yet. Try again in a minute.".to_string()))
        }
        SteamTopUpOutcome::Canceled => {
            ctx.show(bot, "❌ The Steam top-up payment was canceled.".to_string(), Some(keyboards::back_to_menu())).await?;
            Ok(None)
        }
    }
}
