//! Shop screens: product list, checkout, payment check and key delivery

use teloxide::{Bot, types::ChatId, prelude::*, utils::html};
use url::Url;
use crate::handlers::callbacks::{CallbackAction, CallbackContext};
use crate::handlers::keyboards;
use crate::services::{CheckOutcome, ServiceFactory};
use crate::utils::errors::{GatewayError, Result, WayfisError};
use crate::utils::helpers::format_rub;
use crate::utils::logging::log_user_action;

pub async fn show_products(bot: &Bot, chat_id: ChatId, services: &ServiceFactory) -> Result<()> {
    let products = services.shop.list_products().await?;

    if products.is_empty() {
        bot.send_message(chat_id, "🛒 Products are coming soon!")
            .reply_markup(keyboards::back_to_menu())
            .await?;
        return Ok(());
    }

    bot.send_message(chat_id, "🔑 Choose a license:")
        .reply_markup(keyboards::product_list(&products))
        .await?;

    Ok(())
}

pub(crate) fn confirmation_url(raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|e| WayfisError::Gateway(GatewayError::InvalidResponse(e.to_string())))
}

/// Create an order and show the pay link
pub async fn buy(bot: &Bot, ctx: &CallbackContext, services: &ServiceFactory, product_id: i64) -> Result<Option<String>> {
    let checkout = services.shop.buy(ctx.user_id, product_id).await?;
    let url = confirmation_url(&checkout.confirmation_url)?;

    let text = format!(
        "💳 Pay for:\n<b>{}</b>\nPrice: <b>{}</b>",
        html::escape(&checkout.product.name),
        format_rub(checkout.product.price)
    );

    ctx.show(bot, text, Some(keyboards::checkout(url, CallbackAction::Check(checkout.order_id)))).await?;
    Ok(None)
}

fn key_text(product_name: &str, key: &str) -> String {
    format!(
        "✅ Your key for <b>{}</b>:\n\n<code>{}</code>\n\nThank you for your purchase!",
        html::escape(product_name),
        html::escape(key)
    )
}

/// Poll the order's payment and deliver the key once it is settled
pub async fn check(bot: &Bot, ctx: &CallbackContext, services: &ServiceFactory, order_id: i64) -> Result<Option<String>> {
    match services.shop.check_payment(ctx.user_id, order_id).await? {
        CheckOutcome::Delivered { order_id, product_name, key } => {
            log_user_action(ctx.user_id, "key_delivered", Some(&order_id.to_string()));
            ctx.show(bot, key_text(&product_name, &key), Some(keyboards::delivered(order_id))).await?;
            Ok(None)
        }
        CheckOutcome::AlreadyDelivered { order_id, product_name, key } => {
            ctx.show(bot, key_text(&product_name, &key), Some(keyboards::delivered(order_id))).await?;
            Ok(Some("✅ Already paid".to_string()))
        }
        CheckOutcome::NotSettled { .. } => {
            Ok(Some("⏳ Payment is not completed yet. Try again in a minute.".to_string()))
        }
        CheckOutcome::Canceled { order_id } => {
            ctx.show(
                bot,
                format!("❌ Payment for order #{} was canceled.", order_id),
                Some(keyboards::back_to_menu()),
            )
            .await?;
            Ok(None)
        }
        CheckOutcome::KeyUnavailable { order_id } => {
            ctx.show(
                bot,
                format!(
                    "✅ Payment for order #{} received, but this product just ran out of keys.\n\
                     Support has been notified. Press the button again once we restock.",
                    order_id
                ),
                Some(keyboards::recheck(CallbackAction::Check(order_id))),
            )
            .await?;
            Ok(None)
        }
    }
}

/// Open the order's support thread
pub async fn open_support(bot: &Bot, ctx: &CallbackContext, services: &ServiceFactory, order_id: i64) -> Result<Option<String>> {
    services.support.open_thread(ctx.user_id, order_id).await?;

    ctx.show(
        bot,
        "👨‍🔧 Support is connected!\nWrite your question:".to_string(),
        Some(keyboards::support_thread(order_id)),
    )
    .await?;

    Ok(None)
}

/// Close the order's support thread
pub async fn close_support(bot: &Bot, ctx: &CallbackContext, services: &ServiceFactory, order_id: i64) -> Result<Option<String>> {
    services.support.close_thread(ctx.user_id, order_id).await?;
    ctx.show(bot, "🔒 Order closed. Thank you!".to_string(), None).await?;
    Ok(None)
}
