//! Operator notifications
//!
//! Plain-text alerts to the configured admin chat, plus relaying support
//! replies to customers. Alerts are best effort: a failed send is logged and
//! never retried or surfaced to the caller.

use teloxide::{Bot, types::ChatId, requests::Requester};
use tracing::{debug, error};
use crate::utils::errors::Result;
use crate::utils::helpers::format_rub;

#[derive(Clone)]
#[derive(Debug)]
pub struct AdminNotifier {
    bot: Bot,
    admin_chat_id: ChatId,
}

impl AdminNotifier {
    pub fn new(bot: Bot, admin_chat_id: i64) -> Self {
        Self {
            bot,
            admin_chat_id: ChatId(admin_chat_id),
        }
    }

    /// Send an alert to the admin chat, logging any failure
    pub async fn notify(&self, text: impl Into<String>) {
        match self.bot.send_message(self.admin_chat_id, text.into()).await {
            Ok(_) => debug!(chat_id = self.admin_chat_id.0, "Admin alert sent"),
            Err(e) => error!(chat_id = self.admin_chat_id.0, error = %e, "Failed to send admin alert"),
        }
    }

    pub async fn new_ticket(&self, user_id: i64, display_name: &str, username: Option<&str>, text: &str) {
        self.notify(format!(
            "🆘 New support request\nUser: {} (@{})\nID: {}\n\nMessage: {}",
            display_name,
            username.unwrap_or("not set"),
            user_id,
            text
        ))
        .await;
    }

    pub async fn web_ticket(&self, name: &str, email: &str, message: &str) {
        self.notify(format!(
            "🎫 New ticket from the website\n\nName: {}\nEmail: {}\n\nMessage: {}",
            name, email, message
        ))
        .await;
    }

    pub async fn support_thread_opened(&self, order_id: i64) {
        self.notify(format!("🆘 New support request for order #{}", order_id)).await;
    }

    pub async fn support_message(&self, order_id: i64, text: &str) {
        self.notify(format!("💬 Order #{}: {}", order_id, text)).await;
    }

    pub async fn steam_topup(&self, user_id: i64, amount: i64, payment_id: &str) {
        self.notify(format!(
            "💰 Steam top-up from {}\nAmount: {}\nPayment: {}",
            user_id,
            format_rub(amount),
            payment_id
        ))
        .await;
    }

    pub async fn undeliverable_order(&self, order_id: i64, product_id: i64) {
        self.notify(format!(
            "⚠️ Order #{} is paid but product {} has no free keys. Restock and ask the customer to re-check.",
            order_id, product_id
        ))
        .await;
    }

    /// Relay a support reply to the customer; errors are returned so the admin sees them
    pub async fn send_to_user(&self, user_id: i64, text: &str) -> Result<()> {
        self.bot
            .send_message(ChatId(user_id), format!("👨‍💼 Support:\n{}", text))
            .await?;
        Ok(())
    }
}
