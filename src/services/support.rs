//! Per-order support chat and general tickets
//!
//! Messages are stored per order and fanned out to live admin viewers through
//! [`ChatHub`]. A user has at most one thread they are typing into: the most
//! recent order whose support status is open.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, warn};
use crate::database::DatabaseService;
use crate::models::{MessageSender, Order, SupportMessage, SupportStatus, SupportThread};
use crate::services::notification::AdminNotifier;
use crate::utils::errors::{Result, WayfisError};
use crate::utils::helpers::truncate_text;
use crate::utils::logging::log_user_action;

const MAX_MESSAGE_CHARS: usize = 4000;

/// A chat message as pushed to live viewers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatEvent {
    pub order_id: i64,
    pub sender: MessageSender,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl From<&SupportMessage> for ChatEvent {
    fn from(message: &SupportMessage) -> Self {
        Self {
            order_id: message.order_id,
            sender: message.sender,
            text: message.text.clone(),
            created_at: message.created_at,
        }
    }
}

/// In-process fan-out of chat events
#[derive(Clone)]
#[derive(Debug)]
pub struct ChatHub {
    sender: broadcast::Sender<ChatEvent>,
}

impl ChatHub {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn publish(&self, event: ChatEvent) {
        // No receivers just means nobody is watching
        if self.sender.send(event).is_err() {
            debug!("Chat event dropped, no live viewers");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.sender.subscribe()
    }
}

impl Default for ChatHub {
    fn default() -> Self {
        Self::new(256)
    }
}

#[derive(Clone)]
#[derive(Debug)]
pub struct SupportService {
    db: DatabaseService,
    hub: ChatHub,
    notifier: AdminNotifier,
}

impl SupportService {
    pub fn new(db: DatabaseService, hub: ChatHub, notifier: AdminNotifier) -> Self {
        Self { db, hub, notifier }
    }

    pub fn hub(&self) -> &ChatHub {
        &self.hub
    }

    async fn owned_order(&self, user_id: i64, order_id: i64) -> Result<Order> {
        self.db.orders
            .find_by_id(order_id)
            .await?
            .filter(|o| o.user_id == user_id)
            .ok_or_else(|| WayfisError::not_found("Order", order_id))
    }

    /// Open the help thread of one of the user's orders
    pub async fn open_thread(&self, user_id: i64, order_id: i64) -> Result<Order> {
        self.owned_order(user_id, order_id).await?;
        let order = self.db.orders.set_support_status(order_id, SupportStatus::Open).await?;

        log_user_action(user_id, "support_opened", Some(&order_id.to_string()));
        self.notifier.support_thread_opened(order_id).await;
        Ok(order)
    }

    /// Close the help thread of one of the user's orders
    pub async fn close_thread(&self, user_id: i64, order_id: i64) -> Result<Order> {
        self.owned_order(user_id, order_id).await?;
        log_user_action(user_id, "support_closed", Some(&order_id.to_string()));
        self.db.orders.set_support_status(order_id, SupportStatus::Closed).await
    }

    /// Close any order's thread from the admin side
    pub async fn admin_close_thread(&self, order_id: i64) -> Result<Order> {
        self.db.orders.set_support_status(order_id, SupportStatus::Closed).await
    }

    /// Store a user's message in their open thread.
    ///
    /// Returns `None` when the user has no open thread.
    pub async fn post_user_message(&self, user_id: i64, text: &str) -> Result<Option<SupportMessage>> {
        let text = clean_text(text)?;

        let Some(order) = self.db.orders.find_open_support_order_for_user(user_id).await? else {
            return Ok(None);
        };

        let message = self.db.support.save_message(order.id, MessageSender::User, &text).await?;
        self.hub.publish(ChatEvent::from(&message));
        self.notifier.support_message(order.id, &text).await;

        Ok(Some(message))
    }

    /// Store an admin reply and relay it to the customer
    pub async fn post_admin_message(&self, order_id: i64, text: &str) -> Result<SupportMessage> {
        let text = clean_text(text)?;

        let order = self.db.orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| WayfisError::not_found("Order", order_id))?;

        let message = self.db.support.save_message(order.id, MessageSender::Admin, &text).await?;
        self.hub.publish(ChatEvent::from(&message));

        if let Err(e) = self.notifier.send_to_user(order.user_id, &text).await {
            warn!(order_id = order_id, error = %e, "Failed to relay support reply to user");
        }

        Ok(message)
    }

    pub async fn history(&self, order_id: i64) -> Result<Vec<SupportMessage>> {
        if self.db.orders.find_by_id(order_id).await?.is_none() {
            return Err(WayfisError::not_found("Order", order_id));
        }
        self.db.support.history(order_id).await
    }

    pub async fn list_open_threads(&self) -> Result<Vec<SupportThread>> {
        self.db.orders.list_open_support_threads().await
    }

    /// Forward a general support request from the bot to the operator
    pub async fn submit_ticket(&self, user_id: i64, display_name: &str, username: Option<&str>, text: &str) -> Result<()> {
        let text = clean_text(text)?;
        log_user_action(user_id, "ticket_submitted", None);
        self.notifier.new_ticket(user_id, display_name, username, &text).await;
        Ok(())
    }

    /// Forward a ticket submitted through the website
    pub async fn submit_web_ticket(&self, name: &str, email: &str, message: &str) -> Result<()> {
        if name.trim().is_empty() || email.trim().is_empty() || message.trim().is_empty() {
            return Err(WayfisError::InvalidInput("All fields are required".to_string()));
        }
        let message = clean_text(message)?;
        self.notifier.web_ticket(name.trim(), email.trim(), &message).await;
        Ok(())
    }
}

fn clean_text(text: &str) -> Result<String> {
    let text = text.trim();
    if text.is_empty() {
        return Err(WayfisError::InvalidInput("Message must not be empty".to_string()));
    }
    Ok(truncate_text(text, MAX_MESSAGE_CHARS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hub_delivers_to_subscribers() {
        let hub = ChatHub::new(8);
        let mut rx = hub.subscribe();

        let event = ChatEvent {
            order_id: 3,
            sender: MessageSender::User,
            text: "key does not activate".to_string(),
            created_at: Utc::now(),
        };
        hub.publish(event.clone());

        assert_eq!(rx.recv().await.unwrap(), event);
    }

    #[test]
    fn test_publish_without_viewers_is_fine() {
        let hub = ChatHub::default();
        hub.publish(ChatEvent {
            order_id: 1,
            sender: MessageSender::Admin,
            text: "hello".to_string(),
            created_at: Utc::now(),
        });
    }

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text("  hi  ").unwrap(), "hi");
        assert!(matches!(clean_text("   "), Err(WayfisError::InvalidInput(_))));
        assert_eq!(clean_text(&"a".repeat(5000)).unwrap().chars().count(), MAX_MESSAGE_CHARS);
    }
}
