//! Services module
//!
//! This module contains business logic services

pub mod notification;
pub mod payment;
pub mod sessions;
pub mod shop;
pub mod support;
pub mod topup;
pub mod webhook;

// Re-export commonly used services
pub use notification::AdminNotifier;
pub use payment::{PaymentGateway, PaymentStatus, PaymentPurpose, PaymentInfo, CreatedPayment, WebhookNotification};
pub use sessions::SessionStore;
pub use shop::{ShopService, Checkout, CheckOutcome};
pub use support::{SupportService, ChatHub, ChatEvent};
pub use topup::{TopUpService, FeePolicy, SteamQuote, TopUpCheckout, WalletTopUpOutcome, SteamTopUpOutcome};
pub use webhook::{WebhookService, WebhookOutcome};

use crate::config::settings::Settings;
use crate::database::DatabaseService;
use crate::utils::errors::Result;
use teloxide::Bot;

/// Service factory for creating and managing all services
#[derive(Clone)]
#[derive(Debug)]
pub struct ServiceFactory {
    pub db: DatabaseService,
    pub gateway: PaymentGateway,
    pub notifier: AdminNotifier,
    pub shop: ShopService,
    pub topup: TopUpService,
    pub support: SupportService,
    pub webhook: WebhookService,
}

impl ServiceFactory {
    /// Create a new ServiceFactory with all services initialized
    pub fn new(bot: Bot, settings: &Settings, db: DatabaseService) -> Result<Self> {
        let gateway = PaymentGateway::new(settings.payment.clone())?;
        let notifier = AdminNotifier::new(bot, settings.bot.admin_chat_id);

        let shop = ShopService::new(db.clone(), gateway.clone(), notifier.clone());
        let topup = TopUpService::new(db.clone(), gateway.clone(), notifier.clone(), &settings.topup);
        let support = SupportService::new(db.clone(), ChatHub::default(), notifier.clone());
        let webhook = WebhookService::new(gateway.clone(), shop.clone(), topup.clone());

        Ok(Self {
            db,
            gateway,
            notifier,
            shop,
            topup,
            support,
            webhook,
        })
    }
}
