//! Gateway webhook processing
//!
//! A notification only tells us which payment changed. The payment is fetched
//! from the gateway again and routed by its metadata to the purchase or
//! top-up flow, so a forged notification cannot mark anything paid.

use tracing::{info, warn};
use crate::services::payment::{PaymentGateway, PaymentPurpose, WebhookNotification};
use crate::services::shop::{CheckOutcome, ShopService};
use crate::services::topup::{SteamTopUpOutcome, TopUpService, WalletTopUpOutcome};
use crate::utils::errors::Result;
use crate::utils::logging::log_payment_event;

/// What a webhook delivery ended up doing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    Purchase(CheckOutcome),
    WalletTopUp(WalletTopUpOutcome),
    SteamTopUp(SteamTopUpOutcome),
    /// Event type we do not act on
    Ignored,
    /// Payment carries no metadata we recognise
    UnknownPurpose,
}

#[derive(Clone)]
#[derive(Debug)]
pub struct WebhookService {
    gateway: PaymentGateway,
    shop: ShopService,
    topup: TopUpService,
}

impl WebhookService {
    pub fn new(gateway: PaymentGateway, shop: ShopService, topup: TopUpService) -> Self {
        Self { gateway, shop, topup }
    }

    pub async fn handle(&self, notification: &WebhookNotification) -> Result<WebhookOutcome> {
        if !matches!(notification.event.as_str(), "payment.succeeded" | "payment.waiting_for_capture" | "payment.canceled") {
            info!(event = %notification.event, "Ignoring webhook event");
            return Ok(WebhookOutcome::Ignored);
        }

        let payment = self.gateway.get_payment(&notification.object.id).await?;
        log_payment_event(&payment.id, &notification.event, None, Some(payment.amount));

        let outcome = match payment.purpose() {
            Some(PaymentPurpose::Purchase { order_id }) => {
                WebhookOutcome::Purchase(self.shop.apply_payment(order_id, &payment).await?)
            }
            Some(PaymentPurpose::WalletTopUp { user_id }) => {
                WebhookOutcome::WalletTopUp(self.topup.apply_wallet_payment(user_id, &payment).await?)
            }
            Some(PaymentPurpose::SteamTopUp { .. }) => {
                WebhookOutcome::SteamTopUp(self.topup.apply_steam_payment(&payment).await?)
            }
            None => {
                warn!(payment_id = %payment.id, "Webhook payment has unknown metadata");
                WebhookOutcome::UnknownPurpose
            }
        };

        Ok(outcome)
    }
}
