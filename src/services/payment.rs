//! YooKassa payment gateway client
//!
//! Creates redirect payments and polls their status. Every create call carries
//! a fresh `Idempotence-Key`; amounts go over the wire as decimal strings with
//! exactly two fraction digits.

use std::collections::HashMap;
use std::time::Duration;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};
use crate::config::PaymentConfig;
use crate::utils::errors::{GatewayError, GatewayResult};
use crate::utils::helpers::{format_amount, generate_uuid, parse_decimal_amount};

/// Remote payment status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PaymentStatus {
    Pending,
    WaitingForCapture,
    Succeeded,
    Canceled,
    Other(String),
}

impl PaymentStatus {
    /// Money is confirmed: either captured or authorized for capture
    pub fn is_settled(&self) -> bool {
        matches!(self, PaymentStatus::Succeeded | PaymentStatus::WaitingForCapture)
    }

    pub fn as_str(&self) -> &str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::WaitingForCapture => "waiting_for_capture",
            PaymentStatus::Succeeded => "succeeded",
            PaymentStatus::Canceled => "canceled",
            PaymentStatus::Other(status) => status,
        }
    }
}

impl From<String> for PaymentStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "pending" => PaymentStatus::Pending,
            "waiting_for_capture" => PaymentStatus::WaitingForCapture,
            "succeeded" => PaymentStatus::Succeeded,
            "canceled" => PaymentStatus::Canceled,
            _ => PaymentStatus::Other(value),
        }
    }
}

impl From<PaymentStatus> for String {
    fn from(status: PaymentStatus) -> Self {
        status.as_str().to_string()
    }
}

/// What a payment pays for, carried in the payment metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentPurpose {
    Purchase { order_id: i64 },
    WalletTopUp { user_id: i64 },
    /// `amount` is the Steam credit in minor units, before commission
    SteamTopUp { user_id: i64, amount: i64 },
}

impl PaymentPurpose {
    /// Gateway metadata accepts string values only
    pub fn to_metadata(&self) -> HashMap<String, String> {
        let mut metadata = HashMap::new();
        match self {
            PaymentPurpose::Purchase { order_id } => {
                metadata.insert("type".to_string(), "purchase".to_string());
                metadata.insert("order_id".to_string(), order_id.to_string());
            }
            PaymentPurpose::WalletTopUp { user_id } => {
                metadata.insert("type".to_string(), "wallet_topup".to_string());
                metadata.insert("user_id".to_string(), user_id.to_string());
            }
            PaymentPurpose::SteamTopUp { user_id, amount } => {
                metadata.insert("type".to_string(), "steam_topup".to_string());
                metadata.insert("user_id".to_string(), user_id.to_string());
                metadata.insert("amount".to_string(), amount.to_string());
            }
        }
        metadata
    }

    pub fn from_metadata(metadata: &HashMap<String, Value>) -> Option<Self> {
        let field = |name: &str| -> Option<i64> {
            match metadata.get(name)? {
                Value::String(s) => s.parse().ok(),
                Value::Number(n) => n.as_i64(),
                _ => None,
            }
        };

        match metadata.get("type")?.as_str()? {
            "purchase" => Some(PaymentPurpose::Purchase { order_id: field("order_id")? }),
            "wallet_topup" => Some(PaymentPurpose::WalletTopUp { user_id: field("user_id")? }),
            "steam_topup" => Some(PaymentPurpose::SteamTopUp {
                user_id: field("user_id")?,
                amount: field("amount")?,
            }),
            _ => None,
        }
    }
}

/// Payment just created on the gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedPayment {
    pub id: String,
    pub status: PaymentStatus,
    pub confirmation_url: String,
}

/// Current state of a remote payment
#[derive(Debug, Clone)]
pub struct PaymentInfo {
    pub id: String,
    pub status: PaymentStatus,
    /// Gateway-confirmed amount in minor units
    pub amount: i64,
    pub currency: String,
    pub metadata: HashMap<String, Value>,
}

impl PaymentInfo {
    pub fn purpose(&self) -> Option<PaymentPurpose> {
        PaymentPurpose::from_metadata(&self.metadata)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireAmount {
    value: String,
    currency: String,
}

#[derive(Debug, Serialize)]
struct CreatePaymentBody<'a> {
    amount: WireAmount,
    confirmation: WireConfirmationRequest<'a>,
    capture: bool,
    description: &'a str,
    metadata: HashMap<String, String>,
}

#[derive(Debug, Serialize)]
struct WireConfirmationRequest<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    return_url: &'a str,
}

#[derive(Debug, Deserialize)]
struct WirePayment {
    id: String,
    status: PaymentStatus,
    amount: WireAmount,
    #[serde(default)]
    confirmation: Option<WireConfirmation>,
    #[serde(default)]
    metadata: HashMap<String, Value>,
}

#[derive(Debug, Deserialize)]
struct WireConfirmation {
    #[serde(default)]
    confirmation_url: Option<String>,
}

/// Incoming webhook notification; only the payment id is trusted
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookNotification {
    pub event: String,
    pub object: WebhookObject,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookObject {
    pub id: String,
}

/// Payment gateway adapter
#[derive(Clone)]
#[derive(Debug)]
pub struct PaymentGateway {
    client: Client,
    config: PaymentConfig,
}

impl PaymentGateway {
    pub fn new(config: PaymentConfig) -> GatewayResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent("Wayfis-Shop/1.0")
            .build()
            .map_err(|e| GatewayError::Request(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Currency every payment is created in
    pub fn currency(&self) -> &str {
        &self.config.currency
    }

    /// Create a redirect payment for `amount` minor units
    pub async fn create_payment(
        &self,
        amount: i64,
        description: &str,
        purpose: PaymentPurpose,
    ) -> GatewayResult<CreatedPayment> {
        if amount <= 0 {
            return Err(GatewayError::Request(format!("non-positive amount {}", amount)));
        }

        let url = format!("{}/payments", self.config.api_url.trim_end_matches('/'));
        let body = CreatePaymentBody {
            amount: WireAmount {
                value: format_amount(amount),
                currency: self.config.currency.clone(),
            },
            confirmation: WireConfirmationRequest {
                kind: "redirect",
                return_url: &self.config.return_url,
            },
            capture: true,
            description,
            metadata: purpose.to_metadata(),
        };

        debug!(amount = amount, purpose = ?purpose, "Creating gateway payment");

        let response = self.client
            .post(&url)
            .basic_auth(&self.config.shop_id, Some(&self.config.secret_key))
            .header("Idempotence-Key", generate_uuid())
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let payment = read_payment(response).await?;

        let confirmation_url = payment.confirmation
            .and_then(|c| c.confirmation_url)
            .ok_or_else(|| GatewayError::InvalidResponse("missing confirmation_url".to_string()))?;

        Ok(CreatedPayment {
            id: payment.id,
            status: payment.status,
            confirmation_url,
        })
    }

    /// Fetch the current state of a payment
    pub async fn get_payment(&self, payment_id: &str) -> GatewayResult<PaymentInfo> {
        let url = format!("{}/payments/{}", self.config.api_url.trim_end_matches('/'), payment_id);

        let response = self.client
            .get(&url)
            .basic_auth(&self.config.shop_id, Some(&self.config.secret_key))
            .send()
            .await
            .map_err(map_transport_error)?;

        let payment = read_payment(response).await?;

        let amount = parse_decimal_amount(&payment.amount.value).ok_or_else(|| {
            GatewayError::InvalidResponse(format!("bad amount value {}", payment.amount.value))
        })?;

        Ok(PaymentInfo {
            id: payment.id,
            status: payment.status,
            amount,
            currency: payment.amount.currency,
            metadata: payment.metadata,
        })
    }
}

fn map_transport_error(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Timeout
    } else {
        GatewayError::Request(e.to_string())
    }
}

async fn read_payment(response: Response) -> GatewayResult<WirePayment> {
    let status = response.status();
    let body = response.text().await.map_err(map_transport_error)?;

    if !status.is_success() {
        warn!(status = status.as_u16(), "Gateway rejected request");
        return Err(GatewayError::Status { status: status.as_u16(), body });
    }

    serde_json::from_str(&body).map_err(|e| GatewayError::InvalidResponse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_settled_statuses() {
        assert!(PaymentStatus::Succeeded.is_settled());
        assert!(PaymentStatus::WaitingForCapture.is_settled());
        assert!(!PaymentStatus::Pending.is_settled());
        assert!(!PaymentStatus::Canceled.is_settled());
        assert!(!PaymentStatus::Other("refunded".into()).is_settled());
    }

    #[test]
    fn test_unknown_status_is_kept() {
        let status: PaymentStatus = serde_json::from_value(json!("refunded")).unwrap();
        assert_eq!(status, PaymentStatus::Other("refunded".to_string()));
        assert_eq!(status.as_str(), "refunded");
    }

    #[test]
    fn test_purpose_metadata_round_trip() {
        let purposes = [
            PaymentPurpose::Purchase { order_id: 7 },
            PaymentPurpose::WalletTopUp { user_id: 42 },
            PaymentPurpose::SteamTopUp { user_id: 42, amount: 100_000 },
        ];

        for purpose in purposes {
            let metadata: HashMap<String, Value> = purpose
                .to_metadata()
                .into_iter()
                .map(|(k, v)| (k, Value::String(v)))
                .collect();
            assert_eq!(PaymentPurpose::from_metadata(&metadata), Some(purpose));
        }
    }

    #[test]
    fn test_metadata_without_type_is_ignored() {
        let metadata: HashMap<String, Value> =
            serde_json::from_value(json!({ "orderId": "5" })).unwrap();
        assert_eq!(PaymentPurpose::from_metadata(&metadata), None);
    }

    #[test]
    fn test_webhook_notification_parses() {
        let notification: WebhookNotification = serde_json::from_value(json!({
            "type": "notification",
            "event": "payment.succeeded",
            "object": { "id": "2d1b-000f", "status": "succeeded" }
        }))
        .unwrap();

        assert_eq!(notification.event, "payment.succeeded");
        assert_eq!(notification.object.id, "2d1b-000f");
    }
}
