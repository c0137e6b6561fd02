//! Mock YooKassa API
//!
//! Later mounts take priority over earlier ones, so a test can move a payment
//! from `pending` to `succeeded` by mounting a new status.

use serde_json::{json, Value};
use std::sync::atomic::{AtomicU8, Ordering};
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

pub const CONFIRMATION_URL: &str = "https://yoomoney.ru/checkout/payments/v2/contract?orderId=test";

pub struct GatewayMock {
    pub server: MockServer,
    priority: AtomicU8,
}

impl GatewayMock {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
            priority: AtomicU8::new(u8::MAX),
        }
    }

    pub fn api_url(&self) -> String {
        self.server.uri()
    }

    fn next_priority(&self) -> u8 {
        self.priority.fetch_sub(1, Ordering::SeqCst).max(1)
    }

    /// Every payment creation returns `payment_id` in `pending`
    pub async fn mock_create_payment(&self, payment_id: &str, amount: &str) {
        Mock::given(method("POST"))
            .and(path("/payments"))
            .respond_with(ResponseTemplate::new(200).set_body_json(payment_body(
                payment_id,
                "pending",
                amount,
                json!({}),
                true,
            )))
            .with_priority(self.next_priority())
            .mount(&self.server)
            .await;
    }

    /// Answer `GET /payments/{payment_id}` with the given status and metadata
    pub async fn mock_payment_status(&self, payment_id: &str, status: &str, amount: &str, metadata: Value) {
        Mock::given(method("GET"))
            .and(path(format!("/payments/{}", payment_id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(payment_body(
                payment_id, status, amount, metadata, false,
            )))
            .with_priority(self.next_priority())
            .mount(&self.server)
            .await;
    }

    pub async fn mock_purchase_status(&self, payment_id: &str, status: &str, amount: &str, order_id: i64) {
        let metadata = json!({ "type": "purchase", "order_id": order_id.to_string() });
        self.mock_payment_status(payment_id, status, amount, metadata).await;
    }

    pub async fn mock_wallet_status(&self, payment_id: &str, status: &str, amount: &str, user_id: i64) {
        let metadata = json!({ "type": "wallet_topup", "user_id": user_id.to_string() });
        self.mock_payment_status(payment_id, status, amount, metadata).await;
    }

    pub async fn mock_steam_status(&self, payment_id: &str, status: &str, charge: &str, user_id: i64, amount: i64) {
        let metadata = json!({
            "type": "steam_topup",
            "user_id": user_id.to_string(),
            "amount": amount.to_string(),
        });
        self.mock_payment_status(payment_id, status, charge, metadata).await;
    }

    pub async fn received_requests(&self) -> Vec<wiremock::Request> {
        self.server.received_requests().await.unwrap_or_default()
    }
}

pub fn payment_body(payment_id: &str, status: &str, amount: &str, metadata: Value, with_confirmation: bool) -> Value {
    let mut body = json!({
        "id": payment_id,
        "status": status,
        "paid": status == "succeeded",
        "amount": { "value": amount, "currency": "RUB" },
        "created_at": "2026-01-01T00:00:00.000Z",
        "metadata": metadata,
    });

    if with_confirmation {
        body["confirmation"] = json!({
            "type": "redirect",
            "confirmation_url": CONFIRMATION_URL,
        });
    }

    body
}
