//! Mock Telegram Bot API server
//!
//! Accepts every bot method and answers with a plain private-chat message,
//! which is enough for `sendMessage`, `editMessageText` and alerts.

use serde_json::{json, Value};
use url::Url;
use wiremock::{
    matchers::{method, path_regex},
    Mock, MockServer, ResponseTemplate,
};

pub struct TelegramMockServer {
    pub server: MockServer,
}

impl TelegramMockServer {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn api_url(&self) -> Url {
        Url::parse(&self.server.uri()).expect("mock server uri is a valid url")
    }

    pub async fn setup_default_mocks(&self) {
        Mock::given(method("POST"))
            .and(path_regex(r"^/bot[^/]+/(?i)answercallbackquery$"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "result": true })))
            .with_priority(1)
            .mount(&self.server)
            .await;

        Mock::given(method("POST"))
            .and(path_regex(r"^/bot[^/]+/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "result": sent_message(ADMIN_CHAT_ID, "ok"),
            })))
            .mount(&self.server)
            .await;
    }

    /// Texts of every `sendMessage` call so far
    pub async fn sent_texts(&self) -> Vec<String> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|r| r.url.path().to_lowercase().ends_with("/sendmessage"))
            .filter_map(|r| serde_json::from_slice::<Value>(&r.body).ok())
            .filter_map(|body| body.get("text").and_then(Value::as_str).map(str::to_string))
            .collect()
    }
}

pub const ADMIN_CHAT_ID: i64 = 424242;

fn sent_message(chat_id: i64, text: &str) -> Value {
    json!({
        "message_id": 123,
        "from": {
            "id": 12345,
            "is_bot": true,
            "first_name": "WayfisBot",
            "username": "wayfis_bot"
        },
        "chat": {
            "id": chat_id,
            "type": "private",
            "first_name": "Admin"
        },
        "date": 1767225600,
        "text": text
    })
}
