//! Admin JSON API: login, key pool, support inbox, live chat and statistics

use std::convert::Infallible;
use axum::extract::{Path, Query, Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use futures::Stream;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::broadcast::error::RecvError;
use tracing::warn;
use crate::models::{LicenseKey, Product, StorefrontStats, SupportMessage, SupportThread};
use crate::utils::errors::{Result, WayfisError};
use crate::utils::logging::log_admin_action;
use super::AppState;

pub const SESSION_COOKIE: &str = "admin_session";

/// Login of the admin behind the current request
#[derive(Debug, Clone)]
pub struct AdminSession(pub String);

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub login: String,
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(form): Json<LoginRequest>,
) -> Result<Response> {
    let Some(token) = state.sessions.login(&form.login, &form.password).await? else {
        return Err(WayfisError::Authentication("invalid credentials".to_string()));
    };

    let cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .build();

    Ok((jar.add(cookie), Json(json!({ "ok": true }))).into_response())
}

pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> Result<Response> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.sessions.logout(cookie.value()).await?;
    }

    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    Ok((jar, Json(json!({ "ok": true }))).into_response())
}

/// Reject requests without a live session cookie
pub async fn require_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = jar.get(SESSION_COOKIE).map(|c| c.value().to_string()) else {
        return StatusCode::UNAUTHORIZED.into_response();
    };

    match state.sessions.validate(&token).await {
        Ok(Some(admin)) => {
            request.extensions_mut().insert(AdminSession(admin));
            next.run(request).await
        }
        Ok(None) => StatusCode::UNAUTHORIZED.into_response(),
        Err(e) => e.into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateProductForm {
    pub name: String,
    /// Whole rubles
    pub price: i64,
    #[serde(default)]
    pub description: Option<String>,
}

pub async fn create_product(
    State(state): State<AppState>,
    Extension(AdminSession(admin)): Extension<AdminSession>,
    Json(form): Json<CreateProductForm>,
) -> Result<(StatusCode, Json<Product>)> {
    let product = state.services.shop
        .create_product(&form.name, form.price, form.description)
        .await?;

    log_admin_action(&admin, "create_product", Some(&format!("product {} {}", product.id, product.name)));
    Ok((StatusCode::CREATED, Json(product)))
}

#[derive(Debug, Deserialize)]
pub struct ProductVisibility {
    pub enabled: bool,
}

pub async fn set_product_enabled(
    State(state): State<AppState>,
    Extension(AdminSession(admin)): Extension<AdminSession>,
    Path(product_id): Path<i64>,
    Json(form): Json<ProductVisibility>,
) -> Result<Json<Product>> {
    let product = state.services.shop.set_product_enabled(product_id, form.enabled).await?;

    let action = if form.enabled { "enable_product" } else { "disable_product" };
    log_admin_action(&admin, action, Some(&format!("product {}", product_id)));
    Ok(Json(product))
}

#[derive(Debug, Deserialize)]
pub struct KeysQuery {
    pub product_id: Option<i64>,
}

pub async fn list_keys(
    State(state): State<AppState>,
    Query(query): Query<KeysQuery>,
) -> Result<Json<Vec<LicenseKey>>> {
    let keys = state.services.db.keys.list_keys(query.product_id).await?;
    Ok(Json(keys))
}

#[derive(Debug, Deserialize)]
pub struct AddKeysRequest {
    pub product_id: i64,
    pub keys: Vec<String>,
}

#[derive(Debug, Default, Serialize, PartialEq, Eq)]
pub struct AddKeysReport {
    pub added: usize,
    pub duplicates: Vec<String>,
}

/// Add a batch of keys; duplicates are reported, not fatal
pub async fn add_keys(
    State(state): State<AppState>,
    Extension(AdminSession(admin)): Extension<AdminSession>,
    Json(request): Json<AddKeysRequest>,
) -> Result<(StatusCode, Json<AddKeysReport>)> {
    let mut report = AddKeysReport::default();

    for value in request.keys.iter().map(|v| v.trim()).filter(|v| !v.is_empty()) {
        match state.services.db.keys.add_key(request.product_id, value).await {
            Ok(_) => report.added += 1,
            Err(WayfisError::DuplicateKey(value)) => report.duplicates.push(value),
            Err(e) => return Err(e),
        }
    }

    log_admin_action(
        &admin,
        "add_keys",
        Some(&format!("product {}: {} added, {} duplicates", request.product_id, report.added, report.duplicates.len())),
    );

    Ok((StatusCode::CREATED, Json(report)))
}

pub async fn list_threads(State(state): State<AppState>) -> Result<Json<Vec<SupportThread>>> {
    Ok(Json(state.services.support.list_open_threads().await?))
}

pub async fn chat_history(
    State(state): State<AppState>,
    Path(order_id): Path<i64>,
) -> Result<Json<Vec<SupportMessage>>> {
    Ok(Json(state.services.support.history(order_id).await?))
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub text: String,
}

pub async fn send_message(
    State(state): State<AppState>,
    Extension(AdminSession(admin)): Extension<AdminSession>,
    Path(order_id): Path<i64>,
    Json(request): Json<SendMessageRequest>,
) -> Result<Json<SupportMessage>> {
    let message = state.services.support.post_admin_message(order_id, &request.text).await?;
    log_admin_action(&admin, "chat_reply", Some(&order_id.to_string()));
    Ok(Json(message))
}

pub async fn close_chat(
    State(state): State<AppState>,
    Extension(AdminSession(admin)): Extension<AdminSession>,
    Path(order_id): Path<i64>,
) -> Result<Json<serde_json::Value>> {
    state.services.support.admin_close_thread(order_id).await?;
    log_admin_action(&admin, "chat_close", Some(&order_id.to_string()));
    Ok(Json(json!({ "ok": true })))
}

/// Server-sent stream of new messages in one support thread
pub async fn chat_events(
    State(state): State<AppState>,
    Path(order_id): Path<i64>,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    let mut receiver = state.services.support.hub().subscribe();

    let stream = async_stream::stream! {
        loop {
            match receiver.recv().await {
                Ok(event) if event.order_id == order_id => {
                    match Event::default().event("message").json_data(&event) {
                        Ok(sse) => yield Ok(sse),
                        Err(e) => warn!(error = %e, order_id = order_id, "Failed to encode chat event"),
                    }
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!(order_id = order_id, skipped = skipped, "Chat event stream lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: StorefrontStats,
    pub success_rate: u32,
}

pub async fn stats(State(state): State<AppState>) -> Result<Json<StatsResponse>> {
    let stats = state.services.db.stats.storefront_stats().await?;
    let success_rate = stats.success_rate();
    Ok(Json(StatsResponse { stats, success_rate }))
}
