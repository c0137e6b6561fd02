//! Unauthenticated routes

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use crate::database::health_check;
use crate::models::ProductListing;
use crate::services::{WebhookNotification, WebhookOutcome};
use crate::utils::errors::Result;
use super::AppState;

pub async fn health(State(state): State<AppState>) -> Result<Json<serde_json::Value>> {
    health_check(state.services.db.pool()).await?;
    Ok(Json(json!({ "status": "ok" })))
}

pub async fn products(State(state): State<AppState>) -> Result<Json<Vec<ProductListing>>> {
    Ok(Json(state.services.shop.list_products().await?))
}

#[derive(Debug, Deserialize)]
pub struct TicketRequest {
    pub name: String,
    pub email: String,
    pub message: String,
}

pub async fn ticket(
    State(state): State<AppState>,
    Json(request): Json<TicketRequest>,
) -> Result<Json<serde_json::Value>> {
    state.services.support
        .submit_web_ticket(&request.name, &request.email, &request.message)
        .await?;
    Ok(Json(json!({ "ok": true })))
}

/// Gateway notification; the payment is re-fetched before anything is applied
pub async fn payment_webhook(
    State(state): State<AppState>,
    Json(notification): Json<WebhookNotification>,
) -> Result<Json<serde_json::Value>> {
    let outcome = state.services.webhook.handle(&notification).await?;

    if matches!(outcome, WebhookOutcome::Ignored | WebhookOutcome::UnknownPurpose) {
        info!(event = %notification.event, payment_id = %notification.object.id, "Webhook left unapplied");
    }

    Ok(Json(json!({ "ok": true })))
}
