//! Admin and public HTTP surface
//!
//! Public routes serve the product catalogue, web tickets and the payment
//! gateway webhook. Everything under `/admin` except login sits behind the
//! Redis session gate in [`admin::require_session`].

pub mod admin;
pub mod error;
pub mod public;

use std::sync::Arc;
use axum::{middleware, routing::{get, post}, Router};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;
use crate::services::{ServiceFactory, SessionStore};
use crate::utils::errors::Result;

/// Shared state of every HTTP handler
#[derive(Clone)]
pub struct AppState {
    pub services: Arc<ServiceFactory>,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(services: Arc<ServiceFactory>, sessions: SessionStore) -> Self {
        Self { services, sessions }
    }
}

pub fn router(state: AppState) -> Router {
    let admin = Router::new()
        .route("/logout", post(admin::logout))
        .route("/products", post(admin::create_product))
        .route("/products/:product_id/enabled", post(admin::set_product_enabled))
        .route("/keys", get(admin::list_keys).post(admin::add_keys))
        .route("/support", get(admin::list_threads))
        .route("/chat/:order_id", get(admin::chat_history))
        .route("/chat/:order_id/send", post(admin::send_message))
        .route("/chat/:order_id/close", post(admin::close_chat))
        .route("/chat/:order_id/events", get(admin::chat_events))
        .route("/stats", get(admin::stats))
        .route_layer(middleware::from_fn_with_state(state.clone(), admin::require_session))
        .route("/login", post(admin::login));

    Router::new()
        .route("/health", get(public::health))
        .route("/api/products", get(public::products))
        .route("/api/ticket", post(public::ticket))
        .route("/payments/webhook", post(public::payment_webhook))
        .nest("/admin", admin)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until the process exits
pub async fn serve(bind_addr: &str, state: AppState) -> Result<()> {
    let listener = TcpListener::bind(bind_addr).await?;
    info!(addr = bind_addr, "Admin web listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}
