//! Per-order support threads, live chat events and tickets

mod helpers;

use assert_matches::assert_matches;
use helpers::*;
use serial_test::serial;
use wayfis::models::{MessageSender, SupportStatus};
use wayfis::utils::errors::WayfisError;

const CUSTOMER: i64 = 6006;

#[tokio::test]
#[serial]
async fn test_support_thread_lifecycle() {
    let ctx = require_context!();
    create_user(&ctx.services, CUSTOMER).await;
    let product = create_product(&ctx.services, "Windows 11 Pro", 1999, &["K1"]).await;
    let order = ctx.services.db.orders.create(CUSTOMER, product.id).await.unwrap();

    let support = &ctx.services.support;
    let mut events = support.hub().subscribe();

    // Nothing is relayed before a thread is open
    assert!(support.post_user_message(CUSTOMER, "hello?").await.unwrap().is_none());

    let opened = support.open_thread(CUSTOMER, order.id).await.unwrap();
    assert_eq!(opened.support_status, SupportStatus::Open);

    let message = support.post_user_message(CUSTOMER, "  Key does not activate  ").await.unwrap().unwrap();
    assert_eq!(message.order_id, order.id);
    assert_eq!(message.sender, MessageSender::User);
    assert_eq!(message.text, "Key does not activate");

    let event = events.recv().await.unwrap();
    assert_eq!(event.order_id, order.id);
    assert_eq!(event.text, "Key does not activate");

    let threads = support.list_open_threads().await.unwrap();
    assert_eq!(threads.len(), 1);
    assert_eq!(threads[0].order_id, order.id);
    assert_eq!(threads[0].product_name, "Windows 11 Pro");
    assert_eq!(threads[0].last_message.as_deref(), Some("Key does not activate"));

    let reply = support.post_admin_message(order.id, "Try the new key").await.unwrap();
    assert_eq!(reply.sender, MessageSender::Admin);
    assert_eq!(events.recv().await.unwrap().sender, MessageSender::Admin);

    let relayed = ctx.telegram.sent_texts().await;
    assert!(relayed.iter().any(|t| t.contains("Support:") && t.contains("Try the new key")));

    let history = support.history(order.id).await.unwrap();
    let texts: Vec<_> = history.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, vec!["Key does not activate", "Try the new key"]);

    let closed = support.close_thread(CUSTOMER, order.id).await.unwrap();
    assert_eq!(closed.support_status, SupportStatus::Closed);
    assert!(support.post_user_message(CUSTOMER, "still there?").await.unwrap().is_none());
    assert!(support.list_open_threads().await.unwrap().is_empty());
}

#[tokio::test]
#[serial]
async fn test_latest_open_thread_receives_messages() {
    let ctx = require_context!();
    create_user(&ctx.services, CUSTOMER).await;
    let product = create_product(&ctx.services, "Windows 11 Pro", 1999, &["K1", "K2"]).await;
    let older = ctx.services.db.orders.create(CUSTOMER, product.id).await.unwrap();
    let newer = ctx.services.db.orders.create(CUSTOMER, product.id).await.unwrap();

    ctx.services.support.open_thread(CUSTOMER, older.id).await.unwrap();
    ctx.services.support.open_thread(CUSTOMER, newer.id).await.unwrap();

    let message = ctx.services.support.post_user_message(CUSTOMER, "which one?").await.unwrap().unwrap();
    assert_eq!(message.order_id, newer.id);
}

#[tokio::test]
#[serial]
async fn test_cannot_open_someone_elses_thread() {
    let ctx = require_context!();
    create_user(&ctx.services, CUSTOMER).await;
    create_user(&ctx.services, 7007).await;
    let product = create_product(&ctx.services, "Windows 11 Pro", 1999, &["K1"]).await;
    let order = ctx.services.db.orders.create(CUSTOMER, product.id).await.unwrap();

    let err = ctx.services.support.open_thread(7007, order.id).await.unwrap_err();
    assert_matches!(err, WayfisError::NotFound { entity: "Order", .. });

    let err = ctx.services.support.history(order.id + 100).await.unwrap_err();
    assert_matches!(err, WayfisError::NotFound { .. });
}

#[tokio::test]
#[serial]
async fn test_tickets_reach_the_operator() {
    let ctx = require_context!();

    ctx.services.support
        .submit_ticket(CUSTOMER, "Test User", Some("tester"), "Where is my key?")
        .await
        .unwrap();
    ctx.services.support
        .submit_web_ticket("Anna", "anna@example.com", "Invoice please")
        .await
        .unwrap();

    let err = ctx.services.support.submit_web_ticket("Anna", " ", "Invoice please").await.unwrap_err();
    assert_matches!(err, WayfisError::InvalidInput(_));

    let err = ctx.services.support.submit_ticket(CUSTOMER, "Test User", None, "   ").await.unwrap_err();
    assert_matches!(err, WayfisError::InvalidInput(_));

    let alerts = ctx.telegram.sent_texts().await;
    assert!(alerts.iter().any(|t| t.contains("Where is my key?") && t.contains("@tester")));
    assert!(alerts.iter().any(|t| t.contains("anna@example.com")));
}
