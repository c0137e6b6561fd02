//! Purchase flow: reserve stock, take payment, deliver a key
//!
//! A purchase creates a pending order and a gateway payment. Once the gateway
//! reports the payment settled, one transaction locks the order, picks a free
//! key, binds it to the order and marks the order paid. Re-checks of a paid
//! order return the stored key, so the poll path and the webhook path can both
//! run without delivering twice. A settled order with no free key is reported
//! to the operator once and stays pending until a restock.

use tracing::{info, warn};
use crate::database::{DatabaseService, KeyRepository, OrderRepository};
use crate::models::{CreateProductRequest, OrderStatus, Order, Product, ProductListing};
use crate::services::notification::AdminNotifier;
use crate::services::payment::{PaymentGateway, PaymentInfo, PaymentPurpose, PaymentStatus};
use crate::utils::errors::{Result, WayfisError};
use crate::utils::helpers::{rubles, MAX_USER_AMOUNT_RUBLES};
use crate::utils::logging::{log_api_error, log_payment_event, log_user_action};

/// A created purchase awaiting payment
#[derive(Debug, Clone)]
pub struct Checkout {
    pub order_id: i64,
    pub product: Product,
    pub payment_id: String,
    pub confirmation_url: String,
}

/// Result of checking a purchase payment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// Settled now; the key was bound to the order by this call
    Delivered { order_id: i64, product_name: String, key: String },
    /// The order was already paid earlier
    AlreadyDelivered { order_id: i64, product_name: String, key: String },
    /// Gateway has not confirmed the money yet
    NotSettled { status: PaymentStatus },
    /// The payment was canceled; the order is closed
    Canceled { order_id: i64 },
    /// Money is confirmed but no key is free; the order stays pending
    KeyUnavailable { order_id: i64 },
}

#[derive(Clone)]
#[derive(Debug)]
pub struct ShopService {
    db: DatabaseService,
    gateway: PaymentGateway,
    notifier: AdminNotifier,
}

impl ShopService {
    pub fn new(db: DatabaseService, gateway: PaymentGateway, notifier: AdminNotifier) -> Self {
        Self { db, gateway, notifier }
    }

    /// Enabled products with their free key counts
    pub async fn list_products(&self) -> Result<Vec<ProductListing>> {
        self.db.products.list_active_with_stock().await
    }

    /// Add a product to the catalogue; `price_rubles` is in whole rubles
    pub async fn create_product(&self, name: &str, price_rubles: i64, description: Option<String>) -> Result<Product> {
        let name = name.trim();
        if name.is_empty() {
            return Err(WayfisError::InvalidInput("product name must not be empty".to_string()));
        }
        if price_rubles <= 0 || price_rubles > MAX_USER_AMOUNT_RUBLES {
            return Err(WayfisError::InvalidAmount(format!(
                "price must be between 1 and {} rubles",
                MAX_USER_AMOUNT_RUBLES
            )));
        }

        let description = description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        let product = self.db.products.create(CreateProductRequest {
            name: name.to_string(),
            price: rubles(price_rubles),
            description,
        }).await?;

        info!(product_id = product.id, price = product.price, "Product created");
        Ok(product)
    }

    /// Show or hide a product; hidden products cannot be bought
    pub async fn set_product_enabled(&self, product_id: i64, enabled: bool) -> Result<Product> {
        self.db.products.set_enabled(product_id, enabled).await?;

        self.db.products
            .find_by_id(product_id)
            .await?
            .ok_or_else(|| WayfisError::not_found("Product", product_id))
    }

    /// Start a purchase of one key of `product_id` for `user_id`.
    ///
    /// Nothing is created when the product is out of stock. When the gateway
    /// call fails the order stays pending without a payment id.
    pub async fn buy(&self, user_id: i64, product_id: i64) -> Result<Checkout> {
        let product = self.db.products
            .find_by_id(product_id)
            .await?
            .filter(|p| p.enabled)
            .ok_or_else(|| WayfisError::not_found("Product", product_id))?;

        if self.db.keys.find_free_key(product.id).await?.is_none() {
            info!(user_id = user_id, product_id = product.id, "Purchase refused: out of stock");
            return Err(WayfisError::OutOfStock { product_id: product.id });
        }

        let order = self.db.orders.create(user_id, product.id).await?;
        log_user_action(user_id, "order_created", Some(&format!("order {} product {}", order.id, product.id)));

        let payment = self.gateway
            .create_payment(
                product.price,
                &format!("Purchase: {}", product.name),
                PaymentPurpose::Purchase { order_id: order.id },
            )
            .await
            .map_err(|e| {
                log_api_error("yookassa", &e.to_string(), Some(&format!("order {}", order.id)));
                e
            })?;

        self.db.orders.set_payment_id(order.id, &payment.id).await?;
        log_payment_event(&payment.id, "created", Some(order.id), Some(product.price));

        Ok(Checkout {
            order_id: order.id,
            product,
            payment_id: payment.id,
            confirmation_url: payment.confirmation_url,
        })
    }

    /// Check the payment of one of the caller's orders and deliver if settled
    pub async fn check_payment(&self, user_id: i64, order_id: i64) -> Result<CheckOutcome> {
        let order = self.db.orders
            .find_by_id(order_id)
            .await?
            .filter(|o| o.user_id == user_id)
            .ok_or_else(|| WayfisError::not_found("Order", order_id))?;

        self.reconcile_order(order).await
    }

    /// Bring an order in line with its gateway payment
    pub async fn reconcile_order(&self, order: Order) -> Result<CheckOutcome> {
        match order.status {
            OrderStatus::Paid => return self.already_delivered(&order).await,
            OrderStatus::Canceled => return Ok(CheckOutcome::Canceled { order_id: order.id }),
            OrderStatus::Pending => {}
        }

        let payment_id = order.payment_id.as_deref().ok_or_else(|| {
            WayfisError::InvalidInput("This order has no payment yet".to_string())
        })?;

        let payment = self.gateway.get_payment(payment_id).await?;
        self.apply_payment(order.id, &payment).await
    }

    /// Apply a fetched gateway payment to the order it pays for
    pub async fn apply_payment(&self, order_id: i64, payment: &PaymentInfo) -> Result<CheckOutcome> {
        let order = self.db.orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| WayfisError::not_found("Order", order_id))?;

        if order.payment_id.as_deref() != Some(payment.id.as_str()) {
            warn!(order_id = order_id, payment_id = %payment.id, "Payment does not belong to order");
            return Err(WayfisError::not_found("Payment", &payment.id));
        }

        if payment.status == PaymentStatus::Canceled {
            if self.db.orders.mark_canceled(order_id).await? {
                log_payment_event(&payment.id, "canceled", Some(order_id), None);
                return Ok(CheckOutcome::Canceled { order_id });
            }
            // Lost to a concurrent transition; report whatever won
            let current = self.db.orders
                .find_by_id(order_id)
                .await?
                .ok_or_else(|| WayfisError::not_found("Order", order_id))?;
            return match current.status {
                OrderStatus::Paid => self.already_delivered(&current).await,
                _ => Ok(CheckOutcome::Canceled { order_id }),
            };
        }

        if !payment.status.is_settled() {
            return Ok(CheckOutcome::NotSettled { status: payment.status.clone() });
        }

        self.settle(order_id, &payment.id).await
    }

    /// Deliver a key for a settled order in one transaction
    async fn settle(&self, order_id: i64, payment_id: &str) -> Result<CheckOutcome> {
        let mut tx = self.db.pool().begin().await?;

        let order = OrderRepository::lock_with(&mut *tx, order_id)
            .await?
            .ok_or_else(|| WayfisError::not_found("Order", order_id))?;

        match order.status {
            OrderStatus::Paid => {
                tx.commit().await?;
                return self.already_delivered(&order).await;
            }
            OrderStatus::Canceled => {
                tx.commit().await?;
                return Ok(CheckOutcome::Canceled { order_id });
            }
            OrderStatus::Pending => {}
        }

        let Some(key) = KeyRepository::find_free_key_with(&mut *tx, order.product_id).await? else {
            let first_report = OrderRepository::flag_undeliverable_with(&mut *tx, order_id).await?;
            tx.commit().await?;
            warn!(order_id = order_id, product_id = order.product_id, "Paid order has no free key");
            if first_report {
                self.notifier.undeliverable_order(order_id, order.product_id).await;
            }
            return Ok(CheckOutcome::KeyUnavailable { order_id });
        };

        match KeyRepository::reserve_with(&mut *tx, key.id, order_id).await {
            Ok(()) => {}
            Err(WayfisError::AlreadyUsed { key_id }) => {
                tx.rollback().await?;
                warn!(order_id = order_id, key_id = key_id, "Key taken by a concurrent settlement");
                return Ok(CheckOutcome::KeyUnavailable { order_id });
            }
            Err(e) => return Err(e),
        }

        if !OrderRepository::mark_paid_with(&mut *tx, order_id, &key.value).await? {
            tx.rollback().await?;
            return Err(WayfisError::InvalidInput(format!("Order {} is no longer pending", order_id)));
        }

        tx.commit().await?;

        let product_name = self.product_name(order.product_id).await?;
        log_payment_event(payment_id, "delivered", Some(order_id), None);
        info!(order_id = order_id, key_id = key.id, "Order paid and key delivered");

        Ok(CheckOutcome::Delivered {
            order_id,
            product_name,
            key: key.value,
        })
    }

    async fn already_delivered(&self, order: &Order) -> Result<CheckOutcome> {
        let key = order.key_value.clone().ok_or_else(|| {
            WayfisError::InvalidInput(format!("Paid order {} has no key", order.id))
        })?;

        Ok(CheckOutcome::AlreadyDelivered {
            order_id: order.id,
            product_name: self.product_name(order.product_id).await?,
            key,
        })
    }

    async fn product_name(&self, product_id: i64) -> Result<String> {
        Ok(self.db.products
            .find_by_id(product_id)
            .await?
            .map(|p| p.name)
            .unwrap_or_else(|| format!("Product #{}", product_id)))
    }
}
