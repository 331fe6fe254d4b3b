//! Integration tests for the Hearth storefront.
//!
//! The storefront is built in-process with recording collaborators in place
//! of the order API and identity service, so checkout flows run end to end
//! without network access.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p hearth-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `checkout_flow` - Checkout scenarios driven through the checkout service
//! - `http_api` - The JSON API driven through the router

#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use secrecy::SecretString;
use tokio::sync::Mutex;
use url::Url;

use hearth_core::{
    CustomOrderId, CustomOrderStatus, DeliveryMethod, Email, OrderId, Price, ProductId,
    ProductType, UserId,
};
use hearth_storefront::cart::CartItem;
use hearth_storefront::checkout::{CompletionNotice, ShippingForm};
use hearth_storefront::config::{
    BackendConfig, CheckoutConfig, IdentityConfig, PaymentConfig, StorefrontConfig,
};
use hearth_storefront::models::{CreatedOrder, CurrentUser, CustomOrder, NewOrder, ShopperId};
use hearth_storefront::services::{BackendError, CustomOrderStore, OrderStore, TokenProvider};
use hearth_storefront::state::AppState;

/// How long the success message shows before the order is created.
pub const SUCCESS_DELAY: Duration = Duration::from_millis(1500);

/// Order API stand-in that records every order it is asked to save.
#[derive(Default)]
pub struct RecordingOrderStore {
    orders: Mutex<Vec<NewOrder>>,
    fail: AtomicBool,
}

impl RecordingOrderStore {
    /// Make subsequent saves fail (or succeed again).
    pub fn fail_saves(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub async fn orders(&self) -> Vec<NewOrder> {
        self.orders.lock().await.clone()
    }
}

#[async_trait]
impl OrderStore for RecordingOrderStore {
    async fn create_order(&self, order: &NewOrder) -> Result<CreatedOrder, BackendError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(BackendError::Api {
                status: 503,
                message: "order service unavailable".to_string(),
            });
        }

        let mut orders = self.orders.lock().await;
        orders.push(order.clone());
        Ok(CreatedOrder {
            id: OrderId::new(format!("ord_{}", orders.len())),
        })
    }
}

/// Custom-order API stand-in that records status changes.
#[derive(Default)]
pub struct RecordingCustomOrderStore {
    updates: Mutex<Vec<(CustomOrderId, CustomOrderStatus)>>,
}

impl RecordingCustomOrderStore {
    pub async fn updates(&self) -> Vec<(CustomOrderId, CustomOrderStatus)> {
        self.updates.lock().await.clone()
    }
}

#[async_trait]
impl CustomOrderStore for RecordingCustomOrderStore {
    async fn update_custom_order_status(
        &self,
        id: &CustomOrderId,
        status: CustomOrderStatus,
    ) -> Result<(), BackendError> {
        self.updates.lock().await.push((id.clone(), status));
        Ok(())
    }
}

/// Identity service stand-in issuing a fixed token.
pub struct StaticTokens;

#[async_trait]
impl TokenProvider for StaticTokens {
    async fn id_token(
        &self,
        _user: &UserId,
        _force_refresh: bool,
    ) -> Result<SecretString, BackendError> {
        Ok(SecretString::from("test-id-token"))
    }
}

/// Configuration pointing at nothing; collaborators are injected.
pub fn test_config() -> StorefrontConfig {
    StorefrontConfig {
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 3000,
        base_url: Url::parse("http://localhost:3000").unwrap(),
        backend: BackendConfig {
            base_url: Url::parse("http://orders.invalid/api/").unwrap(),
            api_key: SecretString::from("unused"),
        },
        identity: IdentityConfig {
            token_url: Url::parse("http://identity.invalid/token").unwrap(),
            api_key: SecretString::from("unused"),
        },
        payment: PaymentConfig {
            public_key: "FLWPUBK_TEST-hearth".to_string(),
            tx_ref_prefix: "hearth".to_string(),
            payment_options: "card,banktransfer,ussd".to_string(),
            success_display_delay: SUCCESS_DELAY,
        },
        checkout: CheckoutConfig::default(),
        sentry_dsn: None,
        sentry_environment: None,
    }
}

/// A storefront wired to recording collaborators.
pub struct TestContext {
    pub state: AppState,
    pub orders: Arc<RecordingOrderStore>,
    pub custom_orders: Arc<RecordingCustomOrderStore>,
}

impl TestContext {
    pub fn new() -> Self {
        let orders = Arc::new(RecordingOrderStore::default());
        let custom_orders = Arc::new(RecordingCustomOrderStore::default());
        let state = AppState::with_collaborators(
            test_config(),
            Arc::clone(&orders) as Arc<dyn OrderStore>,
            Arc::clone(&custom_orders) as Arc<dyn CustomOrderStore>,
            Arc::new(StaticTokens),
        );

        Self {
            state,
            orders,
            custom_orders,
        }
    }

    /// Put items in a shopper's cart.
    pub async fn fill_cart(&self, shopper: &ShopperId, items: &[(CartItem, i64)]) {
        let shared = self.state.sessions().get_or_create(shopper).await;
        let mut guard = shared.lock().await;
        for (item, quantity) in items {
            guard.cart.add(item.clone(), *quantity).unwrap();
        }
    }

    /// Number of lines in a shopper's cart.
    pub async fn cart_lines(&self, shopper: &ShopperId) -> usize {
        let shared = self.state.sessions().get_or_create(shopper).await;
        let guard = shared.lock().await;
        guard.cart.lines().len()
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

pub fn candle(id: &str, naira: i64) -> CartItem {
    CartItem {
        id: ProductId::new(id),
        name: format!("Candle {id}"),
        unit_price: Price::ngn(Decimal::from(naira)),
        product_type: ProductType::Candle,
    }
}

pub fn signed_in_user() -> CurrentUser {
    CurrentUser {
        id: UserId::new("user_ada"),
        email: Email::parse("ada@example.com").unwrap(),
        display_name: Some("Ada Obi".to_string()),
    }
}

pub fn custom_cake(naira: i64) -> CustomOrder {
    CustomOrder {
        id: CustomOrderId::new("co_cake"),
        description: "Three-tier celebration cake".to_string(),
        price: Price::ngn(Decimal::from(naira)),
        status: CustomOrderStatus::Quoted,
    }
}

pub fn shipping_form(method: DeliveryMethod) -> ShippingForm {
    ShippingForm {
        email: "ada@example.com".to_string(),
        first_name: "Ada".to_string(),
        last_name: "Obi".to_string(),
        phone: "08012345678".to_string(),
        address: "12 Allen Avenue".to_string(),
        city: "Ikeja".to_string(),
        state: "Lagos".to_string(),
        country: Some("Nigeria".to_string()),
        postal_code: None,
        delivery_method: method,
    }
}

pub fn notice(status: &str, tx_ref: &str) -> CompletionNotice {
    CompletionNotice {
        status: status.to_string(),
        transaction_id: serde_json::from_value(serde_json::json!(4_401_223)).ok(),
        id: None,
        tx_ref: tx_ref.to_string(),
        message: None,
    }
}
