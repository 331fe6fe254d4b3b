//! Checkout state machine.
//!
//! One [`CheckoutOrchestrator`] exists per shopper checkout. It owns every
//! piece of cross-step data (the submitted shipping selection and the
//! cart or custom-order snapshot) and is the only thing that moves the
//! checkout between steps.
//!
//! ```text
//! CollectingShipping ──submit──▶ AwaitingPayment(Ready)
//!        ▲                           │ initiate
//!        │ back / dismissed          ▼
//!        └──────────────── AwaitingPayment(Processing) ──declined──▶ Ready
//!                                    │ success
//!                                    ▼
//!                          AwaitingPayment(Succeeded)
//!                                    │ create order
//!                                    ▼
//!                              CreatingOrder ──▶ Confirmed
//!                                    │
//!                                    ▼
//!                               OrderFailed ──restart──▶ AwaitingPayment(Ready)
//! ```

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use hearth_core::{CustomOrderId, Email, Price, UserId};

use super::error::CheckoutError;
use super::finalizer::OrderFinalizer;
use super::payment::{
    PaymentAttempt, PaymentGatewayAdapter, PaymentOutcome, PaymentReceipt, PaymentRequest,
};
use super::shipping::{ShippingCollector, ShippingForm, ShippingSelection};
use crate::cart::{CartLedger, CartLineItem};
use crate::models::{CurrentUser, CustomOrder, Order};

/// Coarse checkout step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckoutStep {
    CollectingShipping,
    AwaitingPayment,
    CreatingOrder,
    OrderFailed,
    Confirmed,
}

impl fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::CollectingShipping => "collecting shipping details",
            Self::AwaitingPayment => "awaiting payment",
            Self::CreatingOrder => "creating the order",
            Self::OrderFailed => "recovering from a failed order",
            Self::Confirmed => "confirmed",
        })
    }
}

/// What is being bought, frozen when shipping is submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderSnapshot {
    Cart {
        lines: Vec<CartLineItem>,
        items_price: Price,
    },
    Custom {
        order: CustomOrder,
    },
}

impl OrderSnapshot {
    fn capture(cart: &CartLedger, custom_order: Option<&CustomOrder>) -> Self {
        match custom_order {
            Some(order) => Self::Custom {
                order: order.clone(),
            },
            None => Self::Cart {
                lines: cart.lines().to_vec(),
                items_price: cart.total(),
            },
        }
    }

    #[must_use]
    pub const fn items_price(&self) -> Price {
        match self {
            Self::Cart { items_price, .. } => *items_price,
            Self::Custom { order } => order.price,
        }
    }

    #[must_use]
    pub const fn is_custom_order(&self) -> bool {
        matches!(self, Self::Custom { .. })
    }

    #[must_use]
    pub const fn custom_order_id(&self) -> Option<&CustomOrderId> {
        match self {
            Self::Custom { order } => Some(&order.id),
            Self::Cart { .. } => None,
        }
    }

    /// Ids forwarded to the gateway as payment metadata.
    #[must_use]
    pub fn item_ids(&self) -> Vec<String> {
        match self {
            Self::Cart { lines, .. } => lines.iter().map(|l| l.id.to_string()).collect(),
            Self::Custom { order } => vec![order.id.to_string()],
        }
    }
}

/// Shipping selection and snapshot carried through the payment steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentStage {
    selection: ShippingSelection,
    snapshot: OrderSnapshot,
}

impl PaymentStage {
    #[must_use]
    pub const fn new(selection: ShippingSelection, snapshot: OrderSnapshot) -> Self {
        Self {
            selection,
            snapshot,
        }
    }

    #[must_use]
    pub const fn selection(&self) -> &ShippingSelection {
        &self.selection
    }

    #[must_use]
    pub const fn snapshot(&self) -> &OrderSnapshot {
        &self.snapshot
    }

    #[must_use]
    pub const fn items_price(&self) -> Price {
        self.snapshot.items_price()
    }

    #[must_use]
    pub const fn shipping_price(&self) -> Price {
        self.selection.shipping_price()
    }

    /// Items plus shipping. Tax is included in item prices.
    #[must_use]
    pub fn total(&self) -> Price {
        self.items_price() + self.shipping_price()
    }
}

/// A captured payment waiting to become an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedPayment {
    pub user_id: UserId,
    pub payer_email: Email,
    pub receipt: PaymentReceipt,
}

/// Sub-state of `AwaitingPayment`.
#[derive(Debug, Clone)]
pub enum PaymentPhase {
    /// Waiting for the shopper to start a payment. `notice` carries the last
    /// error, if any; `declined` is the reference of an attempt the gateway
    /// just declined, whose widget may still be open.
    Ready {
        notice: Option<String>,
        declined: Option<String>,
    },
    /// Widget launched; waiting for the gateway.
    Processing { attempt: Arc<PaymentAttempt> },
    /// Gateway confirmed the charge; the order is about to be created.
    Succeeded { payment: CapturedPayment },
}

/// Full checkout state. Each variant holds exactly the data valid in it.
#[derive(Debug, Clone)]
pub enum CheckoutState {
    CollectingShipping {
        collector: ShippingCollector,
        notice: Option<String>,
    },
    AwaitingPayment {
        stage: PaymentStage,
        phase: PaymentPhase,
    },
    CreatingOrder {
        stage: PaymentStage,
        payment: CapturedPayment,
    },
    OrderFailed {
        stage: PaymentStage,
        payment: CapturedPayment,
        error: String,
    },
    Confirmed {
        order: Order,
    },
}

impl Default for CheckoutState {
    fn default() -> Self {
        Self::CollectingShipping {
            collector: ShippingCollector::default(),
            notice: None,
        }
    }
}

impl CheckoutState {
    #[must_use]
    pub const fn step(&self) -> CheckoutStep {
        match self {
            Self::CollectingShipping { .. } => CheckoutStep::CollectingShipping,
            Self::AwaitingPayment { .. } => CheckoutStep::AwaitingPayment,
            Self::CreatingOrder { .. } => CheckoutStep::CreatingOrder,
            Self::OrderFailed { .. } => CheckoutStep::OrderFailed,
            Self::Confirmed { .. } => CheckoutStep::Confirmed,
        }
    }
}

/// What the caller should do after an outcome is recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Payment succeeded; call [`CheckoutOrchestrator::create_order`].
    CreateOrder,
    /// Back in `AwaitingPayment: Ready` with the reason surfaced.
    Declined { reason: String },
    /// Returned to shipping collection.
    SteppedBack,
    /// Outcome did not belong to the current attempt; nothing changed.
    Stale,
}

/// Checkout state machine for one shopper.
#[derive(Debug, Clone)]
pub struct CheckoutOrchestrator {
    user: Option<CurrentUser>,
    custom_order: Option<CustomOrder>,
    state: CheckoutState,
}

impl CheckoutOrchestrator {
    /// Start a checkout for the cart, or for `custom_order` when given.
    #[must_use]
    pub fn new(user: Option<CurrentUser>, custom_order: Option<CustomOrder>) -> Self {
        let collector = ShippingCollector::new(user.as_ref());
        Self {
            user,
            custom_order,
            state: CheckoutState::CollectingShipping {
                collector,
                notice: None,
            },
        }
    }

    #[must_use]
    pub const fn state(&self) -> &CheckoutState {
        &self.state
    }

    #[must_use]
    pub const fn step(&self) -> CheckoutStep {
        self.state.step()
    }

    #[must_use]
    pub const fn user(&self) -> Option<&CurrentUser> {
        self.user.as_ref()
    }

    #[must_use]
    pub const fn custom_order(&self) -> Option<&CustomOrder> {
        self.custom_order.as_ref()
    }

    /// Refresh the signed-in user (e.g. after signing in mid-checkout).
    pub fn set_user(&mut self, user: Option<CurrentUser>) {
        self.user = user;
    }

    /// Whether a confirmed payment is being turned into an order. The
    /// checkout must not be replaced while this holds.
    #[must_use]
    pub const fn is_locked(&self) -> bool {
        matches!(
            self.state,
            CheckoutState::CreatingOrder { .. }
                | CheckoutState::AwaitingPayment {
                    phase: PaymentPhase::Succeeded { .. },
                    ..
                }
        )
    }

    /// The in-flight payment attempt, if any.
    #[must_use]
    pub fn current_attempt(&self) -> Option<&Arc<PaymentAttempt>> {
        match &self.state {
            CheckoutState::AwaitingPayment {
                phase: PaymentPhase::Processing { attempt },
                ..
            } => Some(attempt),
            _ => None,
        }
    }

    fn declined_tx_ref(&self) -> Option<&str> {
        match &self.state {
            CheckoutState::AwaitingPayment {
                phase:
                    PaymentPhase::Ready {
                        declined: Some(tx_ref),
                        ..
                    },
                ..
            } => Some(tx_ref.as_str()),
            _ => None,
        }
    }

    /// Reference of the latest payment attempt this checkout still tracks.
    #[must_use]
    pub fn tx_ref(&self) -> Option<&str> {
        match &self.state {
            CheckoutState::AwaitingPayment {
                phase: PaymentPhase::Processing { attempt },
                ..
            } => Some(attempt.tx_ref()),
            CheckoutState::AwaitingPayment {
                phase: PaymentPhase::Succeeded { payment },
                ..
            }
            | CheckoutState::CreatingOrder { payment, .. }
            | CheckoutState::OrderFailed { payment, .. } => Some(payment.receipt.tx_ref.as_str()),
            CheckoutState::Confirmed { order } => {
                Some(order.details.payment_result.tx_ref.as_str())
            }
            _ => self.declined_tx_ref(),
        }
    }

    /// Close any open payment attempt before this checkout is discarded, so a
    /// late gateway success is reported instead of silently dropped.
    pub fn abandon(&self) {
        if let Some(attempt) = self.current_attempt()
            && attempt.dismiss().is_some()
        {
            info!(tx_ref = %attempt.tx_ref(), "Open payment attempt abandoned");
        }
    }

    const fn invalid(&self, action: &'static str) -> CheckoutError {
        CheckoutError::InvalidTransition {
            action,
            step: self.state.step(),
        }
    }

    fn back_to_shipping(&mut self, notice: Option<String>) {
        self.state = CheckoutState::CollectingShipping {
            collector: ShippingCollector::new(self.user.as_ref()),
            notice,
        };
    }

    fn set_phase(&mut self, next: PaymentPhase) {
        if let CheckoutState::AwaitingPayment { phase, .. } = &mut self.state {
            *phase = next;
        }
    }

    // -------------------------------------------------------------------------
    // Shipping
    // -------------------------------------------------------------------------

    /// Save the shipping draft without submitting it.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::InvalidTransition`] outside `CollectingShipping`.
    pub fn update_shipping(&mut self, form: ShippingForm) -> Result<(), CheckoutError> {
        match &mut self.state {
            CheckoutState::CollectingShipping { collector, .. } => {
                collector.update(form);
                Ok(())
            }
            _ => Err(self.invalid("edit shipping details")),
        }
    }

    /// Validate shipping, snapshot what is being bought and move to
    /// `AwaitingPayment: Ready`. Returns the total to charge.
    ///
    /// Later cart changes do not affect this checkout's total.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::Validation`] with every failing field (the draft is
    /// kept), or [`CheckoutError::InvalidTransition`] outside
    /// `CollectingShipping`.
    #[instrument(skip_all, fields(delivery_method = %form.delivery_method))]
    pub fn submit_shipping(
        &mut self,
        form: ShippingForm,
        cart: &CartLedger,
    ) -> Result<Price, CheckoutError> {
        let CheckoutState::CollectingShipping { collector, .. } = &mut self.state else {
            return Err(self.invalid("submit shipping details"));
        };

        collector.update(form);
        let selection = collector.submit()?;
        let snapshot = OrderSnapshot::capture(cart, self.custom_order.as_ref());
        let stage = PaymentStage::new(selection, snapshot);
        let total = stage.total();

        debug!(
            items_price = %stage.items_price(),
            shipping_price = %stage.shipping_price(),
            %total,
            "Shipping submitted"
        );

        self.state = CheckoutState::AwaitingPayment {
            stage,
            phase: PaymentPhase::Ready {
                notice: None,
                declined: None,
            },
        };
        Ok(total)
    }

    /// Return from `AwaitingPayment: Ready` to shipping collection.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::InvalidTransition`] once a payment is in flight.
    pub fn step_back(&mut self) -> Result<(), CheckoutError> {
        match &self.state {
            CheckoutState::AwaitingPayment {
                phase: PaymentPhase::Ready { .. },
                ..
            } => {
                self.back_to_shipping(None);
                Ok(())
            }
            _ => Err(self.invalid("go back to shipping")),
        }
    }

    // -------------------------------------------------------------------------
    // Payment
    // -------------------------------------------------------------------------

    /// Start a payment attempt for the snapshot total.
    ///
    /// On failure the checkout stays in `AwaitingPayment: Ready` with the
    /// error as its notice.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::PaymentInit`], [`CheckoutError::Auth`], or
    /// [`CheckoutError::InvalidTransition`] outside `AwaitingPayment: Ready`.
    pub async fn initiate_payment(
        &mut self,
        adapter: &PaymentGatewayAdapter,
        widget_loaded: bool,
    ) -> Result<Arc<PaymentAttempt>, CheckoutError> {
        let CheckoutState::AwaitingPayment {
            stage,
            phase: PaymentPhase::Ready { .. },
        } = &self.state
        else {
            return Err(self.invalid("start a payment"));
        };

        let request = PaymentRequest {
            user: self.user.as_ref(),
            recipient: stage.selection().recipient(),
            amount: stage.total(),
            item_ids: stage.snapshot().item_ids(),
            is_custom_order: stage.snapshot().is_custom_order(),
            widget_loaded,
        };

        match adapter.initiate(request).await {
            Ok(attempt) => {
                self.set_phase(PaymentPhase::Processing {
                    attempt: Arc::clone(&attempt),
                });
                Ok(attempt)
            }
            Err(e) => {
                self.set_phase(PaymentPhase::Ready {
                    notice: Some(e.to_string()),
                    declined: None,
                });
                Err(e)
            }
        }
    }

    /// Apply a reconciled payment outcome for `tx_ref`.
    ///
    /// Outcomes for any attempt other than the one in flight are stale and
    /// change nothing, except a dismissal of the attempt that was just
    /// declined: closing the widget after a failed charge still returns to
    /// shipping.
    pub fn record_outcome(&mut self, tx_ref: &str, outcome: PaymentOutcome) -> Transition {
        if matches!(outcome, PaymentOutcome::Dismissed) && self.declined_tx_ref() == Some(tx_ref) {
            debug!(%tx_ref, "Widget closed after a declined payment");
            self.back_to_shipping(Some(CheckoutError::Dismissed.to_string()));
            return Transition::SteppedBack;
        }

        let Some(attempt) = self.current_attempt().filter(|a| a.tx_ref() == tx_ref) else {
            warn!(%tx_ref, step = %self.step(), "Stale payment outcome ignored");
            return Transition::Stale;
        };

        match outcome {
            PaymentOutcome::Success(receipt) => {
                let intent = attempt.intent();
                let payment = CapturedPayment {
                    user_id: intent.metadata.user_id.clone(),
                    payer_email: intent.customer_email.clone(),
                    receipt,
                };
                self.set_phase(PaymentPhase::Succeeded { payment });
                Transition::CreateOrder
            }
            PaymentOutcome::Declined { reason } => {
                self.set_phase(PaymentPhase::Ready {
                    notice: Some(CheckoutError::PaymentDeclined {
                        reason: reason.clone(),
                    }
                    .to_string()),
                    declined: Some(tx_ref.to_string()),
                });
                Transition::Declined { reason }
            }
            PaymentOutcome::Dismissed => {
                // Returns to shipping rather than to the payment step; any
                // entered shipping details are discarded.
                self.back_to_shipping(Some(CheckoutError::Dismissed.to_string()));
                Transition::SteppedBack
            }
        }
    }

    // -------------------------------------------------------------------------
    // Order
    // -------------------------------------------------------------------------

    /// Persist the order for a succeeded payment.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::OrderPersist`] leaves the checkout in `OrderFailed`;
    /// [`CheckoutError::InvalidTransition`] when no payment has succeeded.
    pub async fn create_order(
        &mut self,
        cart: &mut CartLedger,
        finalizer: &OrderFinalizer,
    ) -> Result<Order, CheckoutError> {
        let (stage, payment) = match &self.state {
            CheckoutState::AwaitingPayment {
                stage,
                phase: PaymentPhase::Succeeded { payment },
            } => (stage.clone(), payment.clone()),
            _ => return Err(self.invalid("create the order")),
        };

        self.state = CheckoutState::CreatingOrder {
            stage: stage.clone(),
            payment: payment.clone(),
        };

        match finalizer.finalize(&stage, &payment, cart).await {
            Ok(order) => {
                self.state = CheckoutState::Confirmed {
                    order: order.clone(),
                };
                Ok(order)
            }
            Err(e) => {
                self.state = CheckoutState::OrderFailed {
                    stage,
                    payment,
                    error: e.to_string(),
                };
                Err(e)
            }
        }
    }

    /// Leave `OrderFailed` for a fresh payment attempt with the same shipping
    /// selection and snapshot.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::InvalidTransition`] outside `OrderFailed`.
    pub fn restart_payment(&mut self) -> Result<(), CheckoutError> {
        match std::mem::take(&mut self.state) {
            CheckoutState::OrderFailed { stage, payment, .. } => {
                warn!(
                    tx_ref = %payment.receipt.tx_ref,
                    "Restarting payment after order failure"
                );
                self.state = CheckoutState::AwaitingPayment {
                    stage,
                    phase: PaymentPhase::Ready {
                        notice: None,
                        declined: None,
                    },
                };
                Ok(())
            }
            other => {
                self.state = other;
                Err(self.invalid("restart the payment"))
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use hearth_core::{CustomOrderStatus, DeliveryMethod, OrderId, ProductId, ProductType};

    use super::*;
    use crate::cart::CartItem;
    use crate::checkout::payment::tests::{intent, test_config};
    use crate::checkout::payment::{CompletionNotice, GatewayId};
    use crate::checkout::shipping::ShippingField;
    use crate::models::CreatedOrder;
    use crate::services::{BackendError, MockCustomOrderStore, MockOrderStore, MockTokenProvider};

    fn user() -> CurrentUser {
        CurrentUser {
            id: UserId::new("u1"),
            email: Email::parse("ada@example.com").unwrap(),
            display_name: Some("Ada Obi".to_string()),
        }
    }

    fn form(method: DeliveryMethod) -> ShippingForm {
        ShippingForm {
            email: "ada@example.com".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Obi".to_string(),
            phone: "08012345678".to_string(),
            address: "12 Admiralty Way".to_string(),
            city: "Lekki".to_string(),
            state: "Lagos".to_string(),
            country: None,
            postal_code: None,
            delivery_method: method,
        }
    }

    fn cart_with(id: &str, price: i64, quantity: i64) -> CartLedger {
        let mut cart = CartLedger::new();
        cart.add(
            CartItem {
                id: ProductId::new(id),
                name: format!("Product {id}"),
                unit_price: Price::ngn(Decimal::from(price)),
                product_type: ProductType::Candle,
            },
            quantity,
        )
        .unwrap();
        cart
    }

    fn adapter() -> PaymentGatewayAdapter {
        let mut tokens = MockTokenProvider::new();
        tokens
            .expect_id_token()
            .returning(|_, _| Ok(secrecy::SecretString::from("tok")));
        PaymentGatewayAdapter::new(Arc::new(tokens), test_config())
    }

    fn success(tx_ref: &str) -> PaymentOutcome {
        PaymentOutcome::Success(PaymentReceipt {
            transaction_id: "4410987".to_string(),
            tx_ref: tx_ref.to_string(),
            raw_status: "successful".to_string(),
            confirmed_at: Utc::now(),
        })
    }

    /// Put the orchestrator into `Processing` without a token round trip.
    fn processing(checkout: &mut CheckoutOrchestrator, tx_ref: &str) -> Arc<PaymentAttempt> {
        let attempt = Arc::new(PaymentAttempt::new(intent(tx_ref)));
        checkout.set_phase(PaymentPhase::Processing {
            attempt: Arc::clone(&attempt),
        });
        attempt
    }

    #[test]
    fn test_submit_shipping_computes_total() {
        let cart = cart_with("A", 1000, 2);
        let mut checkout = CheckoutOrchestrator::new(Some(user()), None);

        let total = checkout
            .submit_shipping(form(DeliveryMethod::LocalDelivery), &cart)
            .unwrap();

        assert_eq!(total, Price::ngn(Decimal::from(5500)));
        assert_eq!(checkout.step(), CheckoutStep::AwaitingPayment);
    }

    #[test]
    fn test_invalid_shipping_stays_on_step() {
        let cart = cart_with("A", 1000, 2);
        let mut checkout = CheckoutOrchestrator::new(Some(user()), None);

        let err = checkout
            .submit_shipping(
                ShippingForm {
                    phone: String::new(),
                    ..form(DeliveryMethod::Pickup)
                },
                &cart,
            )
            .unwrap_err();

        let CheckoutError::Validation(validation) = err else {
            panic!("expected validation error");
        };
        assert!(validation.has(ShippingField::Phone));
        assert_eq!(checkout.step(), CheckoutStep::CollectingShipping);
    }

    #[test]
    fn test_snapshot_ignores_later_cart_changes() {
        let mut cart = cart_with("A", 1000, 2);
        let mut checkout = CheckoutOrchestrator::new(Some(user()), None);
        checkout
            .submit_shipping(form(DeliveryMethod::Pickup), &cart)
            .unwrap();

        cart.set_quantity(&ProductId::new("A"), 9);

        let CheckoutState::AwaitingPayment { stage, .. } = checkout.state() else {
            panic!("expected awaiting payment");
        };
        assert_eq!(stage.total(), Price::ngn(Decimal::from(2000)));
    }

    #[test]
    fn test_delivery_method_locked_after_submit() {
        let cart = cart_with("A", 1000, 1);
        let mut checkout = CheckoutOrchestrator::new(Some(user()), None);
        checkout
            .submit_shipping(form(DeliveryMethod::Pickup), &cart)
            .unwrap();

        let err = checkout
            .update_shipping(form(DeliveryMethod::RemoteDelivery))
            .unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::InvalidTransition {
                step: CheckoutStep::AwaitingPayment,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_empty_cart_fails_before_network() {
        let cart = CartLedger::new();
        let mut checkout = CheckoutOrchestrator::new(Some(user()), None);
        checkout
            .submit_shipping(form(DeliveryMethod::LocalDelivery), &cart)
            .unwrap();

        let mut tokens = MockTokenProvider::new();
        tokens.expect_id_token().times(0);
        let adapter = PaymentGatewayAdapter::new(Arc::new(tokens), test_config());

        let err = checkout.initiate_payment(&adapter, true).await.unwrap_err();
        assert_eq!(err.to_string(), "cart is empty");
        assert!(matches!(
            checkout.state(),
            CheckoutState::AwaitingPayment {
                phase: PaymentPhase::Ready {
                    notice: Some(_),
                    ..
                },
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_initiate_moves_to_processing() {
        let cart = cart_with("A", 1000, 2);
        let mut checkout = CheckoutOrchestrator::new(Some(user()), None);
        checkout
            .submit_shipping(form(DeliveryMethod::LocalDelivery), &cart)
            .unwrap();

        let attempt = checkout.initiate_payment(&adapter(), true).await.unwrap();
        assert_eq!(attempt.intent().amount, Price::ngn(Decimal::from(5500)));
        assert_eq!(attempt.intent().metadata.item_ids, vec!["A".to_string()]);
        assert_eq!(
            checkout.current_attempt().unwrap().tx_ref(),
            attempt.tx_ref()
        );

        // Only one attempt at a time.
        assert!(checkout.initiate_payment(&adapter(), true).await.is_err());
        assert!(checkout.step_back().is_err());
    }

    #[test]
    fn test_declined_returns_to_ready() {
        let cart = cart_with("A", 1000, 2);
        let mut checkout = CheckoutOrchestrator::new(Some(user()), None);
        checkout
            .submit_shipping(form(DeliveryMethod::Pickup), &cart)
            .unwrap();
        let attempt = processing(&mut checkout, "tx1");

        let outcome = attempt
            .complete(&CompletionNotice {
                status: "failed".to_string(),
                transaction_id: Some(GatewayId::Number(1)),
                id: None,
                tx_ref: "tx1".to_string(),
                message: Some("Card declined".to_string()),
            })
            .unwrap();

        assert_eq!(
            checkout.record_outcome("tx1", outcome),
            Transition::Declined {
                reason: "Card declined".to_string()
            }
        );
        let CheckoutState::AwaitingPayment {
            phase: PaymentPhase::Ready { notice, declined },
            ..
        } = checkout.state()
        else {
            panic!("expected ready");
        };
        assert!(notice.as_deref().unwrap().contains("Card declined"));
        assert_eq!(declined.as_deref(), Some("tx1"));
    }

    #[test]
    fn test_dismissal_after_decline_returns_to_shipping() {
        let cart = cart_with("A", 1000, 2);
        let mut checkout = CheckoutOrchestrator::new(Some(user()), None);
        checkout
            .submit_shipping(form(DeliveryMethod::Pickup), &cart)
            .unwrap();
        let attempt = processing(&mut checkout, "tx1");

        let outcome = attempt
            .complete(&CompletionNotice {
                status: "failed".to_string(),
                transaction_id: Some(GatewayId::Number(1)),
                id: None,
                tx_ref: "tx1".to_string(),
                message: None,
            })
            .unwrap();
        checkout.record_outcome("tx1", outcome);
        assert_eq!(checkout.tx_ref(), Some("tx1"));

        // Only the declined attempt's widget can send the shopper back.
        assert_eq!(
            checkout.record_outcome("tx0", PaymentOutcome::Dismissed),
            Transition::Stale
        );
        assert_eq!(checkout.step(), CheckoutStep::AwaitingPayment);

        let outcome = attempt.dismiss().unwrap();
        assert_eq!(
            checkout.record_outcome("tx1", outcome),
            Transition::SteppedBack
        );
        let CheckoutState::CollectingShipping { notice, .. } = checkout.state() else {
            panic!("expected shipping");
        };
        assert_eq!(notice.as_deref(), Some("payment was cancelled"));
        assert_eq!(checkout.tx_ref(), None);
    }

    #[test]
    fn test_dismissal_returns_to_shipping() {
        let cart = cart_with("A", 1000, 2);
        let mut checkout = CheckoutOrchestrator::new(Some(user()), None);
        checkout
            .submit_shipping(form(DeliveryMethod::Pickup), &cart)
            .unwrap();
        processing(&mut checkout, "tx1");

        assert_eq!(
            checkout.record_outcome("tx1", PaymentOutcome::Dismissed),
            Transition::SteppedBack
        );
        assert_eq!(checkout.step(), CheckoutStep::CollectingShipping);
    }

    #[test]
    fn test_stale_outcome_changes_nothing() {
        let cart = cart_with("A", 1000, 2);
        let mut checkout = CheckoutOrchestrator::new(Some(user()), None);
        checkout
            .submit_shipping(form(DeliveryMethod::Pickup), &cart)
            .unwrap();
        processing(&mut checkout, "tx2");

        assert_eq!(
            checkout.record_outcome("tx1", success("tx1")),
            Transition::Stale
        );
        assert!(checkout.current_attempt().is_some());
    }

    #[tokio::test]
    async fn test_success_creates_order_and_clears_cart() {
        let mut cart = cart_with("A", 1000, 2);
        let mut checkout = CheckoutOrchestrator::new(Some(user()), None);
        checkout
            .submit_shipping(form(DeliveryMethod::LocalDelivery), &cart)
            .unwrap();
        processing(&mut checkout, "tx1");

        assert_eq!(
            checkout.record_outcome("tx1", success("tx1")),
            Transition::CreateOrder
        );
        assert!(checkout.is_locked());

        let mut orders = MockOrderStore::new();
        orders
            .expect_create_order()
            .withf(|o| o.total_price == Decimal::from(5500) && !o.is_custom_order)
            .times(1)
            .returning(|_| {
                Ok(CreatedOrder {
                    id: OrderId::new("ord_1"),
                })
            });
        let finalizer = OrderFinalizer::new(Arc::new(orders), Arc::new(MockCustomOrderStore::new()));

        let order = checkout.create_order(&mut cart, &finalizer).await.unwrap();
        assert_eq!(order.id, OrderId::new("ord_1"));
        assert_eq!(checkout.step(), CheckoutStep::Confirmed);
        assert!(cart.is_empty());
        assert!(!checkout.is_locked());
    }

    #[tokio::test]
    async fn test_persist_failure_then_restart() {
        let mut cart = cart_with("A", 1000, 2);
        let mut checkout = CheckoutOrchestrator::new(Some(user()), None);
        checkout
            .submit_shipping(form(DeliveryMethod::Pickup), &cart)
            .unwrap();
        processing(&mut checkout, "tx1");
        checkout.record_outcome("tx1", success("tx1"));

        let mut orders = MockOrderStore::new();
        orders.expect_create_order().returning(|_| {
            Err(BackendError::Api {
                status: 503,
                message: "unavailable".to_string(),
            })
        });
        let finalizer = OrderFinalizer::new(Arc::new(orders), Arc::new(MockCustomOrderStore::new()));

        let err = checkout.create_order(&mut cart, &finalizer).await.unwrap_err();
        assert!(err.payment_captured());
        assert_eq!(checkout.step(), CheckoutStep::OrderFailed);
        assert_eq!(cart.count(), 2);

        checkout.restart_payment().unwrap();
        assert!(matches!(
            checkout.state(),
            CheckoutState::AwaitingPayment {
                phase: PaymentPhase::Ready { notice: None, .. },
                ..
            }
        ));
        assert!(checkout.restart_payment().is_err());
    }

    #[test]
    fn test_custom_order_snapshot() {
        let cart = cart_with("A", 1000, 2);
        let custom = CustomOrder {
            id: CustomOrderId::new("co_1"),
            description: "Three-tier cake".to_string(),
            price: Price::ngn(Decimal::from(20_000)),
            status: CustomOrderStatus::Quoted,
        };
        let mut checkout = CheckoutOrchestrator::new(Some(user()), Some(custom));

        let total = checkout
            .submit_shipping(form(DeliveryMethod::Pickup), &cart)
            .unwrap();
        assert_eq!(total, Price::ngn(Decimal::from(20_000)));

        let CheckoutState::AwaitingPayment { stage, .. } = checkout.state() else {
            panic!("expected awaiting payment");
        };
        assert_eq!(stage.snapshot().item_ids(), vec!["co_1".to_string()]);
    }

    #[test]
    fn test_abandon_closes_open_attempt() {
        let cart = cart_with("A", 1000, 2);
        let mut checkout = CheckoutOrchestrator::new(Some(user()), None);
        checkout
            .submit_shipping(form(DeliveryMethod::Pickup), &cart)
            .unwrap();
        let attempt = processing(&mut checkout, "tx1");

        checkout.abandon();
        assert!(attempt.is_settled());
        assert!(!attempt.succeeded());
    }
}
