//! Checkout service.
//!
//! Drives each shopper's [`CheckoutOrchestrator`] under the shopper lock and
//! reconciles gateway notifications. A notification first settles the
//! attempt's latch without any lock; only the caller that settled it goes on
//! to touch the checkout. A dismissal that loses the race therefore returns
//! at once, even while the winning success is still waiting out its display
//! delay.
//!
//! Once a success is recorded, the delay and the order write run in a
//! spawned task. Dropping the completion request does not stop them.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{Instrument, error, info, instrument, warn};

use hearth_core::{OrderId, Price};

use crate::checkout::{
    CheckoutError, CheckoutOrchestrator, CheckoutStep, CompletionNotice, OrderFinalizer,
    PaymentGatewayAdapter, PaymentOutcome, ShippingForm, Transition, WidgetLaunch,
    is_success_status,
};
use crate::models::{CurrentUser, CustomOrder, ShopperId};
use crate::sessions::{AttemptEntry, SharedShopper, Shopper, ShopperSessions};

/// What a gateway notification led to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "camelCase")]
pub enum NotificationResult {
    /// Duplicate, late, or otherwise superseded; nothing changed.
    Ignored,
    /// Payment failed; back to the payment step.
    Declined { reason: String },
    /// Payment cancelled; back to the shipping step.
    SteppedBack,
    /// Order created.
    #[serde(rename_all = "camelCase")]
    Confirmed { order_id: OrderId },
}

/// Coordinates checkout across shopper sessions.
#[derive(Clone)]
pub struct CheckoutService {
    inner: Arc<CheckoutServiceInner>,
}

struct CheckoutServiceInner {
    sessions: ShopperSessions,
    adapter: PaymentGatewayAdapter,
    finalizer: OrderFinalizer,
}

impl CheckoutService {
    #[must_use]
    pub fn new(
        sessions: ShopperSessions,
        adapter: PaymentGatewayAdapter,
        finalizer: OrderFinalizer,
    ) -> Self {
        Self {
            inner: Arc::new(CheckoutServiceInner {
                sessions,
                adapter,
                finalizer,
            }),
        }
    }

    #[must_use]
    pub fn sessions(&self) -> &ShopperSessions {
        &self.inner.sessions
    }

    fn success_display_delay(&self) -> Duration {
        self.inner.adapter.config().success_display_delay
    }

    /// Start a checkout for the cart, or for a custom order.
    ///
    /// Replaces any previous checkout, closing its open payment attempt.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::InvalidTransition`] while a captured payment is being
    /// turned into an order.
    #[instrument(skip(self, user, custom_order), fields(shopper_id = %shopper_id))]
    pub async fn begin(
        &self,
        shopper_id: &ShopperId,
        user: Option<CurrentUser>,
        custom_order: Option<CustomOrder>,
    ) -> Result<CheckoutStep, CheckoutError> {
        let shared = self.inner.sessions.get_or_create(shopper_id).await;
        let mut shopper = shared.lock().await;

        if let Some(current) = &shopper.checkout {
            if current.is_locked() {
                return Err(CheckoutError::InvalidTransition {
                    action: "start a new checkout",
                    step: current.step(),
                });
            }
            current.abandon();
            if let Some(tx_ref) = current.tx_ref() {
                self.inner.sessions.forget_attempt(tx_ref).await;
            }
        }

        let checkout = CheckoutOrchestrator::new(user, custom_order);
        let step = checkout.step();
        shopper.checkout = Some(checkout);
        info!("Checkout started");
        Ok(step)
    }

    /// Save the shipping draft without validating it.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::NotStarted`] or [`CheckoutError::InvalidTransition`].
    pub async fn update_shipping(
        &self,
        shopper_id: &ShopperId,
        form: ShippingForm,
    ) -> Result<(), CheckoutError> {
        let shared = self.inner.sessions.get_or_create(shopper_id).await;
        let mut guard = shared.lock().await;
        guard
            .checkout
            .as_mut()
            .ok_or(CheckoutError::NotStarted)?
            .update_shipping(form)
    }

    /// Validate shipping and move to payment. Returns the total to charge.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::NotStarted`], [`CheckoutError::Validation`], or
    /// [`CheckoutError::InvalidTransition`].
    #[instrument(skip(self, user, form), fields(shopper_id = %shopper_id))]
    pub async fn submit_shipping(
        &self,
        shopper_id: &ShopperId,
        user: Option<CurrentUser>,
        form: ShippingForm,
    ) -> Result<Price, CheckoutError> {
        let shared = self.inner.sessions.get_or_create(shopper_id).await;
        let mut guard = shared.lock().await;
        let Shopper { cart, checkout } = &mut *guard;
        let checkout = checkout.as_mut().ok_or(CheckoutError::NotStarted)?;

        checkout.set_user(user);
        checkout.submit_shipping(form, cart)
    }

    /// Return to the shipping step.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::NotStarted`] or [`CheckoutError::InvalidTransition`].
    pub async fn step_back(&self, shopper_id: &ShopperId) -> Result<(), CheckoutError> {
        let shared = self.inner.sessions.get_or_create(shopper_id).await;
        let mut guard = shared.lock().await;
        guard
            .checkout
            .as_mut()
            .ok_or(CheckoutError::NotStarted)?
            .step_back()
    }

    /// Open a payment attempt and return the widget launch configuration.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::PaymentInit`], [`CheckoutError::Auth`],
    /// [`CheckoutError::NotStarted`], or [`CheckoutError::InvalidTransition`].
    #[instrument(skip(self, user), fields(shopper_id = %shopper_id))]
    pub async fn initiate_payment(
        &self,
        shopper_id: &ShopperId,
        user: Option<CurrentUser>,
        widget_loaded: bool,
    ) -> Result<WidgetLaunch, CheckoutError> {
        let shared = self.inner.sessions.get_or_create(shopper_id).await;
        let mut guard = shared.lock().await;
        let checkout = guard.checkout.as_mut().ok_or(CheckoutError::NotStarted)?;

        checkout.set_user(user);
        let attempt = checkout
            .initiate_payment(&self.inner.adapter, widget_loaded)
            .await?;
        self.inner
            .sessions
            .register_attempt(shopper_id, Arc::clone(&attempt))
            .await;

        Ok(self.inner.adapter.launch_config(&attempt))
    }

    /// Leave the order-failed state for a fresh payment attempt.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::NotStarted`] or [`CheckoutError::InvalidTransition`].
    pub async fn restart_payment(&self, shopper_id: &ShopperId) -> Result<(), CheckoutError> {
        let shared = self.inner.sessions.get_or_create(shopper_id).await;
        let mut guard = shared.lock().await;
        let checkout = guard.checkout.as_mut().ok_or(CheckoutError::NotStarted)?;

        let failed = checkout.tx_ref().map(str::to_string);
        checkout.restart_payment()?;
        if let Some(tx_ref) = failed {
            self.inner.sessions.forget_attempt(&tx_ref).await;
        }
        Ok(())
    }

    /// Find an attempt issued to this shopper.
    async fn lookup_attempt(
        &self,
        shopper_id: &ShopperId,
        tx_ref: &str,
    ) -> Result<AttemptEntry, CheckoutError> {
        match self.inner.sessions.attempt(tx_ref).await {
            Some(entry) if entry.shopper == *shopper_id => Ok(entry),
            Some(entry) => {
                warn!(%tx_ref, owner = %entry.shopper, "Payment notification from another session");
                Err(CheckoutError::UnknownTransaction(tx_ref.to_string()))
            }
            None => Err(CheckoutError::UnknownTransaction(tx_ref.to_string())),
        }
    }

    /// Wait out the success display delay, then turn the captured payment
    /// into an order.
    async fn finalize_order(
        &self,
        shared: SharedShopper,
        tx_ref: &str,
    ) -> Result<OrderId, CheckoutError> {
        tokio::time::sleep(self.success_display_delay()).await;

        let mut guard = shared.lock().await;
        let Shopper { cart, checkout } = &mut *guard;
        let checkout = checkout.as_mut().ok_or(CheckoutError::NotStarted)?;
        let order = checkout.create_order(cart, &self.inner.finalizer).await?;
        drop(guard);

        self.inner.sessions.forget_attempt(tx_ref).await;
        Ok(order.id)
    }

    /// Handle the widget's completion callback.
    ///
    /// On success the latch is set before anything else runs; the order is
    /// created after the success display delay, in a task that outlives this
    /// call.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::UnknownTransaction`] for a reference not issued to
    /// this shopper, or [`CheckoutError::OrderPersist`] when the paid order
    /// cannot be saved.
    #[instrument(
        skip(self, notice),
        fields(shopper_id = %shopper_id, tx_ref = %notice.tx_ref, status = %notice.status)
    )]
    pub async fn handle_completion(
        &self,
        shopper_id: &ShopperId,
        notice: CompletionNotice,
    ) -> Result<NotificationResult, CheckoutError> {
        let entry = match self.lookup_attempt(shopper_id, &notice.tx_ref).await {
            Ok(entry) => entry,
            Err(e) => {
                if is_success_status(&notice.status) {
                    error!("Payment succeeded for an unknown or closed attempt; reconcile manually");
                }
                return Err(e);
            }
        };

        let Some(outcome) = entry.attempt.complete(&notice) else {
            return Ok(NotificationResult::Ignored);
        };
        let succeeded = matches!(outcome, PaymentOutcome::Success(_));

        let Some(shared) = self.inner.sessions.get(&entry.shopper).await else {
            if succeeded {
                error!(
                    shopper_id = %entry.shopper,
                    "Payment succeeded for an expired shopper session; reconcile manually"
                );
            }
            return Ok(NotificationResult::Ignored);
        };

        let transition = {
            let mut guard = shared.lock().await;
            match guard.checkout.as_mut() {
                Some(checkout) => checkout.record_outcome(&notice.tx_ref, outcome),
                None => Transition::Stale,
            }
        };

        match transition {
            Transition::CreateOrder => {}
            Transition::Declined { reason } => return Ok(NotificationResult::Declined { reason }),
            Transition::SteppedBack => return Ok(NotificationResult::SteppedBack),
            Transition::Stale => {
                if succeeded {
                    error!("Payment succeeded for a checkout that moved on; reconcile manually");
                }
                return Ok(NotificationResult::Ignored);
            }
        }

        let service = self.clone();
        let tx_ref = notice.tx_ref;
        let finalize = tokio::spawn(
            async move { service.finalize_order(shared, &tx_ref).await }.in_current_span(),
        );

        // The task is never aborted, so a join error can only be a panic.
        let order_id = finalize
            .await
            .unwrap_or_else(|e| std::panic::resume_unwind(e.into_panic()))?;
        Ok(NotificationResult::Confirmed { order_id })
    }

    /// Handle the widget's dismissal callback.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::UnknownTransaction`] for a reference not issued to
    /// this shopper.
    #[instrument(skip(self), fields(shopper_id = %shopper_id))]
    pub async fn handle_dismissal(
        &self,
        shopper_id: &ShopperId,
        tx_ref: &str,
    ) -> Result<NotificationResult, CheckoutError> {
        let entry = self.lookup_attempt(shopper_id, tx_ref).await?;

        let Some(outcome) = entry.attempt.dismiss() else {
            return Ok(NotificationResult::Ignored);
        };

        let Some(shared) = self.inner.sessions.get(&entry.shopper).await else {
            return Ok(NotificationResult::Ignored);
        };
        let mut guard = shared.lock().await;
        let transition = match guard.checkout.as_mut() {
            Some(checkout) => checkout.record_outcome(tx_ref, outcome),
            None => Transition::Stale,
        };

        Ok(match transition {
            Transition::SteppedBack => NotificationResult::SteppedBack,
            _ => NotificationResult::Ignored,
        })
    }
}
