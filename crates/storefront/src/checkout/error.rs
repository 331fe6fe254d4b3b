//! Checkout error taxonomy.
//!
//! Every error is handled at the step where it occurs. None trigger an
//! automatic retry; a retry is always the shopper's choice and always gets a
//! fresh payment intent.

use thiserror::Error;

use super::orchestrator::CheckoutStep;
use super::shipping::ShippingValidationError;
use crate::services::BackendError;

/// Why a payment could not be started. Checked before any network call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentInitError {
    /// The gateway script has not finished loading in the browser.
    #[error("payment widget is not ready, please try again")]
    WidgetNotLoaded,

    /// No signed-in user.
    #[error("please sign in to complete your payment")]
    NotAuthenticated,

    /// The amount to charge is zero or negative.
    #[error("amount must be greater than zero")]
    NonPositiveAmount,

    /// Cart checkout with no lines.
    #[error("cart is empty")]
    EmptyCart,
}

/// Errors surfaced by the checkout flow.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Shipping form failed local validation.
    #[error("{0}")]
    Validation(#[from] ShippingValidationError),

    /// Could not obtain an identity token for the payment.
    #[error("could not verify your session: {0}")]
    Auth(#[source] BackendError),

    /// Payment preconditions not met.
    #[error("{0}")]
    PaymentInit(#[from] PaymentInitError),

    /// Gateway reported a non-success status.
    #[error("payment was not successful: {reason}")]
    PaymentDeclined {
        /// Gateway message, or the raw status when no message was sent.
        reason: String,
    },

    /// Shopper closed the payment widget.
    #[error("payment was cancelled")]
    Dismissed,

    /// Payment was captured but the order could not be saved.
    #[error("payment {tx_ref} was received but the order could not be saved: {source}")]
    OrderPersist {
        /// Our transaction reference for the captured payment.
        tx_ref: String,
        /// Gateway transaction id for the captured payment.
        transaction_id: String,
        #[source]
        source: BackendError,
    },

    /// Operation not allowed in the current step.
    #[error("cannot {action} while checkout is {step}")]
    InvalidTransition {
        action: &'static str,
        step: CheckoutStep,
    },

    /// No checkout has been started for this shopper.
    #[error("no checkout in progress")]
    NotStarted,

    /// Notification for a transaction reference we did not issue.
    #[error("unknown payment reference {0}")]
    UnknownTransaction(String),
}

impl CheckoutError {
    /// Whether money has already left the customer's account.
    #[must_use]
    pub const fn payment_captured(&self) -> bool {
        matches!(self, Self::OrderPersist { .. })
    }

    /// Whether the shopper can retry by starting a new payment attempt.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Auth(_) | Self::PaymentInit(_) | Self::PaymentDeclined { .. }
        )
    }
}
