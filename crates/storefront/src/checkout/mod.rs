//! Checkout flow: shipping, payment, and order creation.
//!
//! - [`shipping`] - Shipping form validation and delivery pricing
//! - [`payment`] - Payment intents and notification reconciliation
//! - [`orchestrator`] - The checkout state machine
//! - [`finalizer`] - Order persistence and post-order side effects
//! - [`error`] - Checkout error taxonomy

pub mod error;
pub mod finalizer;
pub mod orchestrator;
pub mod payment;
pub mod shipping;

pub use error::{CheckoutError, PaymentInitError};
pub use finalizer::OrderFinalizer;
pub use orchestrator::{
    CapturedPayment, CheckoutOrchestrator, CheckoutState, CheckoutStep, OrderSnapshot,
    PaymentPhase, PaymentStage, Transition,
};
pub use payment::{
    CompletionNotice, GatewayId, PaymentAttempt, PaymentGatewayAdapter, PaymentIntent,
    PaymentOutcome, PaymentReceipt, WidgetLaunch, is_success_status,
};
pub use shipping::{
    FieldError, ShippingCollector, ShippingField, ShippingForm, ShippingSelection,
    ShippingValidationError,
};
