//! Domain models for the storefront.
//!
//! - [`session`] - Session-stored identity and keys
//! - [`order`] - Order payloads exchanged with the order API
//! - [`custom_order`] - Made-to-order descriptors

pub mod custom_order;
pub mod order;
pub mod session;

pub use custom_order::CustomOrder;
pub use order::{CreatedOrder, NewOrder, Order, OrderItem, PaymentResult, ShippingAddress};
pub use session::{CurrentUser, ShopperId, keys as session_keys};
