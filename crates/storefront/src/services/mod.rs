//! External collaborators used by checkout.
//!
//! - [`backend`] - Order and custom-order API client
//! - [`identity`] - Identity token provider
//! - [`checkout`] - Payment notification handling across shopper sessions
//!
//! The traits here are the seams checkout talks through. Each has a mockall
//! mock so flows can be exercised without a network.

pub mod backend;
pub mod checkout;
pub mod identity;

use async_trait::async_trait;
use mockall::automock;
use secrecy::SecretString;
use thiserror::Error;

use hearth_core::{CustomOrderId, CustomOrderStatus, UserId};

use crate::models::{CreatedOrder, NewOrder};

pub use backend::BackendClient;
pub use checkout::{CheckoutService, NotificationResult};
pub use identity::IdentityClient;

/// Errors from the order and identity APIs.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// API answered 2xx but flagged the request as unsuccessful.
    #[error("request rejected: {0}")]
    Rejected(String),

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// No signed-in user to act for.
    #[error("not signed in")]
    Unauthenticated,
}

/// Persists orders.
#[automock]
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Create an order and return its id.
    async fn create_order(&self, order: &NewOrder) -> Result<CreatedOrder, BackendError>;
}

/// Updates made-to-order records.
#[automock]
#[async_trait]
pub trait CustomOrderStore: Send + Sync {
    /// Move a custom order to a new status.
    async fn update_custom_order_status(
        &self,
        id: &CustomOrderId,
        status: CustomOrderStatus,
    ) -> Result<(), BackendError>;
}

/// Issues identity tokens that the payment gateway forwards to the backend.
#[automock]
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Token for `user`. `force_refresh` skips any cached token.
    async fn id_token(&self, user: &UserId, force_refresh: bool)
    -> Result<SecretString, BackendError>;
}
