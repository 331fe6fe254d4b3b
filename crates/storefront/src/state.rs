//! Application state shared across handlers.

use std::sync::Arc;

use crate::checkout::{OrderFinalizer, PaymentGatewayAdapter};
use crate::config::StorefrontConfig;
use crate::services::{
    BackendClient, BackendError, CheckoutService, CustomOrderStore, IdentityClient, OrderStore,
    TokenProvider,
};
use crate::sessions::ShopperSessions;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// shopper registry, the checkout service and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    checkout: CheckoutService,
}

impl AppState {
    /// Create application state backed by the HTTP collaborators.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be built from the
    /// configuration.
    pub fn new(config: StorefrontConfig) -> Result<Self, BackendError> {
        let backend = Arc::new(BackendClient::new(&config.backend)?);
        let identity = Arc::new(IdentityClient::new(&config.identity)?);
        Ok(Self::with_collaborators(
            config,
            Arc::clone(&backend) as Arc<dyn OrderStore>,
            backend,
            identity,
        ))
    }

    /// Create application state with explicit collaborators.
    #[must_use]
    pub fn with_collaborators(
        config: StorefrontConfig,
        orders: Arc<dyn OrderStore>,
        custom_orders: Arc<dyn CustomOrderStore>,
        tokens: Arc<dyn TokenProvider>,
    ) -> Self {
        let sessions = ShopperSessions::new(config.checkout.session_idle_timeout);
        let adapter = PaymentGatewayAdapter::new(tokens, config.payment.clone());
        let finalizer = OrderFinalizer::new(orders, custom_orders);
        let checkout = CheckoutService::new(sessions, adapter, finalizer);

        Self {
            inner: Arc::new(AppStateInner { config, checkout }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the checkout service.
    #[must_use]
    pub fn checkout(&self) -> &CheckoutService {
        &self.inner.checkout
    }

    /// Get a reference to the shopper registry.
    #[must_use]
    pub fn sessions(&self) -> &ShopperSessions {
        self.inner.checkout.sessions()
    }
}
