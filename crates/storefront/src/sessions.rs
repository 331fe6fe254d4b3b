//! In-memory shopper registry.
//!
//! Each browser session gets a [`ShopperId`]; the registry maps it to that
//! shopper's cart and checkout behind a single async mutex, so every
//! mutation for one shopper runs one at a time. Entries expire after the
//! configured idle time.
//!
//! Payment attempts are also indexed by transaction reference. Gateway
//! notifications only carry the reference, and resolving an attempt's latch
//! through this index never needs the shopper lock.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tokio::sync::Mutex;
use tracing::debug;

use crate::cart::CartLedger;
use crate::checkout::{CheckoutOrchestrator, PaymentAttempt};
use crate::models::ShopperId;

/// Everything held for one shopper.
#[derive(Debug, Default)]
pub struct Shopper {
    pub cart: CartLedger,
    pub checkout: Option<CheckoutOrchestrator>,
}

/// Shared handle to one shopper's state.
pub type SharedShopper = Arc<Mutex<Shopper>>;

/// Attempt index entry.
#[derive(Debug, Clone)]
pub struct AttemptEntry {
    pub shopper: ShopperId,
    pub attempt: Arc<PaymentAttempt>,
}

/// Registry of live shoppers and their payment attempts.
#[derive(Clone)]
pub struct ShopperSessions {
    shoppers: Cache<ShopperId, SharedShopper>,
    attempts: Cache<String, AttemptEntry>,
}

impl ShopperSessions {
    /// Create a registry whose entries expire after `idle_timeout` without use.
    #[must_use]
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            shoppers: Cache::builder()
                .max_capacity(100_000)
                .time_to_idle(idle_timeout)
                .build(),
            attempts: Cache::builder()
                .max_capacity(100_000)
                .time_to_idle(idle_timeout)
                .build(),
        }
    }

    /// Get a shopper's state, creating an empty cart on first use.
    pub async fn get_or_create(&self, id: &ShopperId) -> SharedShopper {
        self.shoppers
            .get_with(id.clone(), async {
                debug!(shopper_id = %id, "New shopper session");
                Arc::new(Mutex::new(Shopper::default()))
            })
            .await
    }

    /// Get a shopper's state if it is still live.
    pub async fn get(&self, id: &ShopperId) -> Option<SharedShopper> {
        self.shoppers.get(id).await
    }

    /// Index a launched attempt by its transaction reference.
    pub async fn register_attempt(&self, shopper: &ShopperId, attempt: Arc<PaymentAttempt>) {
        let tx_ref = attempt.tx_ref().to_string();
        self.attempts
            .insert(
                tx_ref,
                AttemptEntry {
                    shopper: shopper.clone(),
                    attempt,
                },
            )
            .await;
    }

    /// Look up an attempt by transaction reference.
    pub async fn attempt(&self, tx_ref: &str) -> Option<AttemptEntry> {
        self.attempts.get(tx_ref).await
    }

    /// Drop a settled or superseded attempt so its reference stops resolving.
    pub async fn forget_attempt(&self, tx_ref: &str) {
        if self.attempts.remove(tx_ref).await.is_some() {
            debug!(%tx_ref, "Payment attempt forgotten");
        }
    }
}
