//! Turns a captured payment into a persisted order.

use std::sync::Arc;

use tracing::{error, info, instrument};

use hearth_core::{CustomOrderStatus, ProductType};

use super::error::CheckoutError;
use super::orchestrator::{CapturedPayment, OrderSnapshot, PaymentStage};
use crate::cart::CartLedger;
use crate::models::{NewOrder, Order, OrderItem, PaymentResult};
use crate::services::{CustomOrderStore, OrderStore};

/// Persists orders and applies their side effects.
#[derive(Clone)]
pub struct OrderFinalizer {
    orders: Arc<dyn OrderStore>,
    custom_orders: Arc<dyn CustomOrderStore>,
}

impl OrderFinalizer {
    #[must_use]
    pub fn new(orders: Arc<dyn OrderStore>, custom_orders: Arc<dyn CustomOrderStore>) -> Self {
        Self {
            orders,
            custom_orders,
        }
    }

    /// Build the order payload for a captured payment.
    ///
    /// Cart checkouts get one line per cart line; a custom order becomes a
    /// single line of quantity one. The total is items plus shipping with no
    /// separate tax line.
    #[must_use]
    pub fn build_order(stage: &PaymentStage, payment: &CapturedPayment) -> NewOrder {
        let snapshot = stage.snapshot();
        let items = match snapshot {
            OrderSnapshot::Cart { lines, .. } => lines
                .iter()
                .map(|line| OrderItem {
                    product_id: line.id.to_string(),
                    name: line.name.clone(),
                    quantity: line.quantity,
                    price: line.unit_price.amount,
                    product_type: line.product_type,
                })
                .collect(),
            OrderSnapshot::Custom { order } => vec![OrderItem {
                product_id: order.id.to_string(),
                name: order.description.clone(),
                quantity: 1,
                price: order.price.amount,
                product_type: ProductType::Custom,
            }],
        };

        let receipt = &payment.receipt;
        NewOrder {
            user_id: payment.user_id.clone(),
            items,
            shipping_address: stage.selection().to_shipping_address(),
            payment_result: PaymentResult {
                id: receipt.transaction_id.clone(),
                status: receipt.raw_status.clone(),
                tx_ref: receipt.tx_ref.clone(),
                update_time: receipt.confirmed_at,
                email_address: payment.payer_email.to_string(),
            },
            items_price: stage.items_price().amount,
            shipping_price: stage.shipping_price().amount,
            total_price: stage.total().amount,
            is_custom_order: snapshot.is_custom_order(),
            custom_order_id: snapshot.custom_order_id().cloned(),
        }
    }

    /// Persist the order, then clear the cart (cart path) or confirm the
    /// custom order (custom path). Never retries.
    ///
    /// A failed custom-order status update is reported but does not fail the
    /// order: the payment and order both exist at that point.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::OrderPersist`] when the order cannot be saved.
    /// The cart is left untouched in that case.
    #[instrument(
        skip_all,
        fields(
            tx_ref = %payment.receipt.tx_ref,
            user_id = %payment.user_id,
            is_custom_order = stage.snapshot().is_custom_order(),
        )
    )]
    pub async fn finalize(
        &self,
        stage: &PaymentStage,
        payment: &CapturedPayment,
        cart: &mut CartLedger,
    ) -> Result<Order, CheckoutError> {
        let new_order = Self::build_order(stage, payment);

        let created = self
            .orders
            .create_order(&new_order)
            .await
            .map_err(|source| {
                error!(
                    transaction_id = %payment.receipt.transaction_id,
                    error = %source,
                    "Payment captured but order could not be saved"
                );
                CheckoutError::OrderPersist {
                    tx_ref: payment.receipt.tx_ref.clone(),
                    transaction_id: payment.receipt.transaction_id.clone(),
                    source,
                }
            })?;

        info!(order_id = %created.id, total = %new_order.total_price, "Order created");

        match stage.snapshot() {
            OrderSnapshot::Cart { .. } => cart.clear(),
            OrderSnapshot::Custom { order } => {
                if let Err(e) = self
                    .custom_orders
                    .update_custom_order_status(&order.id, CustomOrderStatus::Confirmed)
                    .await
                {
                    let event_id = sentry::capture_error(&e);
                    error!(
                        custom_order_id = %order.id,
                        order_id = %created.id,
                        error = %e,
                        sentry_event_id = %event_id,
                        "Order saved but custom order status was not updated"
                    );
                }
            }
        }

        Ok(Order::new(created.id, new_order))
    }
}
