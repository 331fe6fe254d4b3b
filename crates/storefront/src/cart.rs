//! Shopper cart ledger.
//!
//! The ledger is the in-memory set of line items for one shopper session.
//! It owns the quantity invariants (every stored line holds 1-100 units) and
//! derives totals on every read, so there is no cached figure to drift out of
//! sync with the lines.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use hearth_core::{Price, ProductId, ProductType};

/// Maximum units of a single product a cart line may hold.
pub const MAX_LINE_QUANTITY: u32 = 100;

/// Errors returned by cart mutations.
///
/// A rejected mutation always leaves the cart unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// The item has no product id.
    #[error("item is missing a product id")]
    MissingId,

    /// The item carries a negative unit price.
    #[error("item \"{0}\" has a negative price")]
    NegativePrice(String),

    /// Adding would take a line past the per-line limit.
    #[error("you can only have {max} of \"{name}\" in your cart")]
    QuantityLimit {
        /// Product display name.
        name: String,
        /// The per-line limit.
        max: u32,
    },
}

/// A product as offered to the cart, before a quantity is attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: ProductId,
    pub name: String,
    pub unit_price: Price,
    pub product_type: ProductType,
}

/// One product entry in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    pub id: ProductId,
    pub name: String,
    pub unit_price: Price,
    /// Always within `1..=MAX_LINE_QUANTITY`.
    pub quantity: u32,
    pub product_type: ProductType,
}

impl CartLineItem {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price.times(self.quantity)
    }
}

/// In-memory cart for one shopper session.
#[derive(Debug, Clone, Default)]
pub struct CartLedger {
    lines: Vec<CartLineItem>,
}

impl CartLedger {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Add `quantity` units of `item`, merging into an existing line with the
    /// same product id. Returns the line's new quantity.
    ///
    /// The requested quantity is clamped to `1..=100`. When merging would take
    /// the line past 100 units the whole add is rejected rather than truncated.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::MissingId`], [`CartError::NegativePrice`], or
    /// [`CartError::QuantityLimit`]; the cart is unchanged in every case.
    pub fn add(&mut self, item: CartItem, quantity: i64) -> Result<u32, CartError> {
        if item.id.is_blank() {
            warn!(name = %item.name, "Rejected cart add without a product id");
            return Err(CartError::MissingId);
        }

        if item.unit_price.is_negative() {
            warn!(product_id = %item.id, "Rejected cart add with a negative price");
            return Err(CartError::NegativePrice(item.name));
        }

        let requested = clamp_quantity(quantity, 1);

        if let Some(line) = self.lines.iter_mut().find(|line| line.id == item.id) {
            let merged = line.quantity + requested;
            if merged > MAX_LINE_QUANTITY {
                debug!(
                    product_id = %line.id,
                    current = line.quantity,
                    requested,
                    "Cart add would exceed line limit"
                );
                return Err(CartError::QuantityLimit {
                    name: line.name.clone(),
                    max: MAX_LINE_QUANTITY,
                });
            }
            line.quantity = merged;
            return Ok(merged);
        }

        self.lines.push(CartLineItem {
            id: item.id,
            name: item.name,
            unit_price: item.unit_price,
            quantity: requested,
            product_type: item.product_type,
        });
        Ok(requested)
    }

    /// Set a line's quantity, clamped to `0..=100`. Zero removes the line.
    ///
    /// Returns `false` when no line has the given id.
    pub fn set_quantity(&mut self, id: &ProductId, quantity: i64) -> bool {
        let quantity = clamp_quantity(quantity, 0);
        if quantity == 0 {
            return self.remove(id).is_some();
        }

        match self.lines.iter_mut().find(|line| &line.id == id) {
            Some(line) => {
                line.quantity = quantity;
                true
            }
            None => false,
        }
    }

    /// Remove a line, returning it if present.
    pub fn remove(&mut self, id: &ProductId) -> Option<CartLineItem> {
        let index = self.lines.iter().position(|line| &line.id == id)?;
        Some(self.lines.remove(index))
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Current lines, in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLineItem] {
        &self.lines
    }

    /// Look up a line by product id.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&CartLineItem> {
        self.lines.iter().find(|line| &line.id == id)
    }

    /// Sum of unit price times quantity over every line.
    #[must_use]
    pub fn total(&self) -> Price {
        self.lines.iter().map(CartLineItem::line_total).sum()
    }

    /// Sum of quantities over every line.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Clamp a requested quantity into `min..=MAX_LINE_QUANTITY`.
fn clamp_quantity(quantity: i64, min: u32) -> u32 {
    let clamped = quantity.clamp(i64::from(min), i64::from(MAX_LINE_QUANTITY));
    u32::try_from(clamped).unwrap_or(min)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn item(id: &str, price: i64) -> CartItem {
        CartItem {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            unit_price: Price::ngn(Decimal::from(price)),
            product_type: ProductType::Candle,
        }
    }

    #[test]
    fn test_add_merges_by_id() {
        let mut cart = CartLedger::new();
        cart.add(item("A", 1000), 2).unwrap();
        cart.add(item("A", 1000), 3).unwrap();

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.count(), 5);
        assert_eq!(cart.total(), Price::ngn(Decimal::from(5000)));
    }

    #[test]
    fn test_add_clamps_requested_quantity() {
        let mut cart = CartLedger::new();
        assert_eq!(cart.add(item("A", 10), 0).unwrap(), 1);
        assert_eq!(cart.add(item("B", 10), -4).unwrap(), 1);
        assert_eq!(cart.add(item("C", 10), 500).unwrap(), 100);
    }

    #[test]
    fn test_add_over_limit_is_rejected_not_truncated() {
        let mut cart = CartLedger::new();
        cart.add(item("A", 1000), 95).unwrap();

        let err = cart.add(item("A", 1000), 10).unwrap_err();
        assert_eq!(
            err,
            CartError::QuantityLimit {
                name: "Product A".to_string(),
                max: 100
            }
        );
        assert_eq!(cart.get(&ProductId::new("A")).unwrap().quantity, 95);

        // Exactly reaching the limit is allowed.
        cart.add(item("A", 1000), 5).unwrap();
        assert_eq!(cart.count(), 100);
    }

    #[test]
    fn test_add_without_id_is_a_no_op() {
        let mut cart = CartLedger::new();
        assert_eq!(cart.add(item("  ", 1000), 1).unwrap_err(), CartError::MissingId);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_negative_price_rejected() {
        let mut cart = CartLedger::new();
        assert!(matches!(
            cart.add(item("A", -5), 1),
            Err(CartError::NegativePrice(_))
        ));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_totals_are_exact() {
        let mut cart = CartLedger::new();
        let mut candle = item("A", 0);
        candle.unit_price = Price::ngn(Decimal::new(1234_56, 2));
        cart.add(candle, 1).unwrap();

        let id = ProductId::new("A");
        for q in 1..=100_u32 {
            assert!(cart.set_quantity(&id, i64::from(q)));
            assert_eq!(
                cart.total().amount,
                Decimal::new(1234_56, 2) * Decimal::from(q)
            );
            assert_eq!(cart.count(), q);
        }
    }

    #[test]
    fn test_set_quantity_clamps_high() {
        let mut cart = CartLedger::new();
        cart.add(item("A", 10), 1).unwrap();
        cart.set_quantity(&ProductId::new("A"), 250);
        assert_eq!(cart.count(), 100);
    }

    #[test]
    fn test_set_quantity_zero_removes_and_readd_starts_fresh() {
        let mut cart = CartLedger::new();
        cart.add(item("A", 1000), 7).unwrap();

        assert!(cart.set_quantity(&ProductId::new("A"), 0));
        assert!(cart.is_empty());

        assert_eq!(cart.add(item("A", 1000), 1).unwrap(), 1);
    }

    #[test]
    fn test_set_quantity_negative_removes() {
        let mut cart = CartLedger::new();
        cart.add(item("A", 1000), 7).unwrap();
        assert!(cart.set_quantity(&ProductId::new("A"), -3));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_unknown_line() {
        let mut cart = CartLedger::new();
        assert!(!cart.set_quantity(&ProductId::new("missing"), 3));
    }

    #[test]
    fn test_remove_and_clear() {
        let mut cart = CartLedger::new();
        cart.add(item("A", 1000), 2).unwrap();
        cart.add(item("B", 500), 1).unwrap();

        assert!(cart.remove(&ProductId::new("A")).is_some());
        assert!(cart.remove(&ProductId::new("A")).is_none());
        assert_eq!(cart.total(), Price::ngn(Decimal::from(500)));

        cart.clear();
        assert_eq!(cart.count(), 0);
        assert_eq!(cart.total(), Price::zero());
    }
}
