//! Delivery methods and the fixed shipping rate table.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::price::Price;

/// How an order reaches the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum DeliveryMethod {
    /// Customer collects from the shop.
    #[default]
    Pickup,
    /// Delivery within the shop's city.
    LocalDelivery,
    /// Delivery outside the shop's city.
    RemoteDelivery,
}

impl DeliveryMethod {
    /// All delivery methods, in display order.
    pub const ALL: [Self; 3] = [Self::Pickup, Self::LocalDelivery, Self::RemoteDelivery];

    /// Shipping price from the fixed rate table.
    #[must_use]
    pub fn shipping_price(self) -> Price {
        let amount = match self {
            Self::Pickup => 0,
            Self::LocalDelivery => 3_500,
            Self::RemoteDelivery => 6_500,
        };
        Price::ngn(Decimal::from(amount))
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pickup => "Store pickup",
            Self::LocalDelivery => "Local delivery",
            Self::RemoteDelivery => "Remote delivery",
        }
    }
}

impl fmt::Display for DeliveryMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
