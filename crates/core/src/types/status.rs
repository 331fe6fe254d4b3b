//! Status and classification enums shared across the storefront.

use serde::{Deserialize, Serialize};

/// Product category as carried on a cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductType {
    /// Cakes, breads, pastries.
    BakedGoods,
    /// Scented and decorative candles.
    Candle,
    /// Printed and plain mugs.
    Mug,
    /// Made-to-order item priced outside the catalog.
    Custom,
}

/// Lifecycle of a made-to-order request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CustomOrderStatus {
    /// Submitted by the customer, awaiting a quote.
    #[default]
    Pending,
    /// Priced by the shop, awaiting payment.
    Quoted,
    /// Paid for; an order exists.
    Confirmed,
    /// Withdrawn by either side.
    Cancelled,
}

impl CustomOrderStatus {
    /// Wire value used by the custom-order API.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Quoted => "quoted",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for CustomOrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CustomOrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "quoted" => Ok(Self::Quoted),
            "confirmed" => Ok(Self::Confirmed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("invalid custom order status: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_order_status_round_trips_through_str() {
        for status in [
            CustomOrderStatus::Pending,
            CustomOrderStatus::Quoted,
            CustomOrderStatus::Confirmed,
            CustomOrderStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<CustomOrderStatus>().unwrap(), status);
        }
        assert!("shipped".parse::<CustomOrderStatus>().is_err());
    }

    #[test]
    fn test_confirmed_wire_value() {
        assert_eq!(
            serde_json::to_string(&CustomOrderStatus::Confirmed).unwrap(),
            "\"confirmed\""
        );
        assert_eq!(
            serde_json::to_string(&ProductType::BakedGoods).unwrap(),
            "\"baked_goods\""
        );
    }
}
