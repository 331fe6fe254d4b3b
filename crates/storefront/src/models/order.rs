//! Order payloads exchanged with the order API.
//!
//! Field names follow the order API's camelCase JSON and money travels as
//! plain numbers, so these types serialize amounts with
//! `rust_decimal::serde::float` rather than the string form used elsewhere.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use hearth_core::{CustomOrderId, DeliveryMethod, OrderId, ProductType, UserId};

/// One line on a persisted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    /// Catalog product id, or the custom order id for a made-to-order line.
    pub product_id: String,
    pub name: String,
    pub quantity: u32,
    /// Unit price.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub product_type: ProductType,
}

/// Where and how the order is delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    pub delivery_method: DeliveryMethod,
}

/// Gateway confirmation recorded on the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResult {
    /// Gateway transaction id.
    pub id: String,
    /// Status string exactly as the gateway reported it.
    pub status: String,
    pub tx_ref: String,
    pub update_time: DateTime<Utc>,
    pub email_address: String,
}

/// Order payload sent to the order API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub user_id: UserId,
    pub items: Vec<OrderItem>,
    pub shipping_address: ShippingAddress,
    pub payment_result: PaymentResult,
    #[serde(with = "rust_decimal::serde::float")]
    pub items_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub shipping_price: Decimal,
    /// Items plus shipping. Tax is shown as included and never added.
    #[serde(with = "rust_decimal::serde::float")]
    pub total_price: Decimal,
    pub is_custom_order: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_order_id: Option<CustomOrderId>,
}

/// Identifier returned by the order API for a created order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatedOrder {
    #[serde(alias = "_id")]
    pub id: OrderId,
}

/// A persisted order. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    #[serde(flatten)]
    pub details: NewOrder,
}

impl Order {
    #[must_use]
    pub const fn new(id: OrderId, details: NewOrder) -> Self {
        Self { id, details }
    }

    #[must_use]
    pub const fn is_custom_order(&self) -> bool {
        self.details.is_custom_order
    }

    #[must_use]
    pub const fn total_price(&self) -> Decimal {
        self.details.total_price
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_created_order_accepts_document_id() {
        let created: CreatedOrder =
            serde_json::from_str(r#"{"_id":"665f1c","user":"u1","totalPrice":5500}"#).unwrap();
        assert_eq!(created.id, OrderId::new("665f1c"));

        let created: CreatedOrder = serde_json::from_str(r#"{"id":"ord_1"}"#).unwrap();
        assert_eq!(created.id, OrderId::new("ord_1"));
    }

    #[test]
    fn test_order_item_price_is_numeric() {
        let item = OrderItem {
            product_id: "A".to_string(),
            name: "Vanilla candle".to_string(),
            quantity: 2,
            price: Decimal::from(1000),
            product_type: ProductType::Candle,
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["price"], serde_json::json!(1000.0));
        assert_eq!(json["productId"], "A");
        assert_eq!(json["productType"], "candle");
    }
}
