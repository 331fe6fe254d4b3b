//! Made-to-order descriptors.

use serde::{Deserialize, Serialize};

use hearth_core::{CustomOrderId, CustomOrderStatus, Price};

/// A bespoke item quoted outside the catalog (e.g. a celebration cake).
///
/// The custom-order record itself lives in the order API; checkout only needs
/// enough of it to price the payment and to flip its status once paid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomOrder {
    pub id: CustomOrderId,
    pub description: String,
    pub price: Price,
    #[serde(default)]
    pub status: CustomOrderStatus,
}
