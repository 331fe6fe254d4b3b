//! Cart route handlers.
//!
//! The cart lives in memory under the shopper's session. Every handler
//! returns the full cart view so the client never has to recompute totals.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use hearth_core::{Price, ProductId, ProductType};

use crate::cart::{CartItem, CartLedger, CartLineItem};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::ShopperSession;
use crate::state::AppState;

/// Tax label shown wherever totals are; prices already include it.
pub const TAX_LABEL: &str = "Included";

/// Cart line display data.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemView {
    pub id: ProductId,
    pub name: String,
    pub product_type: ProductType,
    pub quantity: u32,
    pub unit_price: String,
    pub line_price: String,
}

/// Cart display data.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub total: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    pub count: u32,
    pub tax: &'static str,
}

impl From<&CartLineItem> for CartItemView {
    fn from(line: &CartLineItem) -> Self {
        Self {
            id: line.id.clone(),
            name: line.name.clone(),
            product_type: line.product_type,
            quantity: line.quantity,
            unit_price: line.unit_price.display(),
            line_price: line.line_total().display(),
        }
    }
}

impl From<&CartLedger> for CartView {
    fn from(cart: &CartLedger) -> Self {
        let total: Price = cart.total();
        Self {
            items: cart.lines().iter().map(CartItemView::from).collect(),
            total: total.display(),
            total_amount: total.amount,
            count: cart.count(),
            tax: TAX_LABEL,
        }
    }
}

/// Add to cart request.
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub item: CartItem,
    /// Defaults to one.
    pub quantity: Option<i64>,
}

/// Set quantity request.
#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: i64,
}

/// Show the cart.
#[instrument(skip_all, fields(shopper_id = %shopper_id))]
pub async fn show(
    State(state): State<AppState>,
    ShopperSession(shopper_id): ShopperSession,
) -> Json<CartView> {
    let shared = state.sessions().get_or_create(&shopper_id).await;
    let shopper = shared.lock().await;
    Json(CartView::from(&shopper.cart))
}

/// Add an item, merging with an existing line.
#[instrument(skip_all, fields(shopper_id = %shopper_id, product_id = %request.item.id))]
pub async fn add(
    State(state): State<AppState>,
    ShopperSession(shopper_id): ShopperSession,
    Json(request): Json<AddToCartRequest>,
) -> Result<(StatusCode, Json<CartView>)> {
    let product_id = request.item.id.to_string();
    let shared = state.sessions().get_or_create(&shopper_id).await;
    let mut shopper = shared.lock().await;

    let quantity = shopper
        .cart
        .add(request.item, request.quantity.unwrap_or(1))?;

    info!(quantity, "Added to cart");
    add_breadcrumb("cart", "Added item", Some(&[("product_id", product_id.as_str())]));

    Ok((StatusCode::CREATED, Json(CartView::from(&shopper.cart))))
}

/// Set a line's quantity; zero removes it.
#[instrument(skip_all, fields(shopper_id = %shopper_id, product_id = %id))]
pub async fn update(
    State(state): State<AppState>,
    ShopperSession(shopper_id): ShopperSession,
    Path(id): Path<String>,
    Json(request): Json<UpdateQuantityRequest>,
) -> Result<Json<CartView>> {
    let shared = state.sessions().get_or_create(&shopper_id).await;
    let mut shopper = shared.lock().await;

    if !shopper
        .cart
        .set_quantity(&ProductId::new(id), request.quantity)
    {
        return Err(AppError::NotFound("Cart item".to_string()));
    }

    Ok(Json(CartView::from(&shopper.cart)))
}

/// Remove a line.
#[instrument(skip_all, fields(shopper_id = %shopper_id))]
pub async fn remove(
    State(state): State<AppState>,
    ShopperSession(shopper_id): ShopperSession,
    Path(id): Path<String>,
) -> Result<Json<CartView>> {
    let shared = state.sessions().get_or_create(&shopper_id).await;
    let mut shopper = shared.lock().await;

    shopper
        .cart
        .remove(&ProductId::new(id))
        .ok_or_else(|| AppError::NotFound("Cart item".to_string()))?;

    Ok(Json(CartView::from(&shopper.cart)))
}

/// Empty the cart.
#[instrument(skip_all, fields(shopper_id = %shopper_id))]
pub async fn clear(
    State(state): State<AppState>,
    ShopperSession(shopper_id): ShopperSession,
) -> Json<CartView> {
    let shared = state.sessions().get_or_create(&shopper_id).await;
    let mut shopper = shared.lock().await;
    shopper.cart.clear();
    Json(CartView::from(&shopper.cart))
}
