//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Health check
//!
//! # Cart
//! GET    /api/cart                      - Cart view
//! DELETE /api/cart                      - Empty the cart
//! POST   /api/cart/items                - Add an item
//! PUT    /api/cart/items/{id}           - Set quantity (zero removes)
//! DELETE /api/cart/items/{id}           - Remove an item
//!
//! # Checkout
//! POST /api/checkout                    - Begin (cart or custom order)
//! GET  /api/checkout                    - Checkout view
//! PUT  /api/checkout/shipping           - Save shipping draft
//! POST /api/checkout/shipping           - Submit shipping
//! POST /api/checkout/back               - Back to shipping
//! POST /api/checkout/payment            - Open a payment attempt
//! POST /api/checkout/payment/restart    - Retry after a failed order
//! POST /api/checkout/payment/completion - Gateway completion (browser relay)
//! POST /api/checkout/payment/dismissal  - Gateway dismissal (browser relay)
//! ```

pub mod cart;
pub mod checkout;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).delete(cart::clear))
        .route("/items", post(cart::add))
        .route("/items/{id}", put(cart::update).delete(cart::remove))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::show).post(checkout::begin))
        .route(
            "/shipping",
            post(checkout::submit_shipping).put(checkout::update_shipping),
        )
        .route("/back", post(checkout::back))
        .route("/payment", post(checkout::initiate_payment))
        .route("/payment/restart", post(checkout::restart_payment))
        .route("/payment/completion", post(checkout::payment_completion))
        .route("/payment/dismissal", post(checkout::payment_dismissal))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/api/cart", cart_routes())
        .nest("/api/checkout", checkout_routes())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check collaborators.
async fn health() -> &'static str {
    "ok"
}
