//! Hearth storefront library.
//!
//! Cart, checkout and payment reconciliation for the Hearth Goods shop,
//! exposed as a library so the binary and the integration tests build the
//! same router.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod checkout;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod sessions;
pub mod state;

use axum::Router;

use state::AppState;

/// Build the application router with its session layer.
///
/// Observability layers (tracing, request IDs, Sentry) are added by the
/// binary.
pub fn app(state: AppState) -> Router {
    let session_layer = middleware::create_session_layer(state.config());

    routes::routes().layer(session_layer).with_state(state)
}
