//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers return `Result<T, AppError>`.
//! Responses are JSON: `{ "error": message, "code": code }`, plus `fields`
//! for shipping validation failures.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::cart::CartError;
use crate::checkout::{CheckoutError, FieldError, PaymentInitError};

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Checkout step failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Cart mutation rejected.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Session store failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: String,
    code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<&'a [FieldError]>,
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Checkout(err) => match err {
                CheckoutError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                CheckoutError::Auth(_)
                | CheckoutError::PaymentInit(PaymentInitError::NotAuthenticated) => {
                    StatusCode::UNAUTHORIZED
                }
                CheckoutError::PaymentInit(_) => StatusCode::BAD_REQUEST,
                CheckoutError::PaymentDeclined { .. } => StatusCode::PAYMENT_REQUIRED,
                CheckoutError::Dismissed | CheckoutError::InvalidTransition { .. } => {
                    StatusCode::CONFLICT
                }
                CheckoutError::OrderPersist { .. } => StatusCode::BAD_GATEWAY,
                CheckoutError::NotStarted | CheckoutError::UnknownTransaction(_) => {
                    StatusCode::NOT_FOUND
                }
            },
            Self::Cart(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Session(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code for clients.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Checkout(err) => match err {
                CheckoutError::Validation(_) => "validation_error",
                CheckoutError::Auth(_) => "auth_error",
                CheckoutError::PaymentInit(_) => "payment_init_error",
                CheckoutError::PaymentDeclined { .. } => "payment_declined",
                CheckoutError::Dismissed => "payment_dismissed",
                CheckoutError::OrderPersist { .. } => "order_persist_error",
                CheckoutError::InvalidTransition { .. } => "invalid_transition",
                CheckoutError::NotStarted => "checkout_not_started",
                CheckoutError::UnknownTransaction(_) => "unknown_transaction",
            },
            Self::Cart(_) => "cart_error",
            Self::NotFound(_) => "not_found",
            Self::BadRequest(_) => "bad_request",
            Self::Session(_) | Self::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Payment already taken; this one needs a human.
        if let Self::Checkout(CheckoutError::OrderPersist {
            tx_ref,
            transaction_id,
            ..
        }) = &self
        {
            let event_id = sentry::with_scope(
                |scope| {
                    scope.set_tag("tx_ref", tx_ref);
                    scope.set_tag("transaction_id", transaction_id);
                    scope.set_level(Some(sentry::Level::Fatal));
                },
                || sentry::capture_error(&self),
            );
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Order not saved after payment"
            );
        } else if matches!(self, Self::Session(_) | Self::Internal(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Session(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Checkout(CheckoutError::Auth(_)) => {
                "We could not verify your session. Please sign in again and retry.".to_string()
            }
            Self::Checkout(CheckoutError::OrderPersist { tx_ref, .. }) => format!(
                "Your payment was received but we could not save your order. \
                 Please contact support with reference {tx_ref}; you will not be charged again."
            ),
            Self::Checkout(err) => capitalize(&err.to_string()),
            Self::Cart(err) => capitalize(&err.to_string()),
            Self::NotFound(what) => format!("{what} not found"),
            Self::BadRequest(msg) => msg.clone(),
        };

        let fields = match &self {
            Self::Checkout(CheckoutError::Validation(err)) => Some(err.errors()),
            _ => None,
        };

        let body = ErrorBody {
            error: message,
            code: self.code(),
            fields,
        };

        (self.status(), Json(body)).into_response()
    }
}

fn capitalize(message: &str) -> String {
    let mut chars = message.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context.
///
/// Associates any later error in this request with the signed-in user.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Add a breadcrumb for shopper actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added item", Some(&[("product_id", "candle-1")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
