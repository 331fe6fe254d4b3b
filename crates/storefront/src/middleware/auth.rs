//! Session extractors.
//!
//! The signed-in user is written to the session by the external sign-in
//! flow; the storefront only reads it. The shopper id is ours: it is minted
//! on first contact and keys the shopper's in-memory cart and checkout.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;
use tracing::debug;

use crate::error::AppError;
use crate::models::{CurrentUser, ShopperId, session_keys};

/// Extractor that optionally gets the signed-in user.
///
/// Never rejects; checkout decides for itself when a user is required.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(OptionalAuth(user): OptionalAuth) -> impl IntoResponse {
///     match user {
///         Some(u) => format!("Hello, {}!", u.email),
///         None => "Hello, guest!".to_string(),
///     }
/// }
/// ```
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentUser>(session_keys::CURRENT_USER)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        if let Some(user) = &user {
            crate::error::set_sentry_user(&user.id, Some(user.email.as_str()));
        }

        Ok(Self(user))
    }
}

/// Extractor for the shopper id, creating one on first use.
pub struct ShopperSession(pub ShopperId);

impl<S> FromRequestParts<S> for ShopperSession
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or_else(|| AppError::Internal("session layer not installed".to_string()))?;

        if let Some(id) = session.get::<ShopperId>(session_keys::SHOPPER_ID).await? {
            return Ok(Self(id));
        }

        let id = ShopperId::generate();
        session.insert(session_keys::SHOPPER_ID, &id).await?;
        debug!(shopper_id = %id, "Assigned shopper id");
        Ok(Self(id))
    }
}
