//! Session-related types.
//!
//! Types stored in the cookie session. The user identity is written by the
//! external sign-in flow; the storefront only reads it.

use serde::{Deserialize, Serialize};

use hearth_core::{Email, UserId, define_id};

define_id!(ShopperId);

impl ShopperId {
    /// Generate a fresh shopper id for a new browser session.
    #[must_use]
    pub fn generate() -> Self {
        Self::new(uuid::Uuid::new_v4().to_string())
    }
}

/// Session-stored user identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's id in the identity provider.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// Display name, if the user set one.
    pub display_name: Option<String>,
}

/// Session keys.
pub mod keys {
    /// Key for the signed-in user, written by the external sign-in flow.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the shopper id that indexes the in-memory cart and checkout.
    pub const SHOPPER_ID: &str = "shopper_id";
}
