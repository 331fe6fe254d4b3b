//! Session middleware configuration.
//!
//! Sessions are held in memory, like the carts they point at: both live only
//! as long as the process and the shopper's browser session.

use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "hearth_session";

/// Create the session layer with an in-memory store.
///
/// The cookie expires after the same idle time as the shopper's cart.
#[must_use]
pub fn create_session_layer(config: &StorefrontConfig) -> SessionManagerLayer<MemoryStore> {
    let is_secure = config.base_url.scheme() == "https";
    let idle_seconds =
        i64::try_from(config.checkout.session_idle_timeout.as_secs()).unwrap_or(i64::MAX);

    SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(idle_seconds),
        ))
        .with_secure(is_secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
