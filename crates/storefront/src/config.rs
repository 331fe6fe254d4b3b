//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//! - `HEARTH_BACKEND_URL` - Order and custom-order API base URL
//! - `HEARTH_BACKEND_API_KEY` - Order API key (high entropy)
//! - `HEARTH_IDENTITY_URL` - Identity token endpoint
//! - `HEARTH_IDENTITY_API_KEY` - Identity API key (high entropy)
//! - `PAYMENT_PUBLIC_KEY` - Payment gateway public key (safe to expose in browser)
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `PAYMENT_TX_REF_PREFIX` - Transaction reference prefix (default: hearth)
//! - `PAYMENT_OPTIONS` - Gateway payment options (default: card,banktransfer,ussd)
//! - `PAYMENT_SUCCESS_DISPLAY_MS` - Delay between success and order creation (default: 1500)
//! - `CHECKOUT_CONFIRMATION_REDIRECT_MS` - Auto-navigation delay after confirmation (default: 3000)
//! - `SESSION_IDLE_TIMEOUT_SECS` - Cart/checkout idle expiry (default: 7200)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: Url,
    /// Order API configuration
    pub backend: BackendConfig,
    /// Identity token configuration
    pub identity: IdentityConfig,
    /// Payment gateway configuration
    pub payment: PaymentConfig,
    /// Checkout flow timing
    pub checkout: CheckoutConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Order API configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct BackendConfig {
    /// Base URL; endpoint paths are joined onto it
    pub base_url: Url,
    /// Bearer API key
    pub api_key: SecretString,
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// Identity token endpoint configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct IdentityConfig {
    pub token_url: Url,
    pub api_key: SecretString,
}

impl std::fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("token_url", &self.token_url.as_str())
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// Payment gateway configuration.
#[derive(Debug, Clone)]
pub struct PaymentConfig {
    /// Gateway public key (safe to expose in browser)
    pub public_key: String,
    /// Prefix for generated transaction references
    pub tx_ref_prefix: String,
    /// Comma-separated payment options offered in the widget
    pub payment_options: String,
    /// How long the success message shows before the order is created
    pub success_display_delay: Duration,
}

/// Checkout flow timing.
#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    /// Auto-navigation delay after confirmation, sent to the browser
    pub confirmation_redirect: Duration,
    /// Idle time after which a shopper's cart and checkout are dropped
    pub session_idle_timeout: Duration,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_parsed_or_default::<IpAddr>("STOREFRONT_HOST", "127.0.0.1")?;
        let port = get_parsed_or_default::<u16>("STOREFRONT_PORT", "3000")?;
        let base_url = get_required_url("STOREFRONT_BASE_URL")?;

        Ok(Self {
            host,
            port,
            base_url,
            backend: BackendConfig::from_env()?,
            identity: IdentityConfig::from_env()?,
            payment: PaymentConfig::from_env()?,
            checkout: CheckoutConfig::from_env()?,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl BackendConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: with_trailing_slash(get_required_url("HEARTH_BACKEND_URL")?),
            api_key: get_validated_secret("HEARTH_BACKEND_API_KEY")?,
        })
    }
}

impl IdentityConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            token_url: get_required_url("HEARTH_IDENTITY_URL")?,
            api_key: get_validated_secret("HEARTH_IDENTITY_API_KEY")?,
        })
    }
}

impl PaymentConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let public_key = get_required_env("PAYMENT_PUBLIC_KEY")?;
        let tx_ref_prefix = get_env_or_default("PAYMENT_TX_REF_PREFIX", "hearth");
        if tx_ref_prefix.is_empty() || !tx_ref_prefix.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ConfigError::InvalidEnvVar(
                "PAYMENT_TX_REF_PREFIX".to_string(),
                "must be non-empty and alphanumeric".to_string(),
            ));
        }

        Ok(Self {
            public_key,
            tx_ref_prefix,
            payment_options: get_env_or_default("PAYMENT_OPTIONS", "card,banktransfer,ussd"),
            success_display_delay: Duration::from_millis(get_parsed_or_default(
                "PAYMENT_SUCCESS_DISPLAY_MS",
                "1500",
            )?),
        })
    }
}

impl CheckoutConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            confirmation_redirect: Duration::from_millis(get_parsed_or_default(
                "CHECKOUT_CONFIRMATION_REDIRECT_MS",
                "3000",
            )?),
            session_idle_timeout: Duration::from_secs(get_parsed_or_default(
                "SESSION_IDLE_TIMEOUT_SECS",
                "7200",
            )?),
        })
    }
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            confirmation_redirect: Duration::from_millis(3000),
            session_idle_timeout: Duration::from_secs(7200),
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn get_parsed_or_default<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    parse_value(key, &get_env_or_default(key, default))
}

fn parse_value<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Get a required environment variable as an absolute URL.
fn get_required_url(key: &str) -> Result<Url, ConfigError> {
    parse_value(key, &get_required_env(key)?)
}

/// `Url::join` treats the last segment as a file unless the path ends in `/`.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated key."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_bounds() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("ab") - 1.0).abs() < 0.01);
        assert!(shannon_entropy("sk_live_9fQ2xL7pR4mZ8vK1") > MIN_ENTROPY_BITS_PER_CHAR);
    }

    #[test]
    fn test_placeholder_api_keys_rejected() {
        for key in ["your-api-key-here", "changeme123", "REPLACE_WITH_KEY"] {
            let err = validate_secret_strength(key, "HEARTH_BACKEND_API_KEY").unwrap_err();
            assert!(matches!(err, ConfigError::InsecureSecret(ref var, _) if var == "HEARTH_BACKEND_API_KEY"));
        }
    }

    #[test]
    fn test_low_entropy_key_rejected() {
        assert!(validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "K").is_err());
        assert!(validate_secret_strength("sk_live_9fQ2xL7pR4mZ8vK1", "K").is_ok());
    }

    #[test]
    fn test_parse_value_reports_variable() {
        let err = parse_value::<u16>("STOREFRONT_PORT", "70000").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "STOREFRONT_PORT"));
        assert_eq!(parse_value::<u64>("PAYMENT_SUCCESS_DISPLAY_MS", " 1500 ").unwrap(), 1500);
    }

    #[test]
    fn test_backend_url_gets_trailing_slash() {
        let url = with_trailing_slash(Url::parse("https://api.hearthgoods.ng/v1").unwrap());
        assert_eq!(url.join("orders").unwrap().as_str(), "https://api.hearthgoods.ng/v1/orders");

        let url = with_trailing_slash(Url::parse("https://api.hearthgoods.ng/").unwrap());
        assert_eq!(url.as_str(), "https://api.hearthgoods.ng/");
    }

    #[test]
    fn test_backend_config_debug_redacts_key() {
        let config = BackendConfig {
            base_url: Url::parse("https://api.hearthgoods.ng/").unwrap(),
            api_key: SecretString::from("sk_live_9fQ2xL7pR4mZ8vK1"),
        };
        let debug = format!("{config:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("sk_live"));
    }
}
