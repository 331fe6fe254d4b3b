//! Payment gateway adapter.
//!
//! The gateway widget runs in the shopper's browser and reports back through
//! two independent notifications: a completion callback and a dismissal
//! callback. Either may arrive first, both may arrive, and they can land on
//! different server tasks. Each [`PaymentAttempt`] owns a latch; the first
//! terminal outcome to flip it is acted on. The one exception is a dismissal
//! following a decline, which still closes the attempt.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::distr::Alphanumeric;
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

use hearth_core::{CurrencyCode, Email, Price, UserId};

use super::error::{CheckoutError, PaymentInitError};
use super::shipping::Recipient;
use crate::config::PaymentConfig;
use crate::models::CurrentUser;
use crate::services::TokenProvider;

/// Gateway statuses that mean the charge went through, compared
/// case-insensitively.
pub const ACCEPTED_STATUSES: [&str; 3] = ["successful", "success", "completed"];

const STORE_NAME: &str = "Hearth Goods";
const TX_REF_SUFFIX_LEN: usize = 9;

/// Whether a gateway status string reports a successful charge.
#[must_use]
pub fn is_success_status(status: &str) -> bool {
    let status = status.trim();
    ACCEPTED_STATUSES
        .iter()
        .any(|accepted| accepted.eq_ignore_ascii_case(status))
}

/// Build a transaction reference: `{prefix}_{unix millis}_{9 lowercase alphanumerics}`.
///
/// Unique enough to avoid collisions within a session. Not a secret.
#[must_use]
pub fn generate_tx_ref(prefix: &str) -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(TX_REF_SUFFIX_LEN)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();
    format!("{prefix}_{}_{suffix}", Utc::now().timestamp_millis())
}

// =============================================================================
// Intent and notifications
// =============================================================================

/// Data the backend needs to attribute the payment.
#[derive(Debug, Clone)]
pub struct PaymentMetadata {
    pub user_id: UserId,
    pub item_ids: Vec<String>,
    pub is_custom_order: bool,
    pub auth_token: SecretString,
}

/// One payment attempt as handed to the gateway. A retry always gets a new one.
#[derive(Debug, Clone)]
pub struct PaymentIntent {
    pub transaction_ref: String,
    pub amount: Price,
    pub customer_email: Email,
    pub customer_name: String,
    pub customer_phone: String,
    pub metadata: PaymentMetadata,
}

/// Gateway transaction id; the widget sends it as either a number or a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GatewayId {
    Number(u64),
    Text(String),
}

impl std::fmt::Display for GatewayId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Payload of the widget's completion callback, relayed by the browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionNotice {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<GatewayId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<GatewayId>,
    pub tx_ref: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CompletionNotice {
    /// Gateway transaction id, from `transaction_id` or else `id`.
    #[must_use]
    pub fn gateway_transaction_id(&self) -> Option<String> {
        self.transaction_id
            .as_ref()
            .or(self.id.as_ref())
            .map(ToString::to_string)
    }
}

/// Confirmed charge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReceipt {
    pub transaction_id: String,
    pub tx_ref: String,
    /// Status exactly as the gateway sent it.
    pub raw_status: String,
    pub confirmed_at: DateTime<Utc>,
}

/// Reconciled result of one payment attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    Success(PaymentReceipt),
    Declined { reason: String },
    Dismissed,
}

// =============================================================================
// PaymentAttempt
// =============================================================================

const OPEN: u8 = 0;
const SUCCEEDED: u8 = 1;
const DECLINED: u8 = 2;
const DISMISSED: u8 = 3;

/// A launched payment intent plus its outcome latch.
#[derive(Debug)]
pub struct PaymentAttempt {
    intent: PaymentIntent,
    latch: AtomicU8,
}

impl PaymentAttempt {
    #[must_use]
    pub const fn new(intent: PaymentIntent) -> Self {
        Self {
            intent,
            latch: AtomicU8::new(OPEN),
        }
    }

    #[must_use]
    pub const fn intent(&self) -> &PaymentIntent {
        &self.intent
    }

    #[must_use]
    pub fn tx_ref(&self) -> &str {
        &self.intent.transaction_ref
    }

    /// Whether a success has been recognized.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.latch.load(Ordering::Acquire) == SUCCEEDED
    }

    /// Whether any terminal outcome has been recognized.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.latch.load(Ordering::Acquire) != OPEN
    }

    fn settle(&self, from: u8, to: u8) -> Result<(), u8> {
        self.latch
            .compare_exchange(from, to, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
    }

    /// Reconcile a completion notification.
    ///
    /// Returns the outcome only to the caller that settled the attempt;
    /// duplicates and notifications arriving after a dismissal get `None`.
    pub fn complete(&self, notice: &CompletionNotice) -> Option<PaymentOutcome> {
        if notice.tx_ref != self.tx_ref() {
            warn!(
                expected = %self.tx_ref(),
                received = %notice.tx_ref,
                "Completion notice for a different transaction"
            );
            return None;
        }

        if is_success_status(&notice.status) {
            if let Err(previous) = self.settle(OPEN, SUCCEEDED) {
                if previous == SUCCEEDED {
                    debug!(tx_ref = %self.tx_ref(), "Duplicate success notification ignored");
                } else {
                    error!(
                        tx_ref = %self.tx_ref(),
                        transaction_id = ?notice.gateway_transaction_id(),
                        "Payment reported successful after the attempt was already closed; reconcile manually"
                    );
                }
                return None;
            }

            let transaction_id = notice.gateway_transaction_id().unwrap_or_else(|| {
                warn!(tx_ref = %self.tx_ref(), "Successful payment without a gateway transaction id");
                String::new()
            });
            info!(tx_ref = %self.tx_ref(), %transaction_id, "Payment succeeded");

            return Some(PaymentOutcome::Success(PaymentReceipt {
                transaction_id,
                tx_ref: notice.tx_ref.clone(),
                raw_status: notice.status.clone(),
                confirmed_at: Utc::now(),
            }));
        }

        if self.settle(OPEN, DECLINED).is_err() {
            debug!(tx_ref = %self.tx_ref(), status = %notice.status, "Late failure notification ignored");
            return None;
        }

        let reason = notice
            .message
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map_or_else(|| format!("status {}", notice.status), str::to_string);
        info!(tx_ref = %self.tx_ref(), status = %notice.status, %reason, "Payment declined");

        Some(PaymentOutcome::Declined { reason })
    }

    /// Reconcile a dismissal notification.
    ///
    /// Wins over an open or declined attempt. A no-op after a success: the
    /// widget closes itself then, so a dismissal is not a cancellation.
    pub fn dismiss(&self) -> Option<PaymentOutcome> {
        let settled = match self.settle(OPEN, DISMISSED) {
            Err(DECLINED) => self.settle(DECLINED, DISMISSED),
            other => other,
        };
        match settled {
            Ok(()) => {
                info!(tx_ref = %self.tx_ref(), "Payment dismissed by shopper");
                Some(PaymentOutcome::Dismissed)
            }
            Err(_) => {
                debug!(tx_ref = %self.tx_ref(), "Dismissal after outcome ignored");
                None
            }
        }
    }
}

// =============================================================================
// Widget launch configuration
// =============================================================================

/// Configuration the browser passes to the gateway widget.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetLaunch {
    pub public_key: String,
    pub tx_ref: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub currency: CurrencyCode,
    pub payment_options: String,
    pub customer: WidgetCustomer,
    pub customizations: WidgetCustomizations,
    pub metadata: WidgetMetadata,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetCustomer {
    pub email: String,
    pub name: String,
    pub phone_number: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct WidgetCustomizations {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetMetadata {
    pub user_id: UserId,
    pub item_ids: Vec<String>,
    pub is_custom_order: bool,
    pub auth_token: String,
}

// =============================================================================
// PaymentGatewayAdapter
// =============================================================================

/// What the orchestrator asks the adapter to charge.
#[derive(Debug)]
pub struct PaymentRequest<'a> {
    pub user: Option<&'a CurrentUser>,
    pub recipient: &'a Recipient,
    pub amount: Price,
    pub item_ids: Vec<String>,
    pub is_custom_order: bool,
    /// Reported by the browser once the gateway script has loaded.
    pub widget_loaded: bool,
}

/// Builds payment intents and launch configuration for the gateway widget.
#[derive(Clone)]
pub struct PaymentGatewayAdapter {
    tokens: Arc<dyn TokenProvider>,
    config: PaymentConfig,
}

impl PaymentGatewayAdapter {
    #[must_use]
    pub fn new(tokens: Arc<dyn TokenProvider>, config: PaymentConfig) -> Self {
        Self { tokens, config }
    }

    #[must_use]
    pub const fn config(&self) -> &PaymentConfig {
        &self.config
    }

    /// Synchronous checks run before any network call.
    ///
    /// An empty cart is reported before the amount check so a pickup order
    /// with nothing in it says what is actually wrong.
    ///
    /// # Errors
    ///
    /// Returns the first failing [`PaymentInitError`].
    pub fn check_preconditions<'a>(
        request: &PaymentRequest<'a>,
    ) -> Result<&'a CurrentUser, PaymentInitError> {
        if !request.widget_loaded {
            return Err(PaymentInitError::WidgetNotLoaded);
        }
        let user = request.user.ok_or(PaymentInitError::NotAuthenticated)?;
        if !request.is_custom_order && request.item_ids.is_empty() {
            return Err(PaymentInitError::EmptyCart);
        }
        if !request.amount.is_positive() {
            return Err(PaymentInitError::NonPositiveAmount);
        }
        Ok(user)
    }

    /// Check preconditions, fetch a fresh identity token and open a new
    /// payment attempt.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::PaymentInit`] when a precondition fails and
    /// [`CheckoutError::Auth`] when no token can be obtained.
    #[instrument(skip_all, fields(amount = %request.amount, is_custom_order = request.is_custom_order))]
    pub async fn initiate(
        &self,
        request: PaymentRequest<'_>,
    ) -> Result<Arc<PaymentAttempt>, CheckoutError> {
        let user = Self::check_preconditions(&request)?;

        let auth_token = self
            .tokens
            .id_token(&user.id, true)
            .await
            .map_err(|e| {
                warn!(user_id = %user.id, error = %e, "Could not obtain identity token");
                CheckoutError::Auth(e)
            })?;

        let recipient = request.recipient;
        let intent = PaymentIntent {
            transaction_ref: generate_tx_ref(&self.config.tx_ref_prefix),
            amount: request.amount,
            customer_email: recipient.email.clone(),
            customer_name: recipient.full_name(),
            customer_phone: recipient.phone.clone(),
            metadata: PaymentMetadata {
                user_id: user.id.clone(),
                item_ids: request.item_ids,
                is_custom_order: request.is_custom_order,
                auth_token,
            },
        };

        info!(tx_ref = %intent.transaction_ref, user_id = %user.id, "Payment intent created");
        Ok(Arc::new(PaymentAttempt::new(intent)))
    }

    /// Widget configuration for an attempt.
    #[must_use]
    pub fn launch_config(&self, attempt: &PaymentAttempt) -> WidgetLaunch {
        let intent = attempt.intent();
        let description = if intent.metadata.is_custom_order {
            "Payment for your custom order"
        } else {
            "Payment for items in your cart"
        };

        WidgetLaunch {
            public_key: self.config.public_key.clone(),
            tx_ref: intent.transaction_ref.clone(),
            amount: intent.amount.amount,
            currency: intent.amount.currency_code,
            payment_options: self.config.payment_options.clone(),
            customer: WidgetCustomer {
                email: intent.customer_email.to_string(),
                name: intent.customer_name.clone(),
                phone_number: intent.customer_phone.clone(),
            },
            customizations: WidgetCustomizations {
                title: STORE_NAME.to_string(),
                description: description.to_string(),
            },
            metadata: WidgetMetadata {
                user_id: intent.metadata.user_id.clone(),
                item_ids: intent.metadata.item_ids.clone(),
                is_custom_order: intent.metadata.is_custom_order,
                auth_token: intent.metadata.auth_token.expose_secret().to_string(),
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use std::time::Duration;

    use crate::services::{BackendError, MockTokenProvider};

    use super::*;

    pub(crate) fn test_config() -> PaymentConfig {
        PaymentConfig {
            public_key: "FLWPUBK_TEST-hearth".to_string(),
            tx_ref_prefix: "hearth".to_string(),
            payment_options: "card,banktransfer,ussd".to_string(),
            success_display_delay: Duration::from_millis(1500),
        }
    }

    pub(crate) fn intent(tx_ref: &str) -> PaymentIntent {
        PaymentIntent {
            transaction_ref: tx_ref.to_string(),
            amount: Price::ngn(Decimal::from(5500)),
            customer_email: Email::parse("ada@example.com").unwrap(),
            customer_name: "Ada Obi".to_string(),
            customer_phone: "08012345678".to_string(),
            metadata: PaymentMetadata {
                user_id: UserId::new("u1"),
                item_ids: vec!["A".to_string()],
                is_custom_order: false,
                auth_token: SecretString::from("tok"),
            },
        }
    }

    fn notice(tx_ref: &str, status: &str) -> CompletionNotice {
        CompletionNotice {
            status: status.to_string(),
            transaction_id: Some(GatewayId::Number(4_410_987)),
            id: None,
            tx_ref: tx_ref.to_string(),
            message: None,
        }
    }

    fn recipient() -> Recipient {
        Recipient {
            email: Email::parse("ada@example.com").unwrap(),
            first_name: "Ada".to_string(),
            last_name: "Obi".to_string(),
            phone: "08012345678".to_string(),
            address: "12 Admiralty Way".to_string(),
            city: "Lekki".to_string(),
            state: "Lagos".to_string(),
            country: None,
            postal_code: None,
        }
    }

    fn user() -> CurrentUser {
        CurrentUser {
            id: UserId::new("u1"),
            email: Email::parse("ada@example.com").unwrap(),
            display_name: None,
        }
    }

    #[test]
    fn test_success_statuses_are_case_insensitive() {
        for status in ["successful", "SUCCESS", "Completed", " success "] {
            assert!(is_success_status(status), "{status}");
        }
        for status in ["failed", "cancelled", "", "succeeded"] {
            assert!(!is_success_status(status), "{status}");
        }
    }

    #[test]
    fn test_tx_ref_shape() {
        let tx_ref = generate_tx_ref("hearth");
        let parts: Vec<&str> = tx_ref.split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "hearth");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), TX_REF_SUFFIX_LEN);
        assert!(
            parts[2]
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase())
        );
        assert_ne!(generate_tx_ref("hearth"), tx_ref);
    }

    #[test]
    fn test_success_then_dismissal_acts_once() {
        let attempt = PaymentAttempt::new(intent("tx1"));

        let outcome = attempt.complete(&notice("tx1", "successful")).unwrap();
        assert!(matches!(outcome, PaymentOutcome::Success(ref r) if r.transaction_id == "4410987"));
        assert!(attempt.succeeded());

        assert_eq!(attempt.dismiss(), None);
        assert_eq!(attempt.complete(&notice("tx1", "successful")), None);
    }

    #[test]
    fn test_dismissal_then_success_is_not_acted_on() {
        let attempt = PaymentAttempt::new(intent("tx1"));
        assert_eq!(attempt.dismiss(), Some(PaymentOutcome::Dismissed));
        assert_eq!(attempt.complete(&notice("tx1", "completed")), None);
        assert!(!attempt.succeeded());
    }

    #[test]
    fn test_decline_surfaces_gateway_message() {
        let attempt = PaymentAttempt::new(intent("tx1"));
        let mut failed = notice("tx1", "failed");
        failed.message = Some("Insufficient funds".to_string());

        assert_eq!(
            attempt.complete(&failed),
            Some(PaymentOutcome::Declined {
                reason: "Insufficient funds".to_string()
            })
        );
        assert!(attempt.is_settled());
        assert_eq!(attempt.complete(&failed), None);
    }

    #[test]
    fn test_dismissal_wins_after_decline_but_not_after_success() {
        let declined = PaymentAttempt::new(intent("tx1"));
        declined.complete(&notice("tx1", "failed")).unwrap();
        assert_eq!(declined.dismiss(), Some(PaymentOutcome::Dismissed));
        assert_eq!(declined.dismiss(), None);
        assert_eq!(declined.complete(&notice("tx1", "successful")), None);

        let paid = PaymentAttempt::new(intent("tx2"));
        paid.complete(&notice("tx2", "successful")).unwrap();
        assert_eq!(paid.dismiss(), None);
        assert!(paid.succeeded());
    }

    #[test]
    fn test_notice_for_other_tx_ref_is_ignored() {
        let attempt = PaymentAttempt::new(intent("tx1"));
        assert_eq!(attempt.complete(&notice("tx2", "successful")), None);
        assert!(!attempt.is_settled());
    }

    #[test]
    fn test_notice_accepts_id_alias_and_string_ids() {
        let notice: CompletionNotice =
            serde_json::from_str(r#"{"status":"successful","id":"flw-77","tx_ref":"tx1"}"#)
                .unwrap();
        assert_eq!(notice.gateway_transaction_id().as_deref(), Some("flw-77"));

        let notice: CompletionNotice = serde_json::from_str(
            r#"{"status":"successful","transaction_id":123,"id":9,"tx_ref":"tx1"}"#,
        )
        .unwrap();
        assert_eq!(notice.gateway_transaction_id().as_deref(), Some("123"));
    }

    #[test]
    fn test_concurrent_notifications_settle_once() {
        let attempt = Arc::new(PaymentAttempt::new(intent("tx1")));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let attempt = Arc::clone(&attempt);
                std::thread::spawn(move || {
                    if i % 2 == 0 {
                        attempt.complete(&notice("tx1", "successful"))
                    } else {
                        attempt.dismiss()
                    }
                })
            })
            .collect();

        let acted = handles
            .into_iter()
            .filter_map(|h| h.join().unwrap())
            .count();
        assert_eq!(acted, 1);
    }

    #[test]
    fn test_preconditions_in_order() {
        let recipient = recipient();
        let user = user();
        let base = || PaymentRequest {
            user: Some(&user),
            recipient: &recipient,
            amount: Price::ngn(Decimal::from(5500)),
            item_ids: vec!["A".to_string()],
            is_custom_order: false,
            widget_loaded: true,
        };

        assert!(PaymentGatewayAdapter::check_preconditions(&base()).is_ok());

        let request = PaymentRequest {
            widget_loaded: false,
            ..base()
        };
        assert_eq!(
            PaymentGatewayAdapter::check_preconditions(&request).unwrap_err(),
            PaymentInitError::WidgetNotLoaded
        );

        let request = PaymentRequest { user: None, ..base() };
        assert_eq!(
            PaymentGatewayAdapter::check_preconditions(&request).unwrap_err(),
            PaymentInitError::NotAuthenticated
        );

        let request = PaymentRequest {
            item_ids: Vec::new(),
            amount: Price::zero(),
            ..base()
        };
        assert_eq!(
            PaymentGatewayAdapter::check_preconditions(&request).unwrap_err(),
            PaymentInitError::EmptyCart
        );

        let request = PaymentRequest {
            amount: Price::zero(),
            ..base()
        };
        assert_eq!(
            PaymentGatewayAdapter::check_preconditions(&request).unwrap_err(),
            PaymentInitError::NonPositiveAmount
        );

        let request = PaymentRequest {
            item_ids: Vec::new(),
            is_custom_order: true,
            ..base()
        };
        assert!(PaymentGatewayAdapter::check_preconditions(&request).is_ok());
    }

    #[tokio::test]
    async fn test_initiate_forces_token_refresh() {
        let mut tokens = MockTokenProvider::new();
        tokens
            .expect_id_token()
            .withf(|user, force| user.as_str() == "u1" && *force)
            .times(1)
            .returning(|_, _| Ok(SecretString::from("fresh-token")));

        let adapter = PaymentGatewayAdapter::new(Arc::new(tokens), test_config());
        let recipient = recipient();
        let user = user();
        let attempt = adapter
            .initiate(PaymentRequest {
                user: Some(&user),
                recipient: &recipient,
                amount: Price::ngn(Decimal::from(5500)),
                item_ids: vec!["A".to_string()],
                is_custom_order: false,
                widget_loaded: true,
            })
            .await
            .unwrap();

        assert!(attempt.tx_ref().starts_with("hearth_"));
        let launch = adapter.launch_config(&attempt);
        assert_eq!(launch.metadata.auth_token, "fresh-token");
        assert_eq!(launch.customer.name, "Ada Obi");

        let json = serde_json::to_value(&launch).unwrap();
        assert_eq!(json["currency"], "NGN");
        assert_eq!(json["amount"], serde_json::json!(5500.0));
        assert_eq!(json["paymentOptions"], "card,banktransfer,ussd");
    }

    #[tokio::test]
    async fn test_initiate_token_failure_is_auth_error() {
        let mut tokens = MockTokenProvider::new();
        tokens
            .expect_id_token()
            .returning(|_, _| Err(BackendError::Unauthenticated));

        let adapter = PaymentGatewayAdapter::new(Arc::new(tokens), test_config());
        let recipient = recipient();
        let user = user();
        let err = adapter
            .initiate(PaymentRequest {
                user: Some(&user),
                recipient: &recipient,
                amount: Price::ngn(Decimal::from(5500)),
                item_ids: vec!["A".to_string()],
                is_custom_order: false,
                widget_loaded: true,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::Auth(BackendError::Unauthenticated)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_initiate_precondition_failure_skips_network() {
        let mut tokens = MockTokenProvider::new();
        tokens.expect_id_token().times(0);

        let adapter = PaymentGatewayAdapter::new(Arc::new(tokens), test_config());
        let recipient = recipient();
        let user = user();
        let err = adapter
            .initiate(PaymentRequest {
                user: Some(&user),
                recipient: &recipient,
                amount: Price::ngn(Decimal::from(3500)),
                item_ids: Vec::new(),
                is_custom_order: false,
                widget_loaded: true,
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "cart is empty");
    }
}
