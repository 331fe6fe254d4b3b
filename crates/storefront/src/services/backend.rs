//! Order API client.
//!
//! Creates orders and updates custom-order status on the commerce backend.
//! Responses come wrapped in a `{ success, data, message }` envelope; a 2xx
//! with `success: false` is treated as a rejection.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use hearth_core::{CustomOrderId, CustomOrderStatus};

use super::{BackendError, CustomOrderStore, OrderStore};
use crate::config::BackendConfig;
use crate::models::{CreatedOrder, NewOrder};

/// Response envelope used by every backend endpoint.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default = "default_success")]
    success: bool,
    data: Option<T>,
    #[serde(default)]
    message: Option<String>,
}

const fn default_success() -> bool {
    true
}

/// Client for the commerce backend.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    base_url: Url,
}

impl BackendClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns error if the API key is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let mut headers = HeaderMap::new();
        let auth_value = format!("Bearer {}", config.api_key.expose_secret());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth_value)
                .map_err(|e| BackendError::Parse(format!("Invalid API key format: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            inner: Arc::new(BackendClientInner {
                client,
                base_url: config.base_url.clone(),
            }),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        self.inner
            .base_url
            .join(path)
            .map_err(|e| BackendError::Parse(format!("Invalid endpoint {path}: {e}")))
    }

    async fn read_envelope<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<Option<T>, BackendError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<Envelope<serde_json::Value>>(&body)
                .ok()
                .and_then(|e| e.message)
                .unwrap_or(body);
            return Err(BackendError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: Envelope<T> =
            serde_json::from_str(&body).map_err(|e| BackendError::Parse(e.to_string()))?;

        if !envelope.success {
            return Err(BackendError::Rejected(
                envelope
                    .message
                    .unwrap_or_else(|| "request was not successful".to_string()),
            ));
        }

        Ok(envelope.data)
    }
}

#[async_trait]
impl OrderStore for BackendClient {
    #[instrument(skip(self, order), fields(tx_ref = %order.payment_result.tx_ref))]
    async fn create_order(&self, order: &NewOrder) -> Result<CreatedOrder, BackendError> {
        let url = self.endpoint("orders")?;
        let response = self.inner.client.post(url).json(order).send().await?;

        let created: CreatedOrder = Self::read_envelope(response)
            .await?
            .ok_or_else(|| BackendError::Parse("order response had no data".to_string()))?;

        debug!(order_id = %created.id, "Order created");
        Ok(created)
    }
}

#[async_trait]
impl CustomOrderStore for BackendClient {
    #[instrument(skip(self), fields(custom_order_id = %id))]
    async fn update_custom_order_status(
        &self,
        id: &CustomOrderId,
        status: CustomOrderStatus,
    ) -> Result<(), BackendError> {
        let url = self.endpoint(&format!("custom-orders/{}/status", id.as_str()))?;
        let body = serde_json::json!({ "status": status.as_str() });
        let response = self.inner.client.put(url).json(&body).send().await?;

        Self::read_envelope::<serde_json::Value>(response).await?;
        debug!(%status, "Custom order status updated");
        Ok(())
    }
}
