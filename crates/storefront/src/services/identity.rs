//! Identity token client.
//!
//! Payment metadata carries a short-lived identity token so the backend can
//! attribute the webhook to a user. Tokens are cached for 5 minutes; a forced
//! refresh bypasses the cache and replaces the entry.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use url::Url;

use hearth_core::UserId;

use super::{BackendError, TokenProvider};
use crate::config::IdentityConfig;

const TOKEN_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TokenRequest<'a> {
    user_id: &'a str,
    force_refresh: bool,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: String,
}

/// Client for the identity provider's token endpoint.
#[derive(Clone)]
pub struct IdentityClient {
    inner: Arc<IdentityClientInner>,
}

struct IdentityClientInner {
    client: reqwest::Client,
    token_url: Url,
    cache: Cache<UserId, SecretString>,
}

impl IdentityClient {
    /// Create a new identity client.
    ///
    /// # Errors
    ///
    /// Returns error if the API key is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &IdentityConfig) -> Result<Self, BackendError> {
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

        let cache = Cache::builder()
            .max_capacity(10_000)
            .time_to_live(TOKEN_TTL)
            .build();

        Ok(Self {
            inner: Arc::new(IdentityClientInner {
                client,
                token_url: config.token_url.clone(),
                cache,
            }),
        })
    }

    async fn fetch(&self, user: &UserId, force_refresh: bool) -> Result<SecretString, BackendError> {
        let response = self
            .inner
            .client
            .post(self.inner.token_url.clone())
            .json(&TokenRequest {
                user_id: user.as_str(),
                force_refresh,
            })
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(BackendError::Unauthenticated);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(BackendError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| BackendError::Parse(e.to_string()))?;

        if body.token.trim().is_empty() {
            return Err(BackendError::Parse("identity token was empty".to_string()));
        }

        Ok(SecretString::from(body.token))
    }
}

#[async_trait]
impl TokenProvider for IdentityClient {
    #[instrument(skip(self), fields(user_id = %user))]
    async fn id_token(
        &self,
        user: &UserId,
        force_refresh: bool,
    ) -> Result<SecretString, BackendError> {
        if !force_refresh && let Some(token) = self.inner.cache.get(user).await {
            debug!("Identity token cache hit");
            return Ok(token);
        }

        let token = self.fetch(user, force_refresh).await?;
        self.inner.cache.insert(user.clone(), token.clone()).await;
        debug!(force_refresh, "Identity token fetched");
        Ok(token)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_token_request_wire_shape() {
        let json = serde_json::to_value(TokenRequest {
            user_id: "u1",
            force_refresh: true,
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"userId": "u1", "forceRefresh": true}));
    }

    #[tokio::test]
    async fn test_cached_token_served_without_refresh() {
        let client = IdentityClient::new(&IdentityConfig {
            token_url: Url::parse("http://127.0.0.1:9/token").unwrap(),
            api_key: SecretString::from("id-k3y-7c6b5a4d3e2f1a0b"),
        })
        .unwrap();
        let user = UserId::new("u1");
        client
            .inner
            .cache
            .insert(user.clone(), SecretString::from("cached"))
            .await;

        let token = client.id_token(&user, false).await.unwrap();
        assert_eq!(token.expose_secret(), "cached");
    }
}
