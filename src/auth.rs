//! Access token handling and authorized requests.
//!
//! The API key is exchanged for a bearer token at the token endpoint. Every
//! data request carries the current token; a 401 answer means the token
//! expired, so a new one is acquired and the request is sent again, up to
//! [`MAX_ACCESS_FAILURES`] attempts in total.
//!
//! Concurrent requests that hit a 401 with the same stale token share a
//! single refresh: the first one performs the exchange, the others pick up
//! the token it stored.

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, Response, StatusCode};
use serde::Deserialize;
use tokio::sync::{Mutex, RwLock};
use url::Url;

use crate::client::SmartlogicClient;
use crate::error::{AuthError, Result, SmartlogicError};

/// Maximum number of attempts for a single authorized request.
pub const MAX_ACCESS_FAILURES: u32 = 3;

/// Content type of every data request.
pub const JSON_LD_CONTENT_TYPE: &str = "application/ld+json";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Owner of the API key and the current access token.
pub(crate) struct TokenManager {
    http: Client,
    token_url: Url,
    api_key: String,
    current: RwLock<String>,
    refresh_lock: Mutex<()>,
}

impl std::fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenManager")
            .field("token_url", &self.token_url.as_str())
            .finish_non_exhaustive()
    }
}

impl TokenManager {
    /// Create the manager and acquire the initial token.
    pub(crate) async fn connect(
        http: Client,
        token_url: Url,
        api_key: &str,
    ) -> core::result::Result<Self, AuthError> {
        let mut manager = Self {
            http,
            token_url,
            api_key: api_key.to_string(),
            current: RwLock::new(String::new()),
            refresh_lock: Mutex::new(()),
        };

        let token = manager.acquire_token().await?;
        *manager.current.get_mut() = token;

        Ok(manager)
    }

    pub(crate) fn token_url(&self) -> &Url {
        &self.token_url
    }

    pub(crate) async fn current(&self) -> String {
        self.current.read().await.clone()
    }

    /// Exchange the API key for a new bearer token.
    ///
    /// Nothing is stored and nothing is retried.
    #[tracing::instrument(skip(self), fields(token_url = %self.token_url))]
    pub(crate) async fn acquire_token(&self) -> core::result::Result<String, AuthError> {
        let response = self
            .http
            .post(self.token_url.clone())
            .form(&[("grant_type", "apikey"), ("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(AuthError::Exchange)?;

        let status = response.status();
        if !status.is_success() {
            let _ = response.bytes().await;
            return Err(AuthError::Rejected {
                status_code: status.as_u16(),
            });
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(AuthError::InvalidTokenResponse)?;

        tracing::info!("acquired access token");
        Ok(body.access_token)
    }

    /// Replace `stale` with a fresh token.
    ///
    /// If another caller already replaced `stale` while this one waited for
    /// the refresh lock, that token is returned without a new exchange.
    pub(crate) async fn refresh(&self, stale: &str) -> core::result::Result<String, AuthError> {
        let _guard = self.refresh_lock.lock().await;

        {
            let current = self.current.read().await;
            if current.as_str() != stale {
                tracing::debug!("access token already refreshed by a concurrent request");
                return Ok(current.clone());
            }
        }

        let token = self.acquire_token().await?;
        *self.current.write().await = token.clone();
        Ok(token)
    }
}

impl SmartlogicClient {
    /// Exchange the API key for a new access token.
    ///
    /// The returned token is not stored; the client keeps using its own.
    ///
    /// # Errors
    ///
    /// Returns an auth error if the exchange fails, the endpoint answers with a
    /// non-success status, or the body carries no `access_token`.
    pub async fn acquire_token(&self) -> Result<String> {
        Ok(self.tokens.acquire_token().await?)
    }

    /// Send a request with the current bearer token.
    ///
    /// A 401 answer triggers a token refresh and a resend of the same
    /// request, up to [`MAX_ACCESS_FAILURES`] attempts. Any other response is
    /// returned untouched; judging its status is up to the caller.
    ///
    /// # Errors
    ///
    /// Returns a transport error if a request cannot be sent, or
    /// [`SmartlogicError::Unauthorized`] naming `operation` and `target` if a
    /// refresh fails or every attempt was unauthorized.
    #[tracing::instrument(skip(self, method, url, body), fields(method = %method, url = %url))]
    pub async fn execute_authorized(
        &self,
        operation: &'static str,
        target: &str,
        method: Method,
        url: Url,
        body: Option<Vec<u8>>,
    ) -> Result<Response> {
        let mut token = self.tokens.current().await;

        for attempt in 1..=MAX_ACCESS_FAILURES {
            let mut request = self
                .http
                .request(method.clone(), url.clone())
                .bearer_auth(&token)
                .header(CONTENT_TYPE, JSON_LD_CONTENT_TYPE);
            if let Some(body) = &body {
                request = request.body(body.clone());
            }

            tracing::debug!(attempt, "sending authorized request");
            let response = request
                .send()
                .await
                .map_err(|source| SmartlogicError::Transport { operation, source })?;

            if response.status() != StatusCode::UNAUTHORIZED {
                return Ok(response);
            }

            // The rejected body is discarded; read it so the connection is reusable.
            let _ = response.bytes().await;

            if attempt == MAX_ACCESS_FAILURES {
                break;
            }

            tracing::warn!(attempt, "request unauthorized, refreshing access token");
            token = self
                .tokens
                .refresh(&token)
                .await
                .map_err(|e| {
                    unauthorized(operation, target, AuthError::Refresh(Box::new(e)))
                })?;
        }

        tracing::warn!(
            attempts = MAX_ACCESS_FAILURES,
            "giving up after repeated unauthorized responses"
        );
        Err(unauthorized(
            operation,
            target,
            AuthError::RetriesExhausted {
                attempts: MAX_ACCESS_FAILURES,
            },
        ))
    }
}

fn unauthorized(operation: &'static str, target: &str, source: AuthError) -> SmartlogicError {
    SmartlogicError::Unauthorized {
        operation,
        target: target.to_string(),
        source,
    }
}
