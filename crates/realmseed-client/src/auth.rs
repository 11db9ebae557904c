//! Admin API authentication — static bearer token or client credentials.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{ClientError, ClientResult};

/// Credentials for the admin API.
///
/// The [`Debug`] impl redacts secrets to keep them out of log output.
#[derive(Clone, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AdminCredentials {
    /// Static bearer token.
    Bearer { token: String },

    /// Client credentials grant against the server's token endpoint.
    ClientCredentials {
        client_id: String,
        client_secret: String,
        token_endpoint: String,
    },
}

impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bearer { .. } => f
                .debug_struct("Bearer")
                .field("token", &"[REDACTED]")
                .finish(),
            Self::ClientCredentials {
                client_id,
                token_endpoint,
                ..
            } => f
                .debug_struct("ClientCredentials")
                .field("client_id", client_id)
                .field("client_secret", &"[REDACTED]")
                .field("token_endpoint", token_endpoint)
                .finish(),
        }
    }
}

/// Token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// A cached access token with expiry.
#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Option<Instant>,
}

impl CachedToken {
    fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(exp) => Instant::now() >= exp,
            None => false,
        }
    }
}

/// Margin subtracted from the reported token lifetime so a token is never
/// used right at its expiry instant.
const EXPIRY_MARGIN: Duration = Duration::from_secs(10);

/// Authentication handler for the admin API.
///
/// Bearer tokens are used as-is; client-credentials tokens are fetched on
/// demand and cached (shared across clones) until shortly before expiry.
#[derive(Debug, Clone)]
pub struct AdminAuth {
    credentials: AdminCredentials,
    cached_token: Arc<RwLock<Option<CachedToken>>>,
    http_client: reqwest::Client,
}

impl AdminAuth {
    /// Create a new auth handler.
    #[must_use]
    pub fn new(credentials: AdminCredentials, http_client: reqwest::Client) -> Self {
        Self {
            credentials,
            cached_token: Arc::new(RwLock::new(None)),
            http_client,
        }
    }

    /// The bearer token to use for the next request.
    pub async fn bearer_token(&self) -> ClientResult<String> {
        match &self.credentials {
            AdminCredentials::Bearer { token } => Ok(token.clone()),
            AdminCredentials::ClientCredentials {
                client_id,
                client_secret,
                token_endpoint,
            } => {
                {
                    let cache = self.cached_token.read().await;
                    if let Some(cached) = cache.as_ref() {
                        if !cached.is_expired() {
                            return Ok(cached.access_token.clone());
                        }
                    }
                }

                debug!(endpoint = %token_endpoint, "fetching admin access token");
                let response = self
                    .http_client
                    .post(token_endpoint)
                    .basic_auth(client_id, Some(client_secret))
                    .form(&[("grant_type", "client_credentials")])
                    .send()
                    .await
                    .map_err(|e| ClientError::Auth(format!("token request failed: {e}")))?;

                if !response.status().is_success() {
                    let status = response.status();
                    let body = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "<no body>".to_string());
                    return Err(ClientError::Auth(format!(
                        "token endpoint returned {status}: {body}"
                    )));
                }

                let token: TokenResponse = response
                    .json()
                    .await
                    .map_err(|e| ClientError::Auth(format!("bad token response: {e}")))?;

                let expires_at = token
                    .expires_in
                    .map(|secs| Instant::now() + Duration::from_secs(secs).saturating_sub(EXPIRY_MARGIN));

                let mut cache = self.cached_token.write().await;
                *cache = Some(CachedToken {
                    access_token: token.access_token.clone(),
                    expires_at,
                });
                Ok(token.access_token)
            }
        }
    }

    /// Drop the cached token, forcing a refresh on the next request.
    /// Called by the HTTP client on 401.
    pub async fn invalidate(&self) {
        let mut cache = self.cached_token.write().await;
        *cache = None;
    }
}
