//! `OpenEMR` OAuth2 password-grant token manager.
//!
//! The token is cached in memory and refreshed when it is missing or within
//! [`REFRESH_BUFFER_SECS`] of expiry. The cache sits behind an async mutex
//! held across the refresh request, so concurrent callers wait for a single
//! refresh instead of racing their own.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use interop_core::clock::Clock;
use interop_core::error::DomainError;
use interop_core::upstream::{AccessTokenProvider, TokenStatus};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{error, info, instrument, warn};

/// Tokens expiring within this many seconds are refreshed proactively.
pub const REFRESH_BUFFER_SECS: i64 = 300;

const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

/// Password-grant settings. Every field is optional so the service can start
/// without them; a refresh with incomplete settings fails.
#[derive(Debug, Clone, Default)]
pub struct OpenEmrCredentials {
    pub token_url: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub scope: Option<String>,
    pub user_role: Option<String>,
}

impl OpenEmrCredentials {
    fn form(&self) -> Result<(&str, Vec<(&'static str, &str)>), DomainError> {
        let required = [
            ("OPENEMR_TOKEN_URL", self.token_url.as_deref()),
            ("OPENEMR_CLIENT_ID", self.client_id.as_deref()),
            ("OPENEMR_CLIENT_SECRET", self.client_secret.as_deref()),
            ("OPENEMR_USERNAME", self.username.as_deref()),
            ("OPENEMR_PASSWORD", self.password.as_deref()),
        ];
        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.is_none_or(|v| v.trim().is_empty()))
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(DomainError::Configuration(format!(
                "OpenEMR OAuth configuration incomplete: missing {}",
                missing.join(", ")
            )));
        }

        let [token_url, client_id, client_secret, username, password] =
            required.map(|(_, value)| value.unwrap_or_default());
        let mut form = vec![
            ("grant_type", "password"),
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("username", username),
            ("password", password),
        ];
        if let Some(scope) = self.scope.as_deref() {
            form.push(("scope", scope));
        }
        if let Some(role) = self.user_role.as_deref() {
            form.push(("user_role", role));
        }
        Ok((token_url, form))
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<i64>,
    scope: Option<String>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct TokenCache {
    token: Option<CachedToken>,
    scope: Option<String>,
}

impl TokenCache {
    fn status(&self, now: DateTime<Utc>) -> TokenStatus {
        let expires_in = self
            .token
            .as_ref()
            .map(|t| (t.expires_at - now).num_seconds());
        TokenStatus {
            token_present: self.token.is_some(),
            expires_at: self.token.as_ref().map(|t| t.expires_at.timestamp()),
            expires_in_seconds: expires_in,
            expires_soon: expires_in.is_none_or(|secs| secs <= REFRESH_BUFFER_SECS),
            scope: self.scope.clone(),
        }
    }

    fn usable_token(&self, now: DateTime<Utc>) -> Option<&str> {
        if self.status(now).expires_soon {
            return None;
        }
        self.token.as_ref().map(|t| t.access_token.as_str())
    }

    fn store(&mut self, response: TokenResponse, now: DateTime<Utc>) -> Result<&str, DomainError> {
        let access_token = response
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                error!("token response missing access_token");
                DomainError::Upstream("OpenEMR token response invalid".into())
            })?;
        let expires_in = response.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS);
        let expires_at = now + TimeDelta::try_seconds(expires_in).unwrap_or(TimeDelta::zero());
        if response.scope.is_some() {
            self.scope = response.scope;
        }
        info!(expires_at = %expires_at, expires_in, "OpenEMR access token refreshed");
        let cached = self.token.insert(CachedToken {
            access_token,
            expires_at,
        });
        Ok(cached.access_token.as_str())
    }
}

/// Caching token manager for the `OpenEMR` password grant.
pub struct OpenEmrTokenManager {
    client: reqwest::Client,
    credentials: OpenEmrCredentials,
    clock: Arc<dyn Clock>,
    cache: Mutex<TokenCache>,
}

impl std::fmt::Debug for OpenEmrTokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenEmrTokenManager")
            .field("token_url", &self.credentials.token_url)
            .finish_non_exhaustive()
    }
}

impl OpenEmrTokenManager {
    /// Creates a manager with an empty cache.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Configuration` if the HTTP client cannot be built.
    pub fn new(
        credentials: OpenEmrCredentials,
        timeout: Duration,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::Configuration(format!("http client: {e}")))?;
        let cache = TokenCache {
            token: None,
            scope: credentials.scope.clone(),
        };
        Ok(Self {
            client,
            credentials,
            clock,
            cache: Mutex::new(cache),
        })
    }

    #[instrument(skip_all)]
    async fn request_token(&self) -> Result<TokenResponse, DomainError> {
        let (token_url, form) = self.credentials.form().inspect_err(|e| {
            error!(error = %e, "cannot refresh OpenEMR token");
        })?;

        let response = self
            .client
            .post(token_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "OpenEMR token endpoint unreachable");
                DomainError::Upstream(format!("failed to refresh OpenEMR token: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), %body, "OpenEMR token endpoint returned error");
            return Err(DomainError::Upstream(format!(
                "OpenEMR token endpoint returned {status}"
            )));
        }

        response.json::<TokenResponse>().await.map_err(|e| {
            error!(error = %e, "OpenEMR token response unreadable");
            DomainError::Upstream("OpenEMR token response invalid".into())
        })
    }
}

#[async_trait]
impl AccessTokenProvider for OpenEmrTokenManager {
    async fn access_token(&self) -> Result<String, DomainError> {
        let mut cache = self.cache.lock().await;
        if let Some(token) = cache.usable_token(self.clock.now()) {
            return Ok(token.to_owned());
        }
        let response = self.request_token().await?;
        cache
            .store(response, self.clock.now())
            .map(str::to_owned)
    }

    async fn force_refresh(&self) -> Result<TokenStatus, DomainError> {
        let mut cache = self.cache.lock().await;
        cache.token = None;
        let response = self.request_token().await?;
        let now = self.clock.now();
        cache.store(response, now)?;
        Ok(cache.status(now))
    }

    async fn status(&self) -> TokenStatus {
        self.cache.lock().await.status(self.clock.now())
    }
}
