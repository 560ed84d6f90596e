//! Seams to upstream collaborators: the EHR token endpoint and the
//! integration engine's patient-discovery endpoint.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::DomainError;

/// Non-sensitive view of the cached upstream access token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct TokenStatus {
    /// Whether a token is currently cached.
    pub token_present: bool,
    /// Expiry as a Unix timestamp in seconds.
    pub expires_at: Option<i64>,
    /// Seconds until expiry; negative once expired.
    pub expires_in_seconds: Option<i64>,
    /// Whether the token is absent or inside the refresh window.
    pub expires_soon: bool,
    /// Scope granted by the token endpoint.
    pub scope: Option<String>,
}

/// Supplies bearer tokens for upstream calls, refreshing on expiry.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    /// Returns a valid access token, refreshing it first when needed.
    async fn access_token(&self) -> Result<String, DomainError>;

    /// Discards any cached token and fetches a new one.
    async fn force_refresh(&self) -> Result<TokenStatus, DomainError>;

    /// Reports the cache state without contacting the token endpoint.
    async fn status(&self) -> TokenStatus;
}

/// Relays patient-discovery requests to the integration engine.
#[async_trait]
pub trait PdGateway: Send + Sync {
    /// Submit a PD search payload using the given bearer token.
    async fn submit(
        &self,
        payload: &serde_json::Value,
        access_token: &str,
    ) -> Result<(), DomainError>;
}
