//! Test doubles for the upstream token endpoint and PD gateway.

use std::sync::Mutex;

use async_trait::async_trait;
use interop_core::error::DomainError;
use interop_core::upstream::{AccessTokenProvider, PdGateway, TokenStatus};

/// A token provider that always hands out the same token.
#[derive(Debug, Clone)]
pub struct StaticTokenProvider(pub String);

#[async_trait]
impl AccessTokenProvider for StaticTokenProvider {
    async fn access_token(&self) -> Result<String, DomainError> {
        Ok(self.0.clone())
    }

    async fn force_refresh(&self) -> Result<TokenStatus, DomainError> {
        Ok(self.status().await)
    }

    async fn status(&self) -> TokenStatus {
        TokenStatus {
            token_present: true,
            expires_at: None,
            expires_in_seconds: None,
            expires_soon: false,
            scope: Some("api:oemr".to_owned()),
        }
    }
}

/// A token provider whose token endpoint is always down.
#[derive(Debug)]
pub struct FailingTokenProvider;

#[async_trait]
impl AccessTokenProvider for FailingTokenProvider {
    async fn access_token(&self) -> Result<String, DomainError> {
        Err(DomainError::Upstream("token endpoint unavailable".into()))
    }

    async fn force_refresh(&self) -> Result<TokenStatus, DomainError> {
        Err(DomainError::Upstream("token endpoint unavailable".into()))
    }

    async fn status(&self) -> TokenStatus {
        TokenStatus {
            expires_soon: true,
            ..TokenStatus::default()
        }
    }
}

/// A PD gateway that records every submission and always succeeds.
#[derive(Debug, Default)]
pub struct RecordingPdGateway {
    submitted: Mutex<Vec<(serde_json::Value, String)>>,
}

impl RecordingPdGateway {
    /// Returns a snapshot of every `(payload, access_token)` submitted.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn submissions(&self) -> Vec<(serde_json::Value, String)> {
        self.submitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl PdGateway for RecordingPdGateway {
    async fn submit(
        &self,
        payload: &serde_json::Value,
        access_token: &str,
    ) -> Result<(), DomainError> {
        self.submitted
            .lock()
            .unwrap()
            .push((payload.clone(), access_token.to_owned()));
        Ok(())
    }
}

/// A PD gateway that always fails to reach the integration engine.
#[derive(Debug)]
pub struct FailingPdGateway;

#[async_trait]
impl PdGateway for FailingPdGateway {
    async fn submit(
        &self,
        _payload: &serde_json::Value,
        _access_token: &str,
    ) -> Result<(), DomainError> {
        Err(DomainError::Upstream("integration engine unreachable".into()))
    }
}
