//! Integration-engine gateway for patient-discovery searches.

use std::time::Duration;

use async_trait::async_trait;
use interop_core::error::DomainError;
use interop_core::upstream::PdGateway;
use serde_json::Value;
use tracing::{debug, warn};

/// Posts PD search payloads to the integration engine's HTTP listener.
#[derive(Debug, Clone)]
pub struct MirthPdGateway {
    client: reqwest::Client,
    endpoint: Option<String>,
}

impl MirthPdGateway {
    /// Creates a gateway. A `None` endpoint is allowed so the service can
    /// start unconfigured; every submission then fails with a configuration
    /// error.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Configuration` if the HTTP client cannot be built.
    pub fn new(endpoint: Option<String>, timeout: Duration) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::Configuration(format!("http client: {e}")))?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl PdGateway for MirthPdGateway {
    async fn submit(&self, payload: &Value, access_token: &str) -> Result<(), DomainError> {
        let endpoint = self.endpoint.as_deref().ok_or_else(|| {
            DomainError::Configuration("PD endpoint URL is not configured".into())
        })?;

        let response = self
            .client
            .post(endpoint)
            .bearer_auth(access_token)
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "PD endpoint unreachable");
                DomainError::Upstream(format!("unable to submit PD request: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "PD endpoint rejected request");
            return Err(DomainError::Upstream(format!(
                "PD endpoint returned {status}"
            )));
        }
        debug!(status = status.as_u16(), "PD request accepted upstream");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn test_submit_without_endpoint_is_a_configuration_error() {
        let gateway = MirthPdGateway::new(None, Duration::from_secs(1)).unwrap();

        let result = gateway.submit(&json!({}), "tok").await;

        assert!(matches!(result, Err(DomainError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_submit_to_unreachable_endpoint_is_an_upstream_error() {
        // Port 9 on loopback (discard) is closed on test hosts.
        let gateway = MirthPdGateway::new(
            Some("http://127.0.0.1:9/pd".to_owned()),
            Duration::from_secs(1),
        )
        .unwrap();

        let result = gateway.submit(&json!({}), "tok").await;

        assert!(matches!(result, Err(DomainError::Upstream(_))));
    }
}
