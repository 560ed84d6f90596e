//! InterOps API: error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use interop_core::error::{DomainError, FieldError};
use interop_store::StoreError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Startup and runtime errors for the API server.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Database connection or migration error.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// An upstream client could not be constructed.
    #[error("upstream client error: {0}")]
    Upstream(#[from] DomainError),

    /// Tracing or span exporter setup failed.
    #[error("observability error: {0}")]
    Observability(String),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
    /// Field-level failures, for validation errors only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

/// HTTP-layer wrapper around `DomainError` that implements `IntoResponse`.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self.0 {
            DomainError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            DomainError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
            DomainError::Configuration(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "configuration_error")
            }
            DomainError::Upstream(_) => (StatusCode::BAD_GATEWAY, "upstream_error"),
            DomainError::Infrastructure(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "infrastructure_error")
            }
        };
        if status.is_server_error() {
            error!(error = %self.0, "request failed");
        }

        let body = ErrorBody {
            error: error_code,
            message: self.0.to_string(),
            details: self.0.field_errors().map(<[FieldError]>::to_vec),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use http_body_util::BodyExt;
    use serde_json::Value;

    fn status_of(err: DomainError) -> StatusCode {
        let response = ApiError(err).into_response();
        response.status()
    }

    #[test]
    fn test_validation_maps_to_400() {
        assert_eq!(
            status_of(DomainError::Validation(vec![FieldError::new("eventId", "is required")])),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_invalid_request_maps_to_400() {
        assert_eq!(
            status_of(DomainError::InvalidRequest("bad input".into())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_configuration_maps_to_500() {
        assert_eq!(
            status_of(DomainError::Configuration("no endpoint".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_upstream_maps_to_502() {
        assert_eq!(
            status_of(DomainError::Upstream("engine down".into())),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_infrastructure_maps_to_500() {
        assert_eq!(
            status_of(DomainError::Infrastructure("db down".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_validation_body_lists_field_details() {
        // Arrange
        let err = DomainError::Validation(vec![
            FieldError::new("eventId", "is required"),
            FieldError::new("timestamp", "is not a valid date-time"),
        ]);

        // Act
        let response = ApiError(err).into_response();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: Value = serde_json::from_slice(&bytes).unwrap();

        // Assert
        assert_eq!(json["error"], "validation_error");
        assert_eq!(json["details"].as_array().unwrap().len(), 2);
        assert_eq!(json["details"][1]["field"], "timestamp");
    }

    #[tokio::test]
    async fn test_non_validation_body_omits_details() {
        let response = ApiError(DomainError::Upstream("engine down".into())).into_response();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: Value = serde_json::from_slice(&bytes).unwrap();

        assert!(json.get("details").is_none());
    }
}
