//! Routes exposing `OpenEMR` token state for observability.

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::instrument;

use interop_core::upstream::TokenStatus;
use interop_upstream::decode_jwt;

use crate::error::ApiError;
use crate::state::AppState;

/// Response body for GET /auth/openemr/status.
#[derive(Debug, Serialize)]
pub struct OpenEmrStatusResponse {
    #[serde(flatten)]
    pub status: TokenStatus,
    /// Decoded header and claims, or `{}` for an opaque token.
    pub jwt: Value,
}

fn decoded_or_empty(token: &str) -> Value {
    decode_jwt(token).map_or_else(|| json!({}), |decoded| json!(decoded))
}

/// GET /tokens/status
#[instrument(skip(state))]
async fn token_status(State(state): State<AppState>) -> Result<Json<TokenStatus>, ApiError> {
    state.token_provider.access_token().await?;
    Ok(Json(state.token_provider.status().await))
}

/// POST /tokens/refresh
#[instrument(skip(state))]
async fn token_refresh(State(state): State<AppState>) -> Result<Json<TokenStatus>, ApiError> {
    Ok(Json(state.token_provider.force_refresh().await?))
}

/// GET /tokens/jwt
#[instrument(skip(state))]
async fn token_jwt(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let token = state.token_provider.access_token().await?;
    Ok(Json(decoded_or_empty(&token)))
}

/// GET /auth/openemr/status
#[instrument(skip(state))]
async fn openemr_status(
    State(state): State<AppState>,
) -> Result<Json<OpenEmrStatusResponse>, ApiError> {
    let token = state.token_provider.access_token().await?;
    Ok(Json(OpenEmrStatusResponse {
        status: state.token_provider.status().await,
        jwt: decoded_or_empty(&token),
    }))
}

/// Returns the router for token observability.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tokens/status", get(token_status))
        .route("/tokens/refresh", post(token_refresh))
        .route("/tokens/jwt", get(token_jwt))
        .route("/auth/openemr/status", get(openemr_status))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use axum::http::StatusCode;
    use interop_test_support::{FailingTokenProvider, StaticTokenProvider};

    use crate::routes::test_support::{get, post_json, send, test_app_state};

    const SAMPLE_JWT: &str = "eyJhbGciOiJSUzI1NiIsInR5cCI6IkpXVCJ9.eyJzdWIiOiJpbnRlcm9wIn0.c2ln";

    #[tokio::test]
    async fn test_status_reports_cached_token() {
        let app = router().with_state(test_app_state());

        let (status, json) = send(app, get("/tokens/status")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["token_present"], true);
        assert_eq!(json["scope"], "api:oemr");
    }

    #[tokio::test]
    async fn test_refresh_returns_status() {
        let app = router().with_state(test_app_state());

        let (status, json) = send(app, post_json("/tokens/refresh", &Value::Null)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["expires_soon"], false);
    }

    #[tokio::test]
    async fn test_jwt_endpoint_decodes_header_and_claims() {
        // Arrange
        let mut state = test_app_state();
        state.token_provider = Arc::new(StaticTokenProvider(SAMPLE_JWT.into()));
        let app = router().with_state(state);

        // Act
        let (status, json) = send(app, get("/tokens/jwt")).await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["header"]["alg"], "RS256");
        assert_eq!(json["claims"]["sub"], "interop");
    }

    #[tokio::test]
    async fn test_openemr_status_combines_status_and_jwt() {
        let mut state = test_app_state();
        state.token_provider = Arc::new(StaticTokenProvider(SAMPLE_JWT.into()));
        let app = router().with_state(state);

        let (status, json) = send(app, get("/auth/openemr/status")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["token_present"], true);
        assert_eq!(json["jwt"]["claims"]["sub"], "interop");
    }

    #[tokio::test]
    async fn test_opaque_token_decodes_to_empty_object() {
        let app = router().with_state(test_app_state());

        let (_, json) = send(app, get("/tokens/jwt")).await;

        assert_eq!(json, json!({}));
    }

    #[tokio::test]
    async fn test_token_failure_maps_to_502() {
        let mut state = test_app_state();
        state.token_provider = Arc::new(FailingTokenProvider);
        let app = router().with_state(state);

        let (status, json) = send(app, get("/tokens/status")).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(json["error"], "upstream_error");
    }
}
