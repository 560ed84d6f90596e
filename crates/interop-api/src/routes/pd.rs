//! Routes for the patient-discovery context.

use axum::extract::State;
use axum::{Json, Router, routing::post};
use serde::Deserialize;
use tracing::{info, instrument};

use interop_patient_discovery::application::command_handlers::{
    PdSearchReceipt, handle_submit_pd_search,
};
use interop_patient_discovery::domain::commands::{Demographics, SubmitPdSearch};

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /pd/search.
#[derive(Debug, Deserialize)]
pub struct PdSearchRequest {
    /// Optional caller id, reused as the correlation id.
    #[serde(default, alias = "requestId")]
    pub request_id: Option<String>,
    /// Who to search for.
    pub demographics: Demographics,
}

/// POST /pd/search
#[instrument(skip(state, request))]
async fn search(
    State(state): State<AppState>,
    Json(request): Json<PdSearchRequest>,
) -> Result<Json<PdSearchReceipt>, ApiError> {
    let command = SubmitPdSearch {
        request_id: request.request_id,
        demographics: request.demographics,
    };

    info!(request_id = ?command.request_id, "handling pd search");

    let receipt = handle_submit_pd_search(&command, &state.pd_search_context()).await?;
    Ok(Json(receipt))
}

/// Returns the router for the patient-discovery context.
pub fn router() -> Router<AppState> {
    Router::new().route("/pd/search", post(search))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use axum::http::StatusCode;
    use interop_test_support::{FailingPdGateway, FailingTokenProvider};
    use serde_json::{Value, json};

    use crate::routes::test_support::{post_json, send, test_app_state};

    fn search_body() -> Value {
        json!({
            "request_id": "req-42",
            "demographics": { "firstName": "Jane", "lastName": "Doe", "dob": "1990-01-01" }
        })
    }

    #[tokio::test]
    async fn test_search_returns_200_with_correlation_id() {
        // Arrange
        let state = test_app_state();
        let app = router().with_state(state.clone());

        // Act
        let (status, json) = send(app, post_json("/pd/search", &search_body())).await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!({ "status": "submitted", "correlation_id": "req-42" }));
        assert_eq!(state.telemetry_store.len(), 1);
    }

    #[tokio::test]
    async fn test_search_returns_400_for_blank_names() {
        let app = router().with_state(test_app_state());
        let body = json!({
            "demographics": { "firstName": " ", "lastName": "Doe", "dob": "1990-01-01" }
        });

        let (status, json) = send(app, post_json("/pd/search", &body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["details"][0]["field"], "demographics.firstName");
    }

    #[tokio::test]
    async fn test_search_returns_422_for_malformed_dob() {
        let app = router().with_state(test_app_state());
        let body = json!({
            "demographics": { "firstName": "Jane", "lastName": "Doe", "dob": "01/01/1990" }
        });

        let (status, _) = send(app, post_json("/pd/search", &body)).await;

        // Axum returns 422 for deserialization failures.
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_search_returns_502_and_records_failure_when_token_fails() {
        // Arrange
        let mut state = test_app_state();
        state.token_provider = Arc::new(FailingTokenProvider);
        let app = router().with_state(state.clone());

        // Act
        let (status, json) = send(app, post_json("/pd/search", &search_body())).await;

        // Assert
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(json["error"], "upstream_error");
        let events = state.telemetry_store.get_all();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].extra["failureStage"], "token");
    }

    #[tokio::test]
    async fn test_search_returns_502_when_relay_fails() {
        let mut state = test_app_state();
        state.pd_gateway = Arc::new(FailingPdGateway);
        let app = router().with_state(state);

        let (status, _) = send(app, post_json("/pd/search", &search_body())).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }
}
