//! Routes for materialized PD executions.
//!
//! Reads degrade to empty lists and zero counts when storage is unavailable;
//! the failure is logged by the query handler.

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tracing::{info, instrument};

use interop_core::execution::{ExecutionSummary, PdExecution};
use interop_telemetry::application::{command_handlers, query_handlers};

use crate::state::AppState;

/// Response body for GET /pd-executions/count.
#[derive(Debug, Serialize)]
pub struct CountResponse {
    /// Number of executions.
    pub count: u64,
}

/// Response body for POST /pd-executions/materialize.
#[derive(Debug, Serialize)]
pub struct MaterializeResponse {
    /// Rows upserted by this run.
    pub materialized: usize,
}

/// GET /pd-executions
async fn list_executions(State(state): State<AppState>) -> Json<Vec<PdExecution>> {
    Json(
        query_handlers::list_executions(state.execution_repository.as_ref())
            .await
            .into_value(),
    )
}

/// GET /pd-executions/summary
async fn summarize_executions(State(state): State<AppState>) -> Json<ExecutionSummary> {
    Json(
        query_handlers::summarize_executions(state.execution_repository.as_ref())
            .await
            .into_value(),
    )
}

/// GET /pd-executions/count
async fn count_executions(State(state): State<AppState>) -> Json<CountResponse> {
    let count = query_handlers::count_executions(state.execution_repository.as_ref())
        .await
        .into_value();
    Json(CountResponse { count })
}

/// POST /pd-executions/materialize
#[instrument(skip(state))]
async fn materialize(State(state): State<AppState>) -> Json<MaterializeResponse> {
    let materialized = command_handlers::handle_materialize_all(
        &state.telemetry_store,
        state.execution_repository.as_ref(),
    )
    .await;
    info!(materialized, "materialization requested");
    Json(MaterializeResponse { materialized })
}

/// Returns the router for PD executions.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/pd-executions", get(list_executions))
        .route("/pd-executions/summary", get(summarize_executions))
        .route("/pd-executions/count", get(count_executions))
        .route("/pd-executions/materialize", post(materialize))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use axum::http::StatusCode;
    use interop_test_support::FailingExecutionRepository;
    use serde_json::{Value, json};

    use crate::routes::telemetry;
    use crate::routes::test_support::{get, post_json, send, test_app_state};

    fn app(state: AppState) -> Router {
        router().merge(telemetry::router()).with_state(state)
    }

    async fn ingest(state: &AppState, request_id: &str, duration_ms: u64, status: &str) {
        let body = json!({
            "eventId": format!("evt-{request_id}"),
            "eventType": "PD.Request.Completed",
            "timestamp": "2026-01-15T10:00:00Z",
            "correlation": { "requestId": request_id },
            "execution": { "durationMs": duration_ms },
            "outcome": { "status": status }
        });
        let (code, _) = send(app(state.clone()), post_json("/telemetry/events", &body)).await;
        assert_eq!(code, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_materialize_then_read_summary_count_and_list() {
        // Arrange
        let state = test_app_state();
        ingest(&state, "req-1", 100, "success").await;
        ingest(&state, "req-2", 200, "OK").await;
        ingest(&state, "req-3", 300, "error").await;

        // Act
        let (status, materialized) = send(
            app(state.clone()),
            post_json("/pd-executions/materialize", &Value::Null),
        )
        .await;
        let (_, summary) = send(app(state.clone()), get("/pd-executions/summary")).await;
        let (_, count) = send(app(state.clone()), get("/pd-executions/count")).await;
        let (_, list) = send(app(state), get("/pd-executions")).await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(materialized["materialized"], 3);
        assert_eq!(
            summary,
            json!({
                "total": 3,
                "successCount": 2,
                "failureCount": 1,
                "averageDurationMs": 200
            })
        );
        assert_eq!(count["count"], 3);
        let first = &list.as_array().unwrap()[0];
        assert!(first["executionId"].is_string());
        assert_eq!(first["startedAt"], "2026-01-15T09:59:59.900Z");
    }

    #[tokio::test]
    async fn test_reads_return_empty_results_when_storage_fails() {
        // Arrange
        let mut state = test_app_state();
        state.execution_repository = Arc::new(FailingExecutionRepository);

        // Act
        let (list_status, list) = send(app(state.clone()), get("/pd-executions")).await;
        let (_, count) = send(app(state.clone()), get("/pd-executions/count")).await;
        let (_, summary) = send(app(state), get("/pd-executions/summary")).await;

        // Assert
        assert_eq!(list_status, StatusCode::OK);
        assert_eq!(list, json!([]));
        assert_eq!(count["count"], 0);
        assert_eq!(summary["total"], 0);
        assert_eq!(summary["averageDurationMs"], 0);
    }
}
