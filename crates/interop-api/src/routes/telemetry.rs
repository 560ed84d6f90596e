//! Routes for telemetry ingestion and listing.

use axum::extract::State;
use axum::{Json, Router, routing::post};
use serde::Serialize;
use serde_json::Value;
use tracing::instrument;

use interop_telemetry::application::{command_handlers, query_handlers};
use interop_telemetry::domain::events::TelemetryEvent;

use crate::error::ApiError;
use crate::state::AppState;

/// Response body for an accepted event.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestResponse {
    /// Always `"ok"`.
    pub status: &'static str,
    /// Identifier of the accepted event.
    pub event_id: String,
    /// Whether the durable log accepted the event as well.
    pub persisted: bool,
}

/// POST /telemetry/events
#[instrument(skip(state, payload))]
async fn ingest_event(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<Json<IngestResponse>, ApiError> {
    let receipt = command_handlers::handle_ingest_event(
        &payload,
        &state.telemetry_store,
        state.telemetry_log.as_ref(),
    )
    .await?;

    Ok(Json(IngestResponse {
        status: "ok",
        event_id: receipt.event_id,
        persisted: receipt.persisted,
    }))
}

/// GET /telemetry/events
async fn list_events(State(state): State<AppState>) -> Json<Vec<TelemetryEvent>> {
    Json(query_handlers::list_events(&state.telemetry_store))
}

/// Returns the router for the telemetry context.
pub fn router() -> Router<AppState> {
    Router::new().route("/telemetry/events", post(ingest_event).get(list_events))
}
