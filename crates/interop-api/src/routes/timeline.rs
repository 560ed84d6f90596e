//! Routes for patient timelines.

use axum::extract::{Query, State};
use axum::{Json, Router, routing::get};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::instrument;

use interop_timeline::application::query_handlers::{self, PatientTimelineView};

use crate::state::AppState;

/// Query string for GET /timeline.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineQuery {
    /// Patient first name.
    pub first_name: String,
    /// Patient last name.
    pub last_name: String,
    /// Patient date of birth.
    pub dob: NaiveDate,
}

/// GET /timeline
#[instrument(skip(state, query))]
async fn get_timeline(
    State(state): State<AppState>,
    Query(query): Query<TimelineQuery>,
) -> Json<PatientTimelineView> {
    Json(query_handlers::get_patient_timeline(
        &state.timeline_store,
        &query.first_name,
        &query.last_name,
        &query.dob.to_string(),
    ))
}

/// Returns the router for the timeline context.
pub fn router() -> Router<AppState> {
    Router::new().route("/timeline", get(get_timeline))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use chrono::{TimeZone, Utc};
    use interop_timeline::application::command_handlers::record_patient_event;
    use interop_timeline::domain::entry::TimelineEntry;
    use serde_json::json;

    use crate::routes::test_support::{get, send, test_app_state};

    #[tokio::test]
    async fn test_timeline_lookup_ignores_case_and_whitespace() {
        // Arrange
        let state = test_app_state();
        record_patient_event(
            &state.timeline_store,
            "Jane",
            " Doe ",
            "1990-01-01",
            TimelineEntry {
                timestamp: Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap(),
                entry_type: "PD_REQUEST".into(),
                status: "REQUESTED".into(),
                details: json!({ "correlation_id": "req-1" }),
            },
        );
        let app = router().with_state(state);

        // Act
        let (status, json) =
            send(app, get("/timeline?firstName=jane&lastName=DOE&dob=1990-01-01")).await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["patient"]["lastName"], "DOE");
        let events = json["events"].as_array().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0]["type"], "PD_REQUEST");
        assert_eq!(events[0]["timestamp"], "2026-01-15T10:00:00.000Z");
    }

    #[tokio::test]
    async fn test_unknown_patient_has_empty_timeline() {
        let app = router().with_state(test_app_state());

        let (status, json) =
            send(app, get("/timeline?firstName=No&lastName=One&dob=2000-02-02")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["events"], json!([]));
    }

    #[tokio::test]
    async fn test_invalid_dob_is_rejected() {
        let app = router().with_state(test_app_state());

        let (status, _) = send(app, get("/timeline?firstName=Jane&lastName=Doe&dob=soon")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
