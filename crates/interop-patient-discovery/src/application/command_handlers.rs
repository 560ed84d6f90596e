//! Command handlers for the patient-discovery context.
//!
//! A search is relayed to the integration engine with a fresh access token.
//! Every attempt, successful or not, leaves a telemetry event and a patient
//! timeline entry behind.

use std::fmt;

use interop_core::clock::Clock;
use interop_core::error::DomainError;
use interop_core::repository::TelemetryLog;
use interop_core::upstream::{AccessTokenProvider, PdGateway};
use interop_telemetry::application::command_handlers::record_event;
use interop_telemetry::domain::events::{
    CorrelationInfo, OutcomeInfo, ProtocolInfo, SourceInfo, TelemetryEvent,
};
use interop_telemetry::store::TelemetryStore;
use interop_timeline::application::command_handlers::record_patient_event;
use interop_timeline::domain::entry::TimelineEntry;
use interop_timeline::store::TimelineStore;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::domain::commands::{Demographics, SubmitPdSearch};

const SEARCH_EVENT_TYPE: &str = "PD_SEARCH_REQUEST";
const TIMELINE_ENTRY_TYPE: &str = "PD_REQUEST";
const SOURCE_SYSTEM: &str = "interop-ui";
const DESTINATION: &str = "mirth";

/// Acknowledgement returned once the search has been handed upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct PdSearchReceipt {
    /// Always `"submitted"`.
    pub status: &'static str,
    /// Id the integration engine will echo back in its own telemetry.
    pub correlation_id: String,
}

/// Collaborators needed to relay a search.
pub struct PdSearchContext<'a> {
    /// Source of the recorded timestamps.
    pub clock: &'a dyn Clock,
    /// Bearer tokens for the relay.
    pub tokens: &'a dyn AccessTokenProvider,
    /// The integration engine's PD endpoint.
    pub gateway: &'a dyn PdGateway,
    /// Receives the `PD_SEARCH_REQUEST` event.
    pub telemetry_store: &'a TelemetryStore,
    /// Durable copy of the same event, best-effort.
    pub telemetry_log: &'a dyn TelemetryLog,
    /// Receives the patient's `PD_REQUEST` entry.
    pub timeline_store: &'a TimelineStore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FailureStage {
    Token,
    Relay,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Token => write!(f, "token"),
            Self::Relay => write!(f, "relay"),
        }
    }
}

/// Relays a patient-discovery search upstream.
///
/// # Errors
///
/// Returns `DomainError::Validation` for blank names (nothing is recorded),
/// or the token provider's / gateway's error after the attempt has been
/// recorded as `FAILED`.
#[instrument(skip_all)]
pub async fn handle_submit_pd_search(
    command: &SubmitPdSearch,
    ctx: &PdSearchContext<'_>,
) -> Result<PdSearchReceipt, DomainError> {
    let demographics = command.demographics.normalized()?;
    let request_id = command
        .request_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty());
    let correlation_id = request_id.map_or_else(|| Uuid::new_v4().to_string(), str::to_owned);

    let payload = json!({
        "request_id": request_id,
        "correlation_id": correlation_id,
        "demographics": {
            "firstName": demographics.first_name,
            "lastName": demographics.last_name,
            "dob": demographics.dob.to_string(),
        },
    });

    let outcome = relay(&payload, ctx).await;
    let failure_stage = outcome.as_ref().err().map(|(stage, _)| *stage);

    record_attempt(ctx, &demographics, &correlation_id, request_id, failure_stage).await;

    match outcome {
        Ok(()) => {
            info!(%correlation_id, "pd search submitted");
            Ok(PdSearchReceipt {
                status: "submitted",
                correlation_id,
            })
        }
        Err((stage, err)) => {
            warn!(%correlation_id, %stage, error = %err, "pd search relay failed");
            Err(err)
        }
    }
}

async fn relay(
    payload: &Value,
    ctx: &PdSearchContext<'_>,
) -> Result<(), (FailureStage, DomainError)> {
    let token = ctx
        .tokens
        .access_token()
        .await
        .map_err(|err| (FailureStage::Token, err))?;
    ctx.gateway
        .submit(payload, &token)
        .await
        .map_err(|err| (FailureStage::Relay, err))
}

async fn record_attempt(
    ctx: &PdSearchContext<'_>,
    demographics: &Demographics,
    correlation_id: &str,
    request_id: Option<&str>,
    failure_stage: Option<FailureStage>,
) {
    let now = ctx.clock.now();
    let status = if failure_stage.is_some() {
        "FAILED"
    } else {
        "REQUESTED"
    };

    let mut event = TelemetryEvent::new(Uuid::new_v4().to_string(), SEARCH_EVENT_TYPE, now);
    event.source = Some(SourceInfo {
        system: Some(SOURCE_SYSTEM.to_owned()),
        ..SourceInfo::default()
    });
    event.correlation = Some(CorrelationInfo {
        request_id: Some(correlation_id.to_owned()),
        ..CorrelationInfo::default()
    });
    event.protocol = Some(ProtocolInfo {
        standard: Some("PD".to_owned()),
        ..ProtocolInfo::default()
    });
    event.outcome = Some(OutcomeInfo {
        status: Some(status.to_owned()),
        ..OutcomeInfo::default()
    });
    event
        .extra
        .insert("destination".to_owned(), Value::from(DESTINATION));
    if let Some(stage) = failure_stage {
        event
            .extra
            .insert("failureStage".to_owned(), Value::from(stage.to_string()));
    }
    record_event(event, ctx.telemetry_store, ctx.telemetry_log).await;

    let dob = demographics.dob.to_string();
    record_patient_event(
        ctx.timeline_store,
        &demographics.first_name,
        &demographics.last_name,
        &dob,
        TimelineEntry {
            timestamp: now,
            entry_type: TIMELINE_ENTRY_TYPE.to_owned(),
            status: status.to_owned(),
            details: json!({
                "correlation_id": correlation_id,
                "request_id": request_id,
            }),
        },
    );
}
