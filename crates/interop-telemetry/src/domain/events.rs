//! Telemetry event model.
//!
//! Producers evolve independently, so every object keeps the keys it does not
//! recognize in an `extra` map. Only the materializer's fallback extraction
//! looks inside those maps.

use chrono::{DateTime, Utc};
use interop_core::timestamp;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Where the event came from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceInfo {
    /// Reporting system, e.g. `mirth` or `interop-ui`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// Channel within the reporting system.
    #[serde(default, alias = "channel_id", skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    /// Deployment environment of the producer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    /// Unrecognized keys.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Identifiers tying the event to a business request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationInfo {
    /// Request identifier; the preferred execution key.
    #[serde(default, alias = "request_id", skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// Cross-system correlation identifier.
    #[serde(default, alias = "correlation_id", skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    /// Message identifier within the exchange.
    #[serde(default, alias = "message_id", skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    /// Unrecognized keys.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Timing of the reported execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionInfo {
    /// Duration in milliseconds.
    #[serde(default, alias = "duration_ms", skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    /// Start time as sent by the producer.
    #[serde(default, alias = "started_at", skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,
    /// Completion time as sent by the producer.
    #[serde(default, alias = "completed_at", skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
    /// Unrecognized keys.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Result of the reported operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeInfo {
    /// Producer-specific status string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Number of results or requests covered.
    #[serde(default, alias = "result_count", skip_serializing_if = "Option::is_none")]
    pub result_count: Option<u64>,
    /// Unrecognized keys.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Interoperability protocol details.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolInfo {
    /// Protocol family, e.g. `PD`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standard: Option<String>,
    /// Protocol interaction identifier.
    #[serde(default, alias = "interaction_id", skip_serializing_if = "Option::is_none")]
    pub interaction_id: Option<String>,
    /// Unrecognized keys.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One reported occurrence from an external system. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryEvent {
    /// Caller-supplied identifier; duplicates are stored as separate events.
    pub event_id: String,
    /// Free-form event type.
    pub event_type: String,
    /// Event time.
    #[serde(with = "timestamp::canonical")]
    pub timestamp: DateTime<Utc>,
    /// Reporting system.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceInfo>,
    /// Correlation identifiers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation: Option<CorrelationInfo>,
    /// Execution timing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution: Option<ExecutionInfo>,
    /// Outcome of the operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<OutcomeInfo>,
    /// Protocol details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<ProtocolInfo>,
    /// Unrecognized top-level keys, including legacy flat fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TelemetryEvent {
    /// Creates an event with no optional sections.
    #[must_use]
    pub fn new(
        event_id: impl Into<String>,
        event_type: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            event_type: event_type.into(),
            timestamp,
            source: None,
            correlation: None,
            execution: None,
            outcome: None,
            protocol: None,
            extra: Map::new(),
        }
    }

    /// The correlation request id, if present and non-blank.
    #[must_use]
    pub fn correlation_request_id(&self) -> Option<&str> {
        self.correlation
            .as_ref()
            .and_then(|c| c.request_id.as_deref())
            .filter(|id| !id.trim().is_empty())
    }

    /// Serializes the event in its submitted shape, extras flattened back in.
    #[must_use]
    pub fn to_payload(&self) -> Value {
        // Every field is a plain string, number, or JSON map, so this cannot fail.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
