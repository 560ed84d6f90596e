//! Derives normalized execution records from completed PD-request events.
//!
//! Producers have reported completions in at least three shapes over time:
//! nested `execution`/`outcome`/`correlation` sections, flat top-level
//! fields, and ad-hoc legacy keys. Each extraction step below tries the
//! nested form first and then falls back through the flat spellings.

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use interop_core::execution::{ExecutionStatus, PdExecution};
use interop_core::timestamp::parse_timestamp;
use serde_json::{Map, Value};

use super::events::TelemetryEvent;

/// Event type of a completed patient-discovery request.
pub const PD_REQUEST_COMPLETED: &str = "pd.request.completed";

const EXECUTION_ID_KEYS: [&str; 2] = ["executionId", "execution_id"];
const REQUEST_ID_KEYS: [&str; 2] = ["requestId", "request_id"];
const DURATION_KEYS: [&str; 2] = ["durationMs", "duration_ms"];
const STARTED_KEYS: [&str; 3] = ["startedAt", "started_at", "startTimestamp"];
const COMPLETED_KEYS: [&str; 3] = ["completedAt", "completed_at", "endTimestamp"];
const STATUS_KEYS: [&str; 2] = ["status", "success"];
const COUNT_KEYS: [&str; 4] = ["requestCount", "request_count", "resultCount", "result_count"];

const SUCCESS_WORDS: [&str; 4] = ["success", "succeeded", "ok", "true"];
const FAILURE_WORDS: [&str; 4] = ["failure", "failed", "error", "false"];

/// Why an eligible event produced no execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No identifier could be derived.
    MissingIdentifier,
    /// Neither a start time nor a duration could be established.
    MissingTiming,
    /// The explicit start time is later than the completion time.
    NegativeDuration,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::MissingIdentifier => "missing execution identifier",
            Self::MissingTiming => "missing duration and start time",
            Self::NegativeDuration => "start time after completion time",
        })
    }
}

/// Result of materializing a single event.
#[derive(Debug, Clone, PartialEq)]
pub enum Materialization {
    /// The event is not a completed PD request.
    Ignored,
    /// The event is eligible but lacks data needed for a record.
    Skipped(SkipReason),
    /// A record ready to be upserted.
    Ready(PdExecution),
}

/// Returns `true` if the event type is the completed PD-request type.
#[must_use]
pub fn is_pd_completion(event: &TelemetryEvent) -> bool {
    event.event_type.trim().eq_ignore_ascii_case(PD_REQUEST_COMPLETED)
}

/// Converts one event into an execution record.
#[must_use]
pub fn materialize(event: &TelemetryEvent) -> Materialization {
    if !is_pd_completion(event) {
        return Materialization::Ignored;
    }

    let Some(execution_id) = extract_execution_id(event) else {
        return Materialization::Skipped(SkipReason::MissingIdentifier);
    };

    let duration_ms = extract_duration(event);
    let completed_at = explicit_completed_at(event).unwrap_or(event.timestamp);
    let (started_at, duration_ms) = match (explicit_started_at(event), duration_ms) {
        (Some(started_at), Some(duration_ms)) => (started_at, duration_ms),
        (None, Some(duration_ms)) => match subtract_millis(completed_at, duration_ms) {
            Some(started_at) => (started_at, duration_ms),
            None => return Materialization::Skipped(SkipReason::MissingTiming),
        },
        (Some(started_at), None) => {
            match u64::try_from((completed_at - started_at).num_milliseconds()) {
                Ok(duration_ms) => (started_at, duration_ms),
                Err(_) => return Materialization::Skipped(SkipReason::NegativeDuration),
            }
        }
        (None, None) => return Materialization::Skipped(SkipReason::MissingTiming),
    };

    Materialization::Ready(PdExecution {
        execution_id,
        started_at,
        completed_at,
        duration_ms,
        status: extract_status(event),
        request_count: extract_request_count(event),
    })
}

/// Normalizes a producer status value. Anything that is not positive
/// evidence of success is a failure.
#[must_use]
pub fn normalize_status(value: &Value) -> ExecutionStatus {
    match value {
        Value::Bool(true) => ExecutionStatus::Success,
        Value::String(raw) => {
            let lowered = raw.trim().to_ascii_lowercase();
            if SUCCESS_WORDS.contains(&lowered.as_str()) {
                ExecutionStatus::Success
            } else if FAILURE_WORDS.contains(&lowered.as_str()) {
                ExecutionStatus::Failure
            } else if raw.trim() == "SUCCESS" {
                ExecutionStatus::Success
            } else {
                ExecutionStatus::Failure
            }
        }
        _ => ExecutionStatus::Failure,
    }
}

fn extract_execution_id(event: &TelemetryEvent) -> Option<String> {
    event
        .correlation_request_id()
        .map(str::to_owned)
        .or_else(|| first_identifier(&event.extra, &EXECUTION_ID_KEYS))
        .or_else(|| first_identifier(&event.extra, &REQUEST_ID_KEYS))
        .or_else(|| non_blank(&event.event_id).map(str::to_owned))
}

fn extract_duration(event: &TelemetryEvent) -> Option<u64> {
    event
        .execution
        .as_ref()
        .and_then(|execution| execution.duration_ms)
        .or_else(|| first_present(&event.extra, &DURATION_KEYS).and_then(coerce_count))
}

fn explicit_started_at(event: &TelemetryEvent) -> Option<DateTime<Utc>> {
    event
        .execution
        .as_ref()
        .and_then(|execution| execution.started_at.as_deref())
        .and_then(parse_timestamp)
        .or_else(|| first_timestamp(&event.extra, &STARTED_KEYS))
}

fn explicit_completed_at(event: &TelemetryEvent) -> Option<DateTime<Utc>> {
    event
        .execution
        .as_ref()
        .and_then(|execution| execution.completed_at.as_deref())
        .and_then(parse_timestamp)
        .or_else(|| first_timestamp(&event.extra, &COMPLETED_KEYS))
}

fn extract_status(event: &TelemetryEvent) -> ExecutionStatus {
    let nested = event
        .outcome
        .as_ref()
        .and_then(|outcome| outcome.status.as_deref())
        .and_then(non_blank)
        .map(|status| Value::String(status.to_owned()));

    nested
        .as_ref()
        .or_else(|| first_present(&event.extra, &STATUS_KEYS))
        .map_or(ExecutionStatus::Failure, normalize_status)
}

fn extract_request_count(event: &TelemetryEvent) -> u64 {
    event
        .outcome
        .as_ref()
        .and_then(|outcome| outcome.result_count)
        .or_else(|| first_present(&event.extra, &COUNT_KEYS).and_then(coerce_count))
        .unwrap_or(1)
}

fn subtract_millis(completed_at: DateTime<Utc>, duration_ms: u64) -> Option<DateTime<Utc>> {
    i64::try_from(duration_ms)
        .ok()
        .and_then(TimeDelta::try_milliseconds)
        .and_then(|delta| completed_at.checked_sub_signed(delta))
}

/// First key whose value is present and not null or blank.
fn first_present<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().filter_map(|key| map.get(*key)).find(|value| match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        _ => true,
    })
}

fn first_identifier(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    first_present(map, keys).and_then(|value| match value {
        Value::String(s) => Some(s.trim().to_owned()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn first_timestamp(map: &Map<String, Value>, keys: &[&str]) -> Option<DateTime<Utc>> {
    keys.iter()
        .filter_map(|key| map.get(*key))
        .filter_map(Value::as_str)
        .find_map(parse_timestamp)
}

/// Coerces a JSON number or numeric string to a non-negative integer.
/// Fractional numbers are truncated.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn coerce_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0 && *f < 9.0e15)
                .map(|f| f.trunc() as u64)
        }),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
}

fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}
