//! Event validator: turns an untyped payload into a [`TelemetryEvent`].
//!
//! Validation is pure and reports every failing field at once rather than
//! stopping at the first problem, so producers can fix a payload in one pass.

use interop_core::error::{DomainError, FieldError};
use interop_core::timestamp::parse_timestamp;
use serde_json::{Map, Value};

use super::events::TelemetryEvent;

#[derive(Debug, Clone, Copy)]
enum FieldKind {
    Text,
    Count,
}

/// A known field inside a sub-object: camelCase name, snake_case alias, type.
type KnownField = (&'static str, &'static str, FieldKind);

const SECTIONS: [(&str, &[KnownField]); 5] = [
    (
        "source",
        &[
            ("system", "system", FieldKind::Text),
            ("channelId", "channel_id", FieldKind::Text),
            ("environment", "environment", FieldKind::Text),
        ],
    ),
    (
        "correlation",
        &[
            ("requestId", "request_id", FieldKind::Text),
            ("correlationId", "correlation_id", FieldKind::Text),
            ("messageId", "message_id", FieldKind::Text),
        ],
    ),
    (
        "execution",
        &[
            ("durationMs", "duration_ms", FieldKind::Count),
            ("startedAt", "started_at", FieldKind::Text),
            ("completedAt", "completed_at", FieldKind::Text),
        ],
    ),
    (
        "outcome",
        &[
            ("status", "status", FieldKind::Text),
            ("resultCount", "result_count", FieldKind::Count),
        ],
    ),
    (
        "protocol",
        &[
            ("standard", "standard", FieldKind::Text),
            ("interactionId", "interaction_id", FieldKind::Text),
        ],
    ),
];

/// Validates a raw payload and builds the typed event.
///
/// # Errors
///
/// Returns `DomainError::Validation` listing every field-level failure.
pub fn validate_event(payload: &Value) -> Result<TelemetryEvent, DomainError> {
    let Some(object) = payload.as_object() else {
        return Err(DomainError::Validation(vec![FieldError::new(
            "$",
            "payload must be a JSON object",
        )]));
    };

    let mut errors = Vec::new();
    check_identifier(object, "eventId", &mut errors);
    check_identifier(object, "eventType", &mut errors);
    check_timestamp(object, &mut errors);
    for (section, fields) in SECTIONS {
        check_section(object, section, fields, &mut errors);
    }

    if !errors.is_empty() {
        return Err(DomainError::Validation(errors));
    }

    let mut cleaned = payload.clone();
    drop_null_known_fields(&mut cleaned);
    serde_json::from_value(cleaned)
        .map_err(|e| DomainError::Validation(vec![FieldError::new("$", e.to_string())]))
}

// A null known field counts as absent. Serde would otherwise see a null alias
// as a second spelling of the field and reject the whole event.
fn drop_null_known_fields(payload: &mut Value) {
    let Some(object) = payload.as_object_mut() else {
        return;
    };
    for (section, fields) in SECTIONS {
        let Some(Value::Object(section_object)) = object.get_mut(section) else {
            continue;
        };
        for &(name, alias, _) in fields {
            for key in [name, alias] {
                if section_object.get(key).is_some_and(Value::is_null) {
                    section_object.remove(key);
                }
            }
        }
    }
}

fn check_identifier(object: &Map<String, Value>, field: &str, errors: &mut Vec<FieldError>) {
    match object.get(field) {
        None | Some(Value::Null) => errors.push(FieldError::new(field, "is required")),
        Some(Value::String(value)) if value.trim().is_empty() => {
            errors.push(FieldError::new(field, "must not be blank"));
        }
        Some(Value::String(_)) => {}
        Some(_) => errors.push(FieldError::new(field, "must be a string")),
    }
}

fn check_timestamp(object: &Map<String, Value>, errors: &mut Vec<FieldError>) {
    match object.get("timestamp") {
        None | Some(Value::Null) => errors.push(FieldError::new("timestamp", "is required")),
        Some(Value::String(raw)) => {
            if parse_timestamp(raw).is_none() {
                errors.push(FieldError::new(
                    "timestamp",
                    "must be an ISO 8601 date-time",
                ));
            }
        }
        Some(_) => errors.push(FieldError::new("timestamp", "must be a string")),
    }
}

fn check_section(
    object: &Map<String, Value>,
    section: &str,
    fields: &[KnownField],
    errors: &mut Vec<FieldError>,
) {
    let section_object = match object.get(section) {
        None | Some(Value::Null) => return,
        Some(Value::Object(map)) => map,
        Some(_) => {
            errors.push(FieldError::new(section, "must be an object"));
            return;
        }
    };

    for &(name, alias, kind) in fields {
        let primary = section_object.get(name).filter(|v| !v.is_null());
        let secondary = if alias == name {
            None
        } else {
            section_object.get(alias).filter(|v| !v.is_null())
        };
        let path = format!("{section}.{name}");
        if primary.is_some() && secondary.is_some() {
            errors.push(FieldError::new(
                path,
                format!("must not be combined with `{alias}`"),
            ));
            continue;
        }
        if let Some(value) = primary.or(secondary) {
            if let Some(message) = type_mismatch(value, kind) {
                errors.push(FieldError::new(path, message));
            }
        }
    }
}

fn type_mismatch(value: &Value, kind: FieldKind) -> Option<&'static str> {
    match kind {
        FieldKind::Text if !value.is_string() => Some("must be a string"),
        FieldKind::Count if value.as_u64().is_none() => Some("must be a non-negative integer"),
        _ => None,
    }
}
