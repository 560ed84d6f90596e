//! Timeline entries.

use chrono::{DateTime, Utc};
use interop_core::timestamp;
use serde::{Deserialize, Serialize};

/// One entry in a patient's timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    /// When the entry was recorded.
    #[serde(with = "timestamp::canonical")]
    pub timestamp: DateTime<Utc>,
    /// Entry kind, e.g. `PD_REQUEST`.
    #[serde(rename = "type")]
    pub entry_type: String,
    /// Producer status, e.g. `REQUESTED`.
    pub status: String,
    /// Free-form details.
    #[serde(default)]
    pub details: serde_json::Value,
}
