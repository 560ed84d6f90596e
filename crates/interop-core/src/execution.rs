//! Materialized patient-discovery execution records.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timestamp;

/// Normalized outcome of an execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    /// The execution completed successfully.
    Success,
    /// The execution failed, or no positive evidence of success exists.
    Failure,
}

impl ExecutionStatus {
    /// Returns the storage/wire representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
        }
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExecutionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(Self::Success),
            "failure" => Ok(Self::Failure),
            other => Err(format!("unknown execution status: {other}")),
        }
    }
}

/// One completed patient-discovery request, keyed by `execution_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdExecution {
    /// Business identifier; primary key of the executions table.
    pub execution_id: String,
    /// When the execution started.
    #[serde(with = "timestamp::canonical")]
    pub started_at: DateTime<Utc>,
    /// When the execution completed.
    #[serde(with = "timestamp::canonical")]
    pub completed_at: DateTime<Utc>,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,
    /// Normalized outcome.
    pub status: ExecutionStatus,
    /// Number of requests (or results) the execution covered.
    pub request_count: u64,
}

/// Aggregate view over the whole executions table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionSummary {
    /// Total number of executions.
    pub total: u64,
    /// Executions with status `success`.
    pub success_count: u64,
    /// Executions with status `failure`.
    pub failure_count: u64,
    /// Floor of the mean duration; 0 for an empty table.
    pub average_duration_ms: u64,
}

impl ExecutionSummary {
    /// Computes a summary from in-memory executions.
    #[must_use]
    pub fn from_executions<'a>(executions: impl IntoIterator<Item = &'a PdExecution>) -> Self {
        let mut summary = Self::default();
        let mut duration_total: u128 = 0;
        for execution in executions {
            summary.total += 1;
            match execution.status {
                ExecutionStatus::Success => summary.success_count += 1,
                ExecutionStatus::Failure => summary.failure_count += 1,
            }
            duration_total += u128::from(execution.duration_ms);
        }
        if summary.total > 0 {
            summary.average_duration_ms =
                u64::try_from(duration_total / u128::from(summary.total)).unwrap_or(u64::MAX);
        }
        summary
    }
}
