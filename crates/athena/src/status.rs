use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a query execution as reported by Athena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionState {
    Queued,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl ExecutionState {
    /// `true` once no further transition can happen.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "QUEUED",
            Self::Running => "RUNNING",
            Self::Succeeded => "SUCCEEDED",
            Self::Failed => "FAILED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for ExecutionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of one `GetQueryExecution` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionStatus {
    pub state: ExecutionState,
    /// Diagnostic attached by the service to a terminal state (`StateChangeReason`).
    pub reason: Option<String>,
    /// Result object location reported by the service, if any.
    pub output_location: Option<String>,
    /// Total bytes scanned so far.
    pub bytes_scanned: u64,
    /// Engine execution time in milliseconds.
    pub execution_time_ms: u64,
}

impl ExecutionStatus {
    /// A bare status with no reason, location or statistics.
    pub fn new(state: ExecutionState) -> Self {
        Self {
            state,
            reason: None,
            output_location: None,
            bytes_scanned: 0,
            execution_time_ms: 0,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_output_location(mut self, location: impl Into<String>) -> Self {
        self.output_location = Some(location.into());
        self
    }

    /// Estimates the query cost in USD based on Athena's $5/TB pricing model.
    pub fn cost_estimate_usd(&self) -> f64 {
        self.bytes_scanned as f64 * DOLLARS_PER_BYTE
    }
}

/// Athena pricing: $5 per TB scanned.
const DOLLARS_PER_BYTE: f64 = 5.0 / (1024.0 * 1024.0 * 1024.0 * 1024.0);

/// Result of a successful execution: where the CSV lives plus final statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryOutcome {
    /// Athena query execution ID.
    pub query_id: String,
    /// S3 address of the result CSV.
    pub result_location: String,
    /// Number of status polls issued.
    pub polls: u32,
    pub status: ExecutionStatus,
}

impl fmt::Display for QueryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Query {} | {} | {:.3} MB scanned | {}ms | ${:.6} | {} polls",
            self.query_id,
            self.status.state,
            self.status.bytes_scanned as f64 / (1024.0 * 1024.0),
            self.status.execution_time_ms,
            self.status.cost_estimate_usd(),
            self.polls,
        )
    }
}
