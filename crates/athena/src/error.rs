use std::time::Duration;

use crate::status::ExecutionState;

/// Errors that can occur while running a query.
#[derive(Debug, thiserror::Error)]
pub enum AthenaError {
    /// The execution reached `FAILED` or `CANCELLED`.
    #[error("Query {state}: {reason}")]
    QueryFailed {
        query_id: String,
        state: ExecutionState,
        reason: String,
    },

    /// The execution did not finish within the configured timeout.
    #[error("Query {query_id} timed out after {timeout:?}")]
    QueryTimeout { query_id: String, timeout: Duration },

    /// Polling was interrupted by the operator before the execution finished.
    #[error("Query {query_id} interrupted before completion")]
    Interrupted { query_id: String },

    /// An AWS SDK error (stringified).
    #[error("AWS SDK error: {0}")]
    AwsSdk(String),
}
