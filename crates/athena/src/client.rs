//! AWS Athena query execution client.
//!
//! [`AthenaClient`] implements [`QueryService`] on top of the AWS SDK:
//! `StartQueryExecution`, `GetQueryExecution` and `StopQueryExecution`.

use async_trait::async_trait;
use aws_sdk_athena::error::DisplayErrorContext;
use aws_sdk_athena::types::{
    QueryExecution, QueryExecutionContext, QueryExecutionState, ResultConfiguration,
};
use aws_types::SdkConfig;
use tracing::{debug, info};

use crate::error::AthenaError;
use crate::service::{QueryRequest, QueryService};
use crate::status::{ExecutionState, ExecutionStatus};

/// Client for executing queries against AWS Athena.
#[derive(Debug, Clone)]
pub struct AthenaClient {
    athena_client: aws_sdk_athena::Client,
}

impl AthenaClient {
    /// Create a client from a shared SDK config (see `qfetch_core::load_sdk_config`).
    pub fn new(sdk: &SdkConfig) -> Self {
        Self {
            athena_client: aws_sdk_athena::Client::new(sdk),
        }
    }
}

#[async_trait]
impl QueryService for AthenaClient {
    async fn submit(&self, request: &QueryRequest) -> Result<String, AthenaError> {
        let mut start = self
            .athena_client
            .start_query_execution()
            .query_string(&request.query)
            .query_execution_context(
                QueryExecutionContext::builder()
                    .database(&request.database)
                    .build(),
            )
            .result_configuration(
                ResultConfiguration::builder()
                    .output_location(request.output_location.as_str())
                    .build(),
            );

        if let Some(ref workgroup) = request.workgroup {
            start = start.work_group(workgroup);
        }

        let resp = start.send().await.map_err(sdk_error)?;

        let query_id = resp
            .query_execution_id()
            .ok_or_else(|| AthenaError::AwsSdk("No query execution ID returned".into()))?
            .to_string();

        info!(
            query_id = %query_id,
            database = %request.database,
            output_location = %request.output_location,
            "Query execution started"
        );
        Ok(query_id)
    }

    async fn status(&self, query_id: &str) -> Result<ExecutionStatus, AthenaError> {
        let resp = self
            .athena_client
            .get_query_execution()
            .query_execution_id(query_id)
            .send()
            .await
            .map_err(sdk_error)?;

        let qe = resp
            .query_execution()
            .ok_or_else(|| AthenaError::AwsSdk("No query execution in response".into()))?;

        Ok(extract_status(qe))
    }

    async fn cancel(&self, query_id: &str) -> Result<(), AthenaError> {
        info!(query_id = %query_id, "Cancelling query");

        self.athena_client
            .stop_query_execution()
            .query_execution_id(query_id)
            .send()
            .await
            .map_err(sdk_error)?;

        debug!(query_id = %query_id, "Query cancellation requested");
        Ok(())
    }
}

fn sdk_error<E: std::error::Error>(err: E) -> AthenaError {
    AthenaError::AwsSdk(DisplayErrorContext(err).to_string())
}

/// Map the SDK state onto ours. A missing or unrecognised state is treated as
/// still queued so polling continues.
fn map_state(state: Option<&QueryExecutionState>) -> ExecutionState {
    match state {
        Some(QueryExecutionState::Succeeded) => ExecutionState::Succeeded,
        Some(QueryExecutionState::Failed) => ExecutionState::Failed,
        Some(QueryExecutionState::Cancelled) => ExecutionState::Cancelled,
        Some(QueryExecutionState::Running) => ExecutionState::Running,
        _ => ExecutionState::Queued,
    }
}

/// Extract an [`ExecutionStatus`] from an SDK [`QueryExecution`].
fn extract_status(qe: &QueryExecution) -> ExecutionStatus {
    let stats = qe.statistics();
    let status = qe.status();

    ExecutionStatus {
        state: map_state(status.and_then(|s| s.state())),
        reason: status
            .and_then(|s| s.state_change_reason())
            .map(|s| s.to_string()),
        output_location: qe
            .result_configuration()
            .and_then(|rc| rc.output_location())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string()),
        bytes_scanned: stats
            .and_then(|s| s.data_scanned_in_bytes())
            .unwrap_or(0)
            .max(0) as u64,
        execution_time_ms: stats
            .and_then(|s| s.engine_execution_time_in_millis())
            .unwrap_or(0)
            .max(0) as u64,
    }
}

// ---------------------------------------------------------------------------
// Tests — SDK type mapping only, no AWS calls
// ---------------------------------------------------------------------------
