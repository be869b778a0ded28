//! Query-then-download pipeline and exit-code mapping.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use qfetch_athena::{AthenaError, QueryOutcome, QueryRequest, QueryRunner, QueryService};
use qfetch_core::{AddressError, Config};
use qfetch_storage::{ArtifactFetcher, ObjectSource, StorageError};

pub const EXIT_SDK: i32 = 1;
pub const EXIT_MALFORMED_ADDRESS: i32 = 2;
pub const EXIT_QUERY_FAILED: i32 = 3;
pub const EXIT_INCOMPLETE: i32 = 4;
pub const EXIT_TRANSFER: i32 = 5;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Address(#[from] AddressError),

    #[error(transparent)]
    Query(#[from] AthenaError),

    #[error(transparent)]
    Transfer(#[from] StorageError),
}

impl AppError {
    /// Process exit code, distinct per failure kind so scripts can branch on it.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Address(_) | AppError::Transfer(StorageError::Address(_)) => {
                EXIT_MALFORMED_ADDRESS
            }
            AppError::Query(AthenaError::QueryFailed { .. }) => EXIT_QUERY_FAILED,
            AppError::Query(AthenaError::QueryTimeout { .. })
            | AppError::Query(AthenaError::Interrupted { .. })
            | AppError::Transfer(StorageError::Interrupted { .. }) => EXIT_INCOMPLETE,
            AppError::Query(AthenaError::AwsSdk(_)) => EXIT_SDK,
            AppError::Transfer(_) => EXIT_TRANSFER,
        }
    }
}

/// What a successful run produced.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub outcome: QueryOutcome,
    pub output_file: PathBuf,
    pub bytes_written: u64,
}

/// Execute `query`, then download its result to `config.output_file`.
///
/// `on_query_done` is called between the two steps. A download is never
/// attempted when the query does not succeed. An interrupt during the
/// download removes the partial file and leaves no output behind.
pub async fn run<Q, O, F>(
    config: &Config,
    query: &str,
    runner: &QueryRunner<Q>,
    fetcher: &ArtifactFetcher<O>,
    on_query_done: F,
) -> Result<RunSummary, AppError>
where
    Q: QueryService,
    O: ObjectSource,
    F: FnOnce(&QueryOutcome),
{
    let request = QueryRequest::new(
        query,
        config.athena.database.clone(),
        &config.athena.output_location,
    )?
    .with_workgroup(config.athena.workgroup.clone());

    let outcome = runner.execute(&request).await?;
    info!("{}", outcome);
    on_query_done(&outcome);

    let bytes_written = fetcher
        .download(&outcome.result_location, &config.output_file)
        .await?;

    Ok(RunSummary {
        outcome,
        output_file: config.output_file.clone(),
        bytes_written,
    })
}
