//! The query-service seam.
//!
//! [`QueryService`] covers the three calls the runner needs from Athena.
//! [`crate::AthenaClient`] implements it against AWS; tests substitute
//! scripted implementations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use qfetch_core::{AddressError, OutputLocation};

use crate::error::AthenaError;
use crate::status::ExecutionStatus;

/// Everything needed to start one query execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    /// SQL text, passed through untouched.
    pub query: String,
    pub database: String,
    /// Athena workgroup; `None` uses the service default.
    #[serde(default)]
    pub workgroup: Option<String>,
    pub output_location: OutputLocation,
}

impl QueryRequest {
    /// Build a request, validating and normalizing `output_location`.
    pub fn new(
        query: impl Into<String>,
        database: impl Into<String>,
        output_location: &str,
    ) -> Result<Self, AddressError> {
        Ok(Self {
            query: query.into(),
            database: database.into(),
            workgroup: None,
            output_location: OutputLocation::parse(output_location)?,
        })
    }

    pub fn with_workgroup(mut self, workgroup: Option<String>) -> Self {
        self.workgroup = workgroup;
        self
    }
}

/// Asynchronous query execution service.
#[async_trait]
pub trait QueryService: Send + Sync {
    /// Start an execution and return its handle without waiting for completion.
    async fn submit(&self, request: &QueryRequest) -> Result<String, AthenaError>;

    /// Fetch the current status of an execution.
    async fn status(&self, query_id: &str) -> Result<ExecutionStatus, AthenaError>;

    /// Ask the service to stop an execution.
    async fn cancel(&self, query_id: &str) -> Result<(), AthenaError>;
}
