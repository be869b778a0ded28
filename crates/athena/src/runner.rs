//! Submit-and-poll execution of a single query.
//!
//! [`QueryRunner`] drives any [`QueryService`]: submit, poll at a fixed
//! interval until a terminal state, then resolve where the result CSV lives.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Notify;
use tracing::{debug, error, info, warn};

use qfetch_core::config::AthenaConfig;

use crate::error::AthenaError;
use crate::service::{QueryRequest, QueryService};
use crate::status::{ExecutionState, ExecutionStatus, QueryOutcome};

// ---------------------------------------------------------------------------
// Poll policy
// ---------------------------------------------------------------------------

/// How often to poll and how long to wait at most.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Fixed delay between two status polls.
    pub interval: Duration,
    /// Upper bound on total wait; `None` polls until a terminal state.
    pub timeout: Option<Duration>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            timeout: None,
        }
    }
}

impl PollPolicy {
    pub fn from_config(config: &AthenaConfig) -> Self {
        Self {
            interval: Duration::from_millis(config.poll_interval_ms),
            timeout: config.timeout_seconds.map(Duration::from_secs),
        }
    }
}

// ---------------------------------------------------------------------------
// Runner
// ---------------------------------------------------------------------------

pub struct QueryRunner<S> {
    service: S,
    policy: PollPolicy,
    cancel: Option<Arc<Notify>>,
}

impl<S: QueryService> QueryRunner<S> {
    pub fn new(service: S, policy: PollPolicy) -> Self {
        Self {
            service,
            policy,
            cancel: None,
        }
    }

    /// Attach a cancellation signal. A notification interrupts the poll loop,
    /// requests `StopQueryExecution` and fails with [`AthenaError::Interrupted`].
    pub fn with_cancel(mut self, cancel: Arc<Notify>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Run `request` to completion and return the result CSV location.
    ///
    /// The location reported by the service is preferred. When the service
    /// reports none, the `{output_location}/{query_id}.csv` naming convention
    /// is assumed.
    pub async fn execute(&self, request: &QueryRequest) -> Result<QueryOutcome, AthenaError> {
        info!(
            database = %request.database,
            output_location = %request.output_location,
            "Submitting query"
        );

        let query_id = self.service.submit(request).await?;
        let (status, polls) = self.poll_until_terminal(&query_id).await?;

        match status.state {
            ExecutionState::Succeeded => {
                let result_location = match status.output_location.as_deref() {
                    Some(reported) => reported.to_string(),
                    None => {
                        let derived = request.output_location.result_object(&query_id);
                        debug!(
                            query_id = %query_id,
                            location = %derived,
                            "No output location reported, using naming convention"
                        );
                        derived
                    }
                };

                info!(
                    query_id = %query_id,
                    location = %result_location,
                    polls,
                    "Query succeeded"
                );

                Ok(QueryOutcome {
                    query_id,
                    result_location,
                    polls,
                    status,
                })
            }
            state => {
                let reason = status
                    .reason
                    .clone()
                    .unwrap_or_else(|| "unknown".to_string());

                if state == ExecutionState::Cancelled {
                    warn!(query_id = %query_id, reason = %reason, "Query was cancelled");
                } else {
                    error!(query_id = %query_id, reason = %reason, "Query failed");
                }

                Err(AthenaError::QueryFailed {
                    query_id,
                    state,
                    reason,
                })
            }
        }
    }

    /// Poll until a terminal state. Returns the final status and the number
    /// of polls issued. The first poll happens immediately after submission.
    async fn poll_until_terminal(
        &self,
        query_id: &str,
    ) -> Result<(ExecutionStatus, u32), AthenaError> {
        let start = Instant::now();
        let mut polls: u32 = 0;

        loop {
            let status = self.service.status(query_id).await?;
            polls += 1;

            debug!(
                query_id = %query_id,
                state = %status.state,
                poll = polls,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Polling query status"
            );

            if status.state.is_terminal() {
                return Ok((status, polls));
            }

            // Never sleep past the deadline.
            let mut pause = self.policy.interval;
            if let Some(timeout) = self.policy.timeout {
                let elapsed = start.elapsed();
                if elapsed >= timeout {
                    warn!(
                        query_id = %query_id,
                        timeout_ms = timeout.as_millis() as u64,
                        "Query timed out, cancelling"
                    );
                    self.cancel_best_effort(query_id).await;
                    return Err(AthenaError::QueryTimeout {
                        query_id: query_id.to_string(),
                        timeout,
                    });
                }
                pause = pause.min(timeout - elapsed);
            }

            let sleep = tokio::time::sleep(pause);
            match &self.cancel {
                Some(cancel) => {
                    tokio::select! {
                        _ = sleep => {}
                        _ = cancel.notified() => {
                            warn!(query_id = %query_id, "Interrupted, cancelling query");
                            self.cancel_best_effort(query_id).await;
                            return Err(AthenaError::Interrupted {
                                query_id: query_id.to_string(),
                            });
                        }
                    }
                }
                None => sleep.await,
            }
        }
    }

    async fn cancel_best_effort(&self, query_id: &str) {
        if let Err(e) = self.service.cancel(query_id).await {
            warn!(query_id = %query_id, error = %e, "Failed to cancel query");
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
