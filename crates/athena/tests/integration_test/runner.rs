//! Tests for QueryRunner: poll sequences, result-location derivation and failure reporting.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use qfetch_athena::*;

/// Records every call and replays scripted statuses.
struct RecordingService {
    handle: &'static str,
    statuses: Mutex<VecDeque<ExecutionState>>,
    reason: Option<&'static str>,
    calls: Mutex<Vec<String>>,
    submitted: Mutex<Option<QueryRequest>>,
}

impl RecordingService {
    fn new(handle: &'static str, states: &[ExecutionState]) -> Self {
        Self {
            handle,
            statuses: Mutex::new(states.iter().copied().collect()),
            reason: None,
            calls: Mutex::new(Vec::new()),
            submitted: Mutex::new(None),
        }
    }

    fn with_reason(mut self, reason: &'static str) -> Self {
        self.reason = Some(reason);
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl QueryService for RecordingService {
    async fn submit(&self, request: &QueryRequest) -> Result<String, AthenaError> {
        self.calls.lock().unwrap().push("submit".into());
        *self.submitted.lock().unwrap() = Some(request.clone());
        Ok(self.handle.to_string())
    }

    async fn status(&self, query_id: &str) -> Result<ExecutionStatus, AthenaError> {
        self.calls.lock().unwrap().push(format!("status:{query_id}"));
        let state = self
            .statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(ExecutionState::Running);
        let mut status = ExecutionStatus::new(state);
        if state.is_terminal() {
            status.reason = self.reason.map(str::to_string);
        }
        Ok(status)
    }

    async fn cancel(&self, query_id: &str) -> Result<(), AthenaError> {
        self.calls.lock().unwrap().push(format!("cancel:{query_id}"));
        Ok(())
    }
}

fn policy() -> PollPolicy {
    PollPolicy {
        interval: Duration::from_millis(1),
        timeout: None,
    }
}

#[tokio::test]
async fn test_running_then_succeeded() {
    let service = RecordingService::new(
        "h1",
        &[ExecutionState::Running, ExecutionState::Succeeded],
    );
    let runner = QueryRunner::new(service, policy());
    let request = QueryRequest::new("SELECT 1", "db1", "s3://b/out").unwrap();

    let outcome = runner.execute(&request).await.expect("query should succeed");

    assert_eq!(outcome.result_location, "s3://b/out/h1.csv");
    assert_eq!(outcome.polls, 2);
    assert_eq!(outcome.status.state, ExecutionState::Succeeded);
    assert_eq!(
        runner.service().calls(),
        vec!["submit", "status:h1", "status:h1"]
    );

    let submitted = runner.service().submitted.lock().unwrap().clone().unwrap();
    assert_eq!(submitted.query, "SELECT 1");
    assert_eq!(submitted.database, "db1");
    assert_eq!(submitted.output_location.as_str(), "s3://b/out");
}

#[tokio::test]
async fn test_trailing_slash_does_not_double_separator() {
    let service = RecordingService::new("abc-123", &[ExecutionState::Succeeded]);
    let runner = QueryRunner::new(service, policy());
    let request = QueryRequest::new("SELECT 1", "db1", "s3://bucket/path///").unwrap();

    let outcome = runner.execute(&request).await.unwrap();
    assert_eq!(outcome.result_location, "s3://bucket/path/abc-123.csv");
}

#[tokio::test]
async fn test_failed_and_cancelled_carry_reason() {
    for state in [ExecutionState::Failed, ExecutionState::Cancelled] {
        let service = RecordingService::new("h2", &[ExecutionState::Queued, state])
            .with_reason("Query exhausted resources at this scale factor");
        let runner = QueryRunner::new(service, policy());
        let request = QueryRequest::new("SELECT 1", "db1", "s3://b/out").unwrap();

        let err = runner.execute(&request).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("Query {state}: Query exhausted resources at this scale factor")
        );
        assert!(
            !runner.service().calls().iter().any(|c| c.starts_with("cancel")),
            "terminal states must not trigger a cancel"
        );
    }
}

#[tokio::test]
async fn test_workgroup_passed_through() {
    let service = RecordingService::new("h3", &[ExecutionState::Succeeded]);
    let runner = QueryRunner::new(service, policy());
    let request = QueryRequest::new("SELECT 1", "db1", "s3://b/out")
        .unwrap()
        .with_workgroup(Some("analysts".into()));

    runner.execute(&request).await.unwrap();

    let submitted = runner.service().submitted.lock().unwrap().clone().unwrap();
    assert_eq!(submitted.workgroup.as_deref(), Some("analysts"));
}

#[tokio::test]
async fn test_timeout_issues_cancel() {
    let service = RecordingService::new("h4", &[]);
    let runner = QueryRunner::new(
        service,
        PollPolicy {
            interval: Duration::from_millis(2),
            timeout: Some(Duration::from_millis(10)),
        },
    );
    let request = QueryRequest::new("SELECT 1", "db1", "s3://b/out").unwrap();

    let err = runner.execute(&request).await.unwrap_err();
    assert!(matches!(err, AthenaError::QueryTimeout { .. }));
    assert_eq!(runner.service().calls().last().map(String::as_str), Some("cancel:h4"));
}
