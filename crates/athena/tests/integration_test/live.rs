//! Tests against a real Athena endpoint.

use qfetch_athena::*;
use qfetch_core::{load_sdk_config, Config};

/// This test requires valid AWS credentials and network access.
///
/// Run with: `cargo test test_real_athena_query -- --ignored`
///
/// Set environment variables before running:
/// - `AWS_PROFILE=<profile>` (or rely on `default`)
/// - `ATHENA_DATABASE=<your-database>`
/// - `ATHENA_OUTPUT_LOCATION=s3://<your-bucket>/results/`
#[test]
#[ignore]
fn test_real_athena_query() {
    // This test is async, so we need a runtime
    let rt = tokio::runtime::Runtime::new().unwrap();

    rt.block_on(async {
        let config = Config::from_env();
        let sdk = load_sdk_config(&config.aws).await;

        let request = QueryRequest::new(
            "SELECT 1 AS test_column",
            config.athena.database.clone(),
            &config.athena.output_location,
        )
        .expect("ATHENA_OUTPUT_LOCATION must be an s3:// address")
        .with_workgroup(config.athena.workgroup.clone());

        let runner = QueryRunner::new(
            AthenaClient::new(&sdk),
            PollPolicy::from_config(&config.athena),
        );

        let outcome = runner.execute(&request).await.expect("Query execution failed");

        assert_eq!(outcome.status.state, ExecutionState::Succeeded);
        assert!(outcome.result_location.ends_with(&format!("{}.csv", outcome.query_id)));

        println!("Real Athena query succeeded!");
        println!("{}", outcome);
    });
}
