mod app;
mod cli;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::Notify;
use tracing::warn;

use qfetch_athena::{AthenaClient, PollPolicy, QueryRunner};
use qfetch_core::{load_dotenv, load_sdk_config, Config};
use qfetch_storage::{ArtifactFetcher, S3Source};

use crate::cli::CliArgs;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the result lines only.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    load_dotenv();
    let args = CliArgs::parse();

    let config = Config::from_env().apply(args.overrides());
    config.log_summary();

    if args.show_config {
        println!(
            "{}",
            serde_json::to_string_pretty(&config).context("failed to serialize config")?
        );
        return Ok(());
    }

    let query = args.query.as_deref().context("a query is required")?;

    let sdk = load_sdk_config(&config.aws).await;

    let cancel = Arc::new(Notify::new());
    spawn_interrupt_handler(cancel.clone());

    let runner = QueryRunner::new(
        AthenaClient::new(&sdk),
        PollPolicy::from_config(&config.athena),
    )
    .with_cancel(cancel.clone());
    let fetcher = ArtifactFetcher::new(S3Source::new(&sdk)).with_cancel(cancel);

    let json = args.json;
    let result = app::run(&config, query, &runner, &fetcher, |outcome| {
        if !json {
            println!("Query succeeded. Result saved in: {}", outcome.result_location);
        }
    })
    .await;

    match result {
        Ok(summary) => {
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&summary).context("failed to serialize summary")?
                );
            } else {
                println!(
                    "CSV downloaded successfully to: {}",
                    summary.output_file.display()
                );
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}

/// First Ctrl+C cancels whichever step is running (query or download); a
/// second one exits immediately.
fn spawn_interrupt_handler(cancel: Arc<Notify>) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        warn!("Interrupt received, cancelling (press Ctrl+C again to abort)");
        cancel.notify_one();

        if tokio::signal::ctrl_c().await.is_ok() {
            std::process::exit(130);
        }
    });
}
