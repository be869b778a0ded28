//! Tests for ArtifactFetcher: address handling, streaming to disk and cancellation.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::Notify;

use qfetch_core::ObjectAddress;
use qfetch_storage::*;

/// Serves a single object and records every address it was asked for.
struct RecordingSource {
    bucket: &'static str,
    key: &'static str,
    chunks: Vec<&'static str>,
    requested: Mutex<Vec<String>>,
}

impl RecordingSource {
    fn new(bucket: &'static str, key: &'static str, chunks: Vec<&'static str>) -> Self {
        Self {
            bucket,
            key,
            chunks,
            requested: Mutex::new(Vec::new()),
        }
    }

    fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectSource for RecordingSource {
    async fn get_object(&self, address: &ObjectAddress) -> Result<ObjectBody, StorageError> {
        self.requested.lock().unwrap().push(address.to_string());
        if address.bucket != self.bucket || address.key != self.key {
            return Err(StorageError::NotFound {
                bucket: address.bucket.clone(),
                key: address.key.clone(),
            });
        }
        let items: Vec<Result<Bytes, StorageError>> = self
            .chunks
            .iter()
            .copied()
            .map(|c| Ok(Bytes::from_static(c.as_bytes())))
            .collect();
        Ok(Box::pin(futures::stream::iter(items)))
    }
}

fn leftover_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn test_key_with_nested_slashes_is_fetched_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("result.csv");
    let source = RecordingSource::new(
        "athena-results",
        "team/2024/01/abc-123.csv",
        vec!["\"id\",\"name\"\n", "\"1\",\"a\"\n", "\"2\",\"b\"\n"],
    );
    let fetcher = ArtifactFetcher::new(source);

    let bytes = fetcher
        .download("s3://athena-results/team/2024/01/abc-123.csv", &dest)
        .await
        .expect("download should succeed");

    assert_eq!(bytes, 28);
    assert_eq!(
        std::fs::read_to_string(&dest).unwrap(),
        "\"id\",\"name\"\n\"1\",\"a\"\n\"2\",\"b\"\n"
    );
    assert_eq!(
        fetcher.source().requested(),
        vec!["s3://athena-results/team/2024/01/abc-123.csv"]
    );
    assert_eq!(leftover_files(dir.path()), vec!["result.csv"]);
}

#[tokio::test]
async fn test_empty_object_creates_empty_file() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("out.csv");
    let fetcher = ArtifactFetcher::new(RecordingSource::new("b", "k.csv", vec![]));

    let bytes = fetcher.download("s3://b/k.csv", &dest).await.unwrap();

    assert_eq!(bytes, 0);
    assert_eq!(std::fs::read_to_string(&dest).unwrap(), "");
}

#[tokio::test]
async fn test_not_found_reports_full_address() {
    let dir = tempfile::tempdir().unwrap();
    let fetcher = ArtifactFetcher::new(RecordingSource::new("b", "k.csv", vec!["x"]));

    let err = fetcher
        .download("s3://b/other.csv", &dir.path().join("out.csv"))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "object not found: s3://b/other.csv");
    assert!(leftover_files(dir.path()).is_empty());
}

#[tokio::test]
async fn test_malformed_address_is_rejected_before_fetch() {
    let dir = tempfile::tempdir().unwrap();
    let fetcher = ArtifactFetcher::new(RecordingSource::new("b", "k.csv", vec!["x"]));

    let err = fetcher
        .download("https://b.s3.amazonaws.com/k.csv", &dir.path().join("out.csv"))
        .await
        .unwrap_err();

    assert!(matches!(err, StorageError::Address(_)));
    assert!(fetcher.source().requested().is_empty());
}

#[tokio::test]
async fn test_cancelled_download_leaves_no_files() {
    let dir = tempfile::tempdir().unwrap();
    let cancel = Arc::new(Notify::new());
    let fetcher = ArtifactFetcher::new(RecordingSource::new("b", "k.csv", vec!["x"]))
        .with_cancel(cancel.clone());

    cancel.notify_one();
    let err = fetcher
        .download("s3://b/k.csv", &dir.path().join("out.csv"))
        .await
        .unwrap_err();

    assert!(matches!(err, StorageError::Interrupted { .. }));
    assert!(leftover_files(dir.path()).is_empty());
}

#[tokio::test]
async fn test_unused_cancel_signal_does_not_affect_download() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("out.csv");
    let fetcher = ArtifactFetcher::new(RecordingSource::new("b", "k.csv", vec!["ok\n"]))
        .with_cancel(Arc::new(Notify::new()));

    fetcher.download("s3://b/k.csv", &dest).await.unwrap();
    assert_eq!(std::fs::read_to_string(&dest).unwrap(), "ok\n");
}
