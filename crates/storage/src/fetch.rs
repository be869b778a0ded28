use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::TryStreamExt;
use tokio::io::AsyncWriteExt;
use tokio::sync::Notify;
use tracing::{info, warn};

use qfetch_core::ObjectAddress;

use crate::error::StorageError;
use crate::source::{ObjectBody, ObjectSource};

/// Copies a single result object from an [`ObjectSource`] to a local file.
pub struct ArtifactFetcher<S> {
    source: S,
    cancel: Option<Arc<Notify>>,
}

impl<S: ObjectSource> ArtifactFetcher<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            cancel: None,
        }
    }

    /// Attach a cancellation signal. A notification aborts the transfer,
    /// removes the partial file and fails with [`StorageError::Interrupted`].
    pub fn with_cancel(mut self, cancel: Arc<Notify>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Download `address` (`s3://bucket/key`) to `local_path`, replacing any
    /// existing file. Returns the number of bytes written.
    ///
    /// Bytes are streamed into `<local_path>.part` and renamed into place once
    /// complete, so a failed transfer leaves an existing file untouched.
    /// Parent directories are not created.
    pub async fn download(&self, address: &str, local_path: &Path) -> Result<u64, StorageError> {
        let object = ObjectAddress::parse(address)?;

        info!(
            bucket = %object.bucket,
            key = %object.key,
            path = %local_path.display(),
            "Downloading result object"
        );

        let part = part_path(local_path);
        let transfer = self.transfer(&object, &part);

        let result = match &self.cancel {
            Some(cancel) => {
                tokio::select! {
                    biased;
                    _ = cancel.notified() => {
                        warn!(path = %local_path.display(), "Interrupted, abandoning download");
                        Err(StorageError::Interrupted {
                            path: local_path.display().to_string(),
                        })
                    }
                    result = transfer => result,
                }
            }
            None => transfer.await,
        };

        let written = match result {
            Ok(n) => n,
            Err(e) => {
                remove_partial(&part).await;
                return Err(e);
            }
        };

        tokio::fs::rename(&part, local_path)
            .await
            .map_err(|e| StorageError::io(local_path, e))?;

        info!(bytes = written, path = %local_path.display(), "Download complete");
        Ok(written)
    }

    async fn transfer(&self, object: &ObjectAddress, part: &Path) -> Result<u64, StorageError> {
        let mut body = self.source.get_object(object).await?;
        write_body(&mut body, part).await
    }
}

async fn remove_partial(part: &Path) {
    if let Err(e) = tokio::fs::remove_file(part).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(path = %part.display(), error = %e, "Failed to remove partial download");
        }
    }
}

async fn write_body(body: &mut ObjectBody, path: &Path) -> Result<u64, StorageError> {
    let mut file = tokio::fs::File::create(path)
        .await
        .map_err(|e| StorageError::io(path, e))?;

    let mut written: u64 = 0;
    while let Some(chunk) = body.try_next().await? {
        file.write_all(&chunk)
            .await
            .map_err(|e| StorageError::io(path, e))?;
        written += chunk.len() as u64;
    }

    file.flush().await.map_err(|e| StorageError::io(path, e))?;
    Ok(written)
}

/// `out.csv` → `out.csv.part`, in the same directory.
fn part_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(OsString::new);
    name.push(".part");
    path.with_file_name(name)
}
