use thiserror::Error;

use qfetch_core::AddressError;

/// Failures while transferring a result object to local disk.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error(transparent)]
    Address(#[from] AddressError),

    #[error("object not found: s3://{bucket}/{key}")]
    NotFound { bucket: String, key: String },

    #[error("access denied to s3://{bucket}/{key}: {message}")]
    AccessDenied {
        bucket: String,
        key: String,
        message: String,
    },

    #[error("AWS SDK error: {0}")]
    AwsSdk(String),

    /// The download was cancelled before the file was complete.
    #[error("download to {path} interrupted")]
    Interrupted { path: String },

    #[error("IO error writing {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl StorageError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}
