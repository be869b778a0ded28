//! AWS S3 object source.

use async_trait::async_trait;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::operation::get_object::GetObjectError;
use aws_types::SdkConfig;
use tracing::debug;

use qfetch_core::ObjectAddress;

use crate::error::StorageError;
use crate::source::{ObjectBody, ObjectSource};

/// [`ObjectSource`] backed by `GetObject`.
#[derive(Debug, Clone)]
pub struct S3Source {
    client: aws_sdk_s3::Client,
}

impl S3Source {
    /// Build an S3 client from the shared SDK config.
    ///
    /// Custom endpoints (LocalStack, MinIO) get path-style addressing since
    /// they rarely resolve virtual-hosted bucket names.
    pub fn new(sdk: &SdkConfig) -> Self {
        let mut builder = aws_sdk_s3::config::Builder::from(sdk);
        if sdk.endpoint_url().is_some() {
            builder = builder.force_path_style(true);
        }
        Self {
            client: aws_sdk_s3::Client::from_conf(builder.build()),
        }
    }
}

#[async_trait]
impl ObjectSource for S3Source {
    async fn get_object(&self, address: &ObjectAddress) -> Result<ObjectBody, StorageError> {
        let resp = self
            .client
            .get_object()
            .bucket(&address.bucket)
            .key(&address.key)
            .send()
            .await
            .map_err(|e| classify_get_error(address, e))?;

        debug!(
            bucket = %address.bucket,
            key = %address.key,
            content_length = ?resp.content_length(),
            "GetObject response received"
        );

        let stream = futures::stream::unfold(resp.body, |mut body| async move {
            body.next().await.map(|chunk| {
                let chunk = chunk.map_err(|e| {
                    StorageError::AwsSdk(format!("error reading object body: {e}"))
                });
                (chunk, body)
            })
        });

        Ok(Box::pin(stream))
    }
}

/// Sort a `GetObject` failure into not-found, access-denied or generic SDK error.
fn classify_get_error(address: &ObjectAddress, err: SdkError<GetObjectError>) -> StorageError {
    let not_found = || StorageError::NotFound {
        bucket: address.bucket.clone(),
        key: address.key.clone(),
    };

    if let Some(service_err) = err.as_service_error() {
        if service_err.is_no_such_key() {
            return not_found();
        }
        if service_err.code() == Some("AccessDenied") {
            return StorageError::AccessDenied {
                bucket: address.bucket.clone(),
                key: address.key.clone(),
                message: service_err.message().unwrap_or("access denied").to_string(),
            };
        }
    }

    if let Some(raw) = err.raw_response() {
        match raw.status().as_u16() {
            404 => return not_found(),
            403 => {
                return StorageError::AccessDenied {
                    bucket: address.bucket.clone(),
                    key: address.key.clone(),
                    message: "HTTP 403".to_string(),
                }
            }
            _ => {}
        }
    }

    StorageError::AwsSdk(DisplayErrorContext(&err).to_string())
}
