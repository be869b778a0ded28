//! The object-storage seam.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;

use qfetch_core::ObjectAddress;

use crate::error::StorageError;

/// Body of a fetched object, delivered as a stream of chunks.
pub type ObjectBody = BoxStream<'static, Result<Bytes, StorageError>>;

/// Read access to an object store.
///
/// Implementations handle the specifics of one provider. [`crate::S3Source`]
/// is the AWS implementation; tests substitute in-memory sources.
#[async_trait]
pub trait ObjectSource: Send + Sync {
    /// Open the object at `address` for reading.
    ///
    /// Returns [`StorageError::NotFound`] when the key does not exist.
    async fn get_object(&self, address: &ObjectAddress) -> Result<ObjectBody, StorageError>;
}
