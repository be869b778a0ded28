pub mod error;
pub mod fetch;
pub mod s3;
pub mod source;

pub use error::StorageError;
pub use fetch::ArtifactFetcher;
pub use s3::S3Source;
pub use source::{ObjectBody, ObjectSource};
