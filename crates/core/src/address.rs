//! S3 address parsing.
//!
//! Two shapes are handled here:
//! - [`ObjectAddress`]: a full object address `s3://bucket/key`, split into
//!   bucket and key for a `GetObject` call.
//! - [`OutputLocation`]: a container address `s3://bucket[/prefix]` where the
//!   query service writes results. The key part is optional and trailing
//!   slashes are stripped.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// URI scheme every storage address must start with.
pub const S3_SCHEME: &str = "s3://";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("Invalid S3 URI '{0}': must start with 's3://'")]
    MissingScheme(String),

    #[error("Invalid S3 URI '{0}': bucket name is empty")]
    EmptyBucket(String),

    #[error("Invalid S3 URI '{0}': expected s3://bucket/key")]
    MissingKey(String),
}

/// Strip every trailing `/` from an address.
///
/// `"s3://foo/"` and `"s3://foo"` both normalize to `"s3://foo"`.
pub fn normalize_location(address: &str) -> &str {
    address.trim_end_matches('/')
}

// ── ObjectAddress ────────────────────────────────────────────────

/// A bucket + key pair addressing a single object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectAddress {
    pub bucket: String,
    pub key: String,
}

impl ObjectAddress {
    /// Parse `s3://bucket/key`. The remainder after the scheme is split on the
    /// first `/`, so keys may contain further separators.
    pub fn parse(address: &str) -> Result<Self, AddressError> {
        let rest = address
            .strip_prefix(S3_SCHEME)
            .ok_or_else(|| AddressError::MissingScheme(address.to_string()))?;

        let (bucket, key) = rest
            .split_once('/')
            .ok_or_else(|| AddressError::MissingKey(address.to_string()))?;

        if bucket.is_empty() {
            return Err(AddressError::EmptyBucket(address.to_string()));
        }
        if key.is_empty() {
            return Err(AddressError::MissingKey(address.to_string()));
        }

        Ok(Self {
            bucket: bucket.to_string(),
            key: key.to_string(),
        })
    }
}

impl fmt::Display for ObjectAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}/{}", S3_SCHEME, self.bucket, self.key)
    }
}

// ── OutputLocation ───────────────────────────────────────────────

/// A validated, normalized result location (`s3://bucket` or `s3://bucket/prefix`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OutputLocation(String);

impl OutputLocation {
    pub fn parse(raw: &str) -> Result<Self, AddressError> {
        let rest = raw
            .strip_prefix(S3_SCHEME)
            .ok_or_else(|| AddressError::MissingScheme(raw.to_string()))?;
        let rest = normalize_location(rest);

        let bucket = rest.split('/').next().unwrap_or_default();
        if bucket.is_empty() {
            return Err(AddressError::EmptyBucket(raw.to_string()));
        }

        Ok(Self(format!("{S3_SCHEME}{rest}")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Address of the CSV the query service writes for execution `handle`.
    ///
    /// Athena names result objects `{OutputLocation}/{QueryExecutionId}.csv`.
    /// This is a vendor convention, not something the service guarantees
    /// through its API, so callers should prefer a location reported by the
    /// service when one is available.
    pub fn result_object(&self, handle: &str) -> String {
        format!("{}/{}.csv", self.0, handle)
    }
}

impl fmt::Display for OutputLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for OutputLocation {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<OutputLocation> for String {
    fn from(value: OutputLocation) -> Self {
        value.0
    }
}
