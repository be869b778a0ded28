//! Shared AWS SDK configuration.
//!
//! Both the Athena and S3 clients are built from the same [`SdkConfig`] so a
//! single credential profile covers the whole run.

use aws_config::BehaviorVersion;
use aws_types::region::Region;
use aws_types::SdkConfig;
use tracing::debug;

use crate::config::AwsConfig;

/// Resolve an [`SdkConfig`] for the configured profile, region and endpoint.
///
/// Credentials are never read here; the SDK resolves them lazily from the
/// named profile on the first request.
pub async fn load_sdk_config(aws: &AwsConfig) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest()).profile_name(&aws.profile);

    if let Some(ref region) = aws.region {
        loader = loader.region(Region::new(region.clone()));
    }

    if let Some(ref endpoint) = aws.endpoint_url {
        if !endpoint.is_empty() {
            let url = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
                endpoint.clone()
            } else {
                format!("https://{endpoint}")
            };
            loader = loader.endpoint_url(url);
        }
    }

    let sdk = loader.load().await;

    debug!(
        profile = %aws.profile,
        region = ?sdk.region().map(|r| r.as_ref().to_string()),
        "AWS SDK config loaded"
    );

    sdk
}
