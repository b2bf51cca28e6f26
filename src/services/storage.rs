use aws_config::meta::region::RegionProviderChain;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use aws_sdk_s3::Client as S3Client;
use log::error;

use crate::config::StorageConfig;
use crate::error::AppError;

// The upload must succeed before the resulting URL is persisted on a
// profile or block producer; callers await this and only then update.
pub async fn upload(
    config: &StorageConfig,
    key: &str,
    data: Vec<u8>,
    content_type: &str,
) -> Result<String, AppError> {
    if config.access_key.is_empty() || config.secret_key.is_empty() || config.bucket.is_empty() {
        error!("object storage is not configured");
        return Err(AppError::Internal);
    }

    let region_provider = RegionProviderChain::first_try(Region::new(config.region.clone()));
    let creds = aws_sdk_s3::config::Credentials::new(
        config.access_key.clone(),
        config.secret_key.clone(),
        None,
        None,
        "static",
    );
    let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(region_provider)
        .credentials_provider(creds)
        .load()
        .await;

    let client = S3Client::new(&aws_config);
    client
        .put_object()
        .bucket(&config.bucket)
        .key(key)
        .acl(ObjectCannedAcl::PublicRead)
        .content_type(content_type)
        .body(ByteStream::from(data))
        .send()
        .await
        .map_err(|err| {
            error!("object upload failed: {}", err);
            AppError::Internal
        })?;

    let url = if !config.public_url_base.is_empty() {
        format!("{}/{}", config.public_url_base.trim_end_matches('/'), key)
    } else {
        format!(
            "https://s3.{}.amazonaws.com/{}/{}",
            config.region, config.bucket, key
        )
    };
    Ok(url)
}
