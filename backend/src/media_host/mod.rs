//! Media host integration
//!
//! Staged uploads are handed to an external service that stores them durably
//! and serves them under a public URL.

mod cloudinary;
mod error;
mod s3;

use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_s3::Client as S3Client;
use tracing::{error, info};

pub use cloudinary::CloudinaryClient;
pub use error::{MediaHostError, MediaHostResult};
pub use s3::S3MediaHost;

use crate::{
    staging::StagedFile,
    types::{AppConfig, MediaHostConfig},
};

/// A file stored by the media host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedMedia {
    /// Public URL of the hosted file
    pub url: String,
    /// Identifier of the file at the host
    pub public_id: String,
    /// Kind of resource detected by the host (`image`, `video`, `raw`)
    pub resource_type: String,
    /// File format, when known
    pub format: Option<String>,
    /// Stored size in bytes, when reported
    pub bytes: Option<u64>,
}

/// External service storing uploads under public URLs
#[async_trait]
pub trait MediaHost: Send + Sync {
    /// Uploads the staged file and returns where it is now served from
    async fn upload(&self, file: &StagedFile) -> MediaHostResult<HostedMedia>;
}

/// Uploads `staged` to `host`, then removes the staged file
///
/// Failures are logged and reported as `None`; the staged file is removed
/// whatever the outcome. A guard without a local path is refused before the
/// host is contacted.
pub async fn forward_staged_file(host: &dyn MediaHost, staged: StagedFile) -> Option<HostedMedia> {
    let result = if staged.path().as_os_str().is_empty() {
        Err(MediaHostError::MissingPath)
    } else {
        host.upload(&staged).await
    };

    staged.remove().await;

    match result {
        Ok(hosted) => {
            info!(url = %hosted.url, public_id = %hosted.public_id, "File uploaded to media host");
            Some(hosted)
        }
        Err(e) => {
            error!("Error uploading to media host: {e}");
            None
        }
    }
}

/// Builds the media host selected by the configuration
///
/// # Errors
///
/// Returns `MediaHostError::Http` if the HTTP client cannot be created
pub async fn from_config(config: &AppConfig) -> MediaHostResult<Arc<dyn MediaHost>> {
    match &config.media_host {
        MediaHostConfig::Cloudinary(cloudinary) => {
            let client = CloudinaryClient::new(cloudinary.clone())?;
            info!(cloud_name = %cloudinary.cloud_name, "Using Cloudinary media host");
            Ok(Arc::new(client))
        }
        MediaHostConfig::S3(s3) => {
            let s3_client = Arc::new(S3Client::from_conf(
                config.environment.s3_client_config().await,
            ));
            info!(bucket = %s3.bucket_name, "Using S3 media host");
            Ok(Arc::new(S3MediaHost::new(
                s3_client,
                s3.bucket_name.clone(),
                s3.public_base_url.clone(),
            )))
        }
    }
}
