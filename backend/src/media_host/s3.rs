//! S3 bucket acting as media host

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_s3::{primitives::ByteStream, Client as S3Client};
use tracing::debug;

use super::{HostedMedia, MediaHost, MediaHostError, MediaHostResult};
use crate::staging::StagedFile;

/// Key prefix of every uploaded object
const UPLOAD_PREFIX: &str = "uploads";

/// Media host storing uploads as public objects of an S3 bucket
pub struct S3MediaHost {
    s3_client: Arc<S3Client>,
    bucket_name: String,
    public_base_url: String,
}

impl S3MediaHost {
    /// Creates a new S3 media host
    ///
    /// # Arguments
    ///
    /// * `s3_client` - Pre-configured S3 client
    /// * `bucket_name` - Bucket receiving the uploads
    /// * `public_base_url` - URL prefix under which the bucket's objects are served
    #[must_use]
    pub const fn new(s3_client: Arc<S3Client>, bucket_name: String, public_base_url: String) -> Self {
        Self {
            s3_client,
            bucket_name,
            public_base_url,
        }
    }

    /// Object key of a staged file
    #[must_use]
    pub fn object_key(file: &StagedFile) -> String {
        format!("{UPLOAD_PREFIX}/{}", file.file_name())
    }
}

/// Public URL of `key` below `public_base_url`
#[must_use]
pub fn public_url(public_base_url: &str, key: &str) -> String {
    format!("{}/{key}", public_base_url.trim_end_matches('/'))
}

/// Resource kind derived from the declared content type
fn resource_type(file: &StagedFile) -> &'static str {
    let top_level = file.content_type().type_();
    if top_level == mime::IMAGE {
        "image"
    } else if top_level == mime::VIDEO {
        "video"
    } else {
        "raw"
    }
}

#[async_trait]
impl MediaHost for S3MediaHost {
    async fn upload(&self, file: &StagedFile) -> MediaHostResult<HostedMedia> {
        let key = Self::object_key(file);

        let body = ByteStream::from_path(file.path())
            .await
            .map_err(|e| MediaHostError::S3Error(format!("Failed to read staged file: {e}")))?;

        self.s3_client
            .put_object()
            .bucket(&self.bucket_name)
            .key(&key)
            .content_type(file.content_type().as_ref())
            .body(body)
            .send()
            .await?;

        debug!(bucket = %self.bucket_name, key = %key, "Uploaded object to S3");

        Ok(HostedMedia {
            url: public_url(&self.public_base_url, &key),
            resource_type: resource_type(file).to_string(),
            format: Path::new(file.original_name())
                .extension()
                .and_then(|ext| ext.to_str())
                .map(str::to_lowercase),
            bytes: Some(file.size()),
            public_id: key,
        })
    }
}
