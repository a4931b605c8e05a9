//! Cloudinary signed upload API client

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{
    multipart::{Form, Part},
    Client,
};
use serde::Deserialize;
use sha1::{Digest, Sha1};
use tracing::debug;

use super::{HostedMedia, MediaHost, MediaHostError, MediaHostResult};
use crate::{staging::StagedFile, types::CloudinaryConfig};

/// Default request timeout in seconds
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
/// Maximum number of idle connections to maintain per host
const MAX_IDLE_CONNECTIONS_PER_HOST: usize = 10;

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
    resource_type: String,
    #[serde(default)]
    format: Option<String>,
    #[serde(default)]
    bytes: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Client of the Cloudinary upload API
///
/// Files go to the `auto` upload endpoint so Cloudinary detects the resource
/// type itself.
pub struct CloudinaryClient {
    config: CloudinaryConfig,
    http_client: Client,
}

impl CloudinaryClient {
    /// Creates a new Cloudinary client
    ///
    /// # Errors
    ///
    /// Returns `MediaHostError::Http` if the HTTP client fails to be created
    pub fn new(config: CloudinaryConfig) -> MediaHostResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
            .pool_max_idle_per_host(MAX_IDLE_CONNECTIONS_PER_HOST)
            .build()?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Endpoint receiving uploads for the configured account
    #[must_use]
    pub fn upload_url(&self) -> String {
        format!(
            "{}/v1_1/{}/auto/upload",
            self.config.api_base_url.trim_end_matches('/'),
            self.config.cloud_name
        )
    }

    /// Signs request parameters
    ///
    /// Parameters are sorted by name, serialized as `k=v` pairs joined with `&`,
    /// suffixed with the API secret and hashed with SHA-1.
    #[must_use]
    pub fn sign(params: &[(&str, &str)], api_secret: &str) -> String {
        let mut sorted = params.to_vec();
        sorted.sort_by(|a, b| a.0.cmp(b.0));

        let to_sign = sorted
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("&");

        let mut hasher = Sha1::new();
        hasher.update(to_sign.as_bytes());
        hasher.update(api_secret.as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[async_trait]
impl MediaHost for CloudinaryClient {
    async fn upload(&self, file: &StagedFile) -> MediaHostResult<HostedMedia> {
        let bytes = tokio::fs::read(file.path()).await?;
        let timestamp = Utc::now().timestamp().to_string();
        let signature = Self::sign(&[("timestamp", timestamp.as_str())], &self.config.api_secret);

        let part = Part::bytes(bytes)
            .file_name(file.original_name().to_string())
            .mime_str(file.content_type().as_ref())?;

        let form = Form::new()
            .part("file", part)
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("signature", signature);

        debug!(url = %self.upload_url(), file = %file.file_name(), "Uploading to Cloudinary");

        let response = self
            .http_client
            .post(self.upload_url())
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.json::<ErrorResponse>().await.map_or_else(
                |_| {
                    status
                        .canonical_reason()
                        .unwrap_or("unknown error")
                        .to_string()
                },
                |body| body.error.message,
            );

            return Err(MediaHostError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let body: UploadResponse = response.json().await?;

        Ok(HostedMedia {
            url: body.secure_url,
            public_id: body.public_id,
            resource_type: body.resource_type,
            format: body.format,
            bytes: body.bytes,
        })
    }
}
