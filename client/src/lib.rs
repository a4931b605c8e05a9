//! Client side of the image upload relay
//!
//! [`ImageUpload`] holds one selected file and posts it to the relay's upload
//! endpoint as the multipart field `file`.

#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    dead_code
)]
#![allow(clippy::module_name_repetitions)]

mod error;

use std::path::{Path, PathBuf};
use std::time::Duration;

use mime::Mime;
use reqwest::{
    multipart::{Form, Part},
    Client,
};
use serde::Deserialize;

pub use error::{UploadError, UploadResult};

/// Upload endpoint of a relay running locally with default settings
pub const DEFAULT_ENDPOINT: &str = "http://localhost:5000/upload";

/// Multipart field the relay reads the file from
pub const FILE_FIELD: &str = "file";

/// Default request timeout in seconds
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadResponse {
    image_url: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

/// Upload control holding at most one selected file
pub struct ImageUpload {
    endpoint: String,
    http_client: Client,
    file: Option<PathBuf>,
}

impl ImageUpload {
    /// Creates an upload control posting to `endpoint`
    ///
    /// # Errors
    ///
    /// Returns `UploadError::Http` if the HTTP client fails to be created
    pub fn new(endpoint: impl Into<String>) -> UploadResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            endpoint: endpoint.into(),
            http_client,
            file: None,
        })
    }

    /// Endpoint uploads are posted to
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Selects the file to upload, replacing any previous selection
    pub fn select_file(&mut self, path: impl Into<PathBuf>) {
        self.file = Some(path.into());
    }

    /// Currently selected file
    #[must_use]
    pub fn selected_file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    /// Uploads the selected file and returns its public URL
    ///
    /// # Errors
    ///
    /// - `UploadError::NoFileSelected` if no file was selected, no request is sent
    /// - `UploadError::Io` if the file cannot be read
    /// - `UploadError::Http` if the request fails or the response is not the expected JSON
    /// - `UploadError::Rejected` if the relay answers with a non-success status
    pub async fn try_upload(&self) -> UploadResult<String> {
        let path = self.file.as_deref().ok_or(UploadError::NoFileSelected)?;

        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map_or_else(|| "upload".to_string(), |name| name.to_string_lossy().into_owned());

        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(content_type_for(path).as_ref())?;
        let form = Form::new().part(FILE_FIELD, part);

        tracing::debug!(endpoint = %self.endpoint, file = %path.display(), "Uploading image");

        let response = self
            .http_client
            .post(&self.endpoint)
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
                |body| body.error,
            );
            return Err(UploadError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let body: UploadResponse = response.json().await?;
        Ok(body.image_url)
    }

    /// Uploads the selected file, logging the outcome
    ///
    /// Returns the public URL on success and `None` on any failure.
    pub async fn upload(&self) -> Option<String> {
        match self.try_upload().await {
            Ok(image_url) => {
                tracing::info!(image_url = %image_url, "Image uploaded successfully");
                Some(image_url)
            }
            Err(e) => {
                tracing::error!("Error uploading image: {e}");
                None
            }
        }
    }
}

/// Content type declared for a file, guessed from its extension
#[must_use]
pub fn content_type_for(path: &Path) -> Mime {
    mime_guess::from_path(path)
        .first()
        .unwrap_or(mime::APPLICATION_OCTET_STREAM)
}
