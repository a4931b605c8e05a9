//! Error types for media host operations

use aws_sdk_s3::{error::SdkError, operation::put_object::PutObjectError};
use thiserror::Error;

/// Result type for media host operations
pub type MediaHostResult<T> = Result<T, MediaHostError>;

/// Errors that can occur while handing a staged file to the media host
#[derive(Error, Debug)]
pub enum MediaHostError {
    /// No local file to upload
    #[error("No local file path given")]
    MissingPath,

    /// Reading the staged file failed
    #[error("Failed to read staged file: {0}")]
    Io(#[from] std::io::Error),

    /// The HTTP request to the media host failed
    #[error("Media host request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The media host answered with a non-success status
    #[error("Media host rejected the upload ({status}): {message}")]
    Rejected {
        /// HTTP status returned by the host
        status: u16,
        /// Error message returned by the host
        message: String,
    },

    /// S3 service error
    #[error("S3 service error: {0}")]
    S3Error(String),
}

impl From<SdkError<PutObjectError>> for MediaHostError {
    fn from(error: SdkError<PutObjectError>) -> Self {
        match error {
            SdkError::ServiceError(err) => Self::S3Error(format!("{:?}", err.err())),
            _ => Self::S3Error(error.to_string()),
        }
    }
}
