//! Error types for the upload client

use thiserror::Error;

/// Result type for upload operations
pub type UploadResult<T> = Result<T, UploadError>;

/// Errors that can occur while uploading an image to the relay
#[derive(Error, Debug)]
pub enum UploadError {
    /// `upload` was called before any file was selected
    #[error("No file selected")]
    NoFileSelected,

    /// The selected file could not be read
    #[error("Failed to read selected file: {0}")]
    Io(#[from] std::io::Error),

    /// The request could not be sent or its response not decoded
    #[error("Upload request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The relay answered with a non-success status
    #[error("Relay rejected the upload ({status}): {message}")]
    Rejected {
        /// HTTP status returned by the relay
        status: u16,
        /// Error message returned by the relay
        message: String,
    },
}
