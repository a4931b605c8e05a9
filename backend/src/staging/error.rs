//! Error types for staging uploads

use axum::extract::multipart::MultipartError;
use thiserror::Error;

/// Result type for staging operations
pub type StagingResult<T> = Result<T, StagingError>;

/// Errors that can occur while writing an upload to the staging directory
#[derive(Error, Debug)]
pub enum StagingError {
    /// Reading the multipart body failed
    #[error("Multipart error: {0}")]
    Multipart(#[from] MultipartError),

    /// Writing the staged file failed
    #[error("Staging I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Every generated name was already taken
    #[error("No free staging name after {0} attempts")]
    NameExhausted(usize),
}
