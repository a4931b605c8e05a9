//! Universal error handling for the API

use aide::OperationOutput;
use axum::{
    extract::multipart::MultipartRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use backend_storage::image_record::ImageRecordStorageError;
use schemars::JsonSchema;
use serde::Serialize;

use crate::staging::StagingError;

/// API error response body, `{"error": "<message>"}`
#[derive(Debug, Serialize, JsonSchema)]
pub struct ApiErrorResponse {
    /// Human-readable error message
    pub error: &'static str,
}

/// Application error type that wraps the API error response
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    inner: ApiErrorResponse,
}

impl AppError {
    /// Create a new application error
    #[must_use]
    pub const fn new(status: StatusCode, msg: &'static str) -> Self {
        Self {
            status,
            inner: ApiErrorResponse { error: msg },
        }
    }

    /// The request carried no `file` part
    #[must_use]
    pub const fn missing_file() -> Self {
        Self::new(StatusCode::BAD_REQUEST, "No file uploaded")
    }

    /// The request carried more than one `file` part
    #[must_use]
    pub const fn multiple_files() -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "Only one file may be uploaded per request",
        )
    }

    /// The multipart body could not be parsed
    #[must_use]
    pub const fn malformed_multipart() -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Malformed multipart request")
    }

    /// The body exceeded the configured limit
    #[must_use]
    pub const fn payload_too_large() -> Self {
        Self::new(StatusCode::PAYLOAD_TOO_LARGE, "Uploaded file is too large")
    }

    /// The media host did not return a hosted file
    #[must_use]
    pub const fn media_host_failed() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Error uploading to media host",
        )
    }

    /// The request did not complete in time
    #[must_use]
    pub const fn request_timeout() -> Self {
        Self::new(StatusCode::REQUEST_TIMEOUT, "Request timed out")
    }

    /// The record store cannot be reached
    #[must_use]
    pub const fn record_store_unavailable() -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, "Record store unavailable")
    }

    /// Anything else; details stay in the server logs
    #[must_use]
    pub const fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
    }

    /// HTTP status of the error
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Message sent to the client
    #[must_use]
    pub const fn message(&self) -> &'static str {
        self.inner.error
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self.status.as_u16() {
            400..=499 => tracing::warn!("Client error: {} - {}", self.status, self.inner.error),
            500..=599 => tracing::error!("Server error: {} - {}", self.status, self.inner.error),
            _ => {}
        }

        (self.status, Json(self.inner)).into_response()
    }
}

/// Convert staging errors to application errors
impl From<StagingError> for AppError {
    fn from(err: StagingError) -> Self {
        match &err {
            StagingError::Multipart(multipart_err)
                if multipart_err.status() == StatusCode::PAYLOAD_TOO_LARGE =>
            {
                tracing::warn!("Upload exceeds body limit: {err}");
                Self::payload_too_large()
            }
            StagingError::Multipart(_) => {
                tracing::warn!("Malformed multipart request: {err}");
                Self::malformed_multipart()
            }
            StagingError::Io(_) | StagingError::NameExhausted(_) => {
                tracing::error!("Failed to stage upload: {err}");
                Self::internal()
            }
        }
    }
}

/// Convert multipart extraction failures (missing or invalid boundary)
impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        tracing::warn!("Rejected multipart request: {}", rejection.body_text());
        Self::malformed_multipart()
    }
}

/// Convert record store errors to application errors
impl From<ImageRecordStorageError> for AppError {
    fn from(err: ImageRecordStorageError) -> Self {
        tracing::error!("Failed to save image record: {err}");
        Self::internal()
    }
}

impl OperationOutput for AppError {
    type Inner = ApiErrorResponse;

    fn operation_response(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Option<aide::openapi::Response> {
        Json::<ApiErrorResponse>::operation_response(ctx, operation)
    }
}
