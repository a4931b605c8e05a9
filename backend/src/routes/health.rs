use std::sync::Arc;

use axum::{Extension, Json};
use backend_storage::image_record::ImageRecordStore;
use schemars::JsonSchema;
use serde::Serialize;

use crate::types::AppError;

/// Service status and version
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    status: String,
    /// Current version of the application
    semver: String,
    /// Commit hash of the current build (if available)
    rev: Option<String>,
    /// State of the image record store
    record_store: String,
}

/// Health check endpoint
///
/// Returns the current status and version information of the service, or 503
/// when the image record store cannot be reached.
pub async fn handler(
    Extension(record_store): Extension<Arc<dyn ImageRecordStore>>,
) -> Result<Json<HealthResponse>, AppError> {
    record_store.health_check().await.map_err(|e| {
        tracing::error!("Record store health check failed: {e}");
        AppError::record_store_unavailable()
    })?;

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        semver: env!("CARGO_PKG_VERSION").to_string(),
        rev: option_env!("GIT_REV").map(ToString::to_string),
        record_store: "ok".to_string(),
    }))
}
