use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, Multipart},
    Extension, Json,
};
use backend_storage::image_record::ImageRecordStore;
use mime::Mime;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
    media_host::{self, MediaHost},
    staging::{StagedFile, StagingArea, StagingError},
    types::AppError,
};

/// Multipart field carrying the upload
pub const FILE_FIELD: &str = "file";

/// Body of a successful upload
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    /// Public URL of the hosted image
    pub image_url: String,
}

/// Relays one uploaded image to the media host
///
/// 1. Streams the `file` part of the multipart body into the staging area
/// 2. Hands the staged file to the media host and removes it
/// 3. Records the public URL returned by the host
///
/// # Errors
///
/// - 400 if the body is not multipart, has no `file` part or more than one,
///   or is malformed
/// - 413 if the body exceeds the configured limit
/// - 500 if the media host fails or the record cannot be saved
#[instrument(skip_all)]
pub async fn upload_image(
    Extension(staging_area): Extension<Arc<StagingArea>>,
    Extension(media_host): Extension<Arc<dyn MediaHost>>,
    Extension(record_store): Extension<Arc<dyn ImageRecordStore>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let mut multipart = multipart?;
    let staged = stage_single_file(&staging_area, &mut multipart).await?;

    tracing::info!(
        original_name = %staged.original_name(),
        staged = %staged.file_name(),
        bytes = staged.size(),
        "Upload staged"
    );

    let hosted = media_host::forward_staged_file(media_host.as_ref(), staged)
        .await
        .ok_or_else(AppError::media_host_failed)?;

    let record = record_store.save(&hosted.url).await?;

    tracing::info!(record_id = %record.id, url = %record.url, "Image record saved");

    Ok(Json(UploadResponse {
        image_url: record.url,
    }))
}

/// Stages the single `file` part of the request, ignoring every other field
async fn stage_single_file(
    staging_area: &StagingArea,
    multipart: &mut Multipart,
) -> Result<StagedFile, AppError> {
    let mut staged: Option<StagedFile> = None;

    while let Some(field) = multipart.next_field().await.map_err(StagingError::from)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        // A part without a file name is a plain form value, not a file
        let Some(original_name) = field.file_name().map(ToString::to_string) else {
            continue;
        };
        if staged.is_some() {
            return Err(AppError::multiple_files());
        }

        let content_type = field
            .content_type()
            .and_then(|value| value.parse::<Mime>().ok())
            .unwrap_or(mime::APPLICATION_OCTET_STREAM);

        staged = Some(
            staging_area
                .stage(&original_name, content_type, field)
                .await?,
        );
    }

    staged.ok_or_else(AppError::missing_file)
}
