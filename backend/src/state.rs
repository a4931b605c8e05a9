//! Application state management

use std::sync::Arc;

use backend_storage::image_record::ImageRecordStore;

use crate::{media_host::MediaHost, staging::StagingArea};

/// Components shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Directory receiving uploads before they are forwarded
    pub staging_area: Arc<StagingArea>,
    /// Service hosting the uploaded files
    pub media_host: Arc<dyn MediaHost>,
    /// Store of hosted image URLs
    pub record_store: Arc<dyn ImageRecordStore>,
}
