//! In-memory stand-ins for the media host and the record store

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use backend_storage::image_record::{
    ImageRecord, ImageRecordStorageError, ImageRecordStorageResult, ImageRecordStore,
};
use tokio::sync::Mutex;

use crate::{
    media_host::{HostedMedia, MediaHost, MediaHostError, MediaHostResult},
    staging::StagedFile,
};

/// What the stub media host saw when asked to upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedUpload {
    /// Staged path handed to the host
    pub path: PathBuf,
    /// Client file name
    pub original_name: String,
    /// Size of the staged file at upload time, `None` if it did not exist
    pub size_on_disk: Option<u64>,
}

/// Media host answering from memory
pub struct StubMediaHost {
    base_url: Option<String>,
    uploads: Mutex<Vec<ObservedUpload>>,
}

impl StubMediaHost {
    /// Host that accepts every upload and serves it under `base_url`
    #[must_use]
    pub fn succeeding(base_url: &str) -> Self {
        Self {
            base_url: Some(base_url.trim_end_matches('/').to_string()),
            uploads: Mutex::new(Vec::new()),
        }
    }

    /// Host that rejects every upload, as with invalid credentials
    #[must_use]
    pub fn failing() -> Self {
        Self {
            base_url: None,
            uploads: Mutex::new(Vec::new()),
        }
    }

    /// Uploads seen so far
    pub async fn uploads(&self) -> Vec<ObservedUpload> {
        self.uploads.lock().await.clone()
    }
}

#[async_trait]
impl MediaHost for StubMediaHost {
    async fn upload(&self, file: &StagedFile) -> MediaHostResult<HostedMedia> {
        let size_on_disk = tokio::fs::metadata(file.path())
            .await
            .ok()
            .map(|metadata| metadata.len());

        self.uploads.lock().await.push(ObservedUpload {
            path: file.path().to_path_buf(),
            original_name: file.original_name().to_string(),
            size_on_disk,
        });

        let Some(base_url) = &self.base_url else {
            return Err(MediaHostError::Rejected {
                status: 401,
                message: "Invalid api_key".to_string(),
            });
        };

        Ok(HostedMedia {
            url: format!("{base_url}/{}", file.file_name()),
            public_id: file.file_name().to_string(),
            resource_type: "image".to_string(),
            format: None,
            bytes: Some(file.size()),
        })
    }
}

/// Record store keeping records in memory
#[derive(Default)]
pub struct InMemoryImageRecordStore {
    records: Mutex<Vec<ImageRecord>>,
    unavailable: AtomicBool,
}

impl InMemoryImageRecordStore {
    /// Empty, healthy store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that fails every call, as when the database is unreachable
    #[must_use]
    pub fn unavailable() -> Self {
        let store = Self::default();
        store.set_unavailable(true);
        store
    }

    /// Switches the store between reachable and unreachable
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Records saved so far
    pub async fn records(&self) -> Vec<ImageRecord> {
        self.records.lock().await.clone()
    }

    fn check_available(&self) -> ImageRecordStorageResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(ImageRecordStorageError::Unavailable(
                "in-memory store switched off".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ImageRecordStore for InMemoryImageRecordStore {
    async fn save(&self, url: &str) -> ImageRecordStorageResult<ImageRecord> {
        self.check_available()?;

        let record = ImageRecord::new(url);
        self.records.lock().await.push(record.clone());
        Ok(record)
    }

    async fn health_check(&self) -> ImageRecordStorageResult<()> {
        self.check_available()
    }
}
