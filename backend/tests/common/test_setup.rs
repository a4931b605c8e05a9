use std::path::PathBuf;
use std::sync::Arc;

use axum::{body::Body, http::Request, response::Response, Router};
use tempfile::TempDir;
use tower::ServiceExt;
use upload_relay::{
    server,
    staging::StagingArea,
    state::AppState,
    test_utils::{InMemoryImageRecordStore, StubMediaHost},
    types::{AppConfig, Environment, MediaHostConfig, S3MediaConfig},
};

use super::MultipartBody;

/// Base URL the stub media host serves uploads from
pub const MEDIA_BASE_URL: &str = "https://media.example.com/uploads";

/// Upload limit used unless a test asks for another one
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 15 * 1024 * 1024;

/// Setup test environment
pub fn setup_test_env() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .try_init()
        .ok();
}

/// Relay wired to in-memory collaborators and a temporary staging directory
pub struct TestSetup {
    pub router: Router,
    pub media_host: Arc<StubMediaHost>,
    pub record_store: Arc<InMemoryImageRecordStore>,
    pub staging_area: Arc<StagingArea>,
    // Keep the directory alive for the duration of the test
    _staging_dir: TempDir,
}

impl TestSetup {
    pub async fn new() -> Self {
        Self::with(
            StubMediaHost::succeeding(MEDIA_BASE_URL),
            InMemoryImageRecordStore::new(),
            DEFAULT_MAX_UPLOAD_BYTES,
        )
        .await
    }

    pub async fn with(
        media_host: StubMediaHost,
        record_store: InMemoryImageRecordStore,
        max_upload_bytes: usize,
    ) -> Self {
        setup_test_env();

        let staging_dir = tempfile::tempdir().unwrap();
        let staging_area = Arc::new(StagingArea::new(staging_dir.path()));
        staging_area.prepare().await.unwrap();

        let media_host = Arc::new(media_host);
        let record_store = Arc::new(record_store);

        let config = AppConfig {
            environment: Environment::Development,
            port: 0,
            staging_dir: staging_dir.path().to_path_buf(),
            max_upload_bytes,
            image_records_table: "image-records-test".to_string(),
            media_host: MediaHostConfig::S3(S3MediaConfig {
                bucket_name: "unused".to_string(),
                public_base_url: MEDIA_BASE_URL.to_string(),
            }),
        };

        let state = AppState {
            staging_area: staging_area.clone(),
            media_host: media_host.clone(),
            record_store: record_store.clone(),
        };

        Self {
            router: server::router(&config, state),
            media_host,
            record_store,
            staging_area,
            _staging_dir: staging_dir,
        }
    }

    pub async fn send_request(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn send_upload(&self, body: MultipartBody) -> Response {
        self.send_request(body.into_request("/upload")).await
    }

    pub async fn send_get_request(&self, route: &str) -> Response {
        let request = Request::builder()
            .uri(route)
            .method("GET")
            .body(Body::empty())
            .unwrap();

        self.send_request(request).await
    }

    /// Files currently sitting in the staging directory
    pub fn staged_files(&self) -> Vec<PathBuf> {
        std::fs::read_dir(self.staging_area.dir())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect()
    }
}

