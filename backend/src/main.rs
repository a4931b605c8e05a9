use std::sync::Arc;

use aws_sdk_dynamodb::Client as DynamoDbClient;
use backend_storage::image_record::{ImageRecordStorage, ImageRecordStore};
use tracing_subscriber::{fmt, EnvFilter};
use upload_relay::{
    media_host,
    server,
    staging::StagingArea,
    state::AppState,
    types::{AppConfig, Environment},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env();

    // JSON logs for staging/production, human-readable logs for development
    if environment.json_logs() {
        fmt()
            .json()
            .with_env_filter(EnvFilter::from_default_env())
            .init();
    } else {
        fmt().with_env_filter(EnvFilter::from_default_env()).init();
    }

    let config = AppConfig::from_env(environment)?;

    let staging_area = Arc::new(StagingArea::new(config.staging_dir.clone()));
    staging_area.prepare().await?;

    let media_host = media_host::from_config(&config).await?;

    let dynamodb_client = Arc::new(DynamoDbClient::new(&environment.aws_config().await));
    let record_store = Arc::new(ImageRecordStorage::new(
        dynamodb_client,
        config.image_records_table.clone(),
    ));

    // Refuse to start without a reachable record store
    if let Err(e) = record_store.health_check().await {
        tracing::error!(
            table = %record_store.table_name(),
            "Record store unavailable, refusing to start: {e}"
        );
        return Err(e.into());
    }
    tracing::info!(table = %record_store.table_name(), "Record store connected");

    let state = AppState {
        staging_area,
        media_host,
        record_store,
    };

    server::start(config, state).await
}
