//! Image record storage integration using Dynamo DB
//!
//! Every image that was successfully handed to the media host gets one record
//! holding its public URL. Records are append-only: nothing in the relay updates
//! or deletes them.

mod error;

use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_dynamodb::{
    error::SdkError,
    types::{AttributeValue, TableStatus},
    Client as DynamoDbClient,
};
use serde::{Deserialize, Serialize};
use strum::Display;
use uuid::Uuid;

pub use error::{ImageRecordStorageError, ImageRecordStorageResult};

/// Attribute names for the image records table
#[derive(Debug, Clone, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ImageRecordAttribute {
    /// Record id (Primary Key)
    Id,
    /// Public URL returned by the media host
    Url,
}

/// Persisted record of one hosted upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    /// Record id (Primary Key), a random UUID v4
    pub id: String,
    /// Public URL of the hosted image, stored verbatim
    pub url: String,
}

impl ImageRecord {
    /// Creates a record for `url` with a freshly generated id
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            url: url.into(),
        }
    }
}

/// Append-only store of image records
#[async_trait]
pub trait ImageRecordStore: Send + Sync {
    /// Persists a new record for `url` and returns it
    async fn save(&self, url: &str) -> ImageRecordStorageResult<ImageRecord>;

    /// Verifies that the store is reachable and ready to accept writes
    async fn health_check(&self) -> ImageRecordStorageResult<()>;
}

/// Image record storage client for Dynamo DB operations
pub struct ImageRecordStorage {
    dynamodb_client: Arc<DynamoDbClient>,
    table_name: String,
}

impl ImageRecordStorage {
    /// Creates a new image record storage client
    ///
    /// # Arguments
    ///
    /// * `dynamodb_client` - Pre-configured Dynamo DB client
    /// * `table_name` - Dynamo DB table name for image records
    #[must_use]
    pub const fn new(dynamodb_client: Arc<DynamoDbClient>, table_name: String) -> Self {
        Self {
            dynamodb_client,
            table_name,
        }
    }

    /// Name of the backing table
    #[must_use]
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Inserts a record, refusing to overwrite an existing id
    ///
    /// # Errors
    ///
    /// Returns `ImageRecordStorageError` if the Dynamo DB operation fails
    pub async fn insert(&self, record: &ImageRecord) -> ImageRecordStorageResult<()> {
        let item = serde_dynamo::to_item(record)
            .map_err(|e| ImageRecordStorageError::SerializationError(e.to_string()))?;

        self.dynamodb_client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .condition_expression("attribute_not_exists(#pk)")
            .expression_attribute_names("#pk", ImageRecordAttribute::Id.to_string())
            .send()
            .await
            .map_err(|err| {
                if matches!(
                    err,
                    SdkError::ServiceError(ref svc) if svc.err().is_conditional_check_failed_exception()
                ) {
                    ImageRecordStorageError::ImageRecordExists(record.id.clone())
                } else {
                    err.into()
                }
            })?;

        Ok(())
    }

    /// Gets an image record by id
    ///
    /// Only used to verify writes; the relay exposes no read path over HTTP.
    ///
    /// # Errors
    ///
    /// Returns `ImageRecordStorageError` if the Dynamo DB operation fails
    pub async fn get_by_id(&self, id: &str) -> ImageRecordStorageResult<Option<ImageRecord>> {
        let response = self
            .dynamodb_client
            .get_item()
            .table_name(&self.table_name)
            .key(
                ImageRecordAttribute::Id.to_string(),
                AttributeValue::S(id.to_string()),
            )
            .projection_expression("#pk, #url")
            .expression_attribute_names("#pk", ImageRecordAttribute::Id.to_string())
            .expression_attribute_names("#url", ImageRecordAttribute::Url.to_string())
            .consistent_read(true)
            .send()
            .await?;

        let item = response
            .item()
            .map(|item| serde_dynamo::from_item(item.clone()))
            .transpose()
            .map_err(|e| ImageRecordStorageError::SerializationError(e.to_string()))?;

        Ok(item)
    }
}

#[async_trait]
impl ImageRecordStore for ImageRecordStorage {
    async fn save(&self, url: &str) -> ImageRecordStorageResult<ImageRecord> {
        let record = ImageRecord::new(url);
        self.insert(&record).await?;

        tracing::debug!(id = %record.id, table = %self.table_name, "Image record saved");

        Ok(record)
    }

    async fn health_check(&self) -> ImageRecordStorageResult<()> {
        let response = self
            .dynamodb_client
            .describe_table()
            .table_name(&self.table_name)
            .send()
            .await?;

        match response.table().and_then(|table| table.table_status()) {
            Some(TableStatus::Active) => Ok(()),
            Some(status) => Err(ImageRecordStorageError::Unavailable(format!(
                "table {} is {}",
                self.table_name,
                status.as_str()
            ))),
            None => Err(ImageRecordStorageError::Unavailable(format!(
                "table {} reported no status",
                self.table_name
            ))),
        }
    }
}
