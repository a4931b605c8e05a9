//! Image record storage tests against LocalStack
//!
//! Run with `cargo test -p backend_storage -- --ignored` while LocalStack is
//! listening on port 4566.

use std::sync::Arc;
use std::time::Duration;

use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_dynamodb::types::{
    AttributeDefinition, AttributeValue, BillingMode, KeySchemaElement, KeyType, ScalarAttributeType,
};
use aws_sdk_dynamodb::Client as DynamoDbClient;
use backend_storage::image_record::{
    ImageRecord, ImageRecordAttribute, ImageRecordStorage, ImageRecordStorageError,
    ImageRecordStore,
};
use pretty_assertions::assert_eq;
use uuid::Uuid;

/// Test configuration for LocalStack
const LOCALSTACK_ENDPOINT: &str = "http://localhost:4566";
const TEST_REGION: &str = "us-east-1";

/// Test context that automatically cleans up the table on drop
struct TestContext {
    storage: ImageRecordStorage,
    table_name: String,
    dynamodb_client: Arc<DynamoDbClient>,
}

impl Drop for TestContext {
    fn drop(&mut self) {
        let client = self.dynamodb_client.clone();
        let table = self.table_name.clone();

        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                let _ = client.delete_table().table_name(&table).send().await;
            });
        }
    }
}

async fn dynamodb_client() -> Arc<DynamoDbClient> {
    let credentials = Credentials::from_keys("test", "test", None);
    let config = aws_config::defaults(BehaviorVersion::latest())
        .endpoint_url(LOCALSTACK_ENDPOINT)
        .region(Region::new(TEST_REGION))
        .credentials_provider(credentials)
        .load()
        .await;

    Arc::new(DynamoDbClient::new(&config))
}

/// Creates a test setup with a unique table
async fn setup_test() -> TestContext {
    let table_name = format!("test-image-records-{}", Uuid::new_v4());
    let dynamodb_client = dynamodb_client().await;

    dynamodb_client
        .create_table()
        .table_name(&table_name)
        .attribute_definitions(
            AttributeDefinition::builder()
                .attribute_name(ImageRecordAttribute::Id.to_string())
                .attribute_type(ScalarAttributeType::S)
                .build()
                .unwrap(),
        )
        .key_schema(
            KeySchemaElement::builder()
                .attribute_name(ImageRecordAttribute::Id.to_string())
                .key_type(KeyType::Hash)
                .build()
                .unwrap(),
        )
        .billing_mode(BillingMode::PayPerRequest)
        .send()
        .await
        .expect("Failed to create test table");

    tokio::time::sleep(Duration::from_millis(100)).await;

    let storage = ImageRecordStorage::new(dynamodb_client.clone(), table_name.clone());

    TestContext {
        storage,
        table_name,
        dynamodb_client,
    }
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_save_then_get_returns_same_url() {
    let context = setup_test().await;
    let url = "https://res.cloudinary.com/demo/image/upload/v1700000000/photo.jpg";

    let saved = context.storage.save(url).await.expect("Failed to save");
    assert_eq!(saved.url, url);

    let retrieved = context
        .storage
        .get_by_id(&saved.id)
        .await
        .expect("Failed to get by id")
        .expect("Record should exist");

    assert_eq!(retrieved, saved);
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_duplicate_urls_are_permitted() {
    let context = setup_test().await;
    let url = "https://example.com/same.jpg";

    let first = context.storage.save(url).await.expect("First save failed");
    let second = context.storage.save(url).await.expect("Second save failed");

    assert_ne!(first.id, second.id);
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_insert_refuses_existing_id() {
    let context = setup_test().await;
    let record = ImageRecord::new("https://example.com/a.jpg");

    context
        .storage
        .insert(&record)
        .await
        .expect("First insert should succeed");

    let result = context.storage.insert(&record).await;
    assert!(matches!(
        result,
        Err(ImageRecordStorageError::ImageRecordExists(ref id)) if *id == record.id
    ));
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_get_missing_id_returns_none() {
    let context = setup_test().await;

    let missing = context
        .storage
        .get_by_id("non-existent-id")
        .await
        .expect("Failed to query");

    assert!(missing.is_none());
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_health_check() {
    let context = setup_test().await;
    context
        .storage
        .health_check()
        .await
        .expect("Active table should be healthy");

    let missing = ImageRecordStorage::new(
        context.dynamodb_client.clone(),
        format!("missing-table-{}", Uuid::new_v4()),
    );
    assert!(matches!(
        missing.health_check().await,
        Err(ImageRecordStorageError::DynamoDbDescribeError(_))
    ));
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_saved_item_stores_url_attribute() {
    let context = setup_test().await;
    let url = "https://example.com/stored.jpg";

    let saved = context.storage.save(url).await.expect("Failed to save");

    let item = context
        .dynamodb_client
        .get_item()
        .table_name(&context.table_name)
        .key(
            ImageRecordAttribute::Id.to_string(),
            AttributeValue::S(saved.id.clone()),
        )
        .consistent_read(true)
        .send()
        .await
        .expect("Failed to read item")
        .item
        .expect("Item should exist");

    assert_eq!(
        item.get(&ImageRecordAttribute::Url.to_string()),
        Some(&AttributeValue::S(url.to_string()))
    );
}
