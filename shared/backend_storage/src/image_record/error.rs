//! Error types for image record storage operations

use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::{
    describe_table::DescribeTableError, get_item::GetItemError, put_item::PutItemError,
};
use thiserror::Error;

/// Result type for image record storage operations
pub type ImageRecordStorageResult<T> = Result<T, ImageRecordStorageError>;

/// Errors that can occur during image record storage operations
#[derive(Error, Debug)]
pub enum ImageRecordStorageError {
    /// Failed to insert image record into Dynamo DB
    #[error("Failed to insert image record into DynamoDB: {0}")]
    DynamoDbPutError(#[from] SdkError<PutItemError>),

    /// Failed to get image record from Dynamo DB
    #[error("Failed to get image record from DynamoDB: {0}")]
    DynamoDbGetError(#[from] SdkError<GetItemError>),

    /// Failed to describe the image records table
    #[error("Failed to describe image records table: {0}")]
    DynamoDbDescribeError(#[from] SdkError<DescribeTableError>),

    /// Image record with the generated id already exists
    #[error("Image record already exists: {0}")]
    ImageRecordExists(String),

    /// The store is reachable but not usable
    #[error("Image record store unavailable: {0}")]
    Unavailable(String),

    /// Serialization error for `serde_dynamo`
    #[error("Serialization error: {0}")]
    SerializationError(String),
}
