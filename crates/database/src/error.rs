use core_types::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Failed to connect to the database: {0}")]
    Connection(#[source] mongodb::error::Error),

    #[error("Database query failed: {0}")]
    Query(#[from] mongodb::error::Error),

    #[error("Failed to encode document: {0}")]
    Serialization(#[from] mongodb::bson::ser::Error),

    #[error("Failed to decode document: {0}")]
    Deserialization(#[from] mongodb::bson::de::Error),

    #[error("Document failed validation: {0}")]
    Validation(#[from] CoreError),

    #[error("Referenced document does not exist: {0}")]
    InvalidReference(String),

    #[error("Database is unavailable: {0}")]
    Unavailable(String),
}
