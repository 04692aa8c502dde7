//! Storage error types

use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Arrow error: {0}")]
    Arrow(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Core error: {0}")]
    Core(#[from] custdb_core::CoreError),
}

/// Result type for storage operations
pub type Result<T> = std::result::Result<T, StorageError>;

impl From<arrow::error::ArrowError> for StorageError {
    fn from(e: arrow::error::ArrowError) -> Self {
        StorageError::Arrow(e.to_string())
    }
}
