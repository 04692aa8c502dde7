//! Query error types

use custdb_core::CoreError;
use thiserror::Error;

/// Query errors
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Invalid primary key: {0}")]
    InvalidKey(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Index error: {0}")]
    Index(String),
}

/// Result type for query operations
pub type Result<T> = std::result::Result<T, QueryError>;

impl From<CoreError> for QueryError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::KeyTooShort { .. } => QueryError::InvalidKey(e.to_string()),
            CoreError::UnknownField(_) => QueryError::InvalidQuery(e.to_string()),
        }
    }
}

impl From<custdb_storage::StorageError> for QueryError {
    fn from(e: custdb_storage::StorageError) -> Self {
        QueryError::Storage(e.to_string())
    }
}

impl From<custdb_index::IndexError> for QueryError {
    fn from(e: custdb_index::IndexError) -> Self {
        QueryError::Index(e.to_string())
    }
}
