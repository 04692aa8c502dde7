//! Index error types

use thiserror::Error;

/// Index errors
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Core error: {0}")]
    Core(#[from] custdb_core::CoreError),
}

/// Result type for index operations
pub type Result<T> = std::result::Result<T, IndexError>;

impl From<serde_json::Error> for IndexError {
    fn from(e: serde_json::Error) -> Self {
        IndexError::Serialization(e.to_string())
    }
}
