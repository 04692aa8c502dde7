//! Error types for custdb-core

use thiserror::Error;

/// Core error types
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Primary key {key:?} is too short: at least {min} characters required")]
    KeyTooShort { key: String, min: usize },

    #[error("Unknown field: {0}")]
    UnknownField(String),
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
