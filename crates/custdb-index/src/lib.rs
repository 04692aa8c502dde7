//! custdb Index - Secondary value indexes
//!
//! This crate provides:
//! - Value Index: `(field, normalized value)` -> partition addresses, one JSON file per entry
//! - Index Builder: offline pass that extends entries from a full record set

pub mod builder;
pub mod error;
pub mod value;

pub use builder::{BuildSummary, IndexBuilder};
pub use error::{IndexError, Result};
pub use value::{
    file_key, intersect_addresses, merge_addresses, ValueIndex, DEFAULT_INDEX_DIR,
    MAX_FILE_KEY_BYTES,
};
