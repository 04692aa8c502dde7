//! custdb Core - Core types for the partitioned customer store
//!
//! This crate provides the fundamental pieces shared by every other crate:
//! - `Record`: one customer row (`customer_id` plus optional attributes)
//! - `Field`: the fixed customer schema
//! - `Predicate`: single-field equality under trimmed, case-insensitive comparison
//! - `PartitionAddress`: `(bucket, split)` location of a partition
//! - `locate`: the partitioner, primary key -> partition address
//! - `ParallelConfig`: knobs for parallel partition loading

pub mod error;
pub mod parallel;
pub mod partitioner;
pub mod types;

pub use error::{CoreError, Result};
pub use parallel::ParallelConfig;
pub use partitioner::{locate, murmur3_32, PREFIX_LEN};
pub use types::*;
