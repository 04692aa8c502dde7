//! custdb Storage - Partition store for customer records
//!
//! This crate provides the physical layer:
//! - Segments (Arrow IPC / Feather v2 files, one per partition)
//! - Partition Store (`<data_dir>/<bucket>/<split>/<segment_file>` layout,
//!   offline bulk write, forgiving reads)

pub mod error;
pub mod partition;
pub mod segment;

pub use error::{Result, StorageError};
pub use partition::{group_by_partition, PartitionStore, WriteSummary, DEFAULT_SEGMENT_FILE};
pub use segment::{read_records, read_records_from_path, record_schema, write_records};
