//! Partition - hash-based data organization
//!
//! Records are grouped by the partition address of their primary key and
//! stored one segment per address at `<data_dir>/<bucket>/<split>/<segment_file>`.

use crate::error::{Result, StorageError};
use crate::segment;
use custdb_core::{locate, PartitionAddress, Record};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// File name of a segment inside its split directory
pub const DEFAULT_SEGMENT_FILE: &str = "data.feather";

/// Outcome of an offline partition write
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteSummary {
    /// Number of segments written
    pub partitions_written: usize,
    /// Number of records written across all segments
    pub records_written: usize,
}

/// Group records by partition address, keeping source row order within each group
pub fn group_by_partition(records: &[Record]) -> Result<BTreeMap<PartitionAddress, Vec<Record>>> {
    let mut groups: BTreeMap<PartitionAddress, Vec<Record>> = BTreeMap::new();
    for record in records {
        let address = locate(&record.customer_id)?;
        groups.entry(address).or_default().push(record.clone());
    }
    Ok(groups)
}

/// Read and bulk-write access to the partitioned record store.
///
/// Holds no mutable state; every call goes to the filesystem, so a store can
/// be shared between threads freely.
#[derive(Debug, Clone)]
pub struct PartitionStore {
    /// Base data directory
    data_dir: PathBuf,
    /// Segment file name inside each split directory
    segment_file: String,
}

impl PartitionStore {
    /// Create a store rooted at `data_dir`. Nothing is created on disk.
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            segment_file: DEFAULT_SEGMENT_FILE.to_string(),
        }
    }

    /// Use a different segment file name
    pub fn with_segment_file(mut self, segment_file: impl Into<String>) -> Self {
        self.segment_file = segment_file.into();
        self
    }

    /// Get the data directory
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Directory holding the segment of a partition
    pub fn partition_dir(&self, address: &PartitionAddress) -> PathBuf {
        self.data_dir
            .join(address.bucket.to_string())
            .join(&address.split)
    }

    /// Full path of the segment of a partition
    pub fn segment_path(&self, address: &PartitionAddress) -> PathBuf {
        self.partition_dir(address).join(&self.segment_file)
    }

    /// Load every record of a partition.
    ///
    /// A partition with no segment on disk is empty, not an error.
    pub fn load(&self, address: &PartitionAddress) -> Result<Vec<Record>> {
        let path = self.segment_path(address);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(partition = %address, "No segment on disk, treating partition as empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let records = segment::read_records(BufReader::new(file))?;
        debug!(partition = %address, records = records.len(), "Loaded partition");
        Ok(records)
    }

    /// List every partition directory present, sorted by address.
    ///
    /// A missing data directory means an empty store. Directories whose names
    /// cannot form an address are skipped.
    pub fn enumerate_all_partitions(&self) -> Result<Vec<PartitionAddress>> {
        let mut addresses = Vec::new();

        let buckets = match std::fs::read_dir(&self.data_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(addresses),
            Err(e) => return Err(e.into()),
        };

        for bucket_entry in buckets {
            let bucket_entry = bucket_entry?;
            if !bucket_entry.file_type()?.is_dir() {
                continue;
            }
            let bucket_name = bucket_entry.file_name().to_string_lossy().into_owned();

            for split_entry in std::fs::read_dir(bucket_entry.path())? {
                let split_entry = split_entry?;
                if !split_entry.file_type()?.is_dir() {
                    continue;
                }
                let split_name = split_entry.file_name().to_string_lossy().into_owned();

                match PartitionAddress::from_dir_names(&bucket_name, &split_name) {
                    Some(address) => addresses.push(address),
                    None => warn!(
                        "Skipping {}: not a partition directory",
                        split_entry.path().display()
                    ),
                }
            }
        }

        addresses.sort();
        Ok(addresses)
    }

    /// Get partition count
    pub fn partition_count(&self) -> Result<usize> {
        Ok(self.enumerate_all_partitions()?.len())
    }

    /// Offline bulk write: group records by address and write one segment per
    /// non-empty group, replacing existing segments of the same address.
    ///
    /// Segments of addresses absent from `records` are left untouched.
    pub fn write_partitions(&self, records: &[Record]) -> Result<WriteSummary> {
        let groups = group_by_partition(records)?;
        let mut summary = WriteSummary::default();

        for (address, group) in &groups {
            let dir = self.partition_dir(address);
            std::fs::create_dir_all(&dir)?;
            segment::write_records(self.segment_path(address), group)?;

            summary.partitions_written += 1;
            summary.records_written += group.len();
            debug!(partition = %address, records = group.len(), "Wrote segment");
        }

        info!(
            "Wrote {} records into {} partitions under {}",
            summary.records_written,
            summary.partitions_written,
            self.data_dir.display()
        );

        Ok(summary)
    }

    /// Delete the whole store
    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_dir_all(&self.data_dir) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(e)),
        }
    }
}
