//! Value Index - Inverted index for field-equality lookups
//!
//! One entry per `(field, normalized value)`, persisted as a JSON array of
//! partition addresses at `<index_dir>/<field>/<file_key(value)>.json`.
//! Entries are a superset of the partitions holding the value: they only ever
//! grow, so a stale entry can point at partitions that no longer match.

use crate::error::{IndexError, Result};
use custdb_core::{murmur3_32, normalize, Field, PartitionAddress};
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Default index directory name
pub const DEFAULT_INDEX_DIR: &str = "indexes";

const ENTRY_EXTENSION: &str = "json";

/// Longest file name stem, in bytes, before it is shortened
pub const MAX_FILE_KEY_BYTES: usize = 128;

/// Bytes of the readable prefix kept in a shortened stem
const FILE_KEY_PREFIX_BYTES: usize = MAX_FILE_KEY_BYTES - 9;

/// File name stem for a value: normalized, with every character other than
/// alphanumerics, `_` and `-` replaced by `_`.
///
/// Stems longer than [`MAX_FILE_KEY_BYTES`] are cut to a prefix followed by
/// `_` and the hex MurmurHash3 of the whole normalized value, so every value
/// maps to a name the filesystem accepts.
///
/// Distinct values may share a stem ("new york" and "new_york"); they then
/// share one entry, which keeps the superset guarantee.
pub fn file_key(value: &str) -> String {
    let normalized = normalize(value);
    let key: String = normalized
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if key.len() <= MAX_FILE_KEY_BYTES {
        return key;
    }

    let mut end = FILE_KEY_PREFIX_BYTES;
    while !key.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}_{:08x}", &key[..end], murmur3_32(normalized.as_bytes(), 0))
}

/// Deduplicated union of two address lists.
///
/// Existing addresses keep their order and come first; new ones are appended
/// in their own order.
pub fn merge_addresses(
    existing: &[PartitionAddress],
    new: &[PartitionAddress],
) -> Vec<PartitionAddress> {
    let mut seen: HashSet<&PartitionAddress> = HashSet::with_capacity(existing.len() + new.len());
    let mut merged = Vec::with_capacity(existing.len() + new.len());

    for address in existing.iter().chain(new) {
        if seen.insert(address) {
            merged.push(address.clone());
        }
    }

    merged
}

/// Addresses present in every list (AND), in the order of the first list.
///
/// An empty input yields an empty result.
pub fn intersect_addresses(sets: &[Vec<PartitionAddress>]) -> Vec<PartitionAddress> {
    let Some((first, rest)) = sets.split_first() else {
        return Vec::new();
    };

    let others: Vec<HashSet<&PartitionAddress>> =
        rest.iter().map(|set| set.iter().collect()).collect();

    let mut seen = HashSet::new();
    first
        .iter()
        .filter(|address| others.iter().all(|other| other.contains(address)))
        .filter(|address| seen.insert(*address))
        .cloned()
        .collect()
}

/// File-backed value index
#[derive(Debug, Clone)]
pub struct ValueIndex {
    dir: PathBuf,
}

impl ValueIndex {
    /// Create an index rooted at `dir`. Nothing is created on disk.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Get the index directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Directory holding the entries of one field
    pub fn field_dir(&self, field: Field) -> PathBuf {
        self.dir.join(field.as_str())
    }

    /// Path of the entry for a raw (not yet normalized) value
    pub fn entry_path(&self, field: Field, value: &str) -> PathBuf {
        self.field_dir(field)
            .join(format!("{}.{}", file_key(value), ENTRY_EXTENSION))
    }

    /// Find the partitions that may contain `field == value`.
    ///
    /// Returns `None` when there is no entry for the value.
    pub fn lookup(&self, field: Field, value: &str) -> Result<Option<Vec<PartitionAddress>>> {
        let path = self.entry_path(field, value);
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let addresses: Vec<PartitionAddress> = serde_json::from_slice(&bytes).map_err(|e| {
            IndexError::InvalidData(format!("{}: {}", path.display(), e))
        })?;
        Ok(Some(addresses))
    }

    /// Replace the entry for a value
    pub fn write_entry(&self, field: Field, value: &str, addresses: &[PartitionAddress]) -> Result<()> {
        let path = self.entry_path(field, value);
        std::fs::create_dir_all(self.field_dir(field))?;

        let json = serde_json::to_vec_pretty(addresses)?;
        let tmp_path = path.with_extension(format!("{}.tmp", ENTRY_EXTENSION));
        std::fs::write(&tmp_path, json)?;
        std::fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    /// Union `addresses` into the entry for a value.
    ///
    /// The entry is rewritten only when it grew; returns whether it was.
    pub fn extend_entry(
        &self,
        field: Field,
        value: &str,
        addresses: &[PartitionAddress],
    ) -> Result<bool> {
        let existing = self.lookup(field, value)?.unwrap_or_default();
        let merged = merge_addresses(&existing, addresses);
        // Union only grows, so equal length means nothing new
        if merged.len() == existing.len() {
            return Ok(false);
        }
        self.write_entry(field, value, &merged)?;
        Ok(true)
    }

    /// Number of entries stored for a field
    pub fn entry_count(&self, field: Field) -> Result<usize> {
        let entries = match std::fs::read_dir(self.field_dir(field)) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let mut count = 0;
        for entry in entries {
            let path = entry?.path();
            if path.extension().map_or(false, |e| e == ENTRY_EXTENSION) {
                count += 1;
            }
        }
        Ok(count)
    }

    /// Remove every entry
    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_dir_all(&self.dir) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
