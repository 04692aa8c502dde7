//! Index Builder - offline pass over the full record set
//!
//! For every requested field, records are grouped by normalized value and
//! each group's partition addresses are unioned into the persisted entry.
//! Re-running on unchanged input rewrites nothing.

use crate::error::Result;
use crate::value::ValueIndex;
use custdb_core::{locate, normalize, Field, PartitionAddress, Record};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info};

/// Outcome of one builder run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildSummary {
    /// Fields that were indexed
    pub fields_indexed: Vec<Field>,
    /// Requested names that are not part of the schema
    pub fields_skipped: Vec<String>,
    /// Distinct normalized values seen across all indexed fields
    pub values_seen: usize,
    /// Entries created or extended on disk
    pub entries_written: usize,
}

/// Builds and extends [`ValueIndex`] entries
#[derive(Debug, Clone)]
pub struct IndexBuilder {
    index: ValueIndex,
}

impl IndexBuilder {
    /// Create a builder writing into `index`
    pub fn new(index: ValueIndex) -> Self {
        Self { index }
    }

    /// Get the target index
    pub fn index(&self) -> &ValueIndex {
        &self.index
    }

    /// Index `records` on the named fields.
    ///
    /// Names outside the schema are skipped without error.
    pub fn build<S: AsRef<str>>(&self, records: &[Record], fields: &[S]) -> Result<BuildSummary> {
        let mut known = Vec::new();
        let mut skipped = Vec::new();

        for name in fields {
            let name = name.as_ref();
            match name.parse::<Field>() {
                Ok(field) => {
                    if !known.contains(&field) {
                        known.push(field);
                    }
                }
                Err(_) => {
                    debug!(field = name, "Field not in schema, skipping");
                    skipped.push(name.to_string());
                }
            }
        }

        let mut summary = self.build_fields(records, &known)?;
        summary.fields_skipped = skipped;
        Ok(summary)
    }

    /// Index `records` on the given schema fields
    pub fn build_fields(&self, records: &[Record], fields: &[Field]) -> Result<BuildSummary> {
        let addresses: Vec<PartitionAddress> = records
            .iter()
            .map(|record| locate(&record.customer_id))
            .collect::<std::result::Result<_, _>>()?;

        let mut summary = BuildSummary::default();

        for &field in fields {
            let groups = group_by_value(records, &addresses, field);
            summary.values_seen += groups.len();

            for (value, value_addresses) in &groups {
                if self.index.extend_entry(field, value, value_addresses)? {
                    summary.entries_written += 1;
                }
            }

            debug!(%field, values = groups.len(), "Indexed field");
            summary.fields_indexed.push(field);
        }

        info!(
            "Indexed {} records on {} fields: {} values, {} entries written",
            records.len(),
            summary.fields_indexed.len(),
            summary.values_seen,
            summary.entries_written
        );

        Ok(summary)
    }
}

/// Group the addresses of `records` by normalized `field` value.
///
/// Absent and blank values are left out. Addresses within a group are
/// deduplicated and kept in first-seen order.
fn group_by_value(
    records: &[Record],
    addresses: &[PartitionAddress],
    field: Field,
) -> BTreeMap<String, Vec<PartitionAddress>> {
    let mut groups: BTreeMap<String, (Vec<PartitionAddress>, HashSet<PartitionAddress>)> =
        BTreeMap::new();

    for (record, address) in records.iter().zip(addresses) {
        let Some(raw) = record.get(field) else {
            continue;
        };
        let value = normalize(raw);
        if value.is_empty() {
            continue;
        }

        let (ordered, seen) = groups.entry(value).or_default();
        if seen.insert(address.clone()) {
            ordered.push(address.clone());
        }
    }

    groups
        .into_iter()
        .map(|(value, (ordered, _))| (value, ordered))
        .collect()
}
