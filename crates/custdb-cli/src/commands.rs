//! Command implementations behind the `custdb` binary

use crate::config::CustdbConfig;
use anyhow::{bail, Context, Result};
use custdb_core::Record;
use custdb_index::{BuildSummary, IndexBuilder};
use custdb_query::{ExplainOutput, Query, QueryResolver};
use custdb_storage::{read_records_from_path, WriteSummary};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Message reported when a query resolves to no record
pub const NOT_FOUND_MESSAGE: &str = "No customer found with given filters";

/// Parse a `field=value` filter argument
pub fn parse_filter(arg: &str) -> Result<(String, String)> {
    match arg.split_once('=') {
        Some((field, value)) if !field.trim().is_empty() => {
            Ok((field.trim().to_string(), value.to_string()))
        }
        _ => bail!("Invalid filter '{}': expected field=value", arg),
    }
}

fn read_source(source: &Path) -> Result<Vec<Record>> {
    if !source.exists() {
        bail!("File not found: {}", source.display());
    }

    info!("Reading source file: {}", source.display());
    let records = read_records_from_path(source)
        .with_context(|| format!("Failed to read {}", source.display()))?;
    info!("Read {} records", records.len());
    Ok(records)
}

/// Split a full-data file into the partition store
pub fn partition(config: &CustdbConfig, source: &Path) -> Result<WriteSummary> {
    let start = Instant::now();
    let records = read_source(source)?;

    let store = config.to_partition_store();
    let summary = store
        .write_partitions(&records)
        .context("Failed to write partitions")?;

    info!(
        "Partitioned {} records in {:.2}s, {} partitions now under {}",
        summary.records_written,
        start.elapsed().as_secs_f64(),
        store.partition_count()?,
        store.data_dir().display()
    );
    Ok(summary)
}

/// Build or extend the value index from a full-data file.
///
/// Uses the configured field list when `fields` is empty.
pub fn index(config: &CustdbConfig, source: &Path, fields: &[String]) -> Result<BuildSummary> {
    let start = Instant::now();
    let records = read_source(source)?;

    let fields = if fields.is_empty() {
        config.index.fields.as_slice()
    } else {
        fields
    };

    let builder = IndexBuilder::new(config.to_value_index());
    let summary = builder
        .build(&records, fields)
        .context("Failed to build index")?;

    let index = builder.index();
    for &field in &summary.fields_indexed {
        debug!(%field, entries = index.entry_count(field)?, "Index entries on disk");
    }
    info!(
        "Index built under {} in {:.2}s",
        index.dir().display(),
        start.elapsed().as_secs_f64()
    );
    Ok(summary)
}

fn resolver(config: &CustdbConfig) -> QueryResolver {
    QueryResolver::with_parallel_config(
        Arc::new(config.to_partition_store()),
        Arc::new(config.to_value_index()),
        config.to_parallel_config(),
    )
}

/// Resolve filters to the matching records.
///
/// An empty result is reported as an error carrying [`NOT_FOUND_MESSAGE`].
pub fn query(config: &CustdbConfig, filters: &[(String, String)]) -> Result<Vec<Record>> {
    let query = Query::from_pairs(filters.iter().map(|(k, v)| (k.as_str(), v.as_str())))?;
    let result = resolver(config).resolve(&query)?;

    info!(
        "Scanned {} records in {} partitions ({:?}), {} matched",
        result.records_scanned,
        result.partitions_scanned,
        result.path,
        result.len()
    );

    if result.is_empty() {
        bail!(NOT_FOUND_MESSAGE);
    }
    Ok(result.records)
}

/// Plan filters without loading any partition
pub fn explain(config: &CustdbConfig, filters: &[(String, String)]) -> Result<ExplainOutput> {
    let query = Query::from_pairs(filters.iter().map(|(k, v)| (k.as_str(), v.as_str())))?;
    let plan = resolver(config).plan(&query)?;
    Ok(plan.explain())
}
