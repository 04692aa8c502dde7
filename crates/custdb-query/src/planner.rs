//! Query planner with partition pruning
//!
//! Picks the candidate partitions for a query, in a fixed order of decision:
//! 1. a primary key predicate routes straight to one partition (fast path);
//! 2. otherwise every predicate is looked up in the value index and the
//!    partitions common to all entries found are the candidates;
//! 3. if no predicate has an entry, every partition is a candidate.
//!
//! Candidates only bound the I/O. Correctness comes from the residual filter
//! applied after loading, so stale or missing entries cannot change results.

use crate::error::Result;
use crate::model::Query;
use custdb_core::{locate, Field, PartitionAddress};
use custdb_index::{intersect_addresses, ValueIndex};
use custdb_storage::PartitionStore;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// How the candidate partitions were chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionPath {
    /// Primary key routed directly to its partition
    FastPath,
    /// Intersection of the value index entries found
    Indexed,
    /// No entry found, every partition scanned
    FullScan,
}

/// Outcome of one index lookup during planning
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexLookup {
    /// Field looked up
    pub field: Field,
    /// Normalized value looked up
    pub value: String,
    /// Entry size, `None` when there is no entry
    pub partitions: Option<usize>,
}

/// Query plan describing which partitions to load
#[derive(Debug, Clone)]
pub struct QueryPlan {
    /// Query being planned
    pub query: Query,
    /// Selected resolution path
    pub path: ResolutionPath,
    /// Partitions to load, in load order
    pub candidates: Vec<PartitionAddress>,
    /// Index lookups performed (empty on the fast path)
    pub lookups: Vec<IndexLookup>,
}

impl QueryPlan {
    /// Number of partitions the plan will load
    pub fn partition_count(&self) -> usize {
        self.candidates.len()
    }

    /// Format the query plan for EXPLAIN output
    pub fn explain(&self) -> ExplainOutput {
        ExplainOutput {
            path: self.path,
            predicates: self
                .query
                .predicates()
                .iter()
                .map(|p| format!("{} = {:?}", p.field, p.normalized_value()))
                .collect(),
            ignored_fields: self.query.ignored_fields.clone(),
            index_lookups: self.lookups.clone(),
            partitions_to_scan: self.candidates.len(),
            candidates: self.candidates.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Structured EXPLAIN output for JSON serialization
#[derive(Debug, Clone, Serialize)]
pub struct ExplainOutput {
    /// Selected resolution path
    pub path: ResolutionPath,
    /// Predicates in normalized form
    pub predicates: Vec<String>,
    /// Unknown fields that were dropped
    pub ignored_fields: Vec<String>,
    /// Index lookups performed
    pub index_lookups: Vec<IndexLookup>,
    /// Number of partitions to scan
    pub partitions_to_scan: usize,
    /// Candidate partitions as `bucket/split`
    pub candidates: Vec<String>,
}

/// Query planner selecting candidate partitions
#[derive(Debug, Clone)]
pub struct QueryPlanner {
    store: Arc<PartitionStore>,
    index: Arc<ValueIndex>,
}

impl QueryPlanner {
    /// Create a new query planner
    pub fn new(store: Arc<PartitionStore>, index: Arc<ValueIndex>) -> Self {
        Self { store, index }
    }

    /// Plan a query
    pub fn plan(&self, query: &Query) -> Result<QueryPlan> {
        query.validate()?;

        if let Some(key) = query.primary_key() {
            let address = locate(&key.value)?;
            debug!(partition = %address, "Primary key fast path");
            return Ok(QueryPlan {
                query: query.clone(),
                path: ResolutionPath::FastPath,
                candidates: vec![address],
                lookups: Vec::new(),
            });
        }

        let mut lookups = Vec::with_capacity(query.predicates().len());
        let mut entries = Vec::new();

        for predicate in query.predicates() {
            let entry = self.index.lookup(predicate.field, &predicate.value)?;
            lookups.push(IndexLookup {
                field: predicate.field,
                value: predicate.normalized_value(),
                partitions: entry.as_ref().map(Vec::len),
            });
            if let Some(addresses) = entry {
                entries.push(addresses);
            }
        }

        let plan = if entries.is_empty() {
            let candidates = self.store.enumerate_all_partitions()?;
            debug!(partitions = candidates.len(), "No index entry matched, full scan");
            QueryPlan {
                query: query.clone(),
                path: ResolutionPath::FullScan,
                candidates,
                lookups,
            }
        } else {
            let candidates = intersect_addresses(&entries);
            debug!(
                entries = entries.len(),
                partitions = candidates.len(),
                "Intersected index entries"
            );
            QueryPlan {
                query: query.clone(),
                path: ResolutionPath::Indexed,
                candidates,
                lookups,
            }
        };

        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QueryError;
    use custdb_core::Record;
    use custdb_index::IndexBuilder;
    use tempfile::TempDir;

    struct Fixture {
        planner: QueryPlanner,
        index: Arc<ValueIndex>,
        _dir: TempDir,
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(PartitionStore::new(dir.path().join("customer_buckets")));
        let index = Arc::new(ValueIndex::new(dir.path().join("indexes")));

        let records = vec![
            Record::new("cka2501").with(Field::Name, "Alice").with(Field::Gender, "F"),
            Record::new("cka2502").with(Field::Name, "Bob").with(Field::Gender, "M"),
            Record::new("xyz0001").with(Field::Name, "Carol").with(Field::Gender, "F"),
        ];
        store.write_partitions(&records).unwrap();
        IndexBuilder::new((*index).clone())
            .build(&records, &["name", "gender"])
            .unwrap();

        Fixture {
            planner: QueryPlanner::new(store, Arc::clone(&index)),
            index,
            _dir: dir,
        }
    }

    #[test]
    fn test_fast_path_skips_index() {
        let f = fixture();
        // Remove the index entirely: the fast path must not care
        f.index.clear().unwrap();

        let query = Query::builder()
            .where_eq(Field::Name, "alice")
            .where_eq(Field::CustomerId, " cka2501 ")
            .build()
            .unwrap();
        let plan = f.planner.plan(&query).unwrap();

        assert_eq!(plan.path, ResolutionPath::FastPath);
        assert_eq!(plan.candidates, vec![locate("cka").unwrap()]);
        assert!(plan.lookups.is_empty());
    }

    #[test]
    fn test_fast_path_rejects_short_key() {
        let f = fixture();
        let query = Query::builder().where_eq(Field::CustomerId, "ck").build().unwrap();

        assert!(matches!(f.planner.plan(&query), Err(QueryError::InvalidKey(_))));
    }

    #[test]
    fn test_indexed_path_intersects() {
        let f = fixture();

        let query = Query::builder()
            .where_eq(Field::Gender, "f")
            .build()
            .unwrap();
        let plan = f.planner.plan(&query).unwrap();
        assert_eq!(plan.path, ResolutionPath::Indexed);
        assert_eq!(plan.candidates, vec![locate("cka").unwrap(), locate("xyz").unwrap()]);

        let query = Query::builder()
            .where_eq(Field::Gender, "F")
            .where_eq(Field::Name, "carol")
            .build()
            .unwrap();
        let plan = f.planner.plan(&query).unwrap();
        assert_eq!(plan.path, ResolutionPath::Indexed);
        assert_eq!(plan.candidates, vec![locate("xyz").unwrap()]);
    }

    #[test]
    fn test_partial_index_hits_use_found_entries_only() {
        let f = fixture();

        let query = Query::builder()
            .where_eq(Field::Name, "bob")
            .where_eq(Field::Occupation, "pilot")
            .build()
            .unwrap();
        let plan = f.planner.plan(&query).unwrap();

        assert_eq!(plan.path, ResolutionPath::Indexed);
        assert_eq!(plan.candidates, vec![locate("cka").unwrap()]);
        assert_eq!(plan.lookups[0].partitions, Some(1));
        assert_eq!(plan.lookups[1].partitions, None);
    }

    #[test]
    fn test_empty_intersection_is_valid() {
        let f = fixture();

        let query = Query::builder()
            .where_eq(Field::Name, "carol")
            .where_eq(Field::Gender, "m")
            .build()
            .unwrap();
        let plan = f.planner.plan(&query).unwrap();

        assert_eq!(plan.path, ResolutionPath::Indexed);
        assert!(plan.candidates.is_empty());
    }

    #[test]
    fn test_full_scan_when_no_entry() {
        let f = fixture();

        let query = Query::builder()
            .where_eq(Field::Occupation, "astronaut")
            .build()
            .unwrap();
        let plan = f.planner.plan(&query).unwrap();

        assert_eq!(plan.path, ResolutionPath::FullScan);
        assert_eq!(plan.partition_count(), 2);
    }

    #[test]
    fn test_explain_output() {
        let f = fixture();

        let query = Query::from_pairs(vec![("name", " Alice "), ("salary", "9")]).unwrap();
        let explain = f.planner.plan(&query).unwrap().explain();

        assert_eq!(explain.path, ResolutionPath::Indexed);
        assert_eq!(explain.predicates, vec!["name = \"alice\"".to_string()]);
        assert_eq!(explain.ignored_fields, vec!["salary".to_string()]);
        assert_eq!(explain.partitions_to_scan, 1);
        assert_eq!(explain.candidates, vec!["4/497".to_string()]);

        let json = serde_json::to_value(&explain).unwrap();
        assert_eq!(json["path"], "indexed");
        assert_eq!(json["index_lookups"][0]["field"], "name");
    }
}
