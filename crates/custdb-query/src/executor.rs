//! Query resolver
//!
//! Loads the candidate partitions of a plan, using rayon when there are
//! enough of them, and keeps the records that satisfy every predicate.

use crate::error::Result;
use crate::model::{Query, QueryResult};
use crate::planner::{QueryPlan, QueryPlanner};
use custdb_core::{ParallelConfig, PartitionAddress, Record};
use custdb_index::ValueIndex;
use custdb_storage::PartitionStore;
use rayon::prelude::*;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Resolves queries against the partition store and value index
#[derive(Debug, Clone)]
pub struct QueryResolver {
    /// Partition store
    store: Arc<PartitionStore>,
    /// Query planner
    planner: QueryPlanner,
    /// Parallel loading configuration
    parallel: ParallelConfig,
}

impl QueryResolver {
    /// Create a new query resolver
    pub fn new(store: Arc<PartitionStore>, index: Arc<ValueIndex>) -> Self {
        Self {
            planner: QueryPlanner::new(Arc::clone(&store), index),
            store,
            parallel: ParallelConfig::default(),
        }
    }

    /// Create a new query resolver with a parallel loading configuration
    pub fn with_parallel_config(
        store: Arc<PartitionStore>,
        index: Arc<ValueIndex>,
        parallel: ParallelConfig,
    ) -> Self {
        Self {
            parallel,
            ..Self::new(store, index)
        }
    }

    /// Plan a query without loading any partition
    pub fn plan(&self, query: &Query) -> Result<QueryPlan> {
        self.planner.plan(query)
    }

    /// Resolve a query.
    ///
    /// An empty result is the "not found" outcome, not an error.
    pub fn resolve(&self, query: &Query) -> Result<QueryResult> {
        let plan = self.plan(query)?;
        self.execute(&plan)
    }

    /// Execute a plan: load candidates and apply the residual filter
    pub fn execute(&self, plan: &QueryPlan) -> Result<QueryResult> {
        let start = Instant::now();

        let loaded = self.load_partitions(&plan.candidates)?;
        let records_scanned: usize = loaded.iter().map(Vec::len).sum();

        let records: Vec<Record> = loaded
            .into_iter()
            .flatten()
            .filter(|record| plan.query.matches(record))
            .collect();

        debug!(
            path = ?plan.path,
            partitions = plan.partition_count(),
            scanned = records_scanned,
            matched = records.len(),
            "Resolved query"
        );

        Ok(QueryResult {
            records,
            path: plan.path,
            partitions_scanned: plan.partition_count(),
            records_scanned,
            execution_time_ns: start.elapsed().as_nanos() as u64,
        })
    }

    /// Load partitions, keeping the candidate order in the output
    fn load_partitions(&self, candidates: &[PartitionAddress]) -> Result<Vec<Vec<Record>>> {
        if self.parallel.should_parallelize_partitions(candidates.len()) {
            candidates
                .par_iter()
                .map(|address| self.store.load(address).map_err(Into::into))
                .collect()
        } else {
            candidates
                .iter()
                .map(|address| self.store.load(address).map_err(Into::into))
                .collect()
        }
    }
}
