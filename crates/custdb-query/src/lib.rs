//! custdb Query - Query resolution over the partitioned store
//!
//! This crate provides:
//! - Query model: an ordered list of field-equality predicates
//! - Query planning: fast path by primary key, index intersection, or full scan
//! - Resolution: parallel partition loading and the residual exact-match filter

pub mod error;
pub mod executor;
pub mod model;
pub mod planner;

pub use error::{QueryError, Result};
pub use executor::QueryResolver;
pub use model::{Query, QueryBuilder, QueryResult};
pub use planner::{ExplainOutput, IndexLookup, QueryPlan, QueryPlanner, ResolutionPath};
