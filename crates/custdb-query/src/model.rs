//! Query model - Data structures for queries and results

use crate::error::{QueryError, Result};
use crate::planner::ResolutionPath;
use custdb_core::{Field, Predicate, Record};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Query definition: every predicate must hold (AND)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    /// Equality predicates, in the order they were supplied
    pub predicates: Vec<Predicate>,
    /// Names supplied at the boundary that are not part of the schema
    #[serde(default)]
    pub ignored_fields: Vec<String>,
}

impl Query {
    /// Create a new query builder
    pub fn builder() -> QueryBuilder {
        QueryBuilder::new()
    }

    /// Build a query from raw `(field name, value)` pairs.
    ///
    /// Unknown field names are ignored and pairs with blank values dropped,
    /// so callers can pass request parameters straight through.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        pairs
            .into_iter()
            .fold(QueryBuilder::new(), |builder, (name, value)| {
                builder.filter(name.as_ref(), value)
            })
            .build()
    }

    /// Get the predicates
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// The first primary key predicate, if any
    pub fn primary_key(&self) -> Option<&Predicate> {
        self.predicates.iter().find(|p| p.field.is_primary_key())
    }

    /// Check a record against every predicate
    pub fn matches(&self, record: &Record) -> bool {
        self.predicates.iter().all(|p| p.matches(record))
    }

    /// Validate the query
    pub fn validate(&self) -> Result<()> {
        if self.predicates.is_empty() {
            return Err(QueryError::InvalidQuery(
                "at least one predicate on a known field is required".to_string(),
            ));
        }
        Ok(())
    }
}

/// Query builder for fluent API
#[derive(Debug, Default)]
pub struct QueryBuilder {
    predicates: Vec<Predicate>,
    ignored_fields: Vec<String>,
}

impl QueryBuilder {
    /// Create a new query builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equality predicate on a schema field
    pub fn where_eq(mut self, field: Field, value: impl Into<String>) -> Self {
        self.predicates.push(Predicate::new(field, value));
        self
    }

    /// Add an equality predicate by field name.
    ///
    /// Unknown names are recorded as ignored; blank values are dropped.
    pub fn filter(mut self, name: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        if value.trim().is_empty() {
            return self;
        }

        match name.parse::<Field>() {
            Ok(field) => self.predicates.push(Predicate::new(field, value)),
            Err(_) => {
                debug!(field = name, "Ignoring predicate on unknown field");
                self.ignored_fields.push(name.to_string());
            }
        }
        self
    }

    /// Build the query
    pub fn build(self) -> Result<Query> {
        let query = Query {
            predicates: self.predicates,
            ignored_fields: self.ignored_fields,
        };

        query.validate()?;
        Ok(query)
    }
}

/// Query result
#[derive(Debug, Clone, Serialize)]
pub struct QueryResult {
    /// Matching records in partition load order, then row order
    pub records: Vec<Record>,
    /// How candidate partitions were chosen
    pub path: ResolutionPath,
    /// Partitions loaded from storage
    pub partitions_scanned: usize,
    /// Records loaded before the residual filter
    pub records_scanned: usize,
    /// Execution time in nanoseconds
    pub execution_time_ns: u64,
}

impl QueryResult {
    /// True when no record satisfied the query (the "not found" outcome)
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of matching records
    pub fn len(&self) -> usize {
        self.records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_keeps_order() {
        let query = Query::builder()
            .where_eq(Field::Name, "alice")
            .where_eq(Field::Gender, "f")
            .build()
            .unwrap();

        let fields: Vec<Field> = query.predicates().iter().map(|p| p.field).collect();
        assert_eq!(fields, vec![Field::Name, Field::Gender]);
        assert!(query.primary_key().is_none());
    }

    #[test]
    fn test_from_pairs() {
        let query = Query::from_pairs(vec![
            ("name", "Alice"),
            ("salary", "100"),
            ("gender", "   "),
            ("customer_id", "cka2501"),
        ])
        .unwrap();

        assert_eq!(
            query.predicates,
            vec![
                Predicate::new(Field::Name, "Alice"),
                Predicate::new(Field::CustomerId, "cka2501"),
            ]
        );
        assert_eq!(query.ignored_fields, vec!["salary".to_string()]);
        assert_eq!(query.primary_key().unwrap().value, "cka2501");
    }

    #[test]
    fn test_empty_query_is_rejected() {
        assert!(matches!(
            Query::builder().build(),
            Err(QueryError::InvalidQuery(_))
        ));
        // Only unknown fields or blank values leaves nothing to resolve
        assert!(matches!(
            Query::from_pairs(vec![("salary", "100"), ("name", " ")]),
            Err(QueryError::InvalidQuery(_))
        ));
    }

    #[test]
    fn test_query_matches_all_predicates() {
        let query = Query::builder()
            .where_eq(Field::Name, "ALICE")
            .where_eq(Field::Gender, " f ")
            .build()
            .unwrap();

        let alice = Record::new("cka2501")
            .with(Field::Name, "Alice")
            .with(Field::Gender, "F");
        let alice_m = Record::new("cka2503")
            .with(Field::Name, "Alice")
            .with(Field::Gender, "M");

        assert!(query.matches(&alice));
        assert!(!query.matches(&alice_m));
    }
}
