//! Core data types for the custdb customer store

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Normalize a value for index keys and equality checks.
///
/// Comparison across the whole system is case-insensitive and ignores
/// leading/trailing whitespace, so every side of a comparison goes through here.
pub fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Check two raw values for equality under [`normalize`]
pub fn values_match(left: &str, right: &str) -> bool {
    normalize(left) == normalize(right)
}

/// A column of the customer schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// Primary key
    CustomerId,
    Name,
    Surname,
    Age,
    Gender,
    Dob,
    Occupation,
    Experience,
}

impl Field {
    /// Every column, in on-disk column order
    pub const ALL: [Field; 8] = [
        Field::CustomerId,
        Field::Name,
        Field::Surname,
        Field::Age,
        Field::Gender,
        Field::Dob,
        Field::Occupation,
        Field::Experience,
    ];

    /// Columns the index builder covers by default (everything except the primary key)
    pub const INDEXABLE: [Field; 7] = [
        Field::Name,
        Field::Surname,
        Field::Age,
        Field::Gender,
        Field::Occupation,
        Field::Dob,
        Field::Experience,
    ];

    /// Column name as used on disk and at the query boundary
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::CustomerId => "customer_id",
            Field::Name => "name",
            Field::Surname => "surname",
            Field::Age => "age",
            Field::Gender => "gender",
            Field::Dob => "dob",
            Field::Occupation => "occupation",
            Field::Experience => "experience",
        }
    }

    /// True for the primary key column
    pub fn is_primary_key(&self) -> bool {
        matches!(self, Field::CustomerId)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Field::ALL
            .iter()
            .copied()
            .find(|field| field.as_str() == s.trim())
            .ok_or_else(|| CoreError::UnknownField(s.to_string()))
    }
}

/// One customer entity
///
/// `customer_id` is required and immutable; every other attribute may be
/// absent (a null cell in the source data).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Record {
    pub customer_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub surname: Option<String>,
    #[serde(default)]
    pub age: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub dob: Option<String>,
    #[serde(default)]
    pub occupation: Option<String>,
    #[serde(default)]
    pub experience: Option<String>,
}

impl Record {
    /// Create a record with only its primary key set
    pub fn new(customer_id: impl Into<String>) -> Self {
        Self {
            customer_id: customer_id.into(),
            ..Default::default()
        }
    }

    /// Builder-style attribute setter
    pub fn with(mut self, field: Field, value: impl Into<String>) -> Self {
        self.set(field, Some(value.into()));
        self
    }

    /// Get the raw value of a column
    pub fn get(&self, field: Field) -> Option<&str> {
        match field {
            Field::CustomerId => Some(self.customer_id.as_str()),
            Field::Name => self.name.as_deref(),
            Field::Surname => self.surname.as_deref(),
            Field::Age => self.age.as_deref(),
            Field::Gender => self.gender.as_deref(),
            Field::Dob => self.dob.as_deref(),
            Field::Occupation => self.occupation.as_deref(),
            Field::Experience => self.experience.as_deref(),
        }
    }

    /// Set the value of a column. Setting the primary key to `None` clears it
    /// to an empty string.
    pub fn set(&mut self, field: Field, value: Option<String>) {
        match field {
            Field::CustomerId => self.customer_id = value.unwrap_or_default(),
            Field::Name => self.name = value,
            Field::Surname => self.surname = value,
            Field::Age => self.age = value,
            Field::Gender => self.gender = value,
            Field::Dob => self.dob = value,
            Field::Occupation => self.occupation = value,
            Field::Experience => self.experience = value,
        }
    }
}

/// Equality predicate on one column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Predicate {
    pub field: Field,
    pub value: String,
}

impl Predicate {
    /// Create a new predicate
    pub fn new(field: Field, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }

    /// Normalized form of the value, as used for index lookups
    pub fn normalized_value(&self) -> String {
        normalize(&self.value)
    }

    /// Check the record under case-insensitive, trimmed equality.
    /// An absent attribute never matches.
    pub fn matches(&self, record: &Record) -> bool {
        record
            .get(self.field)
            .map_or(false, |actual| values_match(actual, &self.value))
    }
}

/// Physical location of a partition: `(bucket, split)`
///
/// `split` always begins with `bucket`; both come from the same hash digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PartitionAddress {
    pub bucket: char,
    pub split: String,
}

impl PartitionAddress {
    /// Create an address without validating it
    pub fn new(bucket: char, split: impl Into<String>) -> Self {
        Self {
            bucket,
            split: split.into(),
        }
    }

    /// Parse an address from its two directory names.
    ///
    /// Returns `None` unless `bucket` is one hex digit and `split` is one to
    /// three hex digits starting with `bucket`.
    pub fn from_dir_names(bucket: &str, split: &str) -> Option<Self> {
        let mut chars = bucket.chars();
        let bucket_char = chars.next()?;
        if chars.next().is_some() || !bucket_char.is_ascii_hexdigit() {
            return None;
        }
        let split_ok = (1..=3).contains(&split.len())
            && split.chars().all(|c| c.is_ascii_hexdigit())
            && split.starts_with(bucket_char);
        split_ok.then(|| Self::new(bucket_char, split))
    }

    /// Deduplication key in `bucket_split` form
    pub fn key(&self) -> String {
        format!("{}_{}", self.bucket, self.split)
    }
}

impl fmt::Display for PartitionAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bucket, self.split)
    }
}
