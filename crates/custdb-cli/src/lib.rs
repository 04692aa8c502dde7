//! custdb CLI - configuration and commands for the `custdb` binary
//!
//! ## Usage
//!
//! ```bash
//! # Split a full-data file into partitions (uses storage.data_dir from custdb.yml)
//! custdb partition customers.feather
//!
//! # Index the default fields, or only some of them
//! custdb index customers.feather
//! custdb index customers.feather --fields name,gender
//!
//! # Resolve filters to records (JSON on stdout)
//! custdb query -f name=alice -f gender=f
//!
//! # Show how a query would be resolved
//! custdb explain -f customer_id=cka2501
//!
//! # Write a default configuration file
//! custdb generate-config custdb.yml
//! ```

pub mod commands;
pub mod config;

pub use commands::{parse_filter, NOT_FOUND_MESSAGE};
pub use config::{CustdbConfig, IndexSettings, LoggingSettings, StorageSettings, DEFAULT_CONFIG_FILE};
