//! custdb configuration - loaded from YAML (`custdb.yml`)

use custdb_core::{Field, ParallelConfig};
use custdb_index::ValueIndex;
use custdb_storage::{PartitionStore, DEFAULT_SEGMENT_FILE};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::Level;

/// Default config file name
pub const DEFAULT_CONFIG_FILE: &str = "custdb.yml";

/// Complete configuration - can be loaded from YAML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustdbConfig {
    /// Partition store configuration
    pub storage: StorageSettings,
    /// Value index configuration
    pub index: IndexSettings,
    /// Logging configuration
    pub logging: LoggingSettings,
    /// Parallel partition loading configuration
    pub parallel: ParallelConfig,
}

/// Partition store settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Base directory of the partition store
    pub data_dir: PathBuf,
    /// Segment file name inside each split directory
    pub segment_file: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./customer_buckets"),
            segment_file: DEFAULT_SEGMENT_FILE.to_string(),
        }
    }
}

/// Value index settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexSettings {
    /// Base directory of the value index
    pub index_dir: PathBuf,
    /// Fields indexed when `index` is run without `--fields`
    pub fields: Vec<String>,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            index_dir: PathBuf::from("./indexes"),
            fields: Field::INDEXABLE.iter().map(|f| f.as_str().to_string()).collect(),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Include target in logs
    pub show_target: bool,
    /// Include thread IDs in logs
    pub show_thread_ids: bool,
    /// Include file and line numbers
    pub show_location: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            show_target: true,
            show_thread_ids: false,
            show_location: false,
        }
    }
}

impl CustdbConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: CustdbConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from `path` if it exists, defaults otherwise.
    ///
    /// A file that exists but cannot be parsed is an error.
    pub fn load_or_default(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Get log level
    pub fn log_level(&self) -> Level {
        match self.logging.level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }

    /// Build the partition store described by the storage section
    pub fn to_partition_store(&self) -> PartitionStore {
        PartitionStore::new(&self.storage.data_dir).with_segment_file(&self.storage.segment_file)
    }

    /// Build the value index described by the index section
    pub fn to_value_index(&self) -> ValueIndex {
        ValueIndex::new(&self.index.index_dir)
    }

    /// Get the parallel loading configuration
    pub fn to_parallel_config(&self) -> ParallelConfig {
        self.parallel.clone()
    }

    /// Write default config to a file (for generating example config)
    pub fn write_default(path: impl AsRef<Path>) -> anyhow::Result<()> {
        let config = Self::default();
        let yaml = serde_yaml::to_string(&config)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }
}
