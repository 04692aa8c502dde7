//! Parallel partition loading configuration.

use serde::{Deserialize, Serialize};

/// Controls when candidate partitions are loaded in parallel and how large
/// the worker pool is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallelConfig {
    /// Minimum number of candidate partitions before loading them in parallel.
    /// Default: 2
    pub partition_threshold: usize,

    /// Number of threads in the global worker pool.
    /// Set to 0 to let rayon pick (number of CPU cores).
    /// Default: 0
    pub thread_pool_size: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            partition_threshold: 2,
            thread_pool_size: 0,
        }
    }
}

impl ParallelConfig {
    /// Creates a new ParallelConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if this many partitions should be loaded in parallel.
    pub fn should_parallelize_partitions(&self, partition_count: usize) -> bool {
        partition_count >= self.partition_threshold
    }

    /// Explicit pool size, or `None` when the runtime default applies.
    pub fn explicit_thread_pool_size(&self) -> Option<usize> {
        (self.thread_pool_size > 0).then_some(self.thread_pool_size)
    }

    /// Creates a configuration that disables all parallelism.
    pub fn sequential() -> Self {
        Self {
            partition_threshold: usize::MAX,
            thread_pool_size: 1,
        }
    }

    /// Builder method to set partition threshold.
    pub fn with_partition_threshold(mut self, threshold: usize) -> Self {
        self.partition_threshold = threshold;
        self
    }

    /// Builder method to set thread pool size.
    pub fn with_thread_pool_size(mut self, size: usize) -> Self {
        self.thread_pool_size = size;
        self
    }
}
