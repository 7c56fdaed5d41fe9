//! Configuration types for the migration pipeline and the store generator.

use std::path::PathBuf;

/// Name of the partition every RocksDB store carries implicitly.
pub const DEFAULT_RESERVED_PARTITION: &str = "default";

/// Main configuration for a migration pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Path of the source store (opened read-only; must exist).
    pub source_path: PathBuf,

    /// Path of the destination store (created if missing).
    pub dest_path: PathBuf,

    /// The one source partition excluded from the destination set.
    ///
    /// RocksDB forces a "default" column family on every store; records
    /// living in it have no destination and are skipped (counted in the
    /// run's stats).
    pub reserved_partition: String,

    /// Request flush-to-stable-storage on every destination write.
    pub sync_writes: bool,

    /// Worker pool size for reader/writer tasks.
    pub threads: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source_path: PathBuf::new(),
            dest_path: PathBuf::from("_storage.db"),
            reserved_partition: DEFAULT_RESERVED_PARTITION.to_string(),
            sync_writes: true,
            threads: num_cpus::get(),
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration for the given source and destination paths.
    pub fn new(source_path: impl Into<PathBuf>, dest_path: impl Into<PathBuf>) -> Self {
        Self {
            source_path: source_path.into(),
            dest_path: dest_path.into(),
            ..Default::default()
        }
    }

    /// Set the reserved partition name.
    pub fn with_reserved_partition(mut self, name: impl Into<String>) -> Self {
        self.reserved_partition = name.into();
        self
    }

    /// Enable or disable sync writes.
    pub fn with_sync_writes(mut self, sync: bool) -> Self {
        self.sync_writes = sync;
        self
    }

    /// Set the worker pool size.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }
}

/// Configuration for the random test-store generator.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Seed for the random number generator. None draws from entropy.
    pub seed: Option<u64>,

    /// Maximum number of partitions to create (at least 2 are created).
    pub max_partitions: usize,

    /// Maximum total number of rows across all partitions.
    pub max_rows: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: None,
            max_partitions: 6,
            max_rows: 30,
        }
    }
}

impl GeneratorConfig {
    /// Set the RNG seed for reproducible stores.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the maximum partition count.
    pub fn with_max_partitions(mut self, max: usize) -> Self {
        self.max_partitions = max;
        self
    }

    /// Set the maximum total row count.
    pub fn with_max_rows(mut self, max: usize) -> Self {
        self.max_rows = max;
        self
    }
}
