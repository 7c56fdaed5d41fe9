//! rehash: migrate a partitioned RocksDB store, replacing every value with
//! the SHA-256 of its record.
//!
//! Given a source store, rehash opens it read-only, creates a destination
//! store with one partition per source partition (the engine's reserved
//! `default` partition excluded), and streams every record through a
//! concurrent pipeline that replaces its value with the lowercase hex
//! SHA-256 of `key ‖ value`. Once the destination is complete, both stores
//! are dumped as text for inspection.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐   scan    ┌───────────┐   drain   ┌────────────┐
//! │  source    │ ────────▶ │ WorkQueue │ ────────▶ │ dest       │
//! │ (RocksDB,  │  readers  │ FIFO +    │  writers  │ (RocksDB,  │
//! │ read-only) │  hash     │ in-flight │           │ sync puts) │
//! └────────────┘           └───────────┘           └────────────┘
//! ```
//!
//! The [`pipeline::Pipeline`] orchestrator owns both stores and all run
//! state; [`store::PartitionStore`] is the engine seam, with
//! [`store::RocksStore`] as the production binding and [`store::MemStore`]
//! for tests. [`generator`] fills a fresh store with random data so a
//! migration can be exercised end to end.

pub mod config;
pub mod error;
pub mod generator;
pub mod hash;
pub mod pipeline;
pub mod store;
pub mod testing;
pub mod types;

pub use config::{GeneratorConfig, PipelineConfig, DEFAULT_RESERVED_PARTITION};
pub use error::{Error, Result, StorageError};
pub use generator::{generate, GeneratorSummary};
pub use hash::content_hash;
pub use pipeline::{Pipeline, PipelineState, WorkQueue};
pub use store::{dump_partitions, dump_store, MemStore, PartitionStore, RocksStore, ScanIter};
pub use types::{PipelinePhase, PipelineStats, Record, WorkItem};
