//! Shared types for the migration pipeline.

use bytes::Bytes;
use std::sync::Arc;

/// A key/value pair read from a source partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Raw key bytes.
    pub key: Bytes,

    /// Raw value bytes.
    pub value: Bytes,
}

impl Record {
    /// Create a record from raw key and value bytes.
    pub fn new(key: impl Into<Bytes>, value: impl Into<Bytes>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// The unit of work flowing from a reader to a writer.
///
/// Owned exclusively by the [`WorkQueue`](crate::pipeline::WorkQueue) between
/// enqueue and dequeue; ownership transfers to the consuming writer task on
/// dequeue.
#[derive(Debug, Clone)]
pub struct WorkItem {
    /// Raw key bytes, written unchanged to the destination.
    pub key: Bytes,

    /// The original value (discarded at write time; the hash replaces it).
    pub value: Bytes,

    /// Destination partition, by name. Resolved once by the orchestrator.
    pub partition: Arc<str>,

    /// Lowercase hex SHA-256 of `key ‖ value`.
    pub content_hash: String,
}

/// Phase of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelinePhase {
    /// Stores are being opened and the destination partition set created.
    Opening,
    /// Reader tasks have been launched.
    Reading,
    /// The drain loop is feeding writer tasks until completion.
    Draining,
    /// Both stores are being dumped for inspection.
    Verifying,
    /// Stores are released.
    Closed,
}

impl PipelinePhase {
    /// Check if this is a terminal phase.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelinePhase::Closed)
    }
}

impl std::fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelinePhase::Opening => write!(f, "opening"),
            PipelinePhase::Reading => write!(f, "reading"),
            PipelinePhase::Draining => write!(f, "draining"),
            PipelinePhase::Verifying => write!(f, "verifying"),
            PipelinePhase::Closed => write!(f, "closed"),
        }
    }
}

/// Summary of a completed pipeline run.
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Number of source partitions scanned (reserved one included).
    pub source_partitions: usize,

    /// Records hashed and enqueued for writing.
    pub records_hashed: u64,

    /// Destination writes that failed and were dropped.
    pub write_failures: u64,

    /// Records found in the reserved partition and skipped.
    pub reserved_skipped: u64,
}

impl PipelineStats {
    /// Records durably written to the destination.
    pub fn records_written(&self) -> u64 {
        self.records_hashed.saturating_sub(self.write_failures)
    }
}
