//! Error types for the store migration pipeline.

use std::io;
use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the migration pipeline.
#[derive(Error, Debug)]
pub enum Error {
    /// Storage engine errors.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration errors.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error (verification dump sink, runtime construction).
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// Generic internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Storage layer errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Error surfaced by the RocksDB engine.
    #[error("rocksdb error: {0}")]
    RocksDb(String),

    /// A partition was referenced that the store does not have.
    #[error("partition not found: {0}")]
    PartitionNotFound(String),

    /// The store path already exists (when creating a fresh store).
    #[error("store already exists: {0}")]
    AlreadyExists(String),

    /// A point write was rejected by the engine.
    #[error("write failed: {0}")]
    WriteFailed(String),

    /// A partition scan ended in a non-OK state.
    #[error("iteration ended in non-OK state: {0}")]
    Iteration(String),
}
