//! RocksDB-backed partitioned store.
//!
//! Partitions are column families. The store is opened in `MultiThreaded`
//! mode because writer tasks put into possibly-distinct column families
//! concurrently; RocksDB's own concurrency control handles that, no
//! application-level locking is needed.

use crate::error::{Result, StorageError};
use crate::store::{PartitionStore, ScanIter};
use crate::types::Record;
use bytes::Bytes;
use parking_lot::RwLock;
use rocksdb::{DBWithThreadMode, IteratorMode, MultiThreaded, Options, WriteOptions};
use std::path::Path;
use tracing::{debug, info};

type Db = DBWithThreadMode<MultiThreaded>;

/// RocksDB binding of [`PartitionStore`].
#[derive(Debug)]
pub struct RocksStore {
    db: Db,

    /// Partition names, tracked here because RocksDB does not expose the
    /// column-family list of an open database.
    partitions: RwLock<Vec<String>>,

    /// Request flush-to-stable-storage on every put.
    sync_writes: bool,
}

impl RocksStore {
    /// Open an existing store read-only, with its full partition set.
    ///
    /// The partition names are enumerated from the store's manifest before
    /// the open, the way the engine requires.
    pub fn open_read_only(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let names = Db::list_cf(&Options::default(), path)
            .map_err(|e| StorageError::RocksDb(format!("list partitions: {}", e)))?;

        let db = Db::open_cf_for_read_only(&Options::default(), path, &names, false)
            .map_err(|e| StorageError::RocksDb(format!("open read-only: {}", e)))?;

        info!(path = %path.display(), partitions = names.len(), "opened source store read-only");

        Ok(Self {
            db,
            partitions: RwLock::new(names),
            sync_writes: false,
        })
    }

    /// Open a store read-write, creating it if missing.
    pub fn open_or_create(path: impl AsRef<Path>, sync_writes: bool) -> Result<Self> {
        let path = path.as_ref();

        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        // A pre-existing store must be opened with all of its partitions.
        let names = Db::list_cf(&Options::default(), path)
            .unwrap_or_else(|_| vec!["default".to_string()]);

        let db = Db::open_cf(&opts, path, &names)
            .map_err(|e| StorageError::RocksDb(format!("open: {}", e)))?;

        info!(path = %path.display(), "opened destination store");

        Ok(Self {
            db,
            partitions: RwLock::new(names),
            sync_writes,
        })
    }

    /// Create a brand-new store. Fails if the path already exists.
    pub fn create_new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if path.exists() {
            return Err(StorageError::AlreadyExists(path.display().to_string()).into());
        }

        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.set_error_if_exists(true);

        let db = Db::open(&opts, path).map_err(|e| StorageError::RocksDb(format!("create: {}", e)))?;

        info!(path = %path.display(), "created new store");

        Ok(Self {
            db,
            partitions: RwLock::new(vec!["default".to_string()]),
            sync_writes: true,
        })
    }

    fn write_opts(&self) -> WriteOptions {
        let mut opts = WriteOptions::default();
        opts.set_sync(self.sync_writes);
        opts
    }
}

impl PartitionStore for RocksStore {
    fn partition_names(&self) -> Vec<String> {
        self.partitions.read().clone()
    }

    fn create_partitions(&self, names: &[String]) -> Result<()> {
        for name in names {
            self.db
                .create_cf(name, &Options::default())
                .map_err(|e| StorageError::RocksDb(format!("create partition {}: {}", name, e)))?;
            self.partitions.write().push(name.clone());
            debug!(partition = %name, "created destination partition");
        }
        Ok(())
    }

    fn scan(&self, partition: &str) -> Result<ScanIter<'_>> {
        let cf = self
            .db
            .cf_handle(partition)
            .ok_or_else(|| StorageError::PartitionNotFound(partition.to_string()))?;

        let iter = self.db.iterator_cf(&cf, IteratorMode::Start);

        Ok(Box::new(iter.map(|item| match item {
            Ok((key, value)) => Ok(Record::new(
                Bytes::from(key.into_vec()),
                Bytes::from(value.into_vec()),
            )),
            Err(e) => Err(StorageError::Iteration(e.to_string()).into()),
        })))
    }

    fn put(&self, partition: &str, key: &[u8], value: &[u8]) -> Result<()> {
        let cf = self
            .db
            .cf_handle(partition)
            .ok_or_else(|| StorageError::PartitionNotFound(partition.to_string()))?;

        self.db
            .put_cf_opt(&cf, key, value, &self.write_opts())
            .map_err(|e| StorageError::WriteFailed(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_read_only_missing_store() {
        let dir = TempDir::new().unwrap();
        let result = RocksStore::open_read_only(dir.path().join("missing.db"));
        assert!(result.is_err());
    }

    #[test]
    fn test_create_new_refuses_existing_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.db");

        let store = RocksStore::create_new(&path).unwrap();
        drop(store);

        let err = RocksStore::create_new(&path).unwrap_err();
        assert!(matches!(
            err,
            crate::Error::Storage(StorageError::AlreadyExists(_))
        ));
    }

    #[test]
    fn test_partition_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.db");

        let store = RocksStore::create_new(&path).unwrap();
        store
            .create_partitions(&["a".to_string(), "b".to_string()])
            .unwrap();
        store.put("a", b"k2", b"v2").unwrap();
        store.put("a", b"k1", b"v1").unwrap();
        drop(store);

        let reopened = RocksStore::open_read_only(&path).unwrap();
        let mut names = reopened.partition_names();
        names.sort();
        assert_eq!(names, vec!["a", "b", "default"]);

        // Scans come back in ascending key order.
        let records: Vec<_> = reopened
            .scan("a")
            .unwrap()
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(records.len(), 2);
        assert_eq!(&records[0].key[..], b"k1");
        assert_eq!(&records[0].value[..], b"v1");
        assert_eq!(&records[1].key[..], b"k2");
    }

    #[test]
    fn test_put_to_missing_partition() {
        let dir = TempDir::new().unwrap();
        let store = RocksStore::create_new(dir.path().join("store.db")).unwrap();
        let err = store.put("nope", b"k", b"v").unwrap_err();
        assert!(matches!(
            err,
            crate::Error::Storage(StorageError::PartitionNotFound(_))
        ));
    }
}
