//! In-memory partitioned store for tests.

use crate::error::{Result, StorageError};
use crate::store::{PartitionStore, ScanIter};
use crate::types::Record;
use bytes::Bytes;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashSet};

/// In-memory twin of the RocksDB store, with failure injection.
///
/// Partitions are `BTreeMap`s, so scans are in ascending key order like the
/// engine's. Two failure modes can be injected for tests:
/// - [`fail_puts_for`](Self::fail_puts_for) makes every put of a given key
///   fail, simulating a per-record engine write error;
/// - [`poison_scan`](Self::poison_scan) makes a partition scan end in a
///   non-OK state after yielding all of its records.
#[derive(Debug, Default)]
pub struct MemStore {
    partitions: RwLock<BTreeMap<String, BTreeMap<Vec<u8>, Bytes>>>,
    fail_puts: RwLock<HashSet<Vec<u8>>>,
    poisoned_scans: RwLock<HashSet<String>>,
}

impl MemStore {
    /// Create an empty store with no partitions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already has the given partitions.
    pub fn with_partitions(names: &[&str]) -> Self {
        let store = Self::new();
        {
            let mut partitions = store.partitions.write();
            for name in names {
                partitions.insert(name.to_string(), BTreeMap::new());
            }
        }
        store
    }

    /// Seed a record directly, bypassing failure injection.
    pub fn insert(&self, partition: &str, key: &[u8], value: &[u8]) -> Result<()> {
        let mut partitions = self.partitions.write();
        let records = partitions
            .get_mut(partition)
            .ok_or_else(|| StorageError::PartitionNotFound(partition.to_string()))?;
        records.insert(key.to_vec(), Bytes::copy_from_slice(value));
        Ok(())
    }

    /// Read one value back.
    pub fn get(&self, partition: &str, key: &[u8]) -> Option<Bytes> {
        self.partitions.read().get(partition)?.get(key).cloned()
    }

    /// Number of records in a partition.
    pub fn record_count(&self, partition: &str) -> usize {
        self.partitions
            .read()
            .get(partition)
            .map(|r| r.len())
            .unwrap_or(0)
    }

    /// Make every put of `key` fail.
    pub fn fail_puts_for(&self, key: &[u8]) {
        self.fail_puts.write().insert(key.to_vec());
    }

    /// Make scans of `partition` end in a non-OK state after all records.
    pub fn poison_scan(&self, partition: &str) {
        self.poisoned_scans.write().insert(partition.to_string());
    }
}

impl PartitionStore for MemStore {
    fn partition_names(&self) -> Vec<String> {
        self.partitions.read().keys().cloned().collect()
    }

    fn create_partitions(&self, names: &[String]) -> Result<()> {
        let mut partitions = self.partitions.write();
        for name in names {
            if partitions.contains_key(name) {
                return Err(StorageError::AlreadyExists(name.clone()).into());
            }
            partitions.insert(name.clone(), BTreeMap::new());
        }
        Ok(())
    }

    fn scan(&self, partition: &str) -> Result<ScanIter<'_>> {
        let partitions = self.partitions.read();
        let records = partitions
            .get(partition)
            .ok_or_else(|| StorageError::PartitionNotFound(partition.to_string()))?;

        // Point-in-time snapshot; concurrent puts after this are not seen.
        let mut items: Vec<Result<Record>> = records
            .iter()
            .map(|(k, v)| Ok(Record::new(Bytes::copy_from_slice(k), v.clone())))
            .collect();

        if self.poisoned_scans.read().contains(partition) {
            items.push(Err(StorageError::Iteration("injected scan failure".to_string()).into()));
        }

        Ok(Box::new(items.into_iter()))
    }

    fn put(&self, partition: &str, key: &[u8], value: &[u8]) -> Result<()> {
        if self.fail_puts.read().contains(key) {
            return Err(StorageError::WriteFailed("injected put failure".to_string()).into());
        }
        self.insert(partition, key, value)
    }
}
