//! Testing utilities for the migration pipeline.
//!
//! Fixture helpers for building in-memory stores with known contents, used
//! by the integration tests in this module and available to downstream
//! tests.

mod pipeline_integration_tests;

use crate::store::MemStore;

/// Build a [`MemStore`] from a literal layout of partitions and records.
///
/// ```rust
/// use rehash::testing::store_with;
///
/// let store = store_with(&[
///     ("a", &[("k1", "v1"), ("k2", "v2")]),
///     ("default", &[]),
/// ]);
/// assert_eq!(store.record_count("a"), 2);
/// ```
pub fn store_with(layout: &[(&str, &[(&str, &str)])]) -> MemStore {
    let names: Vec<&str> = layout.iter().map(|(name, _)| *name).collect();
    let store = MemStore::with_partitions(&names);
    for (name, records) in layout {
        for (key, value) in *records {
            store
                .insert(name, key.as_bytes(), value.as_bytes())
                .unwrap_or_else(|e| panic!("seeding {name}/{key}: {e}"));
        }
    }
    store
}

/// Dump a store into a `String` for content assertions.
pub fn dump_to_string(store: &dyn crate::store::PartitionStore) -> String {
    let mut out = Vec::new();
    crate::store::dump_store(store, &mut out).unwrap_or_else(|e| panic!("dump failed: {e}"));
    String::from_utf8(out).unwrap_or_else(|e| panic!("dump not UTF-8: {e}"))
}
