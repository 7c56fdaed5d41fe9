//! Random test-store generator.
//!
//! Fills a fresh store with a small random set of partitions and rows so a
//! migration can be exercised end to end without real data. Keys are
//! sequential (`key1`, `key2`, ...) across partitions, values are small
//! random integers rendered as text.

use crate::config::GeneratorConfig;
use crate::error::Result;
use crate::store::PartitionStore;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

/// What a generation run produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorSummary {
    /// Partitions created (not counting any the store already had).
    pub partitions: usize,
    /// Total rows written across those partitions.
    pub rows: usize,
}

/// Populate `store` with random partitions and rows.
///
/// At least two partitions are created and every partition gets at least one
/// row. With a fixed seed the produced store is fully reproducible. A put
/// failure here is fatal; generation targets a store the caller just
/// created, so nothing should fail.
pub fn generate(store: &dyn PartitionStore, config: &GeneratorConfig) -> Result<GeneratorSummary> {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let partition_count = rng.gen_range(2..=config.max_partitions.max(2));
    let names: Vec<String> = (1..=partition_count)
        .map(|i| format!("partition_{i}"))
        .collect();
    store.create_partitions(&names)?;

    let total_rows = rng.gen_range(partition_count..=config.max_rows.max(partition_count));

    // One row per partition guaranteed, the remainder spread at random.
    let mut rows_per_partition = vec![1usize; partition_count];
    for _ in 0..(total_rows - partition_count) {
        rows_per_partition[rng.gen_range(0..partition_count)] += 1;
    }

    let mut key_counter = 0usize;
    for (name, rows) in names.iter().zip(&rows_per_partition) {
        for _ in 0..*rows {
            key_counter += 1;
            let key = format!("key{key_counter}");
            let value = rng.gen_range(0..30u32).to_string();
            store.put(name, key.as_bytes(), value.as_bytes())?;
        }
    }

    info!(
        partitions = partition_count,
        rows = total_rows,
        "generated random store"
    );

    Ok(GeneratorSummary {
        partitions: partition_count,
        rows: total_rows,
    })
}
