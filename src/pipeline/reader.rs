//! Partition readers: scan one source partition and publish work items.

use crate::hash::content_hash;
use crate::pipeline::{PipelineState, WorkQueue};
use crate::store::PartitionStore;
use crate::types::WorkItem;
use std::sync::Arc;
use tracing::{debug, warn};

/// Fully scan one source partition, hashing every record into the queue.
///
/// `destination` is the partition name in the destination store, resolved
/// once by the orchestrator; `None` marks the reserved partition, whose
/// records are skipped and counted.
///
/// A scan that ends in a non-OK state is reportable but non-fatal: the
/// warning is logged and the partition still counts as finished, so the
/// pipeline can terminate.
pub(crate) fn scan_partition(
    store: &dyn PartitionStore,
    partition: &str,
    destination: Option<Arc<str>>,
    queue: &WorkQueue,
    state: &PipelineState,
) {
    let scan = match store.scan(partition) {
        Ok(scan) => scan,
        Err(e) => {
            warn!(partition, error = %e, "partition scan could not start");
            state.finish_partition(queue);
            return;
        }
    };

    let mut hashed = 0u64;
    let mut skipped = 0u64;

    for item in scan {
        match item {
            Ok(record) => match &destination {
                Some(dest) => {
                    let content_hash = content_hash(&record.key, &record.value);
                    queue.enqueue(WorkItem {
                        key: record.key,
                        value: record.value,
                        partition: dest.clone(),
                        content_hash,
                    });
                    hashed += 1;
                }
                None => skipped += 1,
            },
            Err(e) => {
                warn!(partition, error = %e, "partition scan ended in non-OK state");
                break;
            }
        }
    }

    state.add_hashed(hashed);
    if skipped > 0 {
        state.add_reserved_skipped(skipped);
        debug!(partition, skipped, "skipped records in reserved partition");
    }

    debug!(partition, hashed, "partition scan finished");
    state.finish_partition(queue);
}
