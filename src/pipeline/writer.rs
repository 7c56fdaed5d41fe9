//! Record writers: persist one work item's hash into the destination.

use crate::pipeline::{PipelineState, WorkQueue};
use crate::store::PartitionStore;
use crate::types::WorkItem;
use tracing::{trace, warn};

/// Write `(key, content_hash)` into the item's destination partition.
///
/// A failed put is logged as a warning and the record is dropped, never
/// retried. `mark_done` runs exactly once on every path; otherwise the
/// in-flight counter would never reach zero and the pipeline would never
/// terminate.
pub(crate) fn write_item(
    store: &dyn PartitionStore,
    item: WorkItem,
    queue: &WorkQueue,
    state: &PipelineState,
) {
    match store.put(&item.partition, &item.key, item.content_hash.as_bytes()) {
        Ok(()) => {
            trace!(
                partition = %item.partition,
                key = %String::from_utf8_lossy(&item.key),
                "wrote record hash"
            );
        }
        Err(e) => {
            warn!(
                partition = %item.partition,
                key = %String::from_utf8_lossy(&item.key),
                error = %e,
                "destination write failed, record dropped"
            );
            state.add_write_failure();
        }
    }

    queue.mark_done();
}
