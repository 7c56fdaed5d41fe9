//! Shared work queue between partition readers and record writers.

use crate::types::WorkItem;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;

/// Thread-safe FIFO of pending work items with an in-flight counter.
///
/// The in-flight counter tracks items that are not yet durably written, not
/// items merely queued: [`dequeue_front`](Self::dequeue_front) leaves it
/// untouched, and the consuming writer calls [`mark_done`](Self::mark_done)
/// once the write finished, success or failure.
///
/// Every state change wakes the single draining task through a notifier, so
/// the drainer blocks between batches instead of spinning on the counters.
#[derive(Debug, Default)]
pub struct WorkQueue {
    items: Mutex<VecDeque<WorkItem>>,
    in_flight: AtomicUsize,
    notify: Notify,
}

impl WorkQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment the in-flight counter and append the item.
    ///
    /// The counter goes up before the item becomes visible in the deque, so
    /// `in_flight()` is always at least the number of queued items and a
    /// racing `mark_done` can never underflow it.
    ///
    /// FIFO order holds for items from a single producer; items from
    /// different partitions interleave arbitrarily.
    pub fn enqueue(&self, item: WorkItem) {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        self.items.lock().push_back(item);
        self.notify.notify_one();
    }

    /// Remove and return the oldest item, or `None` if the queue is empty.
    ///
    /// Does not decrement the in-flight counter; the item is still pending
    /// until its writer calls [`mark_done`](Self::mark_done).
    pub fn dequeue_front(&self) -> Option<WorkItem> {
        self.items.lock().pop_front()
    }

    /// Decrement the in-flight counter after a write finished.
    ///
    /// Must be called exactly once per dequeued item, on success and on
    /// failure alike, or the pipeline never terminates.
    pub fn mark_done(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.notify.notify_one();
    }

    /// Whether the queue currently holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }

    /// Number of queued (not yet dequeued) items.
    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    /// Number of items enqueued but not yet durably written.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Wake the draining task without changing any counter (used when a
    /// partition scan completes).
    pub(crate) fn wake(&self) {
        self.notify.notify_one();
    }

    /// Wait until the next state change.
    ///
    /// `notify_one` stores a permit when no task is waiting, so a wake that
    /// races with the drainer's termination check is never lost.
    pub(crate) async fn notified(&self) {
        self.notify.notified().await;
    }
}
