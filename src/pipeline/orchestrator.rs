//! Pipeline orchestrator: owns both stores and drives a run to completion.

use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::pipeline::{reader, writer, PipelineState, WorkQueue};
use crate::store::{dump_partitions, dump_store, PartitionStore, RocksStore};
use crate::types::{PipelinePhase, PipelineStats};
use parking_lot::RwLock;
use std::io::Write;
use std::sync::Arc;
use tokio::task;
use tracing::{debug, info};

/// Orchestrates one migration run:
/// `Opening → Reading → Draining → Verifying → Closed`.
///
/// All run state (stores, queue, counters) is owned here and handed to
/// tasks explicitly, so independent pipelines can run side by side in one
/// process.
pub struct Pipeline {
    source: Arc<dyn PartitionStore>,
    dest: Arc<dyn PartitionStore>,

    /// All source partitions, reserved one included.
    source_partitions: Vec<String>,

    /// The source partition excluded from the destination set.
    reserved_partition: String,

    queue: Arc<WorkQueue>,
    state: Arc<PipelineState>,
    phase: RwLock<PipelinePhase>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("source_partitions", &self.source_partitions)
            .field("reserved_partition", &self.reserved_partition)
            .field("phase", &*self.phase.read())
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Open the stores named by the config and build the pipeline.
    ///
    /// The source is opened read-only and must exist; the destination is
    /// created if missing. Any open or partition-creation failure is fatal
    /// and aborts construction before any reading begins.
    pub fn open(config: &PipelineConfig) -> Result<Self> {
        if config.threads == 0 {
            return Err(Error::Config("threads must be at least 1".to_string()));
        }

        let source = RocksStore::open_read_only(&config.source_path)?;
        let dest = RocksStore::open_or_create(&config.dest_path, config.sync_writes)?;
        Self::with_stores(Arc::new(source), Arc::new(dest), &config.reserved_partition)
    }

    /// Build a pipeline over already-opened stores.
    ///
    /// Creates one destination partition per source partition name, except
    /// the reserved one, before any reads start.
    pub fn with_stores(
        source: Arc<dyn PartitionStore>,
        dest: Arc<dyn PartitionStore>,
        reserved_partition: &str,
    ) -> Result<Self> {
        let source_partitions = source.partition_names();

        let dest_partitions: Vec<String> = source_partitions
            .iter()
            .filter(|name| name.as_str() != reserved_partition)
            .cloned()
            .collect();

        dest.create_partitions(&dest_partitions)?;

        info!(
            source_partitions = source_partitions.len(),
            dest_partitions = dest_partitions.len(),
            reserved = %reserved_partition,
            "pipeline opened"
        );

        Ok(Self {
            source,
            dest,
            state: Arc::new(PipelineState::new(source_partitions.len())),
            source_partitions,
            reserved_partition: reserved_partition.to_string(),
            queue: Arc::new(WorkQueue::new()),
            phase: RwLock::new(PipelinePhase::Opening),
        })
    }

    /// Current phase of the run.
    pub fn phase(&self) -> PipelinePhase {
        *self.phase.read()
    }

    /// The shared work queue (observable counters for callers and tests).
    pub fn queue(&self) -> &WorkQueue {
        &self.queue
    }

    fn set_phase(&self, phase: PipelinePhase) {
        debug!(phase = %phase, "pipeline phase");
        *self.phase.write() = phase;
    }

    /// Run the migration: launch readers, drain the queue through writers,
    /// and return the run's stats once the termination invariant holds.
    ///
    /// A pipeline runs once; a second call is rejected.
    pub async fn run(&self) -> Result<PipelineStats> {
        {
            let mut phase = self.phase.write();
            if *phase != PipelinePhase::Opening {
                return Err(Error::Internal(format!(
                    "pipeline already ran (phase: {})",
                    *phase
                )));
            }
            *phase = PipelinePhase::Reading;
        }
        debug!(phase = %PipelinePhase::Reading, "pipeline phase");
        self.spawn_readers();

        self.set_phase(PipelinePhase::Draining);
        self.drain().await;

        self.set_phase(PipelinePhase::Verifying);

        let stats = self.state.stats();
        info!(
            records_hashed = stats.records_hashed,
            records_written = stats.records_written(),
            write_failures = stats.write_failures,
            reserved_skipped = stats.reserved_skipped,
            "pipeline drained"
        );
        Ok(stats)
    }

    /// Launch one reader task per source partition. Does not block.
    fn spawn_readers(&self) {
        for name in &self.source_partitions {
            // Identity name mapping, resolved once here; the reserved
            // partition has no destination.
            let destination = (name.as_str() != self.reserved_partition)
                .then(|| Arc::<str>::from(name.as_str()));

            let source = self.source.clone();
            let queue = self.queue.clone();
            let state = self.state.clone();
            let partition = name.clone();

            task::spawn_blocking(move || {
                reader::scan_partition(source.as_ref(), &partition, destination, &queue, &state);
            });
        }
    }

    /// Hand queued items to writer tasks until every reader has finished
    /// and the in-flight count is zero.
    ///
    /// Blocks on the queue's notifier between batches; every enqueue,
    /// `mark_done`, and partition completion wakes it, so there is no
    /// polling while idle.
    async fn drain(&self) {
        loop {
            while let Some(item) = self.queue.dequeue_front() {
                let dest = self.dest.clone();
                let queue = self.queue.clone();
                let state = self.state.clone();

                task::spawn_blocking(move || {
                    writer::write_item(dest.as_ref(), item, &queue, &state);
                });
            }

            if self.state.drained(&self.queue) {
                break;
            }

            self.queue.notified().await;
        }
    }

    /// Dump both stores to a text sink: every partition's records in
    /// iteration order, a blank line between partitions, and a separator
    /// line between the source dump and the destination dump.
    ///
    /// The destination side lists only the migrated partitions; the engine's
    /// mandatory reserved partition holds no migrated data and is left out.
    pub fn verify_dump<W: Write>(&self, out: &mut W) -> Result<()> {
        dump_store(self.source.as_ref(), out)?;
        writeln!(out, "/////////////")?;

        let dest_names: Vec<String> = self
            .dest
            .partition_names()
            .into_iter()
            .filter(|name| name != &self.reserved_partition)
            .collect();
        dump_partitions(self.dest.as_ref(), &dest_names, out)?;
        Ok(())
    }

    /// Release both stores. Dropping the pipeline has the same effect; this
    /// makes the transition explicit.
    pub fn close(self) {
        self.set_phase(PipelinePhase::Closed);
        info!("pipeline closed");
    }
}
