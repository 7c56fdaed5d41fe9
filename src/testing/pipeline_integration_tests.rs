//! Integration tests for the full migration pipeline over in-memory stores.
//!
//! These cover the end-to-end behaviors a run must exhibit:
//! - destination content and partition set
//! - non-fatal per-record write failures
//! - deterministic output across runs
//! - termination under concurrent load
//! - reserved-partition skipping
//! - non-OK partition scans

#[cfg(test)]
mod tests {
    use crate::hash::content_hash;
    use crate::pipeline::Pipeline;
    use crate::store::{MemStore, PartitionStore};
    use crate::testing::{dump_to_string, store_with};
    use crate::types::{PipelinePhase, PipelineStats};
    use std::sync::Arc;
    use std::time::Duration;

    const RUN_TIMEOUT: Duration = Duration::from_secs(30);

    async fn run_pipeline(
        source: Arc<MemStore>,
        dest: Arc<MemStore>,
    ) -> (Pipeline, PipelineStats) {
        let pipeline = Pipeline::with_stores(source, dest, "default")
            .unwrap_or_else(|e| panic!("pipeline open: {e}"));
        let stats = tokio::time::timeout(RUN_TIMEOUT, pipeline.run())
            .await
            .expect("pipeline must terminate")
            .unwrap_or_else(|e| panic!("pipeline run: {e}"));
        (pipeline, stats)
    }

    #[tokio::test]
    async fn test_two_partition_migration() {
        let source = Arc::new(store_with(&[("A", &[("x", "1")]), ("default", &[])]));
        let dest = Arc::new(MemStore::new());

        let (pipeline, stats) = run_pipeline(source, dest.clone()).await;

        assert_eq!(dest.partition_names(), vec!["A"]);
        assert_eq!(stats.records_hashed, 1);
        assert_eq!(stats.write_failures, 0);

        let written = dest.get("A", b"x").expect("record must be migrated");
        assert_eq!(
            &written[..],
            b"ec31682fde561917952ff78a7a8adeffd0febc372dd26871916c46c630381b45"
        );
        assert_eq!(pipeline.phase(), PipelinePhase::Verifying);
    }

    #[tokio::test]
    async fn test_write_failure_is_not_fatal() {
        let source = Arc::new(store_with(&[
            ("A", &[("ok", "1"), ("x", "2")]),
            ("default", &[]),
        ]));
        let dest = Arc::new(MemStore::new());
        dest.fail_puts_for(b"x");

        let (pipeline, stats) = run_pipeline(source, dest.clone()).await;

        assert_eq!(stats.records_hashed, 2);
        assert_eq!(stats.write_failures, 1);
        assert_eq!(stats.records_written(), 1);
        assert_eq!(pipeline.queue().in_flight(), 0);

        // The failed record is simply absent; its sibling landed.
        assert!(dest.get("A", b"x").is_none());
        assert!(dest.get("A", b"ok").is_some());

        let dump = dump_to_string(dest.as_ref());
        assert!(!dump.contains("x :"));
    }

    #[tokio::test]
    async fn test_runs_are_deterministic() {
        let layout: &[(&str, &[(&str, &str)])] = &[
            ("a", &[("k1", "v1"), ("k2", "v2")]),
            ("b", &[("k3", "v3")]),
            ("default", &[("meta", "ignored")]),
        ];

        let mut dumps = Vec::new();
        for _ in 0..2 {
            let dest = Arc::new(MemStore::new());
            let (_pipeline, _stats) =
                run_pipeline(Arc::new(store_with(layout)), dest.clone()).await;
            dumps.push(dump_to_string(dest.as_ref()));
        }

        assert_eq!(dumps[0], dumps[1]);
    }

    #[tokio::test]
    async fn test_terminates_under_load() {
        let source = Arc::new(MemStore::new());
        let mut names = vec!["default".to_string()];
        for p in 0..8 {
            names.push(format!("p{p}"));
        }
        source.create_partitions(&names).unwrap();
        for p in 0..8 {
            let partition = format!("p{p}");
            for r in 0..50 {
                source
                    .insert(&partition, format!("k{r:03}").as_bytes(), b"v")
                    .unwrap();
            }
        }

        let dest = Arc::new(MemStore::new());
        let (pipeline, stats) = run_pipeline(source, dest.clone()).await;

        assert_eq!(stats.records_hashed, 400);
        assert_eq!(stats.records_written(), 400);
        assert_eq!(pipeline.queue().in_flight(), 0);
        assert!(pipeline.queue().is_empty());

        let total: usize = dest
            .partition_names()
            .iter()
            .map(|n| dest.record_count(n))
            .sum();
        assert_eq!(total, 400);
    }

    #[tokio::test]
    async fn test_reserved_records_are_skipped_and_counted() {
        let source = Arc::new(store_with(&[
            ("a", &[("k", "v")]),
            ("default", &[("d1", "x"), ("d2", "y")]),
        ]));
        let dest = Arc::new(MemStore::new());

        let (_pipeline, stats) = run_pipeline(source, dest.clone()).await;

        assert_eq!(stats.reserved_skipped, 2);
        assert_eq!(stats.records_hashed, 1);
        assert!(!dest.partition_names().contains(&"default".to_string()));
    }

    #[tokio::test]
    async fn test_non_ok_scan_does_not_hang_the_run() {
        let source = Arc::new(store_with(&[
            ("a", &[("k1", "v1")]),
            ("b", &[("k2", "v2")]),
            ("default", &[]),
        ]));
        source.poison_scan("b");
        let dest = Arc::new(MemStore::new());

        let (_pipeline, stats) = run_pipeline(source, dest.clone()).await;

        // Records seen before the non-OK status still migrate.
        assert_eq!(stats.records_hashed, 2);
        assert!(dest.get("a", b"k1").is_some());
        assert!(dest.get("b", b"k2").is_some());
    }

    #[tokio::test]
    async fn test_verified_dump_matches_hashes() {
        let source = Arc::new(store_with(&[
            ("a", &[("k1", "v1"), ("k2", "v2")]),
            ("default", &[]),
        ]));
        let dest = Arc::new(MemStore::new());

        let (pipeline, _stats) = run_pipeline(source, dest).await;

        let mut out = Vec::new();
        pipeline.verify_dump(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        let (source_dump, dest_dump) = text
            .split_once("/////////////\n")
            .expect("separator between the dumps");

        assert!(source_dump.contains("k1 : v1"));
        assert!(dest_dump.contains(&format!("k1 : {}", content_hash(b"k1", b"v1"))));
        assert!(dest_dump.contains(&format!("k2 : {}", content_hash(b"k2", b"v2"))));
    }
}
