//! Live progress for a running scan.
//!
//! A reporter thread wakes once per refresh interval, captures a
//! [`ProgressSnapshot`] from the shared counters and hands it to a
//! [`ProgressSink`]. The sink decides how a snapshot is presented (terminal
//! redraw, log line, nothing at all); the scheduler never renders anything
//! itself.
//!
//! Snapshots may be stale: worker slots are copied while workers keep writing.
//! The scheduler emits one more snapshot through [`ProgressSink::finish`] after
//! every worker and the reporter have been joined, and that one is exact.
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tracing::info;

use super::aggregator::MatchSet;
use crate::metrics::{ScanMetrics, WorkerSnapshot};

/// Everything the status surface shows at one point in time
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressSnapshot {
    pub files_scanned: u64,
    pub files_total: u64,
    pub files_matched: usize,
    pub elapsed: Duration,
    pub workers: Vec<WorkerSnapshot>,
}

impl ProgressSnapshot {
    pub(crate) fn capture(
        metrics: &ScanMetrics,
        matches: &MatchSet,
        files_total: u64,
        started: Instant,
    ) -> Self {
        Self {
            files_scanned: metrics.files_scanned(),
            files_total,
            files_matched: matches.snapshot_count(),
            elapsed: started.elapsed(),
            workers: metrics.worker_snapshots(),
        }
    }
}

/// Receives progress snapshots
pub trait ProgressSink: Send + Sync {
    /// Called on every reporter tick while the scan runs
    fn update(&self, snapshot: &ProgressSnapshot);

    /// Called once, after the scan has completed
    fn finish(&self, snapshot: &ProgressSnapshot) {
        self.update(snapshot);
    }
}

/// Discards all progress
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn update(&self, _snapshot: &ProgressSnapshot) {}
}

/// Writes progress as structured log events
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl ProgressSink for LogSink {
    fn update(&self, snapshot: &ProgressSnapshot) {
        info!(
            files_scanned = snapshot.files_scanned,
            files_total = snapshot.files_total,
            files_matched = snapshot.files_matched,
            elapsed_secs = snapshot.elapsed.as_secs_f64(),
            "Scan progress"
        );
        for worker in snapshot.workers.iter().filter(|w| w.median.is_some()) {
            info!(
                worker = worker.worker,
                files_processed = worker.files_processed,
                median_secs = worker.median.map(|m| m.as_secs_f64()),
                "Worker progress"
            );
        }
    }

    fn finish(&self, snapshot: &ProgressSnapshot) {
        info!(
            files_scanned = snapshot.files_scanned,
            files_matched = snapshot.files_matched,
            elapsed_secs = snapshot.elapsed.as_secs_f64(),
            "Scan finished"
        );
    }
}

/// Shared state the reporter polls
pub(crate) struct ReporterContext<'a> {
    pub metrics: &'a ScanMetrics,
    pub matches: &'a MatchSet,
    pub files_total: u64,
    pub started: Instant,
    pub interval: Duration,
    pub done: &'a AtomicBool,
    pub sink: &'a dyn ProgressSink,
}

/// Reporter loop: snapshot, sleep, repeat until `done` is observed.
///
/// The sleep is a `park_timeout` so the scheduler can wake the reporter as
/// soon as it sets `done`; a spurious wake-up only produces an early snapshot.
pub(crate) fn run_reporter(ctx: ReporterContext<'_>) {
    while !ctx.done.load(Ordering::Acquire) {
        let snapshot =
            ProgressSnapshot::capture(ctx.metrics, ctx.matches, ctx.files_total, ctx.started);
        ctx.sink.update(&snapshot);
        thread::park_timeout(ctx.interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Mutex;

    #[derive(Default)]
    struct CollectingSink {
        updates: Mutex<Vec<ProgressSnapshot>>,
    }

    impl ProgressSink for CollectingSink {
        fn update(&self, snapshot: &ProgressSnapshot) {
            self.updates.lock().unwrap().push(snapshot.clone());
        }
    }

    #[test]
    fn test_capture_reads_shared_counters() {
        let metrics = ScanMetrics::new(2);
        let matches = MatchSet::new();
        metrics.record_scanned();
        metrics.record_file(1, Duration::from_millis(4));
        matches.append(PathBuf::from("a.xml"));

        let snapshot = ProgressSnapshot::capture(&metrics, &matches, 10, Instant::now());
        assert_eq!(snapshot.files_scanned, 1);
        assert_eq!(snapshot.files_total, 10);
        assert_eq!(snapshot.files_matched, 1);
        assert_eq!(snapshot.workers.len(), 2);
        assert_eq!(snapshot.workers[1].median, Some(Duration::from_millis(4)));
    }

    #[test]
    fn test_reporter_stops_when_done() {
        let metrics = ScanMetrics::new(1);
        let matches = MatchSet::new();
        let done = AtomicBool::new(false);
        let sink = CollectingSink::default();

        thread::scope(|scope| {
            let reporter = scope.spawn(|| {
                run_reporter(ReporterContext {
                    metrics: &metrics,
                    matches: &matches,
                    files_total: 0,
                    started: Instant::now(),
                    interval: Duration::from_millis(5),
                    done: &done,
                    sink: &sink,
                })
            });

            thread::sleep(Duration::from_millis(40));
            done.store(true, Ordering::Release);
            reporter.thread().unpark();
            reporter.join().unwrap();
        });

        let updates = sink.updates.lock().unwrap();
        assert!(!updates.is_empty());
    }

    #[test]
    fn test_reporter_exits_immediately_when_already_done() {
        let metrics = ScanMetrics::new(1);
        let matches = MatchSet::new();
        let done = AtomicBool::new(true);
        let sink = CollectingSink::default();

        run_reporter(ReporterContext {
            metrics: &metrics,
            matches: &matches,
            files_total: 0,
            started: Instant::now(),
            interval: Duration::from_secs(60),
            done: &done,
            sink: &sink,
        });

        assert!(sink.updates.lock().unwrap().is_empty());
    }

    #[test]
    fn test_default_finish_forwards_to_update() {
        let sink = CollectingSink::default();
        let snapshot = ProgressSnapshot::capture(
            &ScanMetrics::new(1),
            &MatchSet::new(),
            0,
            Instant::now(),
        );
        sink.finish(&snapshot);
        assert_eq!(sink.updates.lock().unwrap().len(), 1);
    }
}
