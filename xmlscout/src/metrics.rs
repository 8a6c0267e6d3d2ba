use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tracing::debug;

/// Counters owned by one worker. Only that worker writes; the progress
/// reporter reads copies.
#[derive(Debug, Default)]
struct WorkerSlot {
    files_processed: AtomicU64,
    durations: Mutex<Vec<Duration>>,
}

/// Shared counters for one scan run: the scanned-file total plus one slot per
/// worker
#[derive(Debug)]
pub struct ScanMetrics {
    files_scanned: AtomicU64,
    files_failed: AtomicU64,
    workers: Vec<WorkerSlot>,
}

impl ScanMetrics {
    /// Creates metrics with `worker_count` slots
    pub fn new(worker_count: usize) -> Self {
        Self {
            files_scanned: AtomicU64::new(0),
            files_failed: AtomicU64::new(0),
            workers: (0..worker_count).map(|_| WorkerSlot::default()).collect(),
        }
    }

    /// Records that a worker claimed a file
    pub fn record_scanned(&self) {
        self.files_scanned.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a successfully processed file and how long it took
    pub fn record_file(&self, worker: usize, elapsed: Duration) {
        if let Some(slot) = self.workers.get(worker) {
            slot.files_processed.fetch_add(1, Ordering::Relaxed);
            slot.durations
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(elapsed);
        }
    }

    /// Records a file that could not be parsed. It counts as processed by the
    /// worker but contributes no duration sample.
    pub fn record_failure(&self, worker: usize) {
        self.files_failed.fetch_add(1, Ordering::Relaxed);
        if let Some(slot) = self.workers.get(worker) {
            slot.files_processed.fetch_add(1, Ordering::Relaxed);
        }
        debug!("Worker {} skipped an unreadable file", worker);
    }

    pub fn files_scanned(&self) -> u64 {
        self.files_scanned.load(Ordering::Relaxed)
    }

    pub fn files_failed(&self) -> u64 {
        self.files_failed.load(Ordering::Relaxed)
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Copies every worker's counters and computes its median duration
    pub fn worker_snapshots(&self) -> Vec<WorkerSnapshot> {
        self.workers
            .iter()
            .enumerate()
            .map(|(worker, slot)| {
                let mut samples = slot
                    .durations
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .clone();
                WorkerSnapshot {
                    worker,
                    files_processed: slot.files_processed.load(Ordering::Relaxed),
                    samples: samples.len(),
                    median: median_duration(&mut samples),
                }
            })
            .collect()
    }
}

/// Point-in-time view of one worker
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkerSnapshot {
    pub worker: usize,
    pub files_processed: u64,
    /// Number of duration samples behind `median`
    pub samples: usize,
    pub median: Option<Duration>,
}

/// Sorts `samples` and returns the element at index `len / 2`.
///
/// Even-sized samples are not averaged: `[1, 2, 3, 4]` yields `3`.
pub fn median_duration(samples: &mut [Duration]) -> Option<Duration> {
    if samples.is_empty() {
        return None;
    }
    samples.sort_unstable();
    Some(samples[samples.len() / 2])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn secs(values: &[f64]) -> Vec<Duration> {
        values.iter().map(|v| Duration::from_secs_f64(*v)).collect()
    }

    #[test]
    fn test_median_odd_samples() {
        let mut samples = secs(&[0.5, 0.1, 0.3]);
        assert_eq!(
            median_duration(&mut samples),
            Some(Duration::from_secs_f64(0.3))
        );
    }

    #[test]
    fn test_median_even_samples_uses_index_half_len() {
        let mut samples = secs(&[0.4, 0.1, 0.3, 0.2]);
        assert_eq!(
            median_duration(&mut samples),
            Some(Duration::from_secs_f64(0.3))
        );
        assert_eq!(samples, secs(&[0.1, 0.2, 0.3, 0.4]));
    }

    #[test]
    fn test_median_edge_cases() {
        assert_eq!(median_duration(&mut []), None);
        let mut one = secs(&[0.7]);
        assert_eq!(median_duration(&mut one), Some(Duration::from_secs_f64(0.7)));
    }

    #[test]
    fn test_worker_snapshots() {
        let metrics = ScanMetrics::new(2);
        metrics.record_scanned();
        metrics.record_scanned();
        metrics.record_scanned();
        metrics.record_file(0, Duration::from_millis(30));
        metrics.record_file(0, Duration::from_millis(10));
        metrics.record_failure(1);

        assert_eq!(metrics.files_scanned(), 3);
        assert_eq!(metrics.files_failed(), 1);
        assert_eq!(metrics.worker_count(), 2);

        let snapshots = metrics.worker_snapshots();
        assert_eq!(snapshots[0].files_processed, 2);
        assert_eq!(snapshots[0].samples, 2);
        assert_eq!(snapshots[0].median, Some(Duration::from_millis(30)));
        assert_eq!(snapshots[1].files_processed, 1);
        assert_eq!(snapshots[1].samples, 0);
        assert_eq!(snapshots[1].median, None);
    }

    #[test]
    fn test_out_of_range_worker_is_ignored() {
        let metrics = ScanMetrics::new(1);
        metrics.record_file(5, Duration::from_millis(1));
        assert_eq!(metrics.worker_snapshots()[0].files_processed, 0);
    }

    #[test]
    fn test_concurrent_scanned_counter() {
        let metrics = Arc::new(ScanMetrics::new(4));
        let handles: Vec<_> = (0..4)
            .map(|worker| {
                let metrics = Arc::clone(&metrics);
                thread::spawn(move || {
                    for _ in 0..1000 {
                        metrics.record_scanned();
                        metrics.record_file(worker, Duration::from_micros(5));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(metrics.files_scanned(), 4000);
        assert!(metrics
            .worker_snapshots()
            .iter()
            .all(|w| w.files_processed == 1000 && w.samples == 1000));
    }
}
