use ignore::WalkBuilder;
use rayon::prelude::*;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, Thread};
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

use super::aggregator::MatchSet;
use super::matcher::DocumentMatcher;
use super::progress::{run_reporter, ProgressSink, ProgressSnapshot, ReporterContext};
use crate::config::{default_worker_count, ScanConfig};
use crate::document::{DocumentParser, XmlDocumentParser};
use crate::errors::{ScanError, ScanResult};
use crate::filters::is_eligible_document;
use crate::metrics::ScanMetrics;
use crate::predicate::SearchPredicate;
use crate::results::ScanOutcome;

/// Scans the configured input directory with the configured worker count
pub fn scan(
    config: &ScanConfig,
    predicate: &SearchPredicate,
    sink: &dyn ProgressSink,
) -> ScanResult<ScanOutcome> {
    Scanner::from_config(config)?.scan(&config.input_dir, predicate, sink)
}

/// Runs the parse → match → record pipeline over a directory of documents
/// on a fixed pool of workers
#[derive(Debug, Clone)]
pub struct Scanner<P> {
    parser: P,
    extension: String,
    ignore_patterns: Vec<String>,
    worker_count: NonZeroUsize,
    refresh_interval: Duration,
    cancel: Option<Arc<AtomicBool>>,
}

impl Scanner<XmlDocumentParser> {
    pub fn from_config(config: &ScanConfig) -> ScanResult<Self> {
        Ok(Scanner::new(XmlDocumentParser::from_config(config))
            .with_extension(&config.extension)
            .with_ignore_patterns(config.ignore_patterns.clone())
            .with_workers(config.worker_count)
            .with_refresh_interval(config.refresh_interval()?))
    }
}

impl<P: DocumentParser> Scanner<P> {
    pub fn new(parser: P) -> Self {
        Self {
            parser,
            extension: "xml".to_string(),
            ignore_patterns: Vec::new(),
            worker_count: default_worker_count(),
            refresh_interval: Duration::from_secs(1),
            cancel: None,
        }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn with_ignore_patterns(mut self, ignore_patterns: Vec<String>) -> Self {
        self.ignore_patterns = ignore_patterns;
        self
    }

    pub fn with_workers(mut self, worker_count: NonZeroUsize) -> Self {
        self.worker_count = worker_count;
        self
    }

    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    /// Once `cancel` is set, workers skip every file they have not started
    pub fn with_cancellation(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Lists the eligible documents directly inside `dir`.
    ///
    /// Any failure to read the directory is fatal.
    pub fn enumerate(&self, dir: &Path) -> ScanResult<Vec<PathBuf>> {
        let metadata =
            std::fs::metadata(dir).map_err(|e| ScanError::directory(dir, e.to_string()))?;
        if !metadata.is_dir() {
            return Err(ScanError::directory(dir, "not a directory"));
        }
        std::fs::read_dir(dir).map_err(|e| ScanError::directory(dir, e.to_string()))?;

        let mut builder = WalkBuilder::new(dir);
        builder
            .standard_filters(false)
            .follow_links(true)
            .max_depth(Some(1));

        let mut files = Vec::new();
        for entry in builder.build() {
            // Only the directory itself is fatal; a bad entry inside it is skipped
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping entry in {}: {}", dir.display(), e);
                    continue;
                }
            };
            if entry.depth() == 0 || !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }
            if is_eligible_document(entry.path(), &self.extension, &self.ignore_patterns) {
                trace!("Adding document: {}", entry.path().display());
                files.push(entry.into_path());
            }
        }

        debug!("Found {} documents in {}", files.len(), dir.display());
        Ok(files)
    }

    /// Scans every eligible document in `dir` against `predicate`.
    ///
    /// A reporter thread feeds `sink` while the workers run. The outcome is
    /// built only after the worker pool and the reporter have both been joined.
    pub fn scan(
        &self,
        dir: &Path,
        predicate: &SearchPredicate,
        sink: &dyn ProgressSink,
    ) -> ScanResult<ScanOutcome> {
        let files = self.enumerate(dir)?;
        let worker_count = self.worker_count.get();

        info!(
            "Scanning {} documents in {} with {} worker(s) for {}",
            files.len(),
            dir.display(),
            worker_count,
            describe(predicate)
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(worker_count)
            .thread_name(|i| format!("xmlscout-worker-{}", i))
            .build()
            .map_err(|e| ScanError::WorkerPool(e.to_string()))?;

        let metrics = ScanMetrics::new(worker_count);
        let matches = MatchSet::new();
        let matcher = DocumentMatcher::new(predicate);
        let done = AtomicBool::new(false);
        let files_total = files.len() as u64;
        let started = Instant::now();

        thread::scope(|scope| -> ScanResult<()> {
            let reporter = scope.spawn(|| {
                run_reporter(ReporterContext {
                    metrics: &metrics,
                    matches: &matches,
                    files_total,
                    started,
                    interval: self.refresh_interval,
                    done: &done,
                    sink,
                })
            });

            {
                let _signal = DoneSignal {
                    done: &done,
                    reporter: reporter.thread().clone(),
                };
                // Each file is its own job so idle workers steal one file at a time
                pool.install(|| {
                    files
                        .par_iter()
                        .with_max_len(1)
                        .for_each(|path| self.process(path, &matcher, &metrics, &matches));
                });
            }

            reporter
                .join()
                .map_err(|_| ScanError::WorkerPool("progress reporter panicked".to_string()))
        })?;

        let elapsed = started.elapsed();
        let final_snapshot = ProgressSnapshot {
            files_scanned: metrics.files_scanned(),
            files_total,
            files_matched: matches.snapshot_count(),
            elapsed,
            workers: metrics.worker_snapshots(),
        };
        sink.finish(&final_snapshot);

        let cancelled = self.is_cancelled();
        let outcome = ScanOutcome {
            matches: matches.into_paths(),
            files_enumerated: files_total,
            files_scanned: final_snapshot.files_scanned,
            files_failed: metrics.files_failed(),
            elapsed,
            workers: final_snapshot.workers,
            cancelled,
        };

        info!(
            "Scan complete. {} of {} documents matched in {}",
            outcome.matches.len(),
            outcome.files_scanned,
            humantime::format_duration(elapsed)
        );
        Ok(outcome)
    }

    fn process(
        &self,
        path: &Path,
        matcher: &DocumentMatcher<'_>,
        metrics: &ScanMetrics,
        matches: &MatchSet,
    ) {
        if self.is_cancelled() {
            return;
        }

        let worker = rayon::current_thread_index().unwrap_or(0);
        metrics.record_scanned();
        let started = Instant::now();

        match self.parser.parse(path) {
            Ok(records) => {
                if matcher.document_matches(&records) {
                    trace!("Worker {} matched {}", worker, path.display());
                    matches.append(path.to_path_buf());
                }
                metrics.record_file(worker, started.elapsed());
            }
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                metrics.record_failure(worker);
            }
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|cancel| cancel.load(Ordering::Relaxed))
    }
}

/// Raises the done flag and wakes the reporter when dropped, including when a
/// worker panic unwinds through the scan
struct DoneSignal<'a> {
    done: &'a AtomicBool,
    reporter: Thread,
}

impl Drop for DoneSignal<'_> {
    fn drop(&mut self) {
        self.done.store(true, Ordering::Release);
        self.reporter.unpark();
    }
}

fn describe(predicate: &SearchPredicate) -> String {
    predicate
        .terms()
        .iter()
        .map(|term| format!("{} = {:?}", term.field, term.value))
        .collect::<Vec<_>>()
        .join(" and ")
}
