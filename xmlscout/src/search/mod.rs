/// This module implements the concurrent scan-and-match engine.
///
/// # Pipeline
///
/// ```text
/// input dir ──enumerate──▶ [ScanJob, ...] ──rayon pool──▶ parse ─▶ match ─▶ MatchSet
///                                              │
///                                              └──▶ ScanMetrics ◀── reporter thread ──▶ ProgressSink
/// ```
///
/// 1. **Scheduling**: every eligible document becomes one job. Jobs run on a
///    dedicated Rayon pool of exactly `worker_count` threads. Rayon's
///    work-stealing deque hands the next unclaimed document to whichever
///    worker is idle, so a worker stuck on a large document never holds up a
///    statically assigned range of others.
///
/// 2. **Aggregation**: matches go into a mutex-guarded [`MatchSet`]; the
///    scanned-file total is an atomic counter; each worker has its own slot of
///    processed count and duration samples in [`crate::metrics::ScanMetrics`].
///
/// 3. **Reporting**: a scoped thread wakes every refresh interval and hands a
///    [`ProgressSnapshot`] to the caller's [`ProgressSink`]. A done flag ends
///    its loop; joining the pool and then the reporter is what guarantees the
///    final outcome sees every append.
///
/// # Example
///
/// ```rust,ignore
/// let predicate = SearchPredicate::new(fields, vec![(5, "Electronics".to_string())])?;
/// let outcome = Scanner::new(XmlDocumentParser::default())
///     .with_workers(NonZeroUsize::new(8).unwrap())
///     .scan(Path::new("./xml_files/"), &predicate, &LogSink)?;
/// copy_matches(&outcome.matches, Path::new("./XMLs_out/"))?;
/// ```
pub mod aggregator;
pub mod engine;
pub mod matcher;
pub mod progress;

pub use aggregator::MatchSet;
pub use engine::{scan, Scanner};
pub use matcher::DocumentMatcher;
pub use progress::{LogSink, NullSink, ProgressSink, ProgressSnapshot};
