use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::metrics::WorkerSnapshot;

/// The final state of a completed scan
#[derive(Debug, Clone, Serialize)]
pub struct ScanOutcome {
    /// Paths of matching documents, each listed once, in no particular order
    pub matches: Vec<PathBuf>,
    /// Number of eligible documents found in the input directory
    pub files_enumerated: u64,
    /// Number of documents workers picked up, including ones that failed to parse
    pub files_scanned: u64,
    /// Number of documents that failed to parse
    pub files_failed: u64,
    pub elapsed: Duration,
    pub workers: Vec<WorkerSnapshot>,
    /// Whether the scan was stopped before every document was visited
    pub cancelled: bool,
}

impl ScanOutcome {
    pub fn files_matched(&self) -> usize {
        self.matches.len()
    }
}

/// What the copy stage did with the matched documents
#[derive(Debug, Clone, Default, Serialize)]
pub struct CopyReport {
    /// Destination paths written
    pub copied: Vec<PathBuf>,
    /// Source paths that could not be copied, with the reason
    pub failed: Vec<(PathBuf, String)>,
}

impl CopyReport {
    pub fn files_copied(&self) -> usize {
        self.copied.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}
