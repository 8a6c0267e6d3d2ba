use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

/// The paths of matching documents, appended to concurrently by workers.
///
/// Each document is appended at most once because a worker stops reading a
/// document at its first matching record; the set itself only serializes
/// writers.
#[derive(Debug, Default)]
pub struct MatchSet {
    paths: Mutex<Vec<PathBuf>>,
}

impl MatchSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, path: PathBuf) {
        self.paths
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(path);
    }

    /// Current number of matches; may lag behind in-flight appends
    pub fn snapshot_count(&self) -> usize {
        self.paths
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Consumes the set once all workers have finished
    pub fn into_paths(self) -> Vec<PathBuf> {
        self.paths
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
