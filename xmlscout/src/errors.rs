/// This module defines the error types for xmlscout.
///
/// Errors fall into two groups with very different propagation rules:
///
/// 1. **Fatal errors** abort the run before any scanning starts:
///    - the seed document is missing, unreadable or has no record structure
///    - the input directory is missing or cannot be listed
///    - the field selection or configuration is invalid
///
/// 2. **Per-file errors** are recovered where they happen:
///    - a document that fails to parse during the scan is logged and skipped
///    - a matched file that fails to copy is reported and the copy stage moves on
///
/// Both groups share the [`ScanError`] type; the scheduler and copy stage decide
/// locally which errors are isolated and which are propagated with `?`.
///
/// ```rust,ignore
/// match load_seed(&parser, &seed_path) {
///     Ok(records) => // Discover fields,
///     Err(ScanError::SeedNotFound(path)) => // Tell the user which file is missing,
///     Err(e) => // Any other fatal error
/// }
/// ```
use std::path::PathBuf;
use thiserror::Error;

/// Result type for scan operations
pub type ScanResult<T> = Result<T, ScanError>;

/// Errors that can occur while discovering, scanning or copying documents
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("The file {0} does not exist.")]
    SeedNotFound(PathBuf),
    #[error("No records found in seed document: {0}")]
    NoRecords(PathBuf),
    #[error("Failed to load file {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("No root element <{root}> found in {path}")]
    MissingRoot { path: PathBuf, root: String },
    #[error("Cannot read input directory {path}: {message}")]
    Directory { path: PathBuf, message: String },
    #[error("Invalid field selection: {0}")]
    InvalidSelection(String),
    #[error("Failed to copy {path}: {source}")]
    Copy {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Worker pool error: {0}")]
    WorkerPool(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("XML error: {0}")]
    XmlError(#[from] quick_xml::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl ScanError {
    pub fn seed_not_found(path: impl Into<PathBuf>) -> Self {
        Self::SeedNotFound(path.into())
    }

    pub fn no_records(path: impl Into<PathBuf>) -> Self {
        Self::NoRecords(path.into())
    }

    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn missing_root(path: impl Into<PathBuf>, root: impl Into<String>) -> Self {
        Self::MissingRoot {
            path: path.into(),
            root: root.into(),
        }
    }

    pub fn directory(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Directory {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn invalid_selection(msg: impl Into<String>) -> Self {
        Self::InvalidSelection(msg.into())
    }

    pub fn copy(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Copy {
            path: path.into(),
            source,
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_error_creation() {
        let path = Path::new("stock.xml");
        let err = ScanError::seed_not_found(path);
        assert!(matches!(err, ScanError::SeedNotFound(_)));

        let err = ScanError::parse(path, "unexpected end of file");
        assert!(matches!(err, ScanError::Parse { .. }));

        let err = ScanError::missing_root(path, "stockItem");
        assert!(matches!(err, ScanError::MissingRoot { .. }));

        let err = ScanError::directory("xml_files", "not found");
        assert!(matches!(err, ScanError::Directory { .. }));

        let err = ScanError::invalid_selection("field 9 out of range");
        assert!(matches!(err, ScanError::InvalidSelection(_)));
    }

    #[test]
    fn test_error_messages() {
        let err = ScanError::seed_not_found("./xml_files/missing.xml");
        assert_eq!(
            err.to_string(),
            "The file ./xml_files/missing.xml does not exist."
        );

        let err = ScanError::missing_root("a.xml", "stockItem");
        assert_eq!(err.to_string(), "No root element <stockItem> found in a.xml");

        let err = ScanError::config_error("worker count must be at least 1");
        assert_eq!(
            err.to_string(),
            "Configuration error: worker count must be at least 1"
        );
    }
}
