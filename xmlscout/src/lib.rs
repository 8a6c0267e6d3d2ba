pub mod config;
pub mod copy;
pub mod document;
pub mod errors;
pub mod filters;
pub mod generate;
pub mod metrics;
pub mod predicate;
pub mod results;
pub mod schema;
pub mod search;

pub use config::ScanConfig;
pub use copy::{copy_matches, copy_matches_with_progress};
pub use document::{DocumentParser, Record, XmlDocumentParser};
pub use errors::{ScanError, ScanResult};
pub use predicate::{parse_selection, SearchPredicate};
pub use results::{CopyReport, ScanOutcome};
pub use schema::{discover_fields, load_seed};
pub use search::{scan, LogSink, NullSink, ProgressSink, ProgressSnapshot, Scanner};
