use config::{Config as ConfigBuilder, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::{ScanError, ScanResult};

/// Configuration for a scan run.
///
/// # Configuration Locations
///
/// The configuration can be loaded from multiple locations in order of precedence:
/// 1. Custom config file specified via `--config` flag
/// 2. Local `.xmlscout.yaml` in the current directory
/// 3. Global `$HOME/.config/xmlscout/config.yaml`
///
/// # Configuration Format
///
/// ```yaml
/// # Directory holding the documents to scan
/// input_dir: "./xml_files/"
///
/// # Directory receiving copies of matching documents
/// output_dir: "./XMLs_out/"
///
/// # Document extension, root element and record element
/// extension: "xml"
/// root_element: "stockItem"
/// record_element: "item"
///
/// # Patterns to ignore (glob syntax)
/// ignore_patterns:
///   - "**/draft_*.xml"
///
/// # Worker count (default: CPU cores)
/// worker_count: 4
///
/// # How often the progress display refreshes
/// refresh_interval: "1s"
///
/// # Log level (trace, debug, info, warn, error)
/// log_level: "info"
/// ```
///
/// Command-line arguments take precedence over config file values, see
/// [`ScanConfig::merge_with_cli`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Directory holding the documents to scan
    #[serde(default = "default_input_dir")]
    pub input_dir: PathBuf,

    /// Directory receiving copies of matching documents, created if absent
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Extension identifying scannable documents, compared case-insensitively
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Name of the document root element
    #[serde(default = "default_root_element")]
    pub root_element: String,

    /// Name of the record elements directly under the root
    #[serde(default = "default_record_element")]
    pub record_element: String,

    /// Patterns to ignore (supports glob syntax)
    #[serde(default)]
    pub ignore_patterns: Vec<String>,

    /// Number of scan workers
    /// Defaults to number of CPU cores if not specified
    #[serde(default = "default_worker_count")]
    pub worker_count: NonZeroUsize,

    /// Progress refresh interval in humantime format ("1s", "500ms")
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: String,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_input_dir() -> PathBuf {
    PathBuf::from("./xml_files/")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./XMLs_out/")
}

fn default_extension() -> String {
    "xml".to_string()
}

fn default_root_element() -> String {
    "stockItem".to_string()
}

fn default_record_element() -> String {
    "item".to_string()
}

pub(crate) fn default_worker_count() -> NonZeroUsize {
    NonZeroUsize::new(num_cpus::get()).unwrap_or(NonZeroUsize::MIN)
}

fn default_refresh_interval() -> String {
    "1s".to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            input_dir: default_input_dir(),
            output_dir: default_output_dir(),
            extension: default_extension(),
            root_element: default_root_element(),
            record_element: default_record_element(),
            ignore_patterns: Vec::new(),
            worker_count: default_worker_count(),
            refresh_interval: default_refresh_interval(),
            log_level: default_log_level(),
        }
    }
}

impl ScanConfig {
    /// Loads configuration from the default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Loads configuration from a specific file
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        let config_files = [
            dirs::config_dir().map(|p| p.join("xmlscout/config.yaml")),
            Some(PathBuf::from(".xmlscout.yaml")),
        ];

        for path in config_files.iter().flatten() {
            if path.exists() {
                builder = builder.add_source(File::from(path.as_path()));
            }
        }

        // An explicitly requested file must exist
        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder.build()?.try_deserialize()
    }

    /// Merges CLI arguments with configuration file values.
    ///
    /// Only values the user actually passed are carried in `overrides`.
    pub fn merge_with_cli(mut self, overrides: CliOverrides) -> Self {
        if let Some(input_dir) = overrides.input_dir {
            self.input_dir = input_dir;
        }
        if let Some(output_dir) = overrides.output_dir {
            self.output_dir = output_dir;
        }
        if let Some(worker_count) = overrides.worker_count {
            self.worker_count = worker_count;
        }
        if let Some(log_level) = overrides.log_level {
            self.log_level = log_level;
        }
        self
    }

    /// Parses the configured refresh interval
    pub fn refresh_interval(&self) -> ScanResult<Duration> {
        let interval = humantime::parse_duration(&self.refresh_interval).map_err(|e| {
            ScanError::config_error(format!(
                "invalid refresh_interval '{}': {}",
                self.refresh_interval, e
            ))
        })?;
        if interval.is_zero() {
            return Err(ScanError::config_error("refresh_interval must be non-zero"));
        }
        Ok(interval)
    }
}

/// Values supplied on the command line that override file configuration
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub input_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub worker_count: Option<NonZeroUsize>,
    pub log_level: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_load_config_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.yaml");
        let config_content = r#"
            input_dir: "data/in"
            output_dir: "data/out"
            extension: "XML"
            root_element: "catalog"
            record_element: "entry"
            ignore_patterns: ["**/draft_*.xml"]
            worker_count: 4
            refresh_interval: "250ms"
            log_level: "debug"
        "#;

        let mut file = File::create(&config_path).unwrap();
        file.write_all(config_content.as_bytes()).unwrap();

        let config = ScanConfig::load_from(Some(&config_path)).unwrap();
        assert_eq!(config.input_dir, PathBuf::from("data/in"));
        assert_eq!(config.output_dir, PathBuf::from("data/out"));
        assert_eq!(config.extension, "XML");
        assert_eq!(config.root_element, "catalog");
        assert_eq!(config.record_element, "entry");
        assert_eq!(config.ignore_patterns, vec!["**/draft_*.xml".to_string()]);
        assert_eq!(config.worker_count, NonZeroUsize::new(4).unwrap());
        assert_eq!(
            config.refresh_interval().unwrap(),
            Duration::from_millis(250)
        );
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_default_values() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.yaml");
        std::fs::write(&config_path, "input_dir: \"docs\"\n").unwrap();

        let config = ScanConfig::load_from(Some(&config_path)).unwrap();
        assert_eq!(config.input_dir, PathBuf::from("docs"));
        assert_eq!(config.output_dir, PathBuf::from("./XMLs_out/"));
        assert_eq!(config.extension, "xml");
        assert_eq!(config.root_element, "stockItem");
        assert_eq!(config.record_element, "item");
        assert!(config.ignore_patterns.is_empty());
        assert_eq!(
            config.worker_count,
            NonZeroUsize::new(num_cpus::get()).unwrap()
        );
        assert_eq!(config.refresh_interval().unwrap(), Duration::from_secs(1));
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_merge_with_cli() {
        let file_config = ScanConfig {
            input_dir: PathBuf::from("from_file"),
            worker_count: NonZeroUsize::new(2).unwrap(),
            log_level: "info".to_string(),
            ..ScanConfig::default()
        };

        let merged = file_config.merge_with_cli(CliOverrides {
            input_dir: None,
            output_dir: Some(PathBuf::from("cli_out")),
            worker_count: Some(NonZeroUsize::new(8).unwrap()),
            log_level: None,
        });

        assert_eq!(merged.input_dir, PathBuf::from("from_file")); // File value (CLI None)
        assert_eq!(merged.output_dir, PathBuf::from("cli_out")); // CLI value
        assert_eq!(merged.worker_count, NonZeroUsize::new(8).unwrap()); // CLI value
        assert_eq!(merged.log_level, "info"); // File value
    }

    #[test]
    fn test_invalid_refresh_interval() {
        let config = ScanConfig {
            refresh_interval: "soon".to_string(),
            ..ScanConfig::default()
        };
        assert!(matches!(
            config.refresh_interval(),
            Err(ScanError::ConfigError(_))
        ));

        let config = ScanConfig {
            refresh_interval: "0s".to_string(),
            ..ScanConfig::default()
        };
        assert!(config.refresh_interval().is_err());
    }

    #[test]
    fn test_invalid_config() {
        let config_content = r#"
            input_dir: []
            worker_count: "many"
        "#;

        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.yaml");
        std::fs::write(&config_path, config_content).unwrap();

        let result = ScanConfig::load_from(Some(&config_path));
        assert!(result.is_err(), "Expected error loading invalid config");
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = ScanConfig::load_from(Some(Path::new("nonexistent.yaml")));
        assert!(result.is_err());
    }
}
