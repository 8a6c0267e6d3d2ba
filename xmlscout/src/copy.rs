use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::errors::{ScanError, ScanResult};
use crate::results::CopyReport;

/// Copies each matched document into `output_dir` under its base name,
/// overwriting existing files.
///
/// Creating `output_dir` is the only fatal step. A file that fails to copy is
/// logged, recorded in the report, and the remaining files are still copied.
/// Two sources sharing a base name overwrite each other; the last one wins.
pub fn copy_matches(paths: &[PathBuf], output_dir: &Path) -> ScanResult<CopyReport> {
    copy_with(paths, output_dir, None)
}

/// Same as [`copy_matches`] with a progress bar on the terminal
pub fn copy_matches_with_progress(paths: &[PathBuf], output_dir: &Path) -> ScanResult<CopyReport> {
    let progress = ProgressBar::new(paths.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} files copied")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );

    let report = copy_with(paths, output_dir, Some(&progress));
    progress.finish();
    report
}

fn copy_with(
    paths: &[PathBuf],
    output_dir: &Path,
    progress: Option<&ProgressBar>,
) -> ScanResult<CopyReport> {
    fs::create_dir_all(output_dir)?;

    let mut report = CopyReport::default();
    for source in paths {
        match copy_one(source, output_dir) {
            Ok(destination) => {
                debug!("Copied {} to {}", source.display(), destination.display());
                report.copied.push(destination);
            }
            Err(e) => {
                warn!("{}", e);
                report.failed.push((source.clone(), e.to_string()));
            }
        }
        if let Some(progress) = progress {
            progress.inc(1);
        }
    }

    Ok(report)
}

fn copy_one(source: &Path, output_dir: &Path) -> ScanResult<PathBuf> {
    let file_name = source.file_name().ok_or_else(|| {
        ScanError::copy(
            source,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no file name"),
        )
    })?;
    let destination = output_dir.join(file_name);
    // Copying a file onto itself truncates it before reading
    if is_same_file(source, &destination) {
        return Err(ScanError::copy(
            source,
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "source and destination are the same file",
            ),
        ));
    }
    fs::copy(source, &destination).map_err(|e| ScanError::copy(source, e))?;
    Ok(destination)
}

fn is_same_file(source: &Path, destination: &Path) -> bool {
    match (fs::canonicalize(source), fs::canonicalize(destination)) {
        (Ok(source), Ok(destination)) => source == destination,
        _ => false,
    }
}
