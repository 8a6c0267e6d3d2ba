//! Eligibility rules deciding which directory entries become scan jobs.
use glob::Pattern;
use std::path::Path;

/// Checks if a file carries the document extension (case-insensitive)
pub fn has_document_extension(path: &Path, extension: &str) -> bool {
    let wanted = extension.trim_start_matches('.');
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(wanted))
}

/// Checks if a file should be ignored based on ignore patterns
pub fn should_ignore(path: &Path, ignore_patterns: &[String]) -> bool {
    let normalized_path = path.to_string_lossy().replace('\\', "/");

    ignore_patterns.iter().any(|pattern| match Pattern::new(pattern) {
        Ok(p) => p.matches(&normalized_path),
        Err(_) => false,
    })
}

/// Determines if a file becomes a scan job
pub fn is_eligible_document(path: &Path, extension: &str, ignore_patterns: &[String]) -> bool {
    has_document_extension(path, extension) && !should_ignore(path, ignore_patterns)
}
