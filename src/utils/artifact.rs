//! Artifact path resolution with glob pattern support.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Resolve a potentially glob-patterned artifact path relative to a base
/// directory.
///
/// - If the pattern contains no glob chars (`*`, `?`, `[`, `]`), it is
///   returned unchanged after an existence check
/// - If the pattern is a glob, it is expanded and the most recently
///   modified match wins
/// - Returns a `build.artifact_missing` error when nothing matches
pub fn resolve_artifact_path(pattern: &str, base_dir: &Path) -> Result<PathBuf> {
    if !contains_glob_chars(pattern) {
        let path = base_dir.join(pattern);
        if path.is_file() {
            return Ok(path);
        }
        return Err(Error::build_artifact_missing(pattern));
    }

    let full_pattern = base_dir.join(pattern);
    let entries: Vec<PathBuf> = glob::glob(&full_pattern.to_string_lossy())
        .map_err(|e| {
            Error::validation_invalid_argument(
                "artifactPattern",
                format!("Invalid glob pattern '{}': {}", pattern, e),
                Some(pattern.to_string()),
                None,
            )
        })?
        .filter_map(|entry| entry.ok())
        .filter(|p| p.is_file())
        .collect();

    entries
        .into_iter()
        .max_by_key(|p| p.metadata().and_then(|m| m.modified()).ok())
        .ok_or_else(|| Error::build_artifact_missing(pattern))
}

fn contains_glob_chars(pattern: &str) -> bool {
    pattern.contains(['*', '?', '[', ']'])
}
