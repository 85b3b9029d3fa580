use std::path::Path;

use super::{Result, SelectorError};

/// Read a manifest: one directory name per line, surrounding whitespace
/// trimmed, blank lines skipped. Duplicates are left for the caller.
pub fn read_manifest(path: &Path) -> Result<Vec<String>> {
    let contents = std::fs::read_to_string(path).map_err(|source| SelectorError::ManifestRead {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}
