use crate::error::StampbakError;
use crate::Result;
use std::path::{Path, PathBuf};

/// Characters a path may never contain on the current platform
#[cfg(windows)]
const INVALID_PATH_CHARS: &[char] = &['<', '>', '"', '|'];
#[cfg(not(windows))]
const INVALID_PATH_CHARS: &[char] = &[];

/// Check that a path string is structurally usable as a backup source or target.
///
/// The path must be non-empty, carry a root and have a non-empty parent
/// directory, so a bare root such as `/` is rejected. Nothing on disk is
/// consulted.
pub fn is_valid_path(path: &str) -> bool {
    if path.trim().is_empty() {
        return false;
    }

    if path
        .chars()
        .any(|c| c.is_control() || INVALID_PATH_CHARS.contains(&c))
    {
        return false;
    }

    let path = Path::new(path);
    if !path.has_root() {
        return false;
    }

    match path.parent() {
        Some(parent) => !parent.as_os_str().is_empty(),
        None => false,
    }
}

/// Validate a configured source path and make sure it is an existing directory
pub fn validate_source(path: &str) -> Result<PathBuf> {
    if !is_valid_path(path) {
        return Err(StampbakError::InvalidSourcePath {
            path: path.to_string(),
        });
    }

    let source = PathBuf::from(path);
    if !source.is_dir() {
        return Err(StampbakError::SourceNotFound { path: source });
    }

    Ok(source)
}
