use crate::error::StampbakError;
use crate::Result;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

/// Name of the directory a source is copied into, before disambiguation
pub fn source_name(source: &Path) -> Result<OsString> {
    if let Some(name) = source.file_name() {
        return Ok(name.to_os_string());
    }

    // Paths such as `/data/photos/..` have no final component until resolved
    let canonical = source
        .canonicalize()
        .map_err(|e| StampbakError::io_at(source, e))?;

    canonical
        .file_name()
        .map(OsStr::to_os_string)
        .ok_or_else(|| {
            StampbakError::validation(format!(
                "Cannot derive a directory name from {}",
                source.display()
            ))
        })
}

/// Find a destination under `backup_path` that nothing on disk occupies yet.
///
/// Candidates are tried in order: `name`, `name(0)`, `name(1)`, ...
pub fn resolve_unique_dir(backup_path: &Path, name: &OsStr) -> Result<PathBuf> {
    let base_path = backup_path.join(name);
    if !base_path.exists() {
        return Ok(base_path);
    }

    for counter in 0..=u32::MAX {
        let mut candidate = name.to_os_string();
        candidate.push(format!("({counter})"));

        let candidate_path = backup_path.join(candidate);
        if !candidate_path.exists() {
            return Ok(candidate_path);
        }
    }

    Err(StampbakError::validation(format!(
        "No free destination name for {} under {}",
        Path::new(name).display(),
        backup_path.display()
    )))
}
