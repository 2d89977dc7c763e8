// IconForge - platform/fs.rs
//
// Filesystem helpers for the output tree. Every failure carries the path and
// the operation so the fatal error names exactly what went wrong.

use crate::util::error::IconForgeError;
use std::path::Path;

/// Create `dir` and any missing parents. Succeeds if it already exists.
pub fn ensure_dir(dir: &Path) -> Result<(), IconForgeError> {
    std::fs::create_dir_all(dir).map_err(|source| IconForgeError::Io {
        path: dir.to_path_buf(),
        operation: "create directory",
        source,
    })
}

/// Write `bytes` to `path`, creating the parent directory if needed.
///
/// Returns the byte length actually on disk after the write.
pub fn write_file(path: &Path, bytes: &[u8]) -> Result<u64, IconForgeError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_dir(parent)?;
        }
    }
    std::fs::write(path, bytes).map_err(|source| IconForgeError::Io {
        path: path.to_path_buf(),
        operation: "write file",
        source,
    })?;
    let meta = std::fs::metadata(path).map_err(|source| IconForgeError::Io {
        path: path.to_path_buf(),
        operation: "stat file",
        source,
    })?;
    tracing::trace!(path = %path.display(), bytes = meta.len(), "Wrote file");
    Ok(meta.len())
}
