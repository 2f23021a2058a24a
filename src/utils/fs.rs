//! Filesystem utilities.

use std::path::Path;

use crate::error::Result;

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Write `contents` to `path` unless it already exists.
///
/// Returns `false` when the file was left untouched.
pub fn write_new(path: impl AsRef<Path>, contents: &str, overwrite: bool) -> Result<bool> {
    let path = path.as_ref();
    if path.exists() && !overwrite {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    std::fs::write(path, contents)?;
    Ok(true)
}
