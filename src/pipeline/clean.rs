//! Remove stale signed artifacts from the dist directory.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::error::Result;
use crate::pipeline::glob_files;

#[derive(Debug, Clone, Default, Serialize)]
pub struct CleanReport {
    pub removed: Vec<PathBuf>,
}

/// Delete every file in `dist_dir` matching `pattern`.
///
/// Succeeds when nothing matches or `dist_dir` does not exist.
pub fn clean(dist_dir: &Path, pattern: &str) -> Result<CleanReport> {
    let mut report = CleanReport::default();
    for path in glob_files(dist_dir, pattern)? {
        match std::fs::remove_file(&path) {
            Ok(()) => {
                debug!(path = %path.display(), "removed");
                report.removed.push(path);
            }
            // gone between the glob and the unlink
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }
    }
    Ok(report)
}
