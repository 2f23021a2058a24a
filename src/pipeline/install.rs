//! Copy the signed artifact into the consuming project.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::error::{PackError, Result};
use crate::pipeline::glob_files;
use crate::utils::fs::ensure_dir;

#[derive(Debug, Clone, Serialize)]
pub struct InstallReport {
    pub artifact: PathBuf,
    pub destination: PathBuf,
    pub bytes: u64,
}

/// The single file in `dist_dir` matching `pattern`.
pub fn find_artifact(dist_dir: &Path, pattern: &str) -> Result<PathBuf> {
    let mut matches = glob_files(dist_dir, pattern)?;
    match matches.len() {
        0 => Err(PackError::ArtifactNotFound {
            pattern: pattern.to_string(),
            dir: dist_dir.to_path_buf(),
        }),
        1 => Ok(matches.remove(0)),
        _ => Err(PackError::AmbiguousArtifact {
            pattern: pattern.to_string(),
            candidates: matches,
        }),
    }
}

/// Copy the signed artifact to `destination`, creating parent directories.
pub fn install(dist_dir: &Path, pattern: &str, destination: &Path) -> Result<InstallReport> {
    let artifact = find_artifact(dist_dir, pattern)?;

    if let Some(parent) = destination.parent() {
        ensure_dir(parent)?;
    }
    let bytes = std::fs::copy(&artifact, destination)?;
    info!(
        artifact = %artifact.display(),
        destination = %destination.display(),
        bytes,
        "installed"
    );

    Ok(InstallReport {
        artifact,
        destination: destination.to_path_buf(),
        bytes,
    })
}
