//! Zip the extension source tree into the unsigned archive.

use std::ffi::{OsStr, OsString};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Component, Path, PathBuf};

use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::debug;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{PackError, Result};
use crate::utils::fs::ensure_dir;

#[derive(Debug, Clone, Serialize)]
pub struct PackReport {
    pub archive: PathBuf,
    /// Archive entry names of regular files, in archive order.
    pub files: Vec<String>,
    pub bytes: u64,
}

/// Write every file under `source_dir` into a zip at `archive`.
///
/// The archive is assembled in a temporary file beside `archive` and renamed
/// into place once complete.
pub fn pack(source_dir: &Path, archive: &Path) -> Result<PackReport> {
    if !source_dir.is_dir() {
        return Err(PackError::SourceMissing(source_dir.to_path_buf()));
    }

    let out_dir = archive
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    ensure_dir(out_dir)?;

    let tmp = NamedTempFile::new_in(out_dir)?;
    let skip = OutputFilter::new(source_dir, out_dir, [archive, tmp.path()])?;
    let mut zip = ZipWriter::new(BufWriter::new(tmp.reopen()?));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o644);
    let dir_options = SimpleFileOptions::default().unix_permissions(0o755);

    let mut files = Vec::new();
    for entry in WalkDir::new(source_dir).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|err| {
            err.into_io_error()
                .map_or_else(|| PackError::Io(io::Error::other("walk loop detected")), PackError::Io)
        })?;
        let path = entry.path();
        if skip.matches(path) {
            debug!(path = %path.display(), "skipping archive inside source tree");
            continue;
        }

        let rel = path
            .strip_prefix(source_dir)
            .map_err(|_| PackError::InvalidEntryPath(path.to_path_buf()))?;
        let name = entry_name(rel)?;

        if entry.file_type().is_dir() {
            zip.add_directory(format!("{name}/"), dir_options)?;
        } else {
            zip.start_file(name.clone(), options)?;
            let mut input = File::open(path)?;
            io::copy(&mut input, &mut zip)?;
            debug!(entry = %name, "added");
            files.push(name);
        }
    }

    let mut writer = zip.finish()?;
    io::Write::flush(&mut writer)?;
    drop(writer);

    tmp.persist(archive).map_err(|err| PackError::Io(err.error))?;
    let bytes = std::fs::metadata(archive)?.len();

    Ok(PackReport {
        archive: archive.to_path_buf(),
        files,
        bytes,
    })
}

/// `/`-separated archive name for a path relative to the source root.
fn entry_name(rel: &Path) -> Result<String> {
    let mut parts = Vec::new();
    for component in rel.components() {
        match component {
            Component::Normal(part) => {
                let part = part
                    .to_str()
                    .ok_or_else(|| PackError::InvalidEntryPath(rel.to_path_buf()))?;
                parts.push(part);
            }
            _ => return Err(PackError::InvalidEntryPath(rel.to_path_buf())),
        }
    }
    Ok(parts.join("/"))
}

/// Recognizes the archive being written when the output directory lies
/// inside the source tree.
struct OutputFilter {
    out_dir: Option<PathBuf>,
    names: Vec<OsString>,
}

impl OutputFilter {
    fn new<'a>(
        source_dir: &Path,
        out_dir: &Path,
        outputs: impl IntoIterator<Item = &'a Path>,
    ) -> Result<Self> {
        let source = source_dir.canonicalize()?;
        let out = out_dir.canonicalize()?;
        let out_dir = out.starts_with(&source).then_some(out);
        let names = outputs
            .into_iter()
            .filter_map(Path::file_name)
            .map(OsStr::to_os_string)
            .collect();
        Ok(Self { out_dir, names })
    }

    fn matches(&self, path: &Path) -> bool {
        let Some(out_dir) = self.out_dir.as_ref() else {
            return false;
        };
        let Some(name) = path.file_name() else {
            return false;
        };
        self.names.iter().any(|n| n == name)
            && path
                .parent()
                .and_then(|p| p.canonicalize().ok())
                .is_some_and(|p| &p == out_dir)
    }
}
