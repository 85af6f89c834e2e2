//! Source archive extraction.
//!
//! Unpacks the downloaded tar.gz into the working directory and locates
//! the source root: archives conventionally contain a single top-level
//! directory (`name-version/`), but a bare file listing is accepted too.

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use std::fs;
use std::path::{Path, PathBuf};
use tar::Archive;

/// Unpack `archive_path` into `dest` and return the source root.
pub fn extract_archive(archive_path: &Path, dest: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dest)
        .with_context(|| format!("failed to create extraction dir: {}", dest.display()))?;

    let file = fs::File::open(archive_path)
        .with_context(|| format!("failed to open archive: {}", archive_path.display()))?;
    let decompressor = GzDecoder::new(file);
    let mut archive = Archive::new(decompressor);

    archive
        .unpack(dest)
        .with_context(|| format!("failed to extract archive to: {}", dest.display()))?;

    source_root(dest)
}

/// A single top-level directory is the source root; otherwise the
/// extraction dir itself is.
fn source_root(dest: &Path) -> Result<PathBuf> {
    let entries: Vec<_> = fs::read_dir(dest)
        .with_context(|| format!("failed to read extraction dir: {}", dest.display()))?
        .filter_map(|e| e.ok())
        .collect();

    if entries.is_empty() {
        anyhow::bail!("archive was empty: nothing extracted to {}", dest.display());
    }

    if entries.len() == 1 && entries[0].path().is_dir() {
        return Ok(entries[0].path());
    }

    Ok(dest.to_path_buf())
}
