//! Scoped working state for one install run.
//!
//! Each run owns a temporary directory holding the downloaded archive,
//! the extracted source tree, and the isolated runtime environment. The
//! directory is removed when the workspace is dropped, on success and
//! failure alike. `--keep-workdir` opts out for debugging.

use crate::descriptor::Descriptor;
use crate::error::Result;
use crate::store;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Mutable working state, owned exclusively by the running install.
pub struct Workspace {
    dir: TempDir,
    /// Where the source archive is downloaded to.
    pub archive_path: PathBuf,
    /// Root of the extracted source tree, set after extraction.
    pub source_root: Option<PathBuf>,
    /// Target package dir under the store prefix.
    pub install_prefix: PathBuf,
}

impl Workspace {
    pub fn create(descriptor: &Descriptor) -> Result<Self> {
        let dir = tempfile::Builder::new().prefix("steep-").tempdir()?;
        let archive_path = dir.path().join(descriptor.archive_filename());
        let install_prefix = store::package_dir(&descriptor.name, &descriptor.version);

        Ok(Self {
            dir,
            archive_path,
            source_root: None,
            install_prefix,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Where the archive is unpacked.
    pub fn extract_dir(&self) -> PathBuf {
        self.dir.path().join("src")
    }

    /// Root of the isolated runtime environment.
    pub fn env_root(&self) -> PathBuf {
        self.dir.path().join("env")
    }

    /// Persist the working directory instead of removing it, returning
    /// its path.
    pub fn keep(self) -> PathBuf {
        self.dir.keep()
    }
}
