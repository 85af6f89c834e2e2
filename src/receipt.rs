//! Install receipts.
//!
//! Every successful install writes a `RECEIPT.json` into the package
//! directory recording what was installed, from where, and which files
//! it placed. Receipts back `steep list` and the dependents check in
//! `steep uninstall`.

use crate::descriptor::Descriptor;
use crate::error::Result;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

const RECEIPT_FILE: &str = "RECEIPT.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallReceipt {
    pub installer_version: String,
    pub name: String,
    pub version: String,
    pub source_url: String,
    pub sha256: String,
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// RFC 3339 install time.
    pub installed_at: String,
    /// Files under the package dir, relative paths, sorted.
    #[serde(default)]
    pub installed_files: Vec<String>,
}

impl InstallReceipt {
    /// Build a receipt for a freshly populated package dir.
    pub fn for_install(descriptor: &Descriptor, package_dir: &Path) -> Result<Self> {
        Ok(Self {
            installer_version: format!("steep/{}", env!("CARGO_PKG_VERSION")),
            name: descriptor.name.clone(),
            version: descriptor.version.clone(),
            source_url: descriptor.url.clone(),
            sha256: descriptor.sha256.clone(),
            dependencies: descriptor.dependencies.clone(),
            installed_at: chrono::Utc::now().to_rfc3339(),
            installed_files: list_files(package_dir)?,
        })
    }

    /// Read an existing receipt from a package dir.
    pub fn read(package_dir: &Path) -> Result<Self> {
        let receipt_path = package_dir.join(RECEIPT_FILE);
        let contents = fs::read_to_string(&receipt_path)
            .with_context(|| format!("failed to read receipt: {}", receipt_path.display()))?;
        let receipt: Self = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse receipt: {}", receipt_path.display()))?;
        Ok(receipt)
    }

    /// Write the receipt into the package dir.
    pub fn write(&self, package_dir: &Path) -> Result<()> {
        let receipt_path = package_dir.join(RECEIPT_FILE);
        let json = serde_json::to_string_pretty(self)?;
        fs::write(&receipt_path, json)
            .with_context(|| format!("failed to write receipt: {}", receipt_path.display()))?;
        Ok(())
    }
}

fn list_files(dir: &Path) -> Result<Vec<String>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).follow_links(false) {
        let entry = entry.map_err(|e| anyhow::anyhow!("failed to walk {}: {}", dir.display(), e))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(dir)
            .unwrap_or(entry.path())
            .to_string_lossy()
            .to_string();
        files.push(relative);
    }

    files.sort();
    Ok(files)
}
