//! The package store - prefix detection and installed-package listing.
//!
//! Installed packages live under `<prefix>/pkgs/<name>/<version>/`. The
//! prefix comes from one configuration value, the `STEEP_PREFIX`
//! environment variable, defaulting to `~/.local/steep`.

use crate::error::Result;
use crate::receipt::InstallReceipt;
use anyhow::Context;
use std::fs;
use std::path::PathBuf;

/// Detect the install prefix root.
pub fn prefix_root() -> PathBuf {
    if let Ok(prefix) = std::env::var("STEEP_PREFIX") {
        return PathBuf::from(prefix);
    }

    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".local/steep")
}

/// Directory holding all installed packages.
pub fn pkgs_path() -> PathBuf {
    prefix_root().join("pkgs")
}

/// Install prefix for one package version.
pub fn package_dir(name: &str, version: &str) -> PathBuf {
    pkgs_path().join(name).join(version)
}

/// An installed package version in the store.
#[derive(Debug, Clone)]
pub struct InstalledPackage {
    pub name: String,
    pub version: String,
    pub path: PathBuf,
    pub receipt: Option<InstallReceipt>,
}

impl InstalledPackage {
    fn from_path(name: String, version: String, path: PathBuf) -> Self {
        let receipt = InstallReceipt::read(&path).ok();
        Self {
            name,
            version,
            path,
            receipt,
        }
    }

    /// Dependencies recorded at install time.
    pub fn dependencies(&self) -> &[String] {
        self.receipt
            .as_ref()
            .map(|r| r.dependencies.as_slice())
            .unwrap_or(&[])
    }
}

/// Read all installed packages from the store.
pub fn list_installed() -> Result<Vec<InstalledPackage>> {
    let pkgs = pkgs_path();

    if !pkgs.exists() {
        return Ok(vec![]);
    }

    let mut packages = Vec::new();

    for entry in
        fs::read_dir(&pkgs).with_context(|| format!("failed to read store: {}", pkgs.display()))?
    {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();

        if name.starts_with('.') || !entry.path().is_dir() {
            continue;
        }

        for version_entry in fs::read_dir(entry.path())? {
            let version_entry = version_entry?;
            let version = version_entry.file_name().to_string_lossy().to_string();

            if version.starts_with('.') {
                continue;
            }

            packages.push(InstalledPackage::from_path(
                name.clone(),
                version,
                version_entry.path(),
            ));
        }
    }

    packages.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(packages)
}

/// All installed versions of one package, newest first.
pub fn get_installed_versions(name: &str) -> Result<Vec<InstalledPackage>> {
    let package_path = pkgs_path().join(name);

    if !package_path.exists() {
        return Ok(vec![]);
    }

    let mut packages = Vec::new();

    for entry in fs::read_dir(&package_path)? {
        let entry = entry?;
        let version = entry.file_name().to_string_lossy().to_string();

        if version.starts_with('.') {
            continue;
        }

        packages.push(InstalledPackage::from_path(
            name.to_string(),
            version,
            entry.path(),
        ));
    }

    packages.sort_by(|a, b| compare_versions(&b.version, &a.version));
    Ok(packages)
}

/// Compare two dotted version strings numerically, falling back to a
/// lexicographic comparison for non-numeric components.
pub fn compare_versions(a: &str, b: &str) -> std::cmp::Ordering {
    let a_parts: Vec<u32> = a.split('.').filter_map(|s| s.parse().ok()).collect();
    let b_parts: Vec<u32> = b.split('.').filter_map(|s| s.parse().ok()).collect();

    for i in 0..a_parts.len().max(b_parts.len()) {
        let a_part = a_parts.get(i).unwrap_or(&0);
        let b_part = b_parts.get(i).unwrap_or(&0);
        match a_part.cmp(b_part) {
            std::cmp::Ordering::Equal => continue,
            other => return other,
        }
    }

    a.cmp(b)
}
