use crate::descriptor::Descriptor;
use crate::download;
use crate::error::Result;
use colored::Colorize;
use std::path::Path;

/// Download and checksum-verify the source archive into the cache
/// without installing.
pub async fn fetch(descriptor_path: &Path) -> Result<()> {
    let descriptor = Descriptor::load(descriptor_path)?;

    println!(
        "Fetching {} {}",
        descriptor.name.bold(),
        descriptor.version.dimmed()
    );

    let path = download::fetch_archive(&descriptor, &download::cache_dir()).await?;

    println!(
        "{} Downloaded to {}",
        "✓".green(),
        path.display().to_string().cyan()
    );

    Ok(())
}
