use crate::error::Result;
use crate::store;
use colored::Colorize;
use std::fs;

/// Remove all installed versions of a package.
///
/// Refuses when another installed package's receipt declares this one
/// as a dependency, unless `--force` is given.
pub fn uninstall(name: &str, force: bool) -> Result<()> {
    let installed = store::get_installed_versions(name)?;
    if installed.is_empty() {
        println!("  {} {} not installed", "⚠".yellow(), name.bold());
        return Ok(());
    }

    if !force {
        let dependents: Vec<_> = store::list_installed()?
            .into_iter()
            .filter(|pkg| pkg.name != name && pkg.dependencies().contains(&name.to_string()))
            .map(|pkg| pkg.name)
            .collect();

        if !dependents.is_empty() {
            println!(
                "  {} Cannot uninstall {} - required by: {}",
                "⚠".yellow(),
                name.bold(),
                dependents.join(", ").cyan()
            );
            println!("    Use {} to force uninstall", "--force".dimmed());
            return Ok(());
        }
    }

    for pkg in &installed {
        println!("  Uninstalling {} {}", name.cyan(), pkg.version.dimmed());
        fs::remove_dir_all(&pkg.path)?;
    }

    // Drop the now-empty package dir.
    let package_path = store::pkgs_path().join(name);
    if package_path.exists() {
        let _ = fs::remove_dir(&package_path);
    }

    println!(
        "{} Uninstalled {} ({} version{})",
        "✓".green(),
        name.bold(),
        installed.len(),
        if installed.len() == 1 { "" } else { "s" }
    );

    Ok(())
}
