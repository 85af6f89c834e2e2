use crate::error::Result;
use crate::store;
use colored::Colorize;

/// List installed packages from the store.
pub fn list(show_versions: bool) -> Result<()> {
    let packages = store::list_installed()?;

    if packages.is_empty() {
        println!("No packages installed in {}", store::pkgs_path().display());
        return Ok(());
    }

    if show_versions {
        for pkg in &packages {
            println!("{} {}", pkg.name, pkg.version.dimmed());
        }
    } else {
        let mut names: Vec<&str> = packages.iter().map(|p| p.name.as_str()).collect();
        names.dedup();
        for name in names {
            println!("{}", name);
        }
    }

    Ok(())
}
