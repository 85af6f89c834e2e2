use crate::descriptor::Descriptor;
use crate::error::Result;
use crate::store;
use colored::Colorize;
use std::path::Path;

/// Print descriptor metadata and any installed versions.
pub fn show(descriptor_path: &Path, json: bool) -> Result<()> {
    let descriptor = Descriptor::load(descriptor_path)?;

    if json {
        println!("{}", descriptor.to_json()?);
        return Ok(());
    }

    println!(
        "{}",
        format!("==> {} {}", descriptor.name, descriptor.version)
            .bold()
            .green()
    );
    if let Some(desc) = &descriptor.desc {
        println!("{}", desc);
    }
    if let Some(homepage) = &descriptor.homepage {
        println!("{}: {}", "Homepage".bold(), homepage);
    }
    println!("{}: {}", "Source".bold(), descriptor.url);
    println!("{}: {}", "SHA-256".bold(), descriptor.sha256.dimmed());

    if !descriptor.dependencies.is_empty() {
        println!(
            "{}: {}",
            "Dependencies".bold(),
            descriptor.dependencies.join(", ")
        );
    }
    if !descriptor.install.is_empty() {
        println!("{}:", "Install steps".bold());
        for step in &descriptor.install {
            println!("  {}", step);
        }
    }
    if let Some(test) = &descriptor.test {
        println!(
            "{}: `{}` must contain {:?}",
            "Test".bold(),
            test.command,
            test.expectation(&descriptor.version)
        );
    }

    let installed = store::get_installed_versions(&descriptor.name)?;
    if installed.is_empty() {
        println!("{}: not installed", "Installed".bold());
    } else {
        println!("{}:", "Installed".bold());
        for pkg in &installed {
            println!("  {} {}", pkg.version, pkg.path.display().to_string().dimmed());
        }
    }

    Ok(())
}
