use crate::descriptor::Descriptor;
use crate::download;
use crate::error::Result;
use crate::extract;
use crate::receipt::InstallReceipt;
use crate::runtime::{self, RuntimeEnv};
use crate::store;
use crate::verify;
use crate::workspace::Workspace;
use colored::Colorize;
use std::fs;
use std::path::Path;

pub async fn install(descriptor_path: &Path, dry_run: bool, keep_workdir: bool) -> Result<()> {
    let descriptor = Descriptor::load(descriptor_path)?;

    println!(
        "Installing {} {}",
        descriptor.name.bold(),
        descriptor.version.dimmed()
    );

    let already = store::get_installed_versions(&descriptor.name)?;
    if already.iter().any(|p| p.version == descriptor.version) {
        println!(
            "  {} {} {} is already installed",
            "⚠".yellow(),
            descriptor.name.bold(),
            descriptor.version
        );
        println!("    Run {} first to reinstall", "steep uninstall".dimmed());
        return Ok(());
    }

    if dry_run {
        println!("  {} source: {}", "·".dimmed(), descriptor.url.cyan());
        println!(
            "  {} dependencies: {}",
            "·".dimmed(),
            if descriptor.dependencies.is_empty() {
                "none".to_string()
            } else {
                descriptor.dependencies.join(", ")
            }
        );
        println!(
            "  {} install steps: {}",
            "·".dimmed(),
            descriptor.install.len()
        );
        println!("{} Dry run complete - nothing was installed", "✓".green());
        return Ok(());
    }

    let mut workspace = Workspace::create(&descriptor)?;
    let result = run_pipeline(&descriptor, &mut workspace).await;

    // Cleanup happens on every exit path: a failed run removes the
    // partially populated package dir, and dropping the workspace
    // removes the scoped working directory unless the caller asked to
    // keep it.
    if let Err(e) = result {
        if workspace.install_prefix.exists() {
            let _ = fs::remove_dir_all(&workspace.install_prefix);
        }
        if keep_workdir {
            println!(
                "  {} working directory kept at {}",
                "ℹ".cyan(),
                workspace.keep().display()
            );
        }
        return Err(e);
    }

    if keep_workdir {
        println!(
            "  {} working directory kept at {}",
            "ℹ".cyan(),
            workspace.keep().display()
        );
    }

    println!(
        "{} Installed {} {}",
        "✓".green().bold(),
        descriptor.name.bold().green(),
        descriptor.version.dimmed()
    );

    Ok(())
}

async fn run_pipeline(descriptor: &Descriptor, workspace: &mut Workspace) -> Result<()> {
    // Fetch
    let archive = download::fetch_archive(descriptor, workspace.path()).await?;
    println!(
        "  ├ {} Downloaded {}",
        "✓".green(),
        descriptor.archive_filename().dimmed()
    );

    let source_root = extract::extract_archive(&archive, &workspace.extract_dir())?;
    // The archive is released once extracted; only the tree is needed.
    fs::remove_file(&archive)?;
    workspace.source_root = Some(source_root.clone());
    println!("  ├ {} Extracted source tree", "✓".green());

    // Install
    let env = RuntimeEnv::build(&workspace.env_root(), &descriptor.dependencies)?;
    if !descriptor.dependencies.is_empty() {
        println!(
            "  ├ {} Runtime environment with {}",
            "✓".green(),
            format!(
                "{} dependenc{}",
                descriptor.dependencies.len(),
                if descriptor.dependencies.len() == 1 {
                    "y"
                } else {
                    "ies"
                }
            )
            .dimmed()
        );
    }

    fs::create_dir_all(&workspace.install_prefix)?;
    runtime::run_steps(
        &env,
        &descriptor.install,
        &source_root,
        &workspace.install_prefix,
    )?;
    if !descriptor.install.is_empty() {
        println!(
            "  ├ {} Ran {} install step{}",
            "✓".green(),
            descriptor.install.len(),
            if descriptor.install.len() == 1 { "" } else { "s" }
        );
    }

    let receipt = InstallReceipt::for_install(descriptor, &workspace.install_prefix)?;
    receipt.write(&workspace.install_prefix)?;

    // Verify
    match &descriptor.test {
        Some(test) => {
            verify::verify(&workspace.install_prefix, test, &descriptor.version)?;
            println!(
                "  └ {} Verified `{}` output contains {:?}",
                "✓".green(),
                test.command,
                test.expectation(&descriptor.version)
            );
        }
        None => {
            println!("  └ {} No test command, skipping verification", "ℹ".cyan());
        }
    }

    Ok(())
}
