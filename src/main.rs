mod commands;
mod descriptor;
mod download;
mod error;
mod extract;
mod receipt;
mod runtime;
mod store;
mod verify;
mod workspace;

use clap::{CommandFactory, Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "steep")]
#[command(author, version, about = "A descriptor-driven package installer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, install, and verify a package from its descriptor
    Install {
        /// Path to the descriptor file
        descriptor: PathBuf,

        /// Print the plan without downloading or installing
        #[arg(long)]
        dry_run: bool,

        /// Keep the scoped working directory for debugging
        #[arg(long)]
        keep_workdir: bool,
    },

    /// Download and checksum-verify the source archive into the cache
    Fetch {
        /// Path to the descriptor file
        descriptor: PathBuf,
    },

    /// Show descriptor metadata and installed versions
    Show {
        /// Path to the descriptor file
        descriptor: PathBuf,

        /// Output the normalized descriptor as JSON
        #[arg(long)]
        json: bool,
    },

    /// List installed packages
    List {
        /// Show installed versions
        #[arg(long)]
        versions: bool,
    },

    /// Uninstall all installed versions of a package
    Uninstall {
        /// Package name
        name: String,

        /// Ignore dependents (force uninstall)
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Target shell
        shell: clap_complete::Shell,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    if std::env::var("RUST_LOG").is_err() {
        let default = if cli.verbose { "steep=debug" } else { "warn" };
        unsafe {
            std::env::set_var("RUST_LOG", default);
        }
    }
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("{} {}", "✗".red(), e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> error::Result<()> {
    match cli.command {
        Some(Commands::Install {
            descriptor,
            dry_run,
            keep_workdir,
        }) => {
            commands::install(&descriptor, dry_run, keep_workdir).await?;
        }
        Some(Commands::Fetch { descriptor }) => {
            commands::fetch(&descriptor).await?;
        }
        Some(Commands::Show { descriptor, json }) => {
            commands::show(&descriptor, json)?;
        }
        Some(Commands::List { versions }) => {
            commands::list(versions)?;
        }
        Some(Commands::Uninstall { name, force }) => {
            commands::uninstall(&name, force)?;
        }
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(shell, &mut Cli::command(), "steep", &mut std::io::stdout());
        }
        None => {
            println!(
                "{} steep - install packages from declarative descriptors",
                "🍵".bold()
            );
            println!("\nRun {} to see available commands.", "steep --help".cyan());
        }
    }

    Ok(())
}
