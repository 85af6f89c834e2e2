//! Command implementations for the steep CLI
//!
//! - **install**: the full Loader → Fetcher → Installer → Verifier pipeline
//! - **fetch**: download and checksum-verify into the cache, no install
//! - **show**: descriptor metadata and installed versions
//! - **list**: installed packages from the store
//! - **uninstall**: remove installed versions

pub mod fetch;
pub mod install;
pub mod list;
pub mod show;
pub mod uninstall;

pub use fetch::fetch;
pub use install::install;
pub use list::list;
pub use show::show;
pub use uninstall::uninstall;
