//! Post-install verification.
//!
//! Runs the descriptor's smoke-test command with the installed
//! package's `bin/` first on `PATH` and succeeds iff the combined
//! stdout/stderr contains the expected literal. The command's exit
//! status is deliberately ignored: the contract is on the output, the
//! way a `--version` assertion works.

use crate::descriptor::TestSpec;
use crate::error::{Result, SteepError};
use anyhow::Context;
use std::path::Path;
use std::process::Command;

/// Run the smoke test against an installed package dir.
pub fn verify(install_prefix: &Path, test: &TestSpec, version: &str) -> Result<()> {
    let expected = test.expectation(version);

    let current = std::env::var_os("PATH").unwrap_or_default();
    let path_value = std::env::join_paths(
        std::iter::once(install_prefix.join("bin")).chain(std::env::split_paths(&current)),
    )
    .context("PATH contains an invalid entry")?;

    tracing::debug!(command = %test.command, expected, "running verification");

    let output = Command::new("sh")
        .arg("-c")
        .arg(&test.command)
        .env("PATH", &path_value)
        .env("STEEP_PREFIX", install_prefix)
        .output()
        .with_context(|| format!("failed to spawn test command `{}`", test.command))?;

    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));

    if combined.contains(expected) {
        Ok(())
    } else {
        Err(SteepError::VerificationFailed {
            expected: expected.to_string(),
            actual: combined.trim_end().to_string(),
        })
    }
}
