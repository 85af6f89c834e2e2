//! Isolated runtime environment construction and install-step execution.
//!
//! The installer never runs steps against the caller's environment
//! directly: it builds a private `bin/` directory, links each declared
//! dependency's executable into it, and prepends it to `PATH` for every
//! step. Steps run via `sh -c` from the extracted source root, with
//! `STEEP_PREFIX` pointing at the target package dir, and stop at the
//! first non-zero exit.

use crate::error::{Result, SteepError};
use crate::store;
use anyhow::Context;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Isolated environment the install steps run in.
#[derive(Debug)]
pub struct RuntimeEnv {
    pub bin_dir: PathBuf,
    path_value: OsString,
}

impl RuntimeEnv {
    /// Build the environment under `env_root`, linking each dependency
    /// in declared order. Fails before any step runs if a dependency
    /// cannot be resolved.
    pub fn build(env_root: &Path, dependencies: &[String]) -> Result<Self> {
        let bin_dir = env_root.join("bin");
        fs::create_dir_all(&bin_dir)
            .with_context(|| format!("failed to create {}", bin_dir.display()))?;

        for dependency in dependencies {
            let (exe_name, exe_path) = resolve_dependency(dependency)?;
            link_executable(&exe_path, &bin_dir.join(&exe_name))?;
            tracing::debug!(%dependency, path = %exe_path.display(), "linked into runtime env");
        }

        let current = std::env::var_os("PATH").unwrap_or_default();
        let path_value = std::env::join_paths(
            std::iter::once(bin_dir.clone()).chain(std::env::split_paths(&current)),
        )
        .context("PATH contains an invalid entry")?;

        Ok(Self {
            bin_dir,
            path_value,
        })
    }

    /// The `PATH` value steps see: the env's bin first, then the
    /// caller's search path.
    pub fn path_value(&self) -> &OsString {
        &self.path_value
    }
}

/// Run install steps in declared order, failing fast on the first
/// non-zero exit.
pub fn run_steps(
    env: &RuntimeEnv,
    steps: &[String],
    source_root: &Path,
    install_prefix: &Path,
) -> Result<()> {
    for (index, step) in steps.iter().enumerate() {
        tracing::debug!(index, %step, "running install step");

        let output = Command::new("sh")
            .arg("-c")
            .arg(step)
            .current_dir(source_root)
            .env("PATH", env.path_value())
            .env("STEEP_PREFIX", install_prefix)
            .output()
            .with_context(|| format!("failed to spawn install step {}", index))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if !stderr.trim().is_empty() {
                tracing::error!(index, "install step stderr:\n{}", stderr.trim_end());
            }
            return Err(SteepError::InstallStepFailed {
                index,
                step: step.clone(),
                code: output.status.code().unwrap_or(-1),
            });
        }
    }

    Ok(())
}

/// Executable names a dependency may resolve to. A versioned name like
/// `python@3.11` is also tried as `python3.11` and `python`.
fn executable_candidates(dependency: &str) -> Vec<String> {
    let mut candidates = vec![dependency.to_string()];

    if let Some(at) = dependency.find('@') {
        candidates.push(dependency.replace('@', ""));
        candidates.push(dependency[..at].to_string());
    }

    candidates
}

/// Resolve a dependency to an executable, preferring steep's own store
/// over the caller's `PATH`.
fn resolve_dependency(dependency: &str) -> Result<(String, PathBuf)> {
    if let Some(installed) = store::get_installed_versions(dependency)?.first() {
        let bin = installed.path.join("bin");
        for candidate in executable_candidates(dependency) {
            let path = bin.join(&candidate);
            if is_executable(&path) {
                return Ok((candidate, path));
            }
        }
    }

    let search_path = std::env::var_os("PATH").unwrap_or_default();
    for dir in std::env::split_paths(&search_path) {
        for candidate in executable_candidates(dependency) {
            let path = dir.join(&candidate);
            if is_executable(&path) {
                return Ok((candidate, path));
            }
        }
    }

    Err(SteepError::DependencyNotFound(dependency.to_string()))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.is_file()
        && fs::metadata(path)
            .map(|m| m.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(unix)]
fn link_executable(source: &Path, dest: &Path) -> Result<()> {
    if dest.exists() {
        fs::remove_file(dest)?;
    }
    std::os::unix::fs::symlink(source, dest)
        .with_context(|| format!("failed to link {}", dest.display()))?;
    Ok(())
}

#[cfg(not(unix))]
fn link_executable(source: &Path, dest: &Path) -> Result<()> {
    fs::copy(source, dest).with_context(|| format!("failed to copy {}", dest.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidates_for_versioned_dependency() {
        assert_eq!(
            executable_candidates("python@3.11"),
            vec!["python@3.11", "python3.11", "python"]
        );
        assert_eq!(executable_candidates("jq"), vec!["jq"]);
    }

    #[test]
    fn missing_dependency_fails_before_steps() {
        let dir = tempfile::tempdir().unwrap();
        let err =
            RuntimeEnv::build(&dir.path().join("env"), &["definitely-not-a-real-tool-xyz".into()])
                .unwrap_err();
        assert!(matches!(err, SteepError::DependencyNotFound(_)));
    }

    #[test]
    fn steps_run_in_order_and_fail_fast() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("src");
        let prefix = dir.path().join("prefix");
        fs::create_dir_all(&source).unwrap();
        fs::create_dir_all(&prefix).unwrap();

        let env = RuntimeEnv::build(&dir.path().join("env"), &[]).unwrap();

        let steps = vec![
            "echo first > ran_first".to_string(),
            "exit 7".to_string(),
            "touch ran_third".to_string(),
        ];

        let err = run_steps(&env, &steps, &source, &prefix).unwrap_err();
        match err {
            SteepError::InstallStepFailed { index, code, .. } => {
                assert_eq!(index, 1);
                assert_eq!(code, 7);
            }
            other => panic!("unexpected error: {other}"),
        }

        assert!(source.join("ran_first").exists());
        assert!(!source.join("ran_third").exists());
    }

    #[test]
    fn steps_see_prefix_and_env_bin_first() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("src");
        let prefix = dir.path().join("prefix");
        fs::create_dir_all(&source).unwrap();
        fs::create_dir_all(&prefix).unwrap();

        let env = RuntimeEnv::build(&dir.path().join("env"), &[]).unwrap();

        let steps = vec![r#"mkdir -p "$STEEP_PREFIX/bin" && echo ok > "$STEEP_PREFIX/bin/marker""#
            .to_string()];
        run_steps(&env, &steps, &source, &prefix).unwrap();

        assert!(prefix.join("bin/marker").exists());

        // PATH starts with the isolated env's bin.
        let path = env.path_value().to_string_lossy().into_owned();
        assert!(path.starts_with(env.bin_dir.to_string_lossy().as_ref()));
    }
}
