//! Source archive download with checksum verification.
//!
//! Downloads are streamed to disk with a progress bar, then verified
//! against the descriptor's SHA-256 before anything else happens.
//! Transient network failures are retried a bounded number of times
//! with backoff; a checksum mismatch is fatal and never retried.

use crate::descriptor::Descriptor;
use crate::error::{Result, SteepError};
use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;

const MAX_ATTEMPTS: u32 = 3;
const RETRY_BASE_DELAY: Duration = Duration::from_millis(500);

/// Download cache directory used by `steep fetch`.
pub fn cache_dir() -> PathBuf {
    if let Some(cache_home) = std::env::var_os("XDG_CACHE_HOME") {
        PathBuf::from(cache_home).join("steep/downloads")
    } else if let Some(home) = std::env::var_os("HOME") {
        PathBuf::from(home).join(".cache/steep/downloads")
    } else {
        PathBuf::from(".cache/steep/downloads")
    }
}

/// Hex SHA-256 of a file.
pub async fn sha256_file(file_path: &Path) -> Result<String> {
    use sha2::{Digest, Sha256};
    use tokio::io::AsyncReadExt;

    let mut file = fs::File::open(file_path).await?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0; 8192];

    loop {
        let n = file.read(&mut buffer).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// Download the descriptor's source archive into `dest_dir` and verify
/// its checksum. An already-present file with a matching checksum is
/// reused without re-downloading.
pub async fn fetch_archive(descriptor: &Descriptor, dest_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dest_dir)
        .await
        .with_context(|| format!("failed to create {}", dest_dir.display()))?;

    let output_path = dest_dir.join(descriptor.archive_filename());

    if output_path.exists() {
        if sha256_file(&output_path).await? == descriptor.sha256 {
            tracing::debug!(path = %output_path.display(), "reusing cached archive");
            return Ok(output_path);
        }
        fs::remove_file(&output_path).await?;
    }

    download_with_retry(&descriptor.url, &output_path, &descriptor.name).await?;

    let actual = sha256_file(&output_path).await?;
    if actual != descriptor.sha256 {
        fs::remove_file(&output_path).await?;
        return Err(SteepError::ChecksumMismatch {
            expected: descriptor.sha256.clone(),
            actual,
        });
    }

    Ok(output_path)
}

/// Connect and timeout failures may be transient; everything else
/// (bad status, decode errors) is not.
fn is_transient(error: &reqwest::Error) -> bool {
    error.is_connect() || error.is_timeout()
}

async fn download_with_retry(url: &str, output_path: &Path, label: &str) -> Result<()> {
    let client = reqwest::Client::new();
    let mut attempt = 0;

    loop {
        match download_once(&client, url, output_path, label).await {
            Ok(()) => return Ok(()),
            Err(SteepError::Network(e)) if is_transient(&e) && attempt + 1 < MAX_ATTEMPTS => {
                let delay = RETRY_BASE_DELAY * 2u32.pow(attempt);
                tracing::warn!(url, attempt, "transient network error, retrying: {}", e);
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

async fn download_once(
    client: &reqwest::Client,
    url: &str,
    output_path: &Path,
    label: &str,
) -> Result<()> {
    let mut response = client.get(url).send().await?.error_for_status()?;

    let pb = if std::io::stdout().is_terminal() {
        let pb = ProgressBar::new(response.content_length().unwrap_or(0));
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec})")
                .unwrap()
                .progress_chars("#>-"),
        );
        pb.set_message(format!("⬇ {}", label));
        pb
    } else {
        ProgressBar::hidden()
    };

    let mut file = fs::File::create(output_path)
        .await
        .with_context(|| format!("failed to create {}", output_path.display()))?;
    let mut downloaded: u64 = 0;

    while let Some(chunk) = response.chunk().await? {
        file.write_all(&chunk).await?;
        downloaded += chunk.len() as u64;
        pb.set_position(downloaded);
    }

    file.flush().await?;
    pb.finish_and_clear();

    Ok(())
}
