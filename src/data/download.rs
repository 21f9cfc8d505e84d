// Download helper for the Reuters sample dataset.
//
// The dataset is the one bundled with the `lda` project: 395 Reuters news
// titles over a 4,258-term vocabulary. Files are stored in a platform-appropriate
// directory (~/.local/share/ldasweep/datasets/ on Linux) so they persist across runs.

use std::path::{Path, PathBuf};

use anyhow::Result;
#[cfg(feature = "download")]
use anyhow::Context;
#[cfg(feature = "download")]
use indicatif::{ProgressBar, ProgressStyle};
#[cfg(feature = "download")]
use tracing::info;

#[cfg(feature = "download")]
use super::dataset::dataset_files;

/// Name of the sample dataset.
pub const REUTERS: &str = "reuters";

/// Raw-file location of the sample dataset.
#[cfg(feature = "download")]
const REUTERS_BASE_URL: &str =
    "https://raw.githubusercontent.com/lda-project/lda/develop/lda/tests";

/// Returns the default directory for storing datasets.
/// Uses the platform data directory: ~/.local/share/ldasweep/datasets/ on Linux.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ldasweep")
        .join("datasets")
}

/// Download the Reuters sample dataset into `dir`.
///
/// Skips files that already exist. Creates the directory as needed.
#[cfg(feature = "download")]
pub async fn download_reuters(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create data directory: {}", dir.display()))?;

    for path in dataset_files(dir, REUTERS) {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        if path.exists() {
            info!(file = %file_name, "Dataset file already exists, skipping");
            println!("  {file_name} (already exists)");
            continue;
        }

        println!("  Downloading {file_name}...");
        download_file(&format!("{REUTERS_BASE_URL}/{file_name}"), &path).await?;
    }

    Ok(())
}

/// Download a single file from a URL to a local path.
#[cfg(feature = "download")]
async fn download_file(url: &str, dest: &Path) -> Result<()> {
    let response = reqwest::get(url)
        .await
        .with_context(|| format!("Failed to download {url}"))?;

    if !response.status().is_success() {
        anyhow::bail!("Download failed with status {}: {}", response.status(), url);
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("    {spinner} {msg}")
            .context("invalid progress template")?,
    );
    pb.set_message(url.to_string());

    let bytes = response
        .bytes()
        .await
        .context("Failed to read response body")?;

    std::fs::write(dest, &bytes).with_context(|| format!("Failed to write {}", dest.display()))?;
    pb.finish_and_clear();

    info!(url, dest = %dest.display(), bytes = bytes.len(), "Downloaded dataset file");
    Ok(())
}

#[cfg(not(feature = "download"))]
pub async fn download_reuters(_dir: &Path) -> Result<()> {
    anyhow::bail!(
        "This build has no download support.\n\
         Rebuild with: cargo build --features download"
    )
}
