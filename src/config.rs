use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::data::dataset::dataset_present;
use crate::data::download::{default_data_dir, REUTERS};

/// File names of the artifacts written under the output directory.
pub const RESULTS_FILE: &str = "lda_evaluation_results.json";
pub const PLOT_FILE: &str = "lda_evaluation_plot.svg";
pub const FINAL_MODEL_FILE: &str = "lda_evaluation_finalmodel.json";
pub const SUMMARY_DIR: &str = "lda_evaluation_summary";

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy. CLI flags
/// override individual sweep settings on top of this.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding datasets (`<name>.ldac`, `.tokens`, `.titles`)
    pub data_dir: PathBuf,
    /// Directory receiving archives, the plot and the summary
    pub output_dir: PathBuf,
    /// Dataset to evaluate (default: reuters)
    pub dataset: String,
    /// Maximum number of models fitted in parallel
    pub workers: usize,
    /// tracing filter directive, e.g. `ldasweep=debug`
    pub log_filter: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Everything has a default, so this only fails on malformed values.
    pub fn load() -> Result<Self> {
        let workers = match env::var("LDASWEEP_WORKERS") {
            Ok(v) => parse_workers(&v)?,
            Err(_) => default_workers(),
        };

        Ok(Self {
            data_dir: env::var("LDASWEEP_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_data_dir()),
            output_dir: env::var("LDASWEEP_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data")),
            dataset: env::var("LDASWEEP_DATASET").unwrap_or_else(|_| REUTERS.to_string()),
            workers,
            log_filter: env::var("LDASWEEP_LOG").unwrap_or_else(|_| "ldasweep=info".to_string()),
        })
    }

    pub fn results_path(&self) -> PathBuf {
        self.output_dir.join(RESULTS_FILE)
    }

    pub fn plot_path(&self) -> PathBuf {
        self.output_dir.join(PLOT_FILE)
    }

    pub fn final_model_path(&self) -> PathBuf {
        self.output_dir.join(FINAL_MODEL_FILE)
    }

    pub fn summary_dir(&self) -> PathBuf {
        self.output_dir.join(SUMMARY_DIR)
    }

    /// Check that the configured dataset exists on disk.
    /// Call this before any operation that loads the dataset.
    pub fn require_dataset(&self) -> Result<()> {
        if !dataset_present(&self.data_dir, &self.dataset) {
            if self.dataset == REUTERS {
                anyhow::bail!(
                    "Reuters dataset not found in {}\n\
                     Run `ldasweep download-data` to download it.",
                    self.data_dir.display()
                );
            }
            anyhow::bail!(
                "Dataset '{}' not found in {}\n\
                 Run `ldasweep vectorize <dir> --name {}` to build it from text files.",
                self.dataset,
                self.data_dir.display(),
                self.dataset
            );
        }
        Ok(())
    }

    /// Check that a sweep has been run and its results archive exists.
    pub fn require_results(&self) -> Result<()> {
        require_file(&self.results_path(), "Run `ldasweep evaluate` first.")
    }
}

/// Parse a worker count; zero is rejected.
pub fn parse_workers(value: &str) -> Result<usize> {
    let n: usize = value
        .trim()
        .parse()
        .with_context(|| format!("LDASWEEP_WORKERS must be a positive integer, got '{value}'"))?;
    if n == 0 {
        anyhow::bail!("LDASWEEP_WORKERS must be at least 1");
    }
    Ok(n)
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

fn require_file(path: &Path, hint: &str) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("{} not found. {hint}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_workers() {
        assert_eq!(parse_workers("4").unwrap(), 4);
        assert_eq!(parse_workers(" 2 ").unwrap(), 2);
        assert!(parse_workers("0").is_err());
        assert!(parse_workers("many").is_err());
    }

    #[test]
    fn test_artifact_paths_live_under_output_dir() {
        let config = Config {
            data_dir: PathBuf::from("/tmp/ds"),
            output_dir: PathBuf::from("/tmp/out"),
            dataset: "reuters".to_string(),
            workers: 1,
            log_filter: "ldasweep=info".to_string(),
        };
        assert_eq!(config.results_path(), PathBuf::from("/tmp/out").join(RESULTS_FILE));
        assert_eq!(config.summary_dir(), PathBuf::from("/tmp/out").join(SUMMARY_DIR));
    }
}
