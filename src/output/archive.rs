// Durable JSON archives for sweep results and the selected final model.
//
// The results archive holds every EvalResult from a sweep (with or without the
// fitted models). The model archive bundles one fitted model with everything
// needed to interpret it later: vocabulary, document labels and the matrix it
// was fitted on.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::data::dtm::DocumentTermMatrix;
use crate::evaluate::params::LdaParams;
use crate::evaluate::results::EvalResult;
use crate::topics::model::FittedModel;

/// All results of one parameter sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultsArchive {
    pub created_at: DateTime<Utc>,
    /// Name of the dataset the sweep ran on
    pub dataset: String,
    pub results: Vec<EvalResult>,
}

impl ResultsArchive {
    pub fn new(dataset: &str, results: Vec<EvalResult>) -> Self {
        Self {
            created_at: Utc::now(),
            dataset: dataset.to_string(),
            results,
        }
    }
}

/// A results archive read without its fitted models or scores.
#[derive(Debug, Deserialize)]
pub struct ResultsArchiveHeader {
    pub created_at: DateTime<Utc>,
    pub dataset: String,
    pub results: Vec<ResultHeader>,
}

#[derive(Debug, Deserialize)]
pub struct ResultHeader {
    pub params: LdaParams,
    #[serde(default)]
    model: Option<IgnoredAny>,
}

impl ResultHeader {
    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }
}

/// A selected model with its supporting data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArchive {
    pub created_at: DateTime<Utc>,
    pub params: LdaParams,
    pub model: FittedModel,
    pub vocab: Vec<String>,
    pub doc_labels: Vec<String>,
    pub dtm: DocumentTermMatrix,
}

pub fn save_results(path: &Path, archive: &ResultsArchive) -> Result<()> {
    write_json(path, archive)?;
    info!(path = %path.display(), results = archive.results.len(), "Saved results archive");
    Ok(())
}

pub fn load_results(path: &Path) -> Result<ResultsArchive> {
    read_json(path).with_context(|| {
        format!(
            "No usable results archive at {}. Run `ldasweep evaluate` first.",
            path.display()
        )
    })
}

/// Read only the parameters and model presence of a results archive.
pub fn load_results_header(path: &Path) -> Result<ResultsArchiveHeader> {
    read_json(path).with_context(|| format!("No usable results archive at {}", path.display()))
}

pub fn save_model(path: &Path, archive: &ModelArchive) -> Result<()> {
    write_json(path, archive)?;
    info!(path = %path.display(), n_topics = archive.params.n_topics, "Saved model archive");
    Ok(())
}

pub fn load_model(path: &Path) -> Result<ModelArchive> {
    read_json(path)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    serde_json::to_writer(BufWriter::new(file), value)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse {}", path.display()))
}
