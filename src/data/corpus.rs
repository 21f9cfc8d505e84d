// Build a dataset from a directory of plain-text documents.
//
// Every `*.txt` file becomes one document labelled by its file stem. Text is
// lowercased, split into word tokens, and English stop words are dropped. Terms
// that appear in fewer than `min_df` documents are pruned from the vocabulary.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use regex_lite::Regex;
use stop_words::{get, LANGUAGE};
use tracing::info;

use super::dataset::Dataset;
use super::dtm::DocumentTermMatrix;

/// Turns raw text into term counts.
pub struct Vectorizer {
    /// Minimum number of documents a term must appear in
    pub min_df: usize,
    /// Shortest token length kept (in characters)
    pub min_token_len: usize,
    word_re: Regex,
    stop_words: HashSet<String>,
}

impl Default for Vectorizer {
    fn default() -> Self {
        Self::new(1, 2)
    }
}

impl Vectorizer {
    pub fn new(min_df: usize, min_token_len: usize) -> Self {
        Self {
            min_df: min_df.max(1),
            min_token_len,
            // Static pattern, always valid.
            word_re: Regex::new(r"[a-z][a-z0-9']*[a-z0-9]|[a-z]").expect("valid regex"),
            stop_words: get(LANGUAGE::English).into_iter().collect(),
        }
    }

    /// Split text into normalized tokens, dropping stop words and short tokens.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let lower = text.to_lowercase();
        self.word_re
            .find_iter(&lower)
            .map(|m| m.as_str().to_string())
            .filter(|t| t.chars().count() >= self.min_token_len)
            .filter(|t| !self.stop_words.contains(t))
            .collect()
    }

    /// Vectorize labelled documents into a dataset.
    ///
    /// The vocabulary is sorted alphabetically.
    pub fn vectorize(&self, name: &str, docs: &[(String, String)]) -> Result<Dataset> {
        if docs.is_empty() {
            anyhow::bail!("No documents to vectorize");
        }

        let counts: Vec<BTreeMap<String, u32>> = docs
            .iter()
            .map(|(_, text)| {
                let mut c = BTreeMap::new();
                for tok in self.tokenize(text) {
                    *c.entry(tok).or_insert(0) += 1;
                }
                c
            })
            .collect();

        let mut df: BTreeMap<&str, usize> = BTreeMap::new();
        for c in &counts {
            for term in c.keys() {
                *df.entry(term.as_str()).or_insert(0) += 1;
            }
        }

        let vocab: BTreeSet<&str> = df
            .into_iter()
            .filter(|&(_, n)| n >= self.min_df)
            .map(|(t, _)| t)
            .collect();
        if vocab.is_empty() {
            anyhow::bail!(
                "Vectorizing {} documents left an empty vocabulary (min_df = {})",
                docs.len(),
                self.min_df
            );
        }

        let index: BTreeMap<&str, u32> = vocab
            .iter()
            .enumerate()
            .map(|(i, &t)| (t, i as u32))
            .collect();

        // BTreeMap iteration is sorted by term, and the index is assigned in
        // the same order, so each row comes out sorted by term index.
        let rows = counts
            .iter()
            .map(|c| {
                c.iter()
                    .filter_map(|(t, &n)| index.get(t.as_str()).map(|&i| (i, n)))
                    .collect()
            })
            .collect();

        let vocab: Vec<String> = vocab.into_iter().map(str::to_string).collect();
        let dtm = DocumentTermMatrix::from_rows(rows, vocab.len())?;

        Ok(Dataset {
            name: name.to_string(),
            doc_labels: docs.iter().map(|(label, _)| label.clone()).collect(),
            vocab,
            dtm,
        })
    }

    /// Read every `*.txt` file in `dir` (sorted by file name) and vectorize.
    pub fn vectorize_dir(&self, name: &str, dir: &Path) -> Result<Dataset> {
        let mut paths: Vec<_> = fs::read_dir(dir)
            .with_context(|| format!("Failed to read corpus directory: {}", dir.display()))?
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "txt"))
            .collect();
        paths.sort();

        let mut docs = Vec::with_capacity(paths.len());
        for path in &paths {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let label = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            docs.push((label, text));
        }

        if docs.is_empty() {
            anyhow::bail!("No .txt files found in {}", dir.display());
        }

        let dataset = self.vectorize(name, &docs)?;
        info!(
            docs = dataset.doc_labels.len(),
            vocab = dataset.vocab.len(),
            "Vectorized corpus"
        );
        Ok(dataset)
    }
}
