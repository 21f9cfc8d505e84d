// Labeled datasets on disk.
//
// A dataset named `foo` is three sibling files in the data directory:
//   foo.ldac    one document per line in LDA-C format: `N id:count id:count ...`
//   foo.tokens  the vocabulary, one term per line
//   foo.titles  the document labels, one per line
//
// This is the layout the Reuters sample ships in, and `vectorize` writes the
// same layout so custom corpora go through the same loader.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use super::dtm::DocumentTermMatrix;

/// A document-term matrix together with its row and column labels.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub name: String,
    pub doc_labels: Vec<String>,
    pub vocab: Vec<String>,
    pub dtm: DocumentTermMatrix,
}

/// Paths of the three files that make up a named dataset.
pub fn dataset_files(dir: &Path, name: &str) -> [PathBuf; 3] {
    [
        dir.join(format!("{name}.ldac")),
        dir.join(format!("{name}.tokens")),
        dir.join(format!("{name}.titles")),
    ]
}

/// Check whether all files of a named dataset exist.
pub fn dataset_present(dir: &Path, name: &str) -> bool {
    dataset_files(dir, name).iter().all(|p| p.exists())
}

impl Dataset {
    /// Load a named dataset from `dir` and validate its shape.
    pub fn load(dir: &Path, name: &str) -> Result<Self> {
        let [ldac_path, tokens_path, titles_path] = dataset_files(dir, name);

        let vocab = read_lines(&tokens_path)?;
        let doc_labels = read_lines(&titles_path)?;
        let ldac = fs::read_to_string(&ldac_path)
            .with_context(|| format!("Failed to read {}", ldac_path.display()))?;
        let dtm = parse_ldac(&ldac, vocab.len())
            .with_context(|| format!("Failed to parse {}", ldac_path.display()))?;

        let dataset = Self {
            name: name.to_string(),
            doc_labels,
            vocab,
            dtm,
        };
        dataset.validate()?;

        info!(
            dataset = name,
            docs = dataset.doc_labels.len(),
            vocab = dataset.vocab.len(),
            tokens = dataset.dtm.total_tokens(),
            "Loaded dataset"
        );
        Ok(dataset)
    }

    /// Check that the matrix shape agrees with the labels and vocabulary.
    pub fn validate(&self) -> Result<()> {
        let (n_docs, n_terms) = self.dtm.shape();
        if n_docs != self.doc_labels.len() {
            anyhow::bail!(
                "Dataset '{}' has {} matrix rows but {} document labels",
                self.name,
                n_docs,
                self.doc_labels.len()
            );
        }
        if n_terms != self.vocab.len() {
            anyhow::bail!(
                "Dataset '{}' has {} matrix columns but a vocabulary of {} terms",
                self.name,
                n_terms,
                self.vocab.len()
            );
        }
        Ok(())
    }

    /// Write the dataset to `dir` in the on-disk layout `load` reads.
    pub fn save(&self, dir: &Path) -> Result<()> {
        self.validate()?;
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create data directory: {}", dir.display()))?;

        let [ldac_path, tokens_path, titles_path] = dataset_files(dir, &self.name);

        let mut ldac = String::new();
        for d in 0..self.dtm.n_docs() {
            let row = self.dtm.row(d);
            ldac.push_str(&row.len().to_string());
            for &(t, c) in row {
                ldac.push_str(&format!(" {t}:{c}"));
            }
            ldac.push('\n');
        }

        write_file(&ldac_path, &ldac)?;
        write_file(&tokens_path, &(self.vocab.join("\n") + "\n"))?;
        write_file(&titles_path, &(self.doc_labels.join("\n") + "\n"))?;
        Ok(())
    }
}

/// Parse LDA-C text into a document-term matrix with `n_terms` columns.
///
/// Entries are sorted by term index and duplicate indices on one line are
/// summed. Blank lines are skipped.
pub fn parse_ldac(text: &str, n_terms: usize) -> Result<DocumentTermMatrix> {
    let mut rows = Vec::new();

    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut fields = line.split_whitespace();
        let declared: usize = fields
            .next()
            .unwrap_or_default()
            .parse()
            .with_context(|| format!("line {}: bad term count", line_no + 1))?;

        let mut row: Vec<(u32, u32)> = Vec::new();
        let mut n_pairs = 0usize;
        for field in fields {
            n_pairs += 1;
            let (term, count) = field
                .split_once(':')
                .with_context(|| format!("line {}: expected id:count, got '{field}'", line_no + 1))?;
            let term: u32 = term
                .parse()
                .with_context(|| format!("line {}: bad term id '{term}'", line_no + 1))?;
            let count: u32 = count
                .parse()
                .with_context(|| format!("line {}: bad count '{count}'", line_no + 1))?;
            if count > 0 {
                row.push((term, count));
            }
        }
        if n_pairs != declared {
            anyhow::bail!(
                "line {}: declares {declared} terms but lists {n_pairs}",
                line_no + 1
            );
        }

        row.sort_by_key(|&(t, _)| t);
        row.dedup_by(|next, kept| {
            if next.0 == kept.0 {
                kept.1 += next.1;
                true
            } else {
                false
            }
        });
        rows.push(row);
    }

    DocumentTermMatrix::from_rows(rows, n_terms)
}

fn read_lines(path: &Path) -> Result<Vec<String>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(text
        .lines()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect())
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ldac_sums_duplicates() {
        let dtm = parse_ldac("2 3:1 0:2\n2 1:1 1:4\n", 4).unwrap();
        assert_eq!(dtm.row(0), &[(0, 2), (3, 1)]);
        assert_eq!(dtm.row(1), &[(1, 5)]);
    }

    #[test]
    fn test_parse_ldac_rejects_garbage() {
        assert!(parse_ldac("1 3-1\n", 4).is_err());
        assert!(parse_ldac("x 3:1\n", 4).is_err());
    }

    #[test]
    fn test_parse_ldac_rejects_count_mismatch() {
        let err = parse_ldac("1 0:1\n5 1:1\n", 4).unwrap_err().to_string();
        assert!(err.contains("line 2"), "unexpected error: {err}");
        assert!(parse_ldac("1 0:1 2:1\n", 4).is_err());
        // a huge declared count is an error, not an allocation
        assert!(parse_ldac("99999999999999 1:1\n", 4).is_err());
    }
}
