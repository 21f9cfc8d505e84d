// Sparse document-term matrix.
//
// Rows are documents, columns are vocabulary terms. Each row stores only the
// non-zero entries as (term index, count) pairs in ascending term order, which
// keeps the Reuters sample (~400 docs × ~4,300 terms) small in memory and lets
// the sampler walk tokens without scanning zeros.

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// A document-term matrix of raw term counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentTermMatrix {
    n_terms: usize,
    rows: Vec<Vec<(u32, u32)>>,
}

impl DocumentTermMatrix {
    /// Build a matrix from sparse rows.
    ///
    /// Each row must have strictly increasing term indices below `n_terms`
    /// and non-zero counts.
    pub fn from_rows(rows: Vec<Vec<(u32, u32)>>, n_terms: usize) -> Result<Self> {
        for (doc, row) in rows.iter().enumerate() {
            let mut prev: Option<u32> = None;
            for &(term, count) in row {
                if term as usize >= n_terms {
                    anyhow::bail!(
                        "Document {doc} references term {term}, but the vocabulary has only {n_terms} terms"
                    );
                }
                if count == 0 {
                    anyhow::bail!("Document {doc} stores a zero count for term {term}");
                }
                if prev.is_some_and(|p| p >= term) {
                    anyhow::bail!("Document {doc} has unsorted or duplicate term index {term}");
                }
                prev = Some(term);
            }
        }
        Ok(Self { n_terms, rows })
    }

    /// Build a matrix from dense rows of counts. Zeros are dropped.
    pub fn from_dense(dense: &[Vec<u32>]) -> Result<Self> {
        let n_terms = dense.first().map_or(0, Vec::len);
        if dense.iter().any(|r| r.len() != n_terms) {
            anyhow::bail!("Dense rows must all have the same length ({n_terms})");
        }
        let rows = dense
            .iter()
            .map(|r| {
                r.iter()
                    .enumerate()
                    .filter(|(_, &c)| c > 0)
                    .map(|(t, &c)| (t as u32, c))
                    .collect()
            })
            .collect();
        Self::from_rows(rows, n_terms)
    }

    pub fn n_docs(&self) -> usize {
        self.rows.len()
    }

    pub fn n_terms(&self) -> usize {
        self.n_terms
    }

    /// (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        (self.n_docs(), self.n_terms)
    }

    /// Non-zero entries of one document.
    pub fn row(&self, doc: usize) -> &[(u32, u32)] {
        &self.rows[doc]
    }

    /// Count of `term` in `doc` (zero when absent).
    pub fn get(&self, doc: usize, term: usize) -> u32 {
        let row = &self.rows[doc];
        match row.binary_search_by_key(&(term as u32), |&(t, _)| t) {
            Ok(i) => row[i].1,
            Err(_) => 0,
        }
    }

    /// Total number of tokens in each document.
    pub fn doc_lengths(&self) -> Vec<u64> {
        self.rows
            .iter()
            .map(|r| r.iter().map(|&(_, c)| c as u64).sum())
            .collect()
    }

    /// Total number of tokens in the whole corpus.
    pub fn total_tokens(&self) -> u64 {
        self.doc_lengths().iter().sum()
    }

    /// Number of documents containing each term.
    pub fn doc_frequencies(&self) -> Vec<u32> {
        let mut df = vec![0u32; self.n_terms];
        for row in &self.rows {
            for &(t, _) in row {
                df[t as usize] += 1;
            }
        }
        df
    }

    /// Number of documents containing both `a` and `b`.
    pub fn codoc_frequency(&self, a: usize, b: usize) -> u32 {
        (0..self.n_docs())
            .filter(|&d| self.get(d, a) > 0 && self.get(d, b) > 0)
            .count() as u32
    }
}
