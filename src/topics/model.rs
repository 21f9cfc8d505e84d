// Fitted topic models and the dense distribution matrices they carry.
//
// A fitted model is two row-stochastic matrices: topic × term (what each topic
// talks about) and document × topic (what each document is about), plus the
// log-likelihood trace recorded while sampling.

use serde::{Deserialize, Serialize};

/// Row-major dense matrix of probabilities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseMatrix {
    pub n_rows: usize,
    pub n_cols: usize,
    values: Vec<f64>,
}

impl DenseMatrix {
    pub fn zeros(n_rows: usize, n_cols: usize) -> Self {
        Self {
            n_rows,
            n_cols,
            values: vec![0.0; n_rows * n_cols],
        }
    }

    /// Build from row-major values. Returns `None` if the length is wrong.
    pub fn from_vec(n_rows: usize, n_cols: usize, values: Vec<f64>) -> Option<Self> {
        (values.len() == n_rows * n_cols).then_some(Self {
            n_rows,
            n_cols,
            values,
        })
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.n_cols + col]
    }

    pub fn row(&self, row: usize) -> &[f64] {
        &self.values[row * self.n_cols..(row + 1) * self.n_cols]
    }

    pub fn row_mut(&mut self, row: usize) -> &mut [f64] {
        &mut self.values[row * self.n_cols..(row + 1) * self.n_cols]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        // chunks_exact panics on a zero chunk size; an empty matrix has no rows.
        self.values.chunks_exact(self.n_cols.max(1)).take(self.n_rows)
    }

    /// Scale every row to sum to 1. Rows that sum to zero are left alone.
    pub fn normalize_rows(&mut self) {
        for r in 0..self.n_rows {
            let row = self.row_mut(r);
            let sum: f64 = row.iter().sum();
            if sum > 0.0 {
                for v in row.iter_mut() {
                    *v /= sum;
                }
            }
        }
    }

    /// Indices and values of the `n` largest entries of a row, largest first.
    ///
    /// Ties keep the lower column index first.
    pub fn top_n_in_row(&self, row: usize, n: usize) -> Vec<(usize, f64)> {
        let mut indexed: Vec<(usize, f64)> = self.row(row).iter().copied().enumerate().collect();
        indexed.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        indexed.truncate(n);
        indexed
    }
}

/// The output of fitting one topic model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedModel {
    /// Topic-word distribution (`n_topics` × `n_terms`)
    pub topic_word: DenseMatrix,
    /// Document-topic distribution (`n_docs` × `n_topics`)
    pub doc_topic: DenseMatrix,
    /// Joint log-likelihood recorded every `refresh` iterations, plus once
    /// after the final iteration
    pub loglikelihoods: Vec<f64>,
}

impl FittedModel {
    pub fn n_topics(&self) -> usize {
        self.topic_word.n_rows
    }

    /// Log-likelihood of the final sampler state.
    pub fn loglikelihood(&self) -> Option<f64> {
        self.loglikelihoods.last().copied()
    }
}

/// Display name of a topic (`topic_1`, `topic_2`, ...).
pub fn topic_label(topic: usize) -> String {
    format!("topic_{}", topic + 1)
}
