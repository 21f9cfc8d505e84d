// Hyperparameter configurations and the sweep grid.
//
// Each grid point varies the number of topics k and sets the document-topic
// prior to alpha = 1/k; everything else comes from a shared set of constant
// parameters.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// One complete LDA configuration, the unit of work for the evaluator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LdaParams {
    /// Number of topics (k)
    pub n_topics: usize,
    /// Document-topic concentration
    pub alpha: f64,
    /// Topic-word concentration (called beta in most of the literature)
    pub eta: f64,
    /// Gibbs sampling iterations
    pub n_iter: usize,
    /// Seed for the sampler's random number generator
    pub random_state: u64,
    /// Record the log-likelihood every `refresh` iterations
    pub refresh: usize,
}

/// Parameters shared by every configuration in a sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstParams {
    pub eta: f64,
    pub n_iter: usize,
    pub random_state: u64,
    pub refresh: usize,
}

impl Default for ConstParams {
    fn default() -> Self {
        Self {
            eta: 0.1,
            n_iter: 1500,
            random_state: 1,
            refresh: 10,
        }
    }
}

/// Build one configuration per topic count, in input order, with alpha = 1/k.
pub fn build_grid(topic_counts: &[usize], consts: &ConstParams) -> Result<Vec<LdaParams>> {
    topic_counts
        .iter()
        .map(|&k| {
            if k == 0 {
                anyhow::bail!("Topic count must be at least 1");
            }
            Ok(LdaParams {
                n_topics: k,
                alpha: 1.0 / k as f64,
                eta: consts.eta,
                n_iter: consts.n_iter,
                random_state: consts.random_state,
                refresh: consts.refresh,
            })
        })
        .collect()
}

/// The standard sweep: 10–130 in steps of 10, 140–280 in steps of 20,
/// then a coarse tail up to 500.
pub fn default_topic_counts() -> Vec<usize> {
    (10..140)
        .step_by(10)
        .chain((140..300).step_by(20))
        .chain([300, 325, 350, 375, 400, 450, 500])
        .collect()
}

/// Parse a topic-count list such as `10,20,40..100:20`.
///
/// Items are comma-separated. Each is either a single count or a half-open
/// range `start..end[:step]` (step defaults to 1).
pub fn parse_topic_counts(list: &str) -> Result<Vec<usize>> {
    let mut counts = Vec::new();

    for item in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        match item.split_once("..") {
            Some((start, rest)) => {
                let (end, step) = match rest.split_once(':') {
                    Some((end, step)) => (end, step),
                    None => (rest, "1"),
                };
                let start: usize = parse_count(start, item)?;
                let end: usize = parse_count(end, item)?;
                let step: usize = parse_count(step, item)?;
                if step == 0 {
                    anyhow::bail!("Range '{item}' has a zero step");
                }
                if start >= end {
                    anyhow::bail!("Range '{item}' is empty (start must be below end)");
                }
                counts.extend((start..end).step_by(step));
            }
            None => counts.push(parse_count(item, item)?),
        }
    }

    if counts.is_empty() {
        anyhow::bail!("No topic counts given");
    }
    Ok(counts)
}

fn parse_count(s: &str, item: &str) -> Result<usize> {
    s.trim()
        .parse()
        .with_context(|| format!("Invalid topic count list item '{item}'"))
}
