// Evaluation results and post-hoc model selection.
//
// The evaluator produces one EvalResult per configuration. Choosing which model
// to keep is an explicit step: either a specific topic count (usually picked by
// looking at the evaluation plot) or the best score under a metric.

use std::collections::BTreeMap;
use std::fmt;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::metrics::Metric;
use super::params::LdaParams;
use crate::topics::model::FittedModel;

/// Scores (and optionally the model) for one configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalResult {
    pub params: LdaParams,
    pub scores: BTreeMap<Metric, f64>,
    /// Absent when the sweep ran without retaining models
    pub model: Option<FittedModel>,
}

impl EvalResult {
    pub fn score(&self, metric: Metric) -> Option<f64> {
        self.scores.get(&metric).copied()
    }

    /// The retained model, or an error explaining how to get one.
    pub fn require_model(&self) -> Result<&FittedModel> {
        self.model.as_ref().ok_or_else(|| {
            anyhow::anyhow!(
                "The result for n_topics={} was saved without its model.\n\
                 Re-run `ldasweep evaluate` without --no-models to keep fitted models.",
                self.params.n_topics
            )
        })
    }
}

/// A hyperparameter that can index results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Param {
    NTopics,
    Alpha,
    Eta,
}

impl Param {
    pub fn value(&self, params: &LdaParams) -> f64 {
        match self {
            Param::NTopics => params.n_topics as f64,
            Param::Alpha => params.alpha,
            Param::Eta => params.eta,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Param::NTopics => "num. topics k",
            Param::Alpha => "alpha",
            Param::Eta => "eta",
        }
    }
}

/// Pair each result with its value of `param`, sorted ascending by that value.
pub fn results_by_parameter(results: &[EvalResult], param: Param) -> Vec<(f64, &EvalResult)> {
    let mut by: Vec<(f64, &EvalResult)> = results
        .iter()
        .map(|r| (param.value(&r.params), r))
        .collect();
    by.sort_by(|a, b| a.0.total_cmp(&b.0));
    by
}

/// The result evaluated with exactly `n_topics` topics.
///
/// Fails if that topic count was not part of the sweep.
pub fn select_by_n_topics(results: &[EvalResult], n_topics: usize) -> Result<&EvalResult> {
    results
        .iter()
        .find(|r| r.params.n_topics == n_topics)
        .ok_or_else(|| {
            let mut available: Vec<usize> = results.iter().map(|r| r.params.n_topics).collect();
            available.sort_unstable();
            available.dedup();
            let list: Vec<String> = available.iter().map(|k| k.to_string()).collect();
            anyhow::anyhow!(
                "No model with n_topics={n_topics} was evaluated. Evaluated topic counts: [{}]",
                list.join(", ")
            )
        })
}

/// Results ordered best-first under `metric`.
///
/// Results without a finite score for the metric are left out. Equal scores
/// keep their original order.
pub fn rank_by_metric(results: &[EvalResult], metric: Metric) -> Vec<&EvalResult> {
    let mut scored: Vec<(f64, &EvalResult)> = results
        .iter()
        .filter_map(|r| r.score(metric).filter(|s| s.is_finite()).map(|s| (s, r)))
        .collect();
    scored.sort_by(|a, b| {
        if metric.is_better(a.0, b.0) {
            std::cmp::Ordering::Less
        } else if metric.is_better(b.0, a.0) {
            std::cmp::Ordering::Greater
        } else {
            std::cmp::Ordering::Equal
        }
    });
    scored.into_iter().map(|(_, r)| r).collect()
}

/// The single best result under `metric`.
pub fn best_by_metric(results: &[EvalResult], metric: Metric) -> Result<&EvalResult> {
    rank_by_metric(results, metric)
        .into_iter()
        .next()
        .ok_or_else(|| anyhow::anyhow!("No evaluated model has a finite {metric} score"))
}

/// How to pick the final model out of a sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ModelSelection {
    /// Keep the model with exactly this many topics
    NTopics(usize),
    /// Keep the best model under this metric
    BestBy(Metric),
}

impl fmt::Display for ModelSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelSelection::NTopics(k) => write!(f, "n_topics={k}"),
            ModelSelection::BestBy(m) => write!(f, "best by {m}"),
        }
    }
}

/// Apply a selection policy to a set of results.
pub fn select<'a>(results: &'a [EvalResult], selection: &ModelSelection) -> Result<&'a EvalResult> {
    match *selection {
        ModelSelection::NTopics(k) => select_by_n_topics(results, k),
        ModelSelection::BestBy(metric) => best_by_metric(results, metric),
    }
}
