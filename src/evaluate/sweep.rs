// Parallel evaluation of a parameter grid.
//
// Every configuration is fitted on a blocking worker thread (fitting is pure
// CPU work) and scored right there, so only the small EvalResult travels back.
// At most `workers` fits run at once; results come back in grid order
// regardless of which fit finishes first. Any failure aborts the sweep.

use std::sync::Arc;

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt, TryStreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use super::metrics::{self, Metric, MetricOptions};
use super::params::LdaParams;
use super::results::EvalResult;
use crate::data::dtm::DocumentTermMatrix;
use crate::topics::lda::GibbsLda;
use crate::topics::traits::TopicModel;

/// Settings for one sweep.
#[derive(Debug, Clone)]
pub struct EvalOptions {
    /// Metrics to compute for every model
    pub metrics: Vec<Metric>,
    pub metric_options: MetricOptions,
    /// Maximum number of models fitted at once
    pub workers: usize,
    /// Keep the fitted models in the results (needed to export one later)
    pub return_models: bool,
    pub show_progress: bool,
}

impl Default for EvalOptions {
    fn default() -> Self {
        Self {
            metrics: Metric::defaults(),
            metric_options: MetricOptions::default(),
            workers: 1,
            return_models: true,
            show_progress: false,
        }
    }
}

/// Fit and score one LDA model per configuration.
pub async fn evaluate_topic_models(
    dtm: Arc<DocumentTermMatrix>,
    grid: Vec<LdaParams>,
    options: &EvalOptions,
) -> Result<Vec<EvalResult>> {
    evaluate_with(dtm, grid, options, GibbsLda::new).await
}

/// Like [`evaluate_topic_models`], with a caller-supplied model constructor.
pub async fn evaluate_with<M, F>(
    dtm: Arc<DocumentTermMatrix>,
    grid: Vec<LdaParams>,
    options: &EvalOptions,
    make_model: F,
) -> Result<Vec<EvalResult>>
where
    M: TopicModel + 'static,
    F: Fn(LdaParams) -> M + Send + Sync + 'static,
{
    if grid.is_empty() {
        anyhow::bail!("Parameter grid is empty, nothing to evaluate");
    }
    if options.metrics.is_empty() {
        anyhow::bail!("No metrics selected");
    }

    let workers = options.workers.max(1);
    let make_model = Arc::new(make_model);
    info!(configs = grid.len(), workers, "Starting parameter sweep");

    let pb = if options.show_progress {
        let pb = ProgressBar::new(grid.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("  Models [{bar:30}] {pos}/{len} ({eta})")
                .context("invalid progress template")?,
        );
        pb
    } else {
        ProgressBar::hidden()
    };

    let results: Result<Vec<EvalResult>> = stream::iter(grid.into_iter().map(|params| {
        let dtm = Arc::clone(&dtm);
        let make_model = Arc::clone(&make_model);
        let wanted = options.metrics.clone();
        let metric_options = options.metric_options.clone();
        let return_models = options.return_models;
        async move {
            let n_topics = params.n_topics;
            tokio::task::spawn_blocking(move || {
                fit_and_score(&*make_model, params, &dtm, &wanted, &metric_options, return_models)
            })
            .await
            .with_context(|| format!("Fitting task for n_topics={n_topics} panicked"))?
        }
    }))
    .buffered(workers)
    .inspect_ok(|_| pb.inc(1))
    .try_collect()
    .await;

    pb.finish_and_clear();

    let results = results?;
    info!(models = results.len(), "Parameter sweep complete");
    Ok(results)
}

/// Fit one model and compute all requested metrics for it.
fn fit_and_score<M, F>(
    make_model: &F,
    params: LdaParams,
    dtm: &DocumentTermMatrix,
    wanted: &[Metric],
    metric_options: &MetricOptions,
    return_model: bool,
) -> Result<EvalResult>
where
    M: TopicModel,
    F: Fn(LdaParams) -> M,
{
    let model = make_model(params.clone())
        .fit(dtm)
        .with_context(|| format!("Failed to fit model with n_topics={}", params.n_topics))?;

    let mut scores = std::collections::BTreeMap::new();
    for &metric in wanted {
        let score = metrics::compute(metric, &model, dtm, &params, metric_options)
            .with_context(|| format!("Failed to compute {metric} for n_topics={}", params.n_topics))?;
        if score.is_finite() {
            scores.insert(metric, score);
        } else {
            warn!(n_topics = params.n_topics, %metric, "Metric is not finite, leaving it out");
        }
    }

    info!(n_topics = params.n_topics, ?scores, "Evaluated model");

    Ok(EvalResult {
        params,
        scores,
        model: return_model.then_some(model),
    })
}
