// Evaluation pipeline: load the dataset, sweep the parameter grid, persist.
//
// Strategy: load and validate the dataset, build one configuration per topic
// count, fit and score every configuration (in parallel), then save the
// results archive and the evaluation plot and show the results table.

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::config::Config;
use crate::data::dataset::Dataset;
use crate::evaluate::params::{build_grid, ConstParams};
use crate::evaluate::results::{results_by_parameter, Param};
use crate::evaluate::sweep::{evaluate_topic_models, EvalOptions};
use crate::output::archive::{save_results, ResultsArchive};
use crate::output::{plot, terminal};

/// What to sweep and how.
#[derive(Debug, Clone)]
pub struct SweepSettings {
    /// Topic counts to evaluate, in order
    pub topic_counts: Vec<usize>,
    pub consts: ConstParams,
    pub options: EvalOptions,
}

/// Run the evaluation pipeline.
///
/// Returns the results archive that was written to disk.
pub async fn run(config: &Config, settings: &SweepSettings) -> Result<ResultsArchive> {
    config.require_dataset()?;

    println!("Loading dataset '{}'...", config.dataset);
    let dataset = Dataset::load(&config.data_dir, &config.dataset)?;
    println!(
        "  {} documents with vocab size {}",
        dataset.doc_labels.len(),
        dataset.vocab.len()
    );

    let grid = build_grid(&settings.topic_counts, &settings.consts)?;

    println!(
        "Evaluating {} topic models ({} in parallel)...",
        grid.len(),
        settings.options.workers.max(1)
    );
    let dataset_name = dataset.name.clone();
    let results =
        evaluate_topic_models(Arc::new(dataset.dtm), grid, &settings.options).await?;

    println!("Saving results...");
    let archive = ResultsArchive::new(&dataset_name, results);
    let results_path = config.results_path();
    save_results(&results_path, &archive)?;
    println!("  {}", results_path.display());

    println!("Plotting evaluation results...");
    let by_k = results_by_parameter(&archive.results, Param::NTopics);
    let title = format!(
        "Evaluation results for alpha=1/k, beta={}",
        settings.consts.eta
    );
    let plot_path = config.plot_path();
    plot::save_eval_plot(
        &plot_path,
        &by_k,
        &settings.options.metrics,
        Param::NTopics.label(),
        &title,
    )?;
    println!("  {}", plot_path.display());

    terminal::display_eval_table(&by_k, &settings.options.metrics);

    info!(
        dataset = %archive.dataset,
        models = archive.results.len(),
        "Evaluation pipeline finished"
    );
    Ok(archive)
}
