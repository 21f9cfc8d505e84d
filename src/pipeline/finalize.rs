// Final model pipeline: pick one model from a sweep and report on it.
//
// The chosen model is archived together with the vocabulary, document labels
// and matrix so it can be interpreted without the dataset files. Its topics are
// printed to the terminal and a CSV summary is written next to the archive.

use anyhow::Result;
use tracing::info;

use crate::config::Config;
use crate::data::dataset::Dataset;
use crate::evaluate::results::{select, ModelSelection};
use crate::output::archive::{save_model, ModelArchive, ResultsArchive};
use crate::output::summary::{save_summary, SummaryOptions};
use crate::output::terminal;

/// Select, archive and summarize the final model from `results`.
///
/// The dataset named in the archive is reloaded to label the output; it must
/// still match the shape the models were fitted on.
pub fn run(
    config: &Config,
    results: &ResultsArchive,
    selection: &ModelSelection,
    report: &SummaryOptions,
) -> Result<ModelArchive> {
    let chosen = select(&results.results, selection)?;
    let model = chosen.require_model()?;
    println!(
        "Selected model with n_topics={} ({selection})",
        chosen.params.n_topics
    );

    let dataset = Dataset::load(&config.data_dir, &results.dataset)?;
    if dataset.doc_labels.len() != model.doc_topic.n_rows
        || dataset.vocab.len() != model.topic_word.n_cols
    {
        anyhow::bail!(
            "Dataset '{}' ({} documents, {} terms) does not match the evaluated models \
             ({} documents, {} terms). Run `ldasweep evaluate` again.",
            dataset.name,
            dataset.doc_labels.len(),
            dataset.vocab.len(),
            model.doc_topic.n_rows,
            model.topic_word.n_cols
        );
    }

    let archive = ModelArchive {
        created_at: chrono::Utc::now(),
        params: chosen.params.clone(),
        model: model.clone(),
        vocab: dataset.vocab,
        doc_labels: dataset.doc_labels,
        dtm: dataset.dtm,
    };

    let model_path = config.final_model_path();
    println!("Saving final model to {}", model_path.display());
    save_model(&model_path, &archive)?;

    println!("\nTopic-word distributions (top {}):", report.top_words_per_topic);
    terminal::print_topic_words(&archive.model, &archive.vocab, report.top_words_per_topic);
    println!("\nDocument-topic distributions (top {}):", report.top_topics_per_doc);
    terminal::print_doc_topics(&archive.model, &archive.doc_labels, report.top_topics_per_doc);

    let summary_dir = config.summary_dir();
    println!("\nSaving model summary to {}", summary_dir.display());
    save_summary(
        &summary_dir,
        &archive.model,
        &archive.doc_labels,
        &archive.vocab,
        &archive.dtm,
        report,
    )?;

    info!(
        n_topics = archive.params.n_topics,
        selection = %selection,
        "Final model saved"
    );
    Ok(archive)
}
