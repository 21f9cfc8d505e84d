// Spreadsheet-style summary of a fitted model, written as CSV sheets.
//
// The summary directory holds one CSV file per sheet:
//   top_doc_topics_{vals,labels,labelled_vals}.csv   top topics of each document
//   top_topic_word_{vals,labels,labelled_vals}.csv   top words of each topic
//   marginal_topic_distrib.csv                      overall weight of each topic

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::data::dtm::DocumentTermMatrix;
use crate::topics::model::{topic_label, DenseMatrix, FittedModel};

/// How many entries each "top" sheet lists per row.
#[derive(Debug, Clone, Copy)]
pub struct SummaryOptions {
    pub top_topics_per_doc: usize,
    pub top_words_per_topic: usize,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            top_topics_per_doc: 3,
            top_words_per_topic: 10,
        }
    }
}

/// Write all summary sheets for `model` into `dir`.
pub fn save_summary(
    dir: &Path,
    model: &FittedModel,
    doc_labels: &[String],
    vocab: &[String],
    dtm: &DocumentTermMatrix,
    opts: &SummaryOptions,
) -> Result<()> {
    if doc_labels.len() != model.doc_topic.n_rows {
        anyhow::bail!(
            "Model has {} documents but {} document labels were given",
            model.doc_topic.n_rows,
            doc_labels.len()
        );
    }
    if vocab.len() != model.topic_word.n_cols {
        anyhow::bail!(
            "Model has {} terms but the vocabulary has {}",
            model.topic_word.n_cols,
            vocab.len()
        );
    }

    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create summary directory: {}", dir.display()))?;

    let topic_names: Vec<String> = (0..model.n_topics()).map(topic_label).collect();

    write_top_n_sheets(
        dir,
        "top_doc_topics",
        &model.doc_topic,
        doc_labels,
        &topic_names,
        opts.top_topics_per_doc,
    )?;
    write_top_n_sheets(
        dir,
        "top_topic_word",
        &model.topic_word,
        &topic_names,
        vocab,
        opts.top_words_per_topic,
    )?;

    let marginal = marginal_topic_distrib(model, dtm)?;
    let path = dir.join("marginal_topic_distrib.csv");
    let mut w = csv::Writer::from_path(&path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    w.write_record(["topic", "marginal_prob"])?;
    for (name, p) in topic_names.iter().zip(&marginal) {
        let p = p.to_string();
        w.write_record([name.as_str(), p.as_str()])?;
    }
    w.flush()?;

    info!(dir = %dir.display(), "Saved model summary");
    Ok(())
}

/// Overall topic proportions: document-topic rows weighted by document length.
pub fn marginal_topic_distrib(model: &FittedModel, dtm: &DocumentTermMatrix) -> Result<Vec<f64>> {
    let lengths = dtm.doc_lengths();
    if lengths.len() != model.doc_topic.n_rows {
        anyhow::bail!(
            "Matrix has {} documents but the model has {}",
            lengths.len(),
            model.doc_topic.n_rows
        );
    }
    let total: u64 = lengths.iter().sum();
    let mut marginal = vec![0.0; model.n_topics()];
    for (row, &len) in model.doc_topic.rows().zip(&lengths) {
        for (acc, &p) in marginal.iter_mut().zip(row) {
            *acc += p * len as f64;
        }
    }
    if total > 0 {
        for v in &mut marginal {
            *v /= total as f64;
        }
    }
    Ok(marginal)
}

/// Write the `_vals`, `_labels` and `_labelled_vals` variants of one top-n table.
fn write_top_n_sheets(
    dir: &Path,
    prefix: &str,
    distrib: &DenseMatrix,
    row_labels: &[String],
    val_labels: &[String],
    top_n: usize,
) -> Result<()> {
    let top_n = top_n.min(distrib.n_cols);
    let mut header = vec!["label".to_string()];
    header.extend((1..=top_n).map(|rank| format!("rank_{rank}")));

    let open = |suffix: &str| -> Result<csv::Writer<fs::File>> {
        let path = dir.join(format!("{prefix}_{suffix}.csv"));
        let mut w = csv::Writer::from_path(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        w.write_record(&header)?;
        Ok(w)
    };
    let mut vals = open("vals")?;
    let mut labels = open("labels")?;
    let mut labelled = open("labelled_vals")?;

    for (r, row_label) in row_labels.iter().enumerate() {
        let top = distrib.top_n_in_row(r, top_n);

        let mut v_rec = vec![row_label.clone()];
        let mut l_rec = vec![row_label.clone()];
        let mut lv_rec = vec![row_label.clone()];
        for (idx, p) in top {
            v_rec.push(p.to_string());
            l_rec.push(val_labels[idx].clone());
            lv_rec.push(format!("{} ({p:.6})", val_labels[idx]));
        }
        vals.write_record(&v_rec)?;
        labels.write_record(&l_rec)?;
        labelled.write_record(&lv_rec)?;
    }

    vals.flush()?;
    labels.flush()?;
    labelled.flush()?;
    Ok(())
}
