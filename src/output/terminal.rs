// Colored terminal output for evaluation results and fitted models.
//
// This module handles all terminal-specific formatting: colors and tables.
// The pipelines delegate here for everything the user reads on stdout.

use colored::Colorize;

use crate::evaluate::metrics::{Direction, Metric};
use crate::evaluate::results::EvalResult;
use crate::topics::model::{topic_label, DenseMatrix, FittedModel};

/// Format the top entries of every row of a distribution.
///
/// Each row prints its label, then one `> #rank. label (value)` line per entry.
pub fn format_distribution(
    distrib: &DenseMatrix,
    row_labels: &[String],
    val_labels: &[String],
    top_n: usize,
) -> String {
    let mut out = String::new();
    for (r, row_label) in row_labels.iter().enumerate().take(distrib.n_rows) {
        out.push_str(row_label);
        out.push('\n');
        for (rank, (idx, p)) in distrib.top_n_in_row(r, top_n).into_iter().enumerate() {
            let label = val_labels.get(idx).map_or("?", String::as_str);
            out.push_str(&format!("> #{}. {} ({:.6})\n", rank + 1, label, p));
        }
    }
    out
}

/// Print the `n_top` most probable words of every topic.
pub fn print_topic_words(model: &FittedModel, vocab: &[String], n_top: usize) {
    let topic_names: Vec<String> = (0..model.n_topics()).map(topic_label).collect();
    print!(
        "{}",
        format_distribution(&model.topic_word, &topic_names, vocab, n_top)
    );
}

/// Print the `n_top` most probable topics of every document.
pub fn print_doc_topics(model: &FittedModel, doc_labels: &[String], n_top: usize) {
    let labels: Vec<String> = doc_labels
        .iter()
        .map(|l| super::truncate_chars(l, 100))
        .collect();
    let topic_names: Vec<String> = (0..model.n_topics()).map(topic_label).collect();
    print!(
        "{}",
        format_distribution(&model.doc_topic, &labels, &topic_names, n_top)
    );
}

/// Display the evaluation table: one row per configuration, one column per
/// metric, with each metric's best value highlighted.
pub fn display_eval_table(points: &[(f64, &EvalResult)], metrics: &[Metric]) {
    if points.is_empty() {
        println!("No evaluation results.");
        return;
    }

    println!(
        "\n{}",
        format!("=== Evaluation Results ({} models) ===", points.len()).bold()
    );
    println!();

    let mut header = format!("  {:>8}  {:>8}", "k".dimmed(), "alpha".dimmed());
    for m in metrics {
        header.push_str(&format!("  {:>22}", m.name().dimmed()));
    }
    println!("{header}");
    println!("  {}", "-".repeat(20 + 24 * metrics.len()).dimmed());

    let best: Vec<Option<usize>> = metrics
        .iter()
        .map(|&m| {
            points
                .iter()
                .filter_map(|(_, r)| {
                    r.score(m)
                        .filter(|v| v.is_finite())
                        .map(|v| (v, r.params.n_topics))
                })
                .fold(None, |acc: Option<(f64, usize)>, (v, k)| match acc {
                    Some((bv, _)) if !m.is_better(v, bv) => acc,
                    _ => Some((v, k)),
                })
                .map(|(_, k)| k)
        })
        .collect();

    for (_, r) in points {
        let mut line = format!("  {:>8}  {:>8.4}", r.params.n_topics, r.params.alpha);
        for (m, best_k) in metrics.iter().zip(&best) {
            let cell = match r.score(*m) {
                Some(v) => format!("{:>22}", format_score(v)),
                None => format!("{:>22}", "-"),
            };
            if *best_k == Some(r.params.n_topics) {
                line.push_str(&format!("  {}", cell.green().bold()));
            } else {
                line.push_str(&format!("  {cell}"));
            }
        }
        println!("{line}");
    }
    println!();

    for (m, best_k) in metrics.iter().zip(&best) {
        if let Some(k) = best_k {
            let arrow = match m.direction() {
                Direction::Maximize => "max",
                Direction::Minimize => "min",
            };
            println!("  {} {:<22} k = {}", "*".green(), format!("{m} ({arrow})"), k);
        }
    }
}

fn format_score(v: f64) -> String {
    if v.abs() >= 1e5 {
        format!("{v:.1}")
    } else {
        format!("{v:.6}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_distribution_lists_top_entries() {
        let m = DenseMatrix::from_vec(1, 3, vec![0.2, 0.5, 0.3]).unwrap();
        let out = format_distribution(
            &m,
            &["topic_1".to_string()],
            &["oil".to_string(), "wheat".to_string(), "gold".to_string()],
            2,
        );
        assert_eq!(out, "topic_1\n> #1. wheat (0.500000)\n> #2. gold (0.300000)\n");
    }
}
