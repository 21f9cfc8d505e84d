// Unit tests for result indexing and final model selection.
//
// Results are built by hand so the selection rules can be checked against
// known scores: exact topic-count lookup (including the missing-k error),
// metric ranking in both directions, and the handling of missing scores.

use std::collections::BTreeMap;

use ldasweep::evaluate::metrics::Metric;
use ldasweep::evaluate::params::{build_grid, ConstParams};
use ldasweep::evaluate::results::{
    best_by_metric, rank_by_metric, results_by_parameter, select, select_by_n_topics, EvalResult,
    ModelSelection, Param,
};

/// Results for k = 30, 10, 20 (deliberately unsorted).
fn sample_results() -> Vec<EvalResult> {
    let grid = build_grid(&[30, 10, 20], &ConstParams::default()).unwrap();
    let scores = [
        // (loglikelihood, arun_2010)
        (-900.0, 0.30),
        (-1000.0, 0.10),
        (-950.0, 0.20),
    ];
    grid.into_iter()
        .zip(scores)
        .map(|(params, (ll, arun))| EvalResult {
            params,
            scores: BTreeMap::from([(Metric::Loglikelihood, ll), (Metric::Arun2010, arun)]),
            model: None,
        })
        .collect()
}

fn ks(results: &[&EvalResult]) -> Vec<usize> {
    results.iter().map(|r| r.params.n_topics).collect()
}

// ============================================================
// results_by_parameter
// ============================================================

#[test]
fn results_by_n_topics_are_sorted_ascending() {
    let results = sample_results();
    let by_k = results_by_parameter(&results, Param::NTopics);
    let xs: Vec<f64> = by_k.iter().map(|(x, _)| *x).collect();
    assert_eq!(xs, vec![10.0, 20.0, 30.0]);
    assert_eq!(by_k[0].1.params.n_topics, 10);
}

#[test]
fn results_by_alpha_reverse_the_topic_order() {
    let results = sample_results();
    let by_alpha = results_by_parameter(&results, Param::Alpha);
    let order: Vec<usize> = by_alpha.iter().map(|(_, r)| r.params.n_topics).collect();
    assert_eq!(order, vec![30, 20, 10]);
}

// ============================================================
// select_by_n_topics
// ============================================================

#[test]
fn select_existing_topic_count() {
    let results = sample_results();
    let r = select_by_n_topics(&results, 20).unwrap();
    assert_eq!(r.params.n_topics, 20);
    assert_eq!(r.score(Metric::Arun2010), Some(0.20));
}

#[test]
fn select_missing_topic_count_lists_available() {
    let results = sample_results();
    let err = select_by_n_topics(&results, 25).unwrap_err().to_string();
    assert!(err.contains("n_topics=25"), "unexpected error: {err}");
    assert!(err.contains("[10, 20, 30]"), "unexpected error: {err}");
}

// ============================================================
// Ranking by metric
// ============================================================

#[test]
fn rank_maximized_metric_best_first() {
    let results = sample_results();
    assert_eq!(ks(&rank_by_metric(&results, Metric::Loglikelihood)), vec![30, 20, 10]);
}

#[test]
fn rank_minimized_metric_best_first() {
    let results = sample_results();
    assert_eq!(ks(&rank_by_metric(&results, Metric::Arun2010)), vec![10, 20, 30]);
}

#[test]
fn rank_skips_results_without_score() {
    let mut results = sample_results();
    results[0].scores.remove(&Metric::Arun2010);
    assert_eq!(ks(&rank_by_metric(&results, Metric::Arun2010)), vec![10, 20]);
    assert!(rank_by_metric(&results, Metric::CaoJuan2009).is_empty());
}

#[test]
fn best_by_metric_without_scores_fails() {
    let results = sample_results();
    assert!(best_by_metric(&results, Metric::CoherenceMimno2011).is_err());
    assert_eq!(best_by_metric(&results, Metric::Arun2010).unwrap().params.n_topics, 10);
}

// ============================================================
// select() and require_model()
// ============================================================

#[test]
fn select_dispatches_on_policy() {
    let results = sample_results();
    let by_k = select(&results, &ModelSelection::NTopics(30)).unwrap();
    assert_eq!(by_k.params.n_topics, 30);
    let by_metric = select(&results, &ModelSelection::BestBy(Metric::Loglikelihood)).unwrap();
    assert_eq!(by_metric.params.n_topics, 30);
}

#[test]
fn selection_display() {
    assert_eq!(ModelSelection::NTopics(20).to_string(), "n_topics=20");
    assert_eq!(
        ModelSelection::BestBy(Metric::Arun2010).to_string(),
        "best by arun_2010"
    );
}

#[test]
fn require_model_explains_missing_model() {
    let results = sample_results();
    let err = results[0].require_model().unwrap_err().to_string();
    assert!(err.contains("--no-models"), "unexpected error: {err}");
}
