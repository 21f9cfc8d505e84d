// Unit tests for the topic model behind its trait.
//
// The sweep only sees `dyn TopicModel`, so these tests drive the Gibbs sampler
// the same way: fit a small block-structured matrix and check the fitted
// distributions, not the sampler internals.

use ldasweep::data::dtm::DocumentTermMatrix;
use ldasweep::evaluate::params::{build_grid, ConstParams};
use ldasweep::topics::lda::GibbsLda;
use ldasweep::topics::model::FittedModel;
use ldasweep::topics::traits::TopicModel;

fn two_block_dtm() -> DocumentTermMatrix {
    DocumentTermMatrix::from_dense(&[
        vec![5, 4, 0, 0],
        vec![4, 6, 0, 0],
        vec![3, 5, 0, 0],
        vec![0, 0, 5, 4],
        vec![0, 0, 4, 6],
        vec![0, 0, 6, 3],
    ])
    .unwrap()
}

fn fit(k: usize, n_iter: usize) -> FittedModel {
    let consts = ConstParams {
        n_iter,
        ..ConstParams::default()
    };
    let params = build_grid(&[k], &consts).unwrap().remove(0);
    let model: Box<dyn TopicModel> = Box::new(GibbsLda::new(params));
    model.fit(&two_block_dtm()).unwrap()
}

// ============================================================
// Fitted distributions
// ============================================================

#[test]
fn distributions_are_row_stochastic() {
    let m = fit(2, 50);
    assert_eq!((m.topic_word.n_rows, m.topic_word.n_cols), (2, 4));
    assert_eq!((m.doc_topic.n_rows, m.doc_topic.n_cols), (6, 2));
    for row in m.topic_word.rows().chain(m.doc_topic.rows()) {
        let sum: f64 = row.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9, "row sums to {sum}");
        assert!(row.iter().all(|&p| p > 0.0));
    }
}

#[test]
fn log_likelihood_trace_improves_on_initial_state() {
    let m = fit(2, 100);
    // 0, 10, ..., 90 plus the final state
    assert_eq!(m.loglikelihoods.len(), 11);
    let first = m.loglikelihoods[0];
    let last = m.loglikelihood().unwrap();
    assert!(last > first, "expected {last} > {first}");
}

#[test]
fn same_block_documents_share_a_dominant_topic() {
    let m = fit(2, 200);
    let dominant: Vec<usize> = (0..6).map(|d| m.doc_topic.top_n_in_row(d, 1)[0].0).collect();
    assert_eq!(dominant[0], dominant[1]);
    assert_eq!(dominant[1], dominant[2]);
    assert_eq!(dominant[3], dominant[4]);
    assert_eq!(dominant[4], dominant[5]);
    assert_ne!(dominant[0], dominant[3]);
}

#[test]
fn single_topic_model_matches_word_frequencies() {
    let m = fit(1, 10);
    assert!(m.doc_topic.rows().all(|r| (r[0] - 1.0).abs() < 1e-12));
    // With one topic every token is assigned to it, so the topic-word row is
    // the smoothed corpus frequency of each term.
    let dtm = two_block_dtm();
    let total = dtm.total_tokens() as f64;
    let eta = ConstParams::default().eta;
    for w in 0..4 {
        let count: u64 = (0..6).map(|d| dtm.get(d, w) as u64).sum();
        let expected = (count as f64 + eta) / (total + 4.0 * eta);
        assert!((m.topic_word.get(0, w) - expected).abs() < 1e-12);
    }
}
