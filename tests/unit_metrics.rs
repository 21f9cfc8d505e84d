// Unit tests for the model quality metrics.
//
// Each metric is checked on small hand-built models whose answer is known:
// identical vs. disjoint topics, coherent vs. incoherent word sets, and the
// error paths for models a metric cannot score.

use ldasweep::data::dtm::DocumentTermMatrix;
use ldasweep::evaluate::metrics::{
    arun_2010, cao_juan_2009, coherence_mimno_2011, compute, griffiths_2004, parse_metrics,
    Direction, Metric, MetricOptions,
};
use ldasweep::evaluate::params::LdaParams;
use ldasweep::topics::model::{DenseMatrix, FittedModel};

fn model(topic_word: (usize, usize, Vec<f64>), doc_topic: (usize, usize, Vec<f64>)) -> FittedModel {
    FittedModel {
        topic_word: DenseMatrix::from_vec(topic_word.0, topic_word.1, topic_word.2).unwrap(),
        doc_topic: DenseMatrix::from_vec(doc_topic.0, doc_topic.1, doc_topic.2).unwrap(),
        loglikelihoods: vec![-120.0, -110.0, -105.0],
    }
}

fn params(n_topics: usize) -> LdaParams {
    LdaParams {
        n_topics,
        alpha: 1.0 / n_topics as f64,
        eta: 0.1,
        n_iter: 30,
        random_state: 1,
        refresh: 10,
    }
}

/// Two documents about words {0,1}, two about words {2,3}.
fn block_dtm() -> DocumentTermMatrix {
    DocumentTermMatrix::from_dense(&[
        vec![1, 1, 0, 0],
        vec![2, 1, 0, 0],
        vec![0, 0, 1, 1],
        vec![0, 0, 1, 3],
    ])
    .unwrap()
}

// ============================================================
// Metric names and directions
// ============================================================

#[test]
fn directions_match_metric_semantics() {
    assert_eq!(Metric::Loglikelihood.direction(), Direction::Maximize);
    assert_eq!(Metric::CoherenceMimno2011.direction(), Direction::Maximize);
    assert_eq!(Metric::Griffiths2004.direction(), Direction::Maximize);
    assert_eq!(Metric::CaoJuan2009.direction(), Direction::Minimize);
    assert_eq!(Metric::Arun2010.direction(), Direction::Minimize);
}

#[test]
fn is_better_follows_direction() {
    assert!(Metric::Loglikelihood.is_better(-10.0, -20.0));
    assert!(!Metric::Loglikelihood.is_better(-20.0, -10.0));
    assert!(Metric::Arun2010.is_better(0.1, 0.2));
    assert!(!Metric::Arun2010.is_better(0.2, 0.1));
}

#[test]
fn default_metrics_exclude_griffiths() {
    assert_eq!(
        Metric::defaults(),
        vec![
            Metric::Loglikelihood,
            Metric::CaoJuan2009,
            Metric::Arun2010,
            Metric::CoherenceMimno2011,
        ]
    );
}

#[test]
fn parse_metrics_dedups_and_rejects_unknown() {
    assert_eq!(
        parse_metrics("arun_2010, loglikelihood,arun_2010").unwrap(),
        vec![Metric::Arun2010, Metric::Loglikelihood]
    );
    let err = parse_metrics("arun_2010,perplexity").unwrap_err();
    assert!(err.to_string().contains("perplexity"));
    assert!(parse_metrics(" , ").is_err());
}

// ============================================================
// cao_juan_2009
// ============================================================

#[test]
fn cao_juan_identical_topics_is_one() {
    let m = model(
        (2, 3, vec![0.5, 0.5, 0.0, 0.5, 0.5, 0.0]),
        (1, 2, vec![0.5, 0.5]),
    );
    assert!((cao_juan_2009(&m) - 1.0).abs() < 1e-12);
}

#[test]
fn cao_juan_disjoint_topics_is_zero() {
    let m = model(
        (2, 4, vec![0.5, 0.5, 0.0, 0.0, 0.0, 0.0, 0.5, 0.5]),
        (1, 2, vec![0.5, 0.5]),
    );
    assert!(cao_juan_2009(&m).abs() < 1e-12);
}

#[test]
fn cao_juan_single_topic_is_zero() {
    let m = model((1, 2, vec![0.3, 0.7]), (1, 1, vec![1.0]));
    assert_eq!(cao_juan_2009(&m), 0.0);
}

// ============================================================
// arun_2010
// ============================================================

#[test]
fn arun_is_non_negative_and_finite() {
    let m = model(
        (2, 3, vec![0.6, 0.3, 0.1, 0.1, 0.2, 0.7]),
        (2, 2, vec![0.8, 0.2, 0.3, 0.7]),
    );
    let v = arun_2010(&m, &[3, 5]).unwrap();
    assert!(v.is_finite());
    assert!(v >= 0.0, "symmetric KL must be non-negative, got {v}");
}

#[test]
fn arun_identity_model_matches_hand_computed_value() {
    // Singular values are [1, 1]; length-weighted topic mass is [3, 4] / 5.
    let m = model(
        (2, 2, vec![1.0, 0.0, 0.0, 1.0]),
        (2, 2, vec![1.0, 0.0, 0.0, 1.0]),
    );
    let v = arun_2010(&m, &[3, 4]).unwrap();
    let expected = 0.4 * (1.0f64 / 0.6).ln() + 0.2 * (1.0f64 / 0.8).ln();
    assert!((v - expected).abs() < 1e-9, "expected {expected}, got {v}");
    assert!((v - 0.248_958_959_769_238_26).abs() < 1e-9);
}

#[test]
fn arun_rejects_more_topics_than_terms() {
    let m = model(
        (3, 2, vec![0.5, 0.5, 0.5, 0.5, 0.5, 0.5]),
        (1, 3, vec![0.2, 0.3, 0.5]),
    );
    assert!(arun_2010(&m, &[4]).is_err());
}

#[test]
fn arun_rejects_length_mismatch() {
    let m = model(
        (2, 3, vec![0.6, 0.3, 0.1, 0.1, 0.2, 0.7]),
        (2, 2, vec![0.8, 0.2, 0.3, 0.7]),
    );
    assert!(arun_2010(&m, &[3]).is_err());
}

// ============================================================
// coherence_mimno_2011
// ============================================================

#[test]
fn coherence_prefers_co_occurring_words() {
    let dtm = block_dtm();
    let doc_topic = (4, 2, vec![1.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 1.0]);

    // Each topic's top words always appear together.
    let coherent = model((2, 4, vec![0.4, 0.4, 0.1, 0.1, 0.1, 0.1, 0.4, 0.4]), doc_topic.clone());
    // Each topic's top words never appear together.
    let incoherent = model((2, 4, vec![0.4, 0.1, 0.4, 0.1, 0.1, 0.4, 0.1, 0.4]), doc_topic);

    let c_good = coherence_mimno_2011(&coherent, &dtm, 2, 1e-12);
    let c_bad = coherence_mimno_2011(&incoherent, &dtm, 2, 1e-12);

    assert!(c_good.abs() < 1e-9, "fully co-occurring words score ~0, got {c_good}");
    assert!(c_bad < -10.0, "never co-occurring words score very low, got {c_bad}");
    assert!(c_good > c_bad);
}

#[test]
fn coherence_matches_hand_computed_value() {
    // df = [3, 3, 2]; co-document counts: (0,1) = 2, (0,2) = 2, (1,2) = 1
    let dtm = DocumentTermMatrix::from_dense(&[
        vec![1, 1, 0],
        vec![2, 0, 1],
        vec![1, 3, 1],
        vec![0, 1, 0],
    ])
    .unwrap();
    let m = model(
        // topic 0 ranks words 0,1,2; topic 1 ranks words 2,1,0
        (2, 3, vec![0.5, 0.3, 0.2, 0.1, 0.2, 0.7]),
        (4, 2, vec![0.5; 8]),
    );

    let topic0 = (2.0f64 / 3.0).ln() + (2.0f64 / 3.0).ln() + (1.0f64 / 3.0).ln();
    let topic1 = (1.0f64 / 2.0).ln() + (2.0f64 / 2.0).ln() + (2.0f64 / 3.0).ln();
    let expected = (topic0 / 6.0 + topic1 / 6.0) / 2.0;

    let v = coherence_mimno_2011(&m, &dtm, 3, 1e-12);
    assert!((v - expected).abs() < 1e-9, "expected {expected}, got {v}");
}

#[test]
fn coherence_top_n_is_capped_by_vocabulary() {
    let dtm = block_dtm();
    let m = model(
        (2, 4, vec![0.4, 0.4, 0.1, 0.1, 0.1, 0.1, 0.4, 0.4]),
        (4, 2, vec![1.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 1.0]),
    );
    assert!(coherence_mimno_2011(&m, &dtm, 20, 1e-12).is_finite());
}

// ============================================================
// griffiths_2004 and compute()
// ============================================================

#[test]
fn griffiths_is_at_most_the_median() {
    let v = griffiths_2004(&[-105.0, -100.0, -110.0, -102.0]);
    assert!(v <= -103.5 + 1e-9);
    assert!(v >= -110.0);
}

#[test]
fn compute_loglikelihood_takes_last_trace_entry() {
    let m = model((1, 2, vec![0.3, 0.7]), (1, 1, vec![1.0]));
    let dtm = DocumentTermMatrix::from_dense(&[vec![1, 2]]).unwrap();
    let v = compute(Metric::Loglikelihood, &m, &dtm, &params(1), &MetricOptions::default()).unwrap();
    assert_eq!(v, -105.0);
}

#[test]
fn compute_loglikelihood_without_trace_fails() {
    let mut m = model((1, 2, vec![0.3, 0.7]), (1, 1, vec![1.0]));
    m.loglikelihoods.clear();
    let dtm = DocumentTermMatrix::from_dense(&[vec![1, 2]]).unwrap();
    assert!(compute(Metric::Loglikelihood, &m, &dtm, &params(1), &MetricOptions::default()).is_err());
}

#[test]
fn compute_griffiths_needs_samples_after_burnin() {
    // burn-in 50 / refresh 10 = 5 samples dropped, only 3 recorded
    let m = model((1, 2, vec![0.3, 0.7]), (1, 1, vec![1.0]));
    let dtm = DocumentTermMatrix::from_dense(&[vec![1, 2]]).unwrap();
    assert!(compute(Metric::Griffiths2004, &m, &dtm, &params(1), &MetricOptions::default()).is_err());

    let opts = MetricOptions {
        griffiths_burnin: 10,
        ..MetricOptions::default()
    };
    let v = compute(Metric::Griffiths2004, &m, &dtm, &params(1), &opts).unwrap();
    assert!(v.is_finite());
}
