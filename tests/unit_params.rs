// Unit tests for the sweep grid and topic-count parsing.
//
// Covers build_grid's shape guarantees (order, alpha = 1/k, shared constants),
// its rejection of degenerate topic counts, and the list syntax accepted by
// parse_topic_counts.

use ldasweep::evaluate::params::{build_grid, default_topic_counts, parse_topic_counts, ConstParams};
use proptest::prelude::*;

// ============================================================
// build_grid
// ============================================================

#[test]
fn grid_for_two_topic_counts() {
    let consts = ConstParams {
        eta: 0.1,
        n_iter: 1500,
        random_state: 1,
        refresh: 10,
    };
    let grid = build_grid(&[10, 20], &consts).unwrap();

    assert_eq!(grid.len(), 2);
    assert_eq!(grid[0].n_topics, 10);
    assert!((grid[0].alpha - 0.1).abs() < 1e-12);
    assert_eq!(grid[1].n_topics, 20);
    assert!((grid[1].alpha - 0.05).abs() < 1e-12);
    for p in &grid {
        assert_eq!(p.eta, 0.1);
        assert_eq!(p.n_iter, 1500);
        assert_eq!(p.random_state, 1);
        assert_eq!(p.refresh, 10);
    }
}

#[test]
fn grid_preserves_input_order() {
    let grid = build_grid(&[40, 10, 25], &ConstParams::default()).unwrap();
    let ks: Vec<usize> = grid.iter().map(|p| p.n_topics).collect();
    assert_eq!(ks, vec![40, 10, 25]);
}

#[test]
fn grid_rejects_zero_topics() {
    let err = build_grid(&[10, 0], &ConstParams::default()).unwrap_err();
    assert!(err.to_string().contains("at least 1"), "unexpected error: {err}");
}

#[test]
fn empty_topic_list_gives_empty_grid() {
    assert!(build_grid(&[], &ConstParams::default()).unwrap().is_empty());
}

#[test]
fn default_sweep_is_strictly_increasing() {
    let ks = default_topic_counts();
    assert!(ks.windows(2).all(|w| w[0] < w[1]));
    assert!(build_grid(&ks, &ConstParams::default()).is_ok());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_alpha_is_inverse_of_k(ks in prop::collection::vec(1usize..1000, 1..20)) {
        let grid = build_grid(&ks, &ConstParams::default()).unwrap();
        prop_assert_eq!(grid.len(), ks.len());
        for (p, &k) in grid.iter().zip(&ks) {
            prop_assert_eq!(p.n_topics, k);
            prop_assert!((p.alpha * k as f64 - 1.0).abs() < 1e-12);
        }
    }
}

// ============================================================
// parse_topic_counts
// ============================================================

#[test]
fn parse_single_values() {
    assert_eq!(parse_topic_counts("10,20,30").unwrap(), vec![10, 20, 30]);
}

#[test]
fn parse_range_with_step() {
    assert_eq!(
        parse_topic_counts("40..100:20").unwrap(),
        vec![40, 60, 80]
    );
}

#[test]
fn parse_rejects_bad_input() {
    assert!(parse_topic_counts("").is_err());
    assert!(parse_topic_counts("ten").is_err());
    assert!(parse_topic_counts("10..5").is_err());
    assert!(parse_topic_counts("10..50:0").is_err());
}
