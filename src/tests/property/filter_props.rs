//! Property-based tests for the confidence filter

use proptest::prelude::*;

use crate::core::suggest::{Candidate, ConfidenceFilter, ScoreStats};

fn arb_scores() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.0f64..1000.0, 0..60)
}

/// Whole-number scores keep sums and means exact.
fn arb_integral_scores() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec((0u32..1000).prop_map(f64::from), 1..60)
}

/// Scores as the backend returns them, best first.
fn arb_ranked_scores() -> impl Strategy<Value = Vec<f64>> {
    arb_integral_scores().prop_map(|mut scores| {
        scores.sort_by(|a, b| b.total_cmp(a));
        scores
    })
}

fn to_candidates(scores: &[f64]) -> Vec<Candidate> {
    scores
        .iter()
        .enumerate()
        .map(|(i, s)| Candidate::new(format!("c{}", i), *s))
        .collect()
}

proptest! {
    #[test]
    fn never_exceeds_max_count(scores in arb_scores(), max in 0usize..10, k in 0.0f64..4.0) {
        let out = ConfidenceFilter::new(k).filter(&to_candidates(&scores), max);
        prop_assert!(out.len() <= max);
    }

    #[test]
    fn never_admits_below_cutoff(scores in arb_scores(), k in 0.0f64..4.0) {
        let (out, stats) = ConfidenceFilter::new(k).filter_with_stats(&to_candidates(&scores), 100);
        if let Some(stats) = stats {
            for c in &out {
                prop_assert!(c.score >= stats.cutoff);
            }
        } else {
            prop_assert!(out.is_empty());
        }
    }

    #[test]
    fn output_is_input_prefix(scores in arb_scores(), k in 0.0f64..4.0) {
        let candidates = to_candidates(&scores);
        let out = ConfidenceFilter::new(k).filter(&candidates, 100);
        prop_assert_eq!(&out[..], &candidates[..out.len()]);
    }

    #[test]
    fn first_below_cutoff_ends_the_walk(scores in arb_scores(), k in 0.0f64..4.0) {
        let candidates = to_candidates(&scores);
        let (out, stats) = ConfidenceFilter::new(k).filter_with_stats(&candidates, 100);
        if let Some(stats) = stats {
            if let Some(next) = candidates.get(out.len()) {
                prop_assert!(next.score < stats.cutoff);
            }
        }
    }

    #[test]
    fn zero_k_always_admits_the_best(scores in arb_ranked_scores()) {
        let out = ConfidenceFilter::new(0.0).filter(&to_candidates(&scores), 1);
        prop_assert_eq!(out.len(), 1);
        prop_assert_eq!(out[0].score, scores[0]);
    }

    #[test]
    fn stats_are_ordered(scores in prop::collection::vec(0.0f64..1000.0, 1..60)) {
        let stats = ScoreStats::compute(&scores, 2.0).unwrap();
        prop_assert!(stats.min <= stats.median && stats.median <= stats.max);
        prop_assert!(stats.variance >= 0.0);
        prop_assert!(stats.cutoff >= stats.mean);
    }

    #[test]
    fn uniform_scores_all_pass(score in 0u32..1000, n in 1usize..20) {
        let out = ConfidenceFilter::default().filter(&to_candidates(&vec![f64::from(score); n]), n);
        prop_assert_eq!(out.len(), n);
    }
}
