use cpon_rust::{cumulative, histogram, qks, rescale, search_betamap, BetaParam, FitConfig};
use proptest::prelude::*;

fn arb_sorted_scores() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.0f64..=1.0, 1..400).prop_map(|mut v| {
        v.sort_by(f64::total_cmp);
        v
    })
}

fn arb_histogram() -> impl Strategy<Value = Vec<u64>> {
    prop::collection::vec(0u64..50, 2..150).prop_filter("non-empty", |h| h.iter().any(|&c| c > 0))
}

// ── histogram: length and mass ───────────────────────────────────────────

proptest! {
    #[test]
    fn histogram_conserves_count(data in arb_sorted_scores(), bins in 30usize..200) {
        let hist = histogram(&data, bins).unwrap();
        prop_assert_eq!(hist.len(), bins);
        prop_assert_eq!(hist.iter().sum::<u64>(), data.len() as u64);
    }
}

// ── ECDF: monotone, ends at one ──────────────────────────────────────────

proptest! {
    #[test]
    fn ecdf_is_monotone_and_ends_at_one(hist in arb_histogram()) {
        let ecdf = cumulative(&hist).unwrap();
        prop_assert_eq!(ecdf.len(), hist.len());
        prop_assert!(ecdf.windows(2).all(|w| w[0] <= w[1]));
        prop_assert_eq!(*ecdf.last().unwrap(), 1.0);
    }
}

// ── rescale: monotone, saturated tail, untouched low tail ────────────────

proptest! {
    #[test]
    fn rescale_preserves_shape_invariants(hist in arb_histogram()) {
        let ecdf = cumulative(&hist).unwrap();
        let rescaled = rescale(&ecdf);
        let values = &rescaled.values;
        let state = rescaled.state;

        prop_assert_eq!(values.len(), ecdf.len());
        prop_assert!(values.windows(2).all(|w| w[0] <= w[1]));
        prop_assert!(values[state.imax..].iter().all(|&v| v == 1.0));

        let imin = ecdf.iter().position(|&v| v > 0.0);
        let imax = ecdf.iter().rposition(|&v| v < 1.0);
        match (imin, imax) {
            (Some(lo), Some(hi)) if lo <= hi => {
                // nothing is written below the first scaled position
                let first = state.scale(lo as f64) as usize;
                prop_assert!(values[..first].iter().all(|&v| v == 0.0));
            }
            _ => prop_assert_eq!(values, &ecdf),
        }
    }
}

// ── qks: bounded, finite, decreasing ─────────────────────────────────────

proptest! {
    #[test]
    fn qks_is_a_bounded_finite_probability(lam in 0.0f64..100.0) {
        let p = qks(lam);
        prop_assert!(p.is_finite());
        prop_assert!((0.0..=1.0).contains(&p));
    }

    #[test]
    fn qks_is_decreasing(a in 0.0f64..4.0, delta in 0.01f64..1.0) {
        prop_assert!(qks(a + delta) <= qks(a) + 1e-6);
    }
}

// ── segment map: keys increase, sentinel present, queries defined ────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn segment_map_invariants_hold(data in arb_sorted_scores(), rv in 0.0f64..=1.0) {
        let config = FitConfig {
            search_rounds: Some(3),
            search_steps: Some(8),
            ..FitConfig::default()
        };
        let ecdf = cumulative(&histogram(&data, 100).unwrap()).unwrap();
        let rescaled = rescale(&ecdf);
        let map = search_betamap(&rescaled.values, BetaParam::uniform(), &config);

        let keys = map.keys();
        prop_assert!(keys.windows(2).all(|w| w[0] < w[1]));
        prop_assert_eq!(*keys.last().unwrap(), 1.0);
        prop_assert!(map.is_valid());

        let p = map.probability(rv).unwrap();
        prop_assert!(p.is_finite() && (0.0..=1.0).contains(&p));
    }
}
