//! Segmentation of a rescaled ECDF into Beta-governed pieces.

use serde::{Deserialize, Serialize};

use crate::config::FitConfig;
use crate::error::CponResult;
use crate::models::beta::{search_beta, BetaParam, SearchOutcome};
use crate::models::segment_map::SegmentMap;
use crate::utils::ks::{kstest, KsResult, KsTest};

/// Walks `ecdf` left to right, growing the test window `[front, rear)`.
///
/// Whenever the current parameters fail the partial KS test, a local
/// search is attempted. If the search fails too, the segment ending at
/// `rear - 1` is closed under the pre-search parameters, the window
/// restarts at `rear - 1` and the same `rear` is tested again with the
/// searched parameters. A cut is only recorded when it closes a non-empty
/// segment. The final parameters get the sentinel key 1.0.
pub fn search_betamap(ecdf: &[f64], seed: BetaParam, config: &FitConfig) -> SegmentMap {
    let significance = config.effective_significance();
    let size = ecdf.len();
    let mut map = SegmentMap::new();
    let mut kst = KsTest::new(ecdf);
    let mut prev = seed;

    let mut rear = 1;
    while rear <= size {
        kst.rear = rear;
        kst.run(&prev);

        if kst.rejects(significance) {
            let mut searched = prev;
            let outcome = search_beta(&mut kst, &mut searched, config);
            if outcome == SearchOutcome::Exhausted && rear - 1 > kst.front {
                let cut = rear - 1;
                let key = cut as f64 / size as f64;
                map.insert(key, prev);
                tracing::debug!(
                    key,
                    alpha = prev.alpha,
                    beta = prev.beta,
                    pval = kst.result.pval,
                    "closing segment"
                );
                kst.front = cut;
                prev = searched;
                continue;
            }
            prev = searched;
        }
        rear += 1;
    }

    map.insert(1.0, prev);
    map
}

/// Diagnostic view of a fit: the model's curve next to the ECDF it was
/// fitted to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BetaSketch {
    pub xaxis: Vec<f64>,
    pub ecdf: Vec<f64>,
    pub beta: Vec<f64>,
    pub ksr: KsResult,
}

impl BetaSketch {
    /// Evaluates `map` at `i / N` for `i = 1..=N` and KS-tests the curve
    /// against `ecdf`.
    pub fn from_fit(ecdf: &[f64], map: &SegmentMap) -> CponResult<Self> {
        let size = ecdf.len();
        let xaxis: Vec<f64> = (1..=size).map(|i| i as f64 / size as f64).collect();
        let beta: Vec<f64> = xaxis
            .iter()
            .map(|&rv| map.probability(rv).unwrap_or(0.0))
            .collect();
        let ksr = kstest(ecdf, &beta)?;
        Ok(BetaSketch {
            xaxis,
            ecdf: ecdf.to_vec(),
            beta,
            ksr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform_ecdf() -> Vec<f64> {
        (1..=100).map(|i| i as f64 / 100.0).collect()
    }

    #[test]
    fn test_single_segment_when_seed_fits() {
        let ecdf = uniform_ecdf();
        let map = search_betamap(&ecdf, BetaParam::uniform(), &FitConfig::default());
        assert_eq!(map.len(), 1);
        assert_eq!(map.keys(), vec![1.0]);
        assert_eq!(map.lookup(0.5), Some(BetaParam::uniform()));
    }

    #[test]
    fn test_step_ecdf_is_split() {
        // flat at 0.05 then jumping to 0.95: no single Beta hugs both shelves
        let mut ecdf = vec![0.05; 50];
        ecdf.extend(vec![0.95; 49]);
        ecdf.push(1.0);
        let config = FitConfig {
            search_rounds: Some(5),
            search_steps: Some(10),
            ..FitConfig::default()
        };
        let map = search_betamap(&ecdf, BetaParam::uniform(), &config);

        assert!(map.is_valid());
        for rv in [0.0, 0.1, 0.49, 0.5, 0.51, 0.99, 1.0] {
            let p = map.probability(rv).unwrap();
            assert!((0.0..=1.0).contains(&p), "rv={rv} p={p}");
        }
    }

    #[test]
    fn test_single_point_ecdf() {
        let map = search_betamap(&[1.0], BetaParam::new(2.0, 3.0), &FitConfig::default());
        assert!(map.is_valid());
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_sketch_of_uniform_fit() {
        let ecdf = uniform_ecdf();
        let map = search_betamap(&ecdf, BetaParam::uniform(), &FitConfig::default());
        let sketch = BetaSketch::from_fit(&ecdf, &map).unwrap();
        assert_eq!(sketch.xaxis.len(), 100);
        assert_eq!(sketch.beta.len(), 100);
        assert!(sketch.ksr.d < 1e-9);
        assert_eq!(sketch.ksr.pval, 1.0);
    }
}
