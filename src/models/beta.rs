//! Beta shape parameters: moment-matched seeding and the local
//! coordinate-descent search driven by the partial KS test.

use serde::{Deserialize, Serialize};
use statrs::distribution::{Beta, ContinuousCDF};

use crate::config::FitConfig;
use crate::error::{CponError, CponResult};
use crate::utils::ks::KsTest;

/// Shape parameters of a Beta distribution over [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BetaParam {
    pub alpha: f64,
    pub beta: f64,
}

impl BetaParam {
    pub fn new(alpha: f64, beta: f64) -> Self {
        BetaParam { alpha, beta }
    }

    /// Beta(1, 1).
    pub fn uniform() -> Self {
        BetaParam::new(1.0, 1.0)
    }

    /// Regularized incomplete Beta function `I_x(alpha, beta)`.
    ///
    /// `x` is clamped to [0, 1]. A non-positive shape is read as its
    /// limit: `alpha <= 0` puts all mass at 0, `beta <= 0` all mass at 1.
    pub fn cdf(&self, x: f64) -> f64 {
        let x = x.clamp(0.0, 1.0);
        if self.alpha <= 0.0 {
            return if x > 0.0 { 1.0 } else { 0.0 };
        }
        if self.beta <= 0.0 {
            return if x >= 1.0 { 1.0 } else { 0.0 };
        }
        match Beta::new(self.alpha, self.beta) {
            Ok(dist) => {
                let p = dist.cdf(x);
                if p.is_finite() {
                    p.clamp(0.0, 1.0)
                } else {
                    x
                }
            }
            // Non-finite shapes; treat as uniform.
            Err(_) => x,
        }
    }
}

impl Default for BetaParam {
    fn default() -> Self {
        BetaParam::uniform()
    }
}

/// Seeds Beta parameters from the mean and variance of data on
/// `[lower, upper]` by the method of moments.
///
/// Fails with `DegenerateSample` when the mean touches a support bound or
/// the variance vanishes.
pub fn moment_match(mean: f64, variance: f64, lower: f64, upper: f64) -> CponResult<BetaParam> {
    let degenerate = CponError::DegenerateSample { mean, variance };
    let width = upper - lower;
    if !(mean.is_finite() && variance.is_finite() && width > 0.0) {
        return Err(degenerate);
    }

    let mu = (mean - lower) / width;
    let var = variance / (width * width);
    if mu <= 0.0 || mu >= 1.0 || var <= f64::EPSILON {
        return Err(degenerate);
    }

    let alpha = (mu * ((mu * (1.0 - mu)) / var - 1.0)).abs();
    let beta = alpha * (1.0 - mu) / mu;
    if !(alpha.is_finite() && beta.is_finite()) || alpha <= 0.0 || beta <= 0.0 {
        return Err(degenerate);
    }
    Ok(BetaParam::new(alpha, beta))
}

/// How a parameter search ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The partial KS p-value reached the significance level.
    Converged,
    /// The iteration budget ran out first.
    Exhausted,
}

/// Locally searches `bp` until the partial KS test on `kst`'s window stops
/// rejecting.
///
/// Coordinate descent: each round starts with steps of half the current
/// alpha and beta and walks alpha, then beta. A move that worsens the
/// statistic flips that parameter's direction and shrinks its step; a move
/// that would make a parameter negative ends its walk for the round. Both
/// directions flip between rounds. `bp` is updated in place; the caller
/// reads the final p-value from `kst.result`.
///
/// This is a heuristic. It may stop at a fit that is good enough rather
/// than best, or give up.
pub fn search_beta(kst: &mut KsTest<'_>, bp: &mut BetaParam, config: &FitConfig) -> SearchOutcome {
    let significance = config.effective_significance();
    let shrink = config.effective_step_shrink();
    let steps = config.effective_search_steps();

    let mut asign = 1.0;
    let mut bsign = 1.0;
    let mut best_d = kst.result.d;

    for _ in 0..config.effective_search_rounds() {
        if !kst.rejects(significance) {
            break;
        }
        let mut astep = bp.alpha / 2.0;
        let mut bstep = bp.beta / 2.0;

        for _ in 0..steps {
            if !kst.rejects(significance) || bp.alpha + asign * astep < 0.0 {
                break;
            }
            bp.alpha += asign * astep;
            let result = kst.run(bp);
            if result.d > best_d {
                asign = -asign;
                astep *= shrink;
            } else {
                best_d = result.d;
            }
        }

        for _ in 0..steps {
            if !kst.rejects(significance) || bp.beta + bsign * bstep < 0.0 {
                break;
            }
            bp.beta += bsign * bstep;
            let result = kst.run(bp);
            if result.d > best_d {
                bsign = -bsign;
                bstep *= shrink;
            } else {
                best_d = result.d;
            }
        }

        asign = -asign;
        bsign = -bsign;
    }

    let outcome = if kst.rejects(significance) {
        SearchOutcome::Exhausted
    } else {
        SearchOutcome::Converged
    };
    tracing::debug!(
        front = kst.front,
        rear = kst.rear,
        alpha = bp.alpha,
        beta = bp.beta,
        pval = kst.result.pval,
        ?outcome,
        "beta search finished"
    );
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cdf_uniform() {
        let bp = BetaParam::uniform();
        assert!((bp.cdf(0.3) - 0.3).abs() < 1e-10);
        assert_eq!(bp.cdf(-1.0), 0.0);
        assert_eq!(bp.cdf(2.0), 1.0);
    }

    #[test]
    fn test_cdf_known_value() {
        // I_0.5(2, 2) = 0.5 by symmetry; I_0.5(1, 2) = 1 - 0.25
        assert!((BetaParam::new(2.0, 2.0).cdf(0.5) - 0.5).abs() < 1e-10);
        assert!((BetaParam::new(1.0, 2.0).cdf(0.5) - 0.75).abs() < 1e-10);
    }

    #[test]
    fn test_cdf_zero_shapes() {
        assert_eq!(BetaParam::new(0.0, 2.0).cdf(0.1), 1.0);
        assert_eq!(BetaParam::new(0.0, 2.0).cdf(0.0), 0.0);
        assert_eq!(BetaParam::new(2.0, 0.0).cdf(0.9), 0.0);
        assert_eq!(BetaParam::new(2.0, 0.0).cdf(1.0), 1.0);
    }

    #[test]
    fn test_moment_match_recovers_parameters() {
        // Beta(2, 5): mean 2/7, variance 10 / (49 * 8)
        let mean = 2.0 / 7.0;
        let variance = 10.0 / (49.0 * 8.0);
        let bp = moment_match(mean, variance, 0.0, 1.0).unwrap();
        assert!((bp.alpha - 2.0).abs() < 1e-9);
        assert!((bp.beta - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_moment_match_rescaled_support() {
        let mean = 2.0 / 7.0 * 10.0;
        let variance = 10.0 / (49.0 * 8.0) * 100.0;
        let bp = moment_match(mean, variance, 0.0, 10.0).unwrap();
        assert!((bp.alpha - 2.0).abs() < 1e-9);
        assert!((bp.beta - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_moment_match_degenerate() {
        assert!(matches!(
            moment_match(0.0, 0.1, 0.0, 1.0),
            Err(CponError::DegenerateSample { .. })
        ));
        assert!(matches!(
            moment_match(1.0, 0.1, 0.0, 1.0),
            Err(CponError::DegenerateSample { .. })
        ));
        assert!(matches!(
            moment_match(0.5, 0.0, 0.0, 1.0),
            Err(CponError::DegenerateSample { .. })
        ));
        assert!(matches!(
            moment_match(f64::NAN, 0.1, 0.0, 1.0),
            Err(CponError::DegenerateSample { .. })
        ));
    }

    #[test]
    fn test_search_improves_bad_seed() {
        // uniform ECDF against Beta(0.5, 1): sqrt(x) deviates by 0.25
        let ecdf: Vec<f64> = (1..=100).map(|i| i as f64 / 100.0).collect();
        let mut kst = KsTest::new(&ecdf);
        kst.rear = 100;
        let mut bp = BetaParam::new(0.5, 1.0);
        let before = kst.run(&bp);
        assert!(before.pval < 0.05);

        // one alpha step of +alpha/2 lands on x^0.75, within tolerance
        let outcome = search_beta(&mut kst, &mut bp, &FitConfig::default());
        assert_eq!(outcome, SearchOutcome::Converged);
        assert_eq!(bp, BetaParam::new(0.75, 1.0));
        assert!(kst.result.pval >= 0.05);
        assert!(kst.result.d < before.d);
    }

    #[test]
    fn test_search_outcome_matches_pvalue() {
        let ecdf = vec![0.0, 0.0, 0.9, 0.9, 0.9, 0.95, 1.0, 1.0, 1.0, 1.0];
        let mut kst = KsTest::new(&ecdf);
        kst.rear = ecdf.len();
        let mut bp = BetaParam::new(9.0, 0.5);
        kst.run(&bp);

        let config = FitConfig {
            search_rounds: Some(3),
            search_steps: Some(5),
            ..FitConfig::default()
        };
        let outcome = search_beta(&mut kst, &mut bp, &config);
        assert_eq!(
            outcome == SearchOutcome::Converged,
            kst.result.pval >= config.effective_significance()
        );
        assert!(bp.alpha >= 0.0 && bp.beta >= 0.0);
        assert!(kst.result.d.is_finite());
    }

    #[test]
    fn test_search_no_op_when_accepted() {
        let ecdf: Vec<f64> = (1..=100).map(|i| i as f64 / 100.0).collect();
        let mut kst = KsTest::new(&ecdf);
        kst.rear = 100;
        let mut bp = BetaParam::uniform();
        kst.run(&bp);

        let outcome = search_beta(&mut kst, &mut bp, &FitConfig::default());
        assert_eq!(outcome, SearchOutcome::Converged);
        assert_eq!(bp, BetaParam::uniform());
    }
}
