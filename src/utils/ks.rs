//! Kolmogorov-Smirnov goodness-of-fit testing.
//!
//! `qks` is the asymptotic complementary CDF of the Kolmogorov
//! distribution. `kstest` compares two equal-length curves; `KsTest` runs
//! the partial test of an ECDF window against a Beta CDF.

use serde::{Deserialize, Serialize};

use crate::error::{CponError, CponResult};
use crate::models::beta::BetaParam;

const QKS_MAX_TERMS: u32 = 100;
/// Stop once a term is this small relative to the previous term.
const QKS_EPS_TERM: f64 = 0.001;
/// Stop once a term is this small relative to the running sum.
const QKS_EPS_SUM: f64 = 1.0e-8;

/// KS statistic and its p-value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KsResult {
    pub d: f64,
    pub pval: f64,
}

impl Default for KsResult {
    fn default() -> Self {
        KsResult { d: 0.0, pval: 1.0 }
    }
}

/// Complementary CDF of the Kolmogorov distribution at `lam`.
///
/// Sums `2 * (-1)^(j-1) * exp(-2 lam^2 j^2)` for `j = 1..=100`. When the
/// series has not converged by then (small `lam`), returns 1.0.
pub fn qks(lam: f64) -> f64 {
    let a2 = -2.0 * lam * lam;
    let mut fac = 2.0;
    let mut sum = 0.0;
    let mut prev = 0.0;

    for j in 1..=QKS_MAX_TERMS {
        let jf = j as f64;
        let term = fac * (a2 * jf * jf).exp();
        sum += term;
        if term.abs() <= QKS_EPS_TERM * prev || term.abs() <= QKS_EPS_SUM * sum {
            return sum.clamp(0.0, 1.0);
        }
        fac = -fac;
        prev = term.abs();
    }
    1.0
}

/// p-value for statistic `d` at effective sample size `en`.
fn pvalue(en: f64, d: f64) -> f64 {
    qks((en + 0.23 / en) * d)
}

/// Two-sample KS test over two equal-length ordered curves.
pub fn kstest(sample1: &[f64], sample2: &[f64]) -> CponResult<KsResult> {
    let (n1, n2) = (sample1.len(), sample2.len());
    if n1 != n2 {
        return Err(CponError::InputSizeMismatch {
            left: n1,
            right: n2,
        });
    }
    if n1 == 0 {
        return Ok(KsResult::default());
    }

    let en = ((n1 * n2) as f64 / (n1 + n2) as f64).sqrt();
    let d = sample1
        .iter()
        .zip(sample2)
        .map(|(a, b)| (a - b).abs())
        .fold(0.0, f64::max);

    Ok(KsResult {
        d,
        pval: pvalue(en, d),
    })
}

/// Partial KS test state over an ECDF window `[front, rear)`.
#[derive(Debug, Clone)]
pub struct KsTest<'a> {
    ecdf: &'a [f64],
    en_sqrt: f64,
    pub front: usize,
    pub rear: usize,
    pub result: KsResult,
}

impl<'a> KsTest<'a> {
    pub fn new(ecdf: &'a [f64]) -> Self {
        KsTest {
            ecdf,
            en_sqrt: (ecdf.len() as f64).sqrt(),
            front: 0,
            rear: 1.min(ecdf.len()),
            result: KsResult::default(),
        }
    }

    /// Tests the window against `Beta(bp)`, evaluating the CDF at
    /// `(j + 1) / N` for each index `j`, and stores the result.
    pub fn run(&mut self, bp: &BetaParam) -> KsResult {
        let size = self.ecdf.len() as f64;
        let rear = self.rear.min(self.ecdf.len());
        let front = self.front.min(rear);

        let d = self.ecdf[front..rear]
            .iter()
            .enumerate()
            .map(|(offset, &fn_)| {
                let rv = (front + offset + 1) as f64 / size;
                (fn_ - bp.cdf(rv)).abs()
            })
            .fold(0.0, f64::max);

        self.result = KsResult {
            d,
            pval: pvalue(self.en_sqrt, d),
        };
        self.result
    }

    /// Whether the last result rejects the fit at `significance`.
    pub fn rejects(&self, significance: f64) -> bool {
        self.result.pval < significance
    }
}
