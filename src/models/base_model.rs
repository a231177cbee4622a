use crate::error::CponResult;
use crate::utils::ks::KsResult;

/// A common Rust trait for per-class score calibration models.
pub trait BaseModel {
    /// Replace the training sample.
    fn insert(&mut self, xs: &[f64]);

    /// Append to the training sample.
    fn update(&mut self, xs: &[f64]);

    /// Fit on the current sample; returns the diagnostic KS result.
    fn fit(&mut self) -> CponResult<KsResult>;

    /// Probability that a score `rv` belongs to the class.
    fn probability(&self, rv: f64) -> CponResult<f64>;

    /// Default: replace the sample, then fit.
    fn fit_samples(&mut self, xs: &[f64]) -> CponResult<KsResult> {
        self.insert(xs);
        self.fit()
    }

    /// Default: query a batch.
    fn probabilities(&self, rvs: &[f64]) -> CponResult<Vec<f64>> {
        rvs.iter().map(|&rv| self.probability(rv)).collect()
    }
}
