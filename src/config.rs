//! Fit configuration.

use serde::{Deserialize, Serialize};

use crate::error::{CponError, CponResult};

/// Configuration shared by every stage of a Beta-segment fit.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct FitConfig {
    /// Histogram bin count. Default: 100. Values below 30 are allowed but coarse.
    pub bins: Option<usize>,
    /// KS p-value below which a fit is rejected. Default: 0.05.
    pub significance: Option<f64>,
    /// Outer coordinate-descent rounds. Default: 100.
    pub search_rounds: Option<usize>,
    /// Inner steps per parameter per round. Default: 100.
    pub search_steps: Option<usize>,
    /// Step multiplier applied after a worsening move. Default: 0.1.
    pub step_shrink: Option<f64>,
    /// Lower bound of the score support. Default: 0.0.
    pub support_lower: Option<f64>,
    /// Upper bound of the score support. Default: 1.0.
    pub support_upper: Option<f64>,
}

impl FitConfig {
    /// Parses a TOML document. Missing keys fall back to defaults.
    pub fn from_toml_str(src: &str) -> CponResult<Self> {
        let config: FitConfig =
            toml::from_str(src).map_err(|e| CponError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn effective_bins(&self) -> usize {
        self.bins.unwrap_or(100)
    }

    pub fn effective_significance(&self) -> f64 {
        self.significance.unwrap_or(0.05)
    }

    pub fn effective_search_rounds(&self) -> usize {
        self.search_rounds.unwrap_or(100)
    }

    pub fn effective_search_steps(&self) -> usize {
        self.search_steps.unwrap_or(100)
    }

    pub fn effective_step_shrink(&self) -> f64 {
        self.step_shrink.unwrap_or(0.1)
    }

    /// Returns `(lower, upper)` support bounds, defaulting to `(0.0, 1.0)`.
    pub fn effective_support(&self) -> (f64, f64) {
        (
            self.support_lower.unwrap_or(0.0),
            self.support_upper.unwrap_or(1.0),
        )
    }

    pub fn validate(&self) -> CponResult<()> {
        let bins = self.effective_bins();
        if bins < 2 {
            return Err(CponError::InvalidConfig(format!(
                "bins must be at least 2, got {bins}"
            )));
        }
        if bins < 30 {
            tracing::warn!(bins, "histogram bin count below 30, fits will be coarse");
        }

        let significance = self.effective_significance();
        if !(significance > 0.0 && significance < 1.0) {
            return Err(CponError::InvalidConfig(format!(
                "significance must lie in (0, 1), got {significance}"
            )));
        }
        if self.effective_search_rounds() == 0 || self.effective_search_steps() == 0 {
            return Err(CponError::InvalidConfig(
                "search budgets must be non-zero".to_string(),
            ));
        }

        let shrink = self.effective_step_shrink();
        if !(shrink > 0.0 && shrink < 1.0) {
            return Err(CponError::InvalidConfig(format!(
                "step_shrink must lie in (0, 1), got {shrink}"
            )));
        }

        let (lower, upper) = self.effective_support();
        if !(lower.is_finite() && upper.is_finite() && lower < upper) {
            return Err(CponError::InvalidConfig(format!(
                "support bounds must satisfy lower < upper, got [{lower}, {upper}]"
            )));
        }
        Ok(())
    }
}
