//! ECDF rescaling.
//!
//! Raw ECDFs built from sparse scores sit flat at 0 for the low bins and
//! flat at 1 for the high bins. Those flats carry no shape information and
//! make the KS-driven search unstable, so the informative middle is
//! stretched over the full index range before any Beta is fitted.

use serde::{Deserialize, Serialize};

/// Derived scalars of a rescale: the informative index window and its
/// stretch factor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RescaleState {
    /// First index with a strictly positive ECDF value.
    pub imin: usize,
    /// Last index with an ECDF value below 1.
    pub imax: usize,
    /// `(len - 1) / (imax - imin + 2)`.
    pub iratio: f64,
    /// Largest scaled position, `len - 1`.
    ceiling: f64,
}

impl RescaleState {
    /// Identity state for a degenerate ECDF of length `len`.
    fn identity(len: usize) -> Self {
        let ceiling = len.saturating_sub(1) as f64;
        RescaleState {
            imin: 0,
            imax: len.saturating_sub(1),
            iratio: 1.0,
            ceiling,
        }
    }

    /// Maps an original index onto the stretched index range.
    pub fn scale(&self, i: f64) -> f64 {
        if i < self.imin as f64 {
            0.0
        } else if i > self.imax as f64 {
            self.ceiling
        } else {
            (i - self.imin as f64 + 1.0) * self.iratio
        }
    }
}

/// A rescaled ECDF together with the statistics the moment-matched seed
/// is computed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RescaledEcdf {
    pub values: Vec<f64>,
    pub state: RescaleState,
    /// Mean of `values`.
    pub mean: f64,
    /// Sample variance of `values`.
    pub variance: f64,
}

/// Stretches `ecdf` so its non-degenerate region spans the whole index
/// range.
///
/// For every original index `i` in `[imin, imax]`, ascending, the value
/// `ecdf[i]` is written over the suffix starting at `floor(scale(i))`.
/// Each output position therefore holds the value of the largest `i`
/// whose scaled position reaches it. Positions from `imax` on are then
/// saturated to 1.
///
/// An ECDF whose mass sits in a single bin has no informative window; it
/// is returned unchanged.
pub fn rescale(ecdf: &[f64]) -> RescaledEcdf {
    let len = ecdf.len();
    let imin = ecdf.iter().position(|&v| v > 0.0);
    let imax = ecdf.iter().rposition(|&v| v < 1.0);

    let (values, state) = match (imin, imax) {
        (Some(imin), Some(imax)) if imin <= imax => {
            let ceiling = (len - 1) as f64;
            let state = RescaleState {
                imin,
                imax,
                iratio: ceiling / (imax - imin + 2) as f64,
                ceiling,
            };

            let mut values = vec![0.0; len];
            for (i, &v) in ecdf.iter().enumerate().take(imax + 1).skip(imin) {
                let k = (state.scale(i as f64) as usize).min(len);
                values[k..].fill(v);
            }
            values[imax..].fill(1.0);
            (values, state)
        }
        _ => {
            tracing::warn!(len, "degenerate ECDF, skipping rescale");
            (ecdf.to_vec(), RescaleState::identity(len))
        }
    };

    let (mean, variance) = mean_variance(&values);
    RescaledEcdf {
        values,
        state,
        mean,
        variance,
    }
}

fn mean_variance(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let mean = values.iter().sum::<f64>() / n;
    if values.len() < 2 {
        return (mean, 0.0);
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    (mean, variance)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rescale_uniform_ecdf() {
        let ecdf: Vec<f64> = (1..=100).map(|i| i as f64 / 100.0).collect();
        let rescaled = rescale(&ecdf);

        assert_eq!(rescaled.state.imin, 0);
        assert_eq!(rescaled.state.imax, 98);
        assert!((rescaled.state.iratio - 0.99).abs() < 1e-12);
        for i in 0..98 {
            assert!((rescaled.values[i] - ecdf[i]).abs() < 1e-12, "index {i}");
        }
        assert_eq!(rescaled.values[98], 1.0);
        assert_eq!(rescaled.values[99], 1.0);
    }

    #[test]
    fn test_rescale_stretches_narrow_window() {
        // mass in bins 2..=5 of 10
        let ecdf = vec![0.0, 0.0, 0.25, 0.5, 0.75, 1.0, 1.0, 1.0, 1.0, 1.0];
        let rescaled = rescale(&ecdf);

        assert_eq!(rescaled.state.imin, 2);
        assert_eq!(rescaled.state.imax, 4);
        // iratio = 9 / 4
        assert!((rescaled.state.iratio - 2.25).abs() < 1e-12);
        // scale(2)=2.25, scale(3)=4.5, scale(4)=6.75, then saturation from imax=4
        assert_eq!(
            rescaled.values,
            vec![0.0, 0.0, 0.25, 0.25, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0]
        );
    }

    #[test]
    fn test_rescale_single_bin_is_identity() {
        let ecdf = vec![0.0, 0.0, 1.0, 1.0];
        let rescaled = rescale(&ecdf);
        assert_eq!(rescaled.values, ecdf);
        assert_eq!(rescaled.state.imin, 0);
        assert_eq!(rescaled.state.imax, 3);
    }

    #[test]
    fn test_rescale_statistics() {
        let ecdf = vec![0.0, 0.5, 1.0];
        let rescaled = rescale(&ecdf);
        let mean = rescaled.values.iter().sum::<f64>() / 3.0;
        assert!((rescaled.mean - mean).abs() < 1e-12);
        assert!(rescaled.variance > 0.0);
    }

    #[test]
    fn test_scale_clamps_outside_window() {
        let ecdf = vec![0.0, 0.0, 0.25, 0.5, 0.75, 1.0, 1.0, 1.0, 1.0, 1.0];
        let state = rescale(&ecdf).state;
        assert_eq!(state.scale(0.0), 0.0);
        assert_eq!(state.scale(9.0), 9.0);
    }
}
