//! Equal-width histograms over [0, 1] and their cumulative curves.

use crate::error::{CponError, CponResult};

/// Bins `data` into `bins` equal-width buckets over [0, 1].
///
/// `data` must already be sorted ascending. A value falls into bin `i`
/// when `i/bins < x <= (i+1)/bins`; values at or below zero land in the
/// first bin and anything past the last boundary lands in the last one,
/// so the counts always sum to `data.len()`.
pub fn histogram(data: &[f64], bins: usize) -> CponResult<Vec<u64>> {
    if bins == 0 {
        return Err(CponError::InvalidConfig("bins must be non-zero".to_string()));
    }
    if let Some(index) = data.windows(2).position(|w| w[0] > w[1]) {
        return Err(CponError::UnsortedInput { index: index + 1 });
    }

    let step = 1.0 / bins as f64;
    let mut hist = Vec::with_capacity(bins);
    let mut area = step;
    let mut count = 0u64;

    for &x in data {
        while x > area && hist.len() < bins - 1 {
            hist.push(count);
            count = 0;
            area += step;
        }
        count += 1;
    }
    while hist.len() < bins {
        hist.push(count);
        count = 0;
    }

    Ok(hist)
}

/// Cumulates bin counts in bin order and normalizes to [0, 1].
///
/// Counts are accumulated in their original order; sorting them first
/// would break the link between a bin's position and its cumulative value.
pub fn cumulative(hist: &[u64]) -> CponResult<Vec<f64>> {
    let total: u64 = hist.iter().sum();
    if total == 0 {
        return Err(CponError::EmptySample);
    }

    let mut cum = 0u64;
    Ok(hist
        .iter()
        .map(|&c| {
            cum += c;
            cum as f64 / total as f64
        })
        .collect())
}
