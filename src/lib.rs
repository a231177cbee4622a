//! Class probability output network.
//!
//! Calibrates raw class scores into positive-class probabilities. Each
//! class keeps its training scores, builds an ECDF over equal-width bins
//! (100 by default), stretches away the flat tails, and fits a piecewise
//! Beta model whose pieces are validated by Kolmogorov-Smirnov tests.
//! Queries evaluate the Beta CDF of the piece covering the score.

pub mod config;
pub mod error;
pub mod models;
pub mod utils;

pub use config::FitConfig;
pub use error::{CponError, CponResult};
pub use models::base_model::BaseModel;
pub use models::beta::{moment_match, search_beta, BetaParam, SearchOutcome};
pub use models::class_probability::{ClassProbabilityImpl, Pattern};
pub use models::network::CponImpl;
pub use models::segment_map::{Segment, SegmentMap};
pub use models::segmenter::{search_betamap, BetaSketch};
pub use utils::histogram::{cumulative, histogram};
pub use utils::ks::{kstest, qks, KsResult, KsTest};
pub use utils::rescale::{rescale, RescaleState, RescaledEcdf};

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// A Python module implemented in Rust.
#[cfg(feature = "python")]
#[pymodule]
fn cpon_rust(_py: Python, m: &PyModule) -> PyResult<()> {
    // per-class model
    m.add_class::<models::class_probability::ClassProbability>()?;

    // registry
    m.add_class::<models::network::Cpon>()?;
    Ok(())
}
