//! Error handling for the fitting engine.
//! One enum for the whole crate, `thiserror` only.

/// Errors surfaced by histogram construction, KS testing, moment matching
/// and the model registry.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CponError {
    #[error("sample sizes differ: {left} vs {right}")]
    InputSizeMismatch { left: usize, right: usize },

    #[error("input must be sorted ascending (violated at index {index})")]
    UnsortedInput { index: usize },

    #[error("degenerate sample: mean={mean}, variance={variance}")]
    DegenerateSample { mean: f64, variance: f64 },

    #[error("sample is empty")]
    EmptySample,

    #[error("class '{0}' has not been fitted")]
    NotFitted(String),

    #[error("unknown class '{0}', use insert() first")]
    UnknownClass(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

pub type CponResult<T> = Result<T, CponError>;

#[cfg(feature = "python")]
impl From<CponError> for pyo3::PyErr {
    fn from(err: CponError) -> Self {
        use pyo3::exceptions::{PyKeyError, PyRuntimeError, PyValueError};
        match err {
            CponError::UnknownClass(_) => PyKeyError::new_err(err.to_string()),
            CponError::NotFitted(_) => PyRuntimeError::new_err(err.to_string()),
            _ => PyValueError::new_err(err.to_string()),
        }
    }
}
