//! Per-class probability model: training sample, rescaled ECDF and the
//! fitted segment map.

use serde::{Deserialize, Serialize};

use crate::config::FitConfig;
use crate::error::{CponError, CponResult};
use crate::models::base_model::BaseModel;
use crate::models::beta::{moment_match, BetaParam};
use crate::models::segment_map::SegmentMap;
use crate::models::segmenter::{search_betamap, BetaSketch};
use crate::utils::histogram::{cumulative, histogram};
use crate::utils::ks::KsResult;
use crate::utils::rescale::{rescale, RescaleState};

#[cfg(feature = "python")]
use crate::utils::pyarray::{extract_scores, to_pyarray};
#[cfg(feature = "python")]
use numpy::PyArray1;
#[cfg(feature = "python")]
use pyo3::prelude::*;
#[cfg(feature = "python")]
use pyo3::types::PyAny;

/// Per-class state bundle.
///
/// `data` is the raw sample. Everything else describes the last
/// successful fit: the rescaled ECDF and its mean and variance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    pub data: Vec<f64>,
    pub ecdf: Vec<f64>,
    pub rescale: Option<RescaleState>,
    pub mean: f64,
    pub variance: f64,
}

/// Pure-Rust class probability model
#[derive(Debug, Clone)]
pub struct ClassProbabilityImpl {
    name: String,
    config: FitConfig,
    pattern: Pattern,
    betamap: SegmentMap,
    sketch: BetaSketch,
}

impl ClassProbabilityImpl {
    pub fn new(name: impl Into<String>) -> Self {
        ClassProbabilityImpl {
            name: name.into(),
            config: FitConfig::default(),
            pattern: Pattern::default(),
            betamap: SegmentMap::new(),
            sketch: BetaSketch::default(),
        }
    }

    pub fn with_samples(name: impl Into<String>, data: &[f64]) -> Self {
        let mut model = ClassProbabilityImpl::new(name);
        model.insert(data);
        model
    }

    /// Anonymous model over `data`.
    pub fn from_samples(data: &[f64]) -> Self {
        ClassProbabilityImpl::with_samples("", data)
    }

    pub fn with_config(mut self, config: FitConfig) -> Self {
        self.config = config;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &FitConfig {
        &self.config
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn segment_map(&self) -> &SegmentMap {
        &self.betamap
    }

    pub fn sketch(&self) -> &BetaSketch {
        &self.sketch
    }

    pub fn is_fitted(&self) -> bool {
        !self.betamap.is_empty()
    }

    /// Maps a raw score into [0, 1] using the configured support.
    fn normalize(&self, x: f64) -> f64 {
        let (lower, upper) = self.config.effective_support();
        (x - lower) / (upper - lower)
    }

    /// Fits the segment map from the current sample.
    ///
    /// The new ECDF, segment map and sketch replace the old ones only
    /// once every stage has succeeded.
    fn map_beta(&mut self) -> CponResult<KsResult> {
        self.config.validate()?;

        let mut data: Vec<f64> = self
            .pattern
            .data
            .iter()
            .copied()
            .filter(|x| x.is_finite())
            .collect();
        let dropped = self.pattern.data.len() - data.len();
        if dropped > 0 {
            tracing::warn!(class = %self.name, dropped, "dropping non-finite scores");
        }
        if data.is_empty() {
            return Err(CponError::EmptySample);
        }
        data.sort_by(f64::total_cmp);

        let normalized: Vec<f64> = data.iter().map(|&x| self.normalize(x)).collect();
        let hist = histogram(&normalized, self.config.effective_bins())?;
        let rescaled = rescale(&cumulative(&hist)?);

        // ECDF values always live on the unit interval
        let seed = match moment_match(rescaled.mean, rescaled.variance, 0.0, 1.0) {
            Ok(bp) => bp,
            Err(e) => {
                tracing::warn!(class = %self.name, error = %e, "falling back to uniform seed");
                BetaParam::uniform()
            }
        };

        let betamap = search_betamap(&rescaled.values, seed, &self.config);
        let sketch = BetaSketch::from_fit(&rescaled.values, &betamap)?;
        let ksr = sketch.ksr;

        tracing::info!(
            class = %self.name,
            samples = data.len(),
            segments = betamap.len(),
            d = ksr.d,
            pval = ksr.pval,
            "mapped beta segments"
        );

        self.pattern = Pattern {
            data,
            ecdf: rescaled.values,
            rescale: Some(rescaled.state),
            mean: rescaled.mean,
            variance: rescaled.variance,
        };
        self.betamap = betamap;
        self.sketch = sketch;
        Ok(ksr)
    }
}

impl BaseModel for ClassProbabilityImpl {
    fn insert(&mut self, xs: &[f64]) {
        self.pattern.data = xs.to_vec();
    }

    fn update(&mut self, xs: &[f64]) {
        self.pattern.data.extend_from_slice(xs);
    }

    fn fit(&mut self) -> CponResult<KsResult> {
        self.map_beta()
    }

    /// Positive-class probability only; nothing is normalized across
    /// classes.
    fn probability(&self, rv: f64) -> CponResult<f64> {
        self.betamap
            .probability(self.normalize(rv))
            .ok_or_else(|| CponError::NotFitted(self.name.clone()))
    }
}

/// Python-exposed wrapper around ClassProbabilityImpl
#[cfg(feature = "python")]
#[pyclass]
pub struct ClassProbability {
    inner: ClassProbabilityImpl,
}

#[cfg(feature = "python")]
#[pymethods]
impl ClassProbability {
    #[new]
    #[pyo3(signature = (name, data=None, bins=None, significance=None))]
    fn new(
        name: String,
        data: Option<&PyAny>,
        bins: Option<usize>,
        significance: Option<f64>,
    ) -> PyResult<Self> {
        let config = FitConfig {
            bins,
            significance,
            ..FitConfig::default()
        };
        config.validate()?;

        let mut inner = ClassProbabilityImpl::new(name).with_config(config);
        if let Some(data) = data {
            inner.insert(&extract_scores(data)?);
        }
        Ok(ClassProbability { inner })
    }

    fn insert(&mut self, data: &PyAny) -> PyResult<()> {
        self.inner.insert(&extract_scores(data)?);
        Ok(())
    }

    fn update(&mut self, data: &PyAny) -> PyResult<()> {
        self.inner.update(&extract_scores(data)?);
        Ok(())
    }

    /// Fits the model; returns the diagnostic `(d, pvalue)`.
    fn map_beta(&mut self, py: Python<'_>) -> PyResult<(f64, f64)> {
        let inner = &mut self.inner;
        let ksr = py.allow_threads(|| inner.fit())?;
        Ok((ksr.d, ksr.pval))
    }

    fn cls_prob(&self, rv: f64) -> PyResult<f64> {
        Ok(self.inner.probability(rv)?)
    }

    fn cls_probs(&self, py: Python<'_>, rvs: &PyAny) -> PyResult<Py<PyArray1<f64>>> {
        let probs = self.inner.probabilities(&extract_scores(rvs)?)?;
        Ok(to_pyarray(py, &probs))
    }

    #[getter]
    fn name(&self) -> String {
        self.inner.name().to_string()
    }

    #[getter]
    fn ecdf(&self, py: Python<'_>) -> Py<PyArray1<f64>> {
        to_pyarray(py, &self.inner.pattern().ecdf)
    }

    /// `(key, alpha, beta)` triples in key order.
    #[getter]
    fn segments(&self) -> Vec<(f64, f64, f64)> {
        self.inner
            .segment_map()
            .iter()
            .map(|s| (s.key, s.alpha, s.beta))
            .collect()
    }

    /// `(xaxis, ecdf, beta, d, pvalue)` of the last fit.
    #[allow(clippy::type_complexity)]
    fn get_betasketch(
        &self,
        py: Python<'_>,
    ) -> (
        Py<PyArray1<f64>>,
        Py<PyArray1<f64>>,
        Py<PyArray1<f64>>,
        f64,
        f64,
    ) {
        let sketch = self.inner.sketch();
        (
            to_pyarray(py, &sketch.xaxis),
            to_pyarray(py, &sketch.ecdf),
            to_pyarray(py, &sketch.beta),
            sketch.ksr.d,
            sketch.ksr.pval,
        )
    }
}
