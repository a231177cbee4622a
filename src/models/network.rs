//! Class probability output network: a registry of named per-class models.

use std::collections::BTreeMap;

use rayon::prelude::*;

use crate::config::FitConfig;
use crate::error::{CponError, CponResult};
use crate::models::base_model::BaseModel;
use crate::models::class_probability::ClassProbabilityImpl;
use crate::utils::ks::KsResult;

#[cfg(feature = "python")]
use crate::utils::pyarray::extract_scores;
#[cfg(feature = "python")]
use pyo3::prelude::*;
#[cfg(feature = "python")]
use pyo3::types::{PyAny, PyDict};
#[cfg(feature = "python")]
use std::collections::HashMap;

/// Pure-Rust registry of class models, keyed and iterated by name.
#[derive(Debug, Clone, Default)]
pub struct CponImpl {
    config: FitConfig,
    classes: BTreeMap<String, ClassProbabilityImpl>,
}

impl CponImpl {
    pub fn new() -> Self {
        CponImpl::default()
    }

    pub fn with_config(config: FitConfig) -> CponResult<Self> {
        config.validate()?;
        Ok(CponImpl {
            config,
            classes: BTreeMap::new(),
        })
    }

    /// Creates the class, replacing any existing one of the same name.
    pub fn insert(&mut self, name: &str, data: &[f64]) {
        let model =
            ClassProbabilityImpl::with_samples(name, data).with_config(self.config.clone());
        self.classes.insert(name.to_string(), model);
    }

    pub fn insert_many<'a, I>(&mut self, classes: I)
    where
        I: IntoIterator<Item = (&'a str, &'a [f64])>,
    {
        for (name, data) in classes {
            self.insert(name, data);
        }
    }

    /// Appends to an existing class's sample.
    pub fn update(&mut self, name: &str, data: &[f64]) -> CponResult<()> {
        self.classes
            .get_mut(name)
            .ok_or_else(|| CponError::UnknownClass(name.to_string()))?
            .update(data);
        Ok(())
    }

    pub fn update_many<'a, I>(&mut self, classes: I) -> CponResult<()>
    where
        I: IntoIterator<Item = (&'a str, &'a [f64])>,
    {
        for (name, data) in classes {
            self.update(name, data)?;
        }
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Option<ClassProbabilityImpl> {
        self.classes.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&ClassProbabilityImpl> {
        self.classes.get(name)
    }

    pub fn class_names(&self) -> Vec<String> {
        self.classes.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Fits every class. Models are independent, so they are fitted in
    /// parallel; results come back in name order.
    pub fn build_network(&mut self) -> CponResult<BTreeMap<String, KsResult>> {
        let results: Vec<(String, CponResult<KsResult>)> = self
            .classes
            .par_iter_mut()
            .map(|(name, model)| {
                tracing::info!(class = %name, "building class");
                (name.clone(), model.fit())
            })
            .collect();

        results
            .into_iter()
            .map(|(name, result)| result.map(|ksr| (name, ksr)))
            .collect()
    }

    pub fn probability(&self, name: &str, rv: f64) -> CponResult<f64> {
        self.classes
            .get(name)
            .ok_or_else(|| CponError::UnknownClass(name.to_string()))?
            .probability(rv)
    }

    /// Positive-class probability of `rv` under every fitted class.
    /// Values are independent and do not sum to one.
    pub fn probabilities(&self, rv: f64) -> BTreeMap<String, f64> {
        self.classes
            .iter()
            .filter_map(|(name, model)| model.probability(rv).ok().map(|p| (name.clone(), p)))
            .collect()
    }
}

/// Python-exposed wrapper around CponImpl
#[cfg(feature = "python")]
#[pyclass]
pub struct Cpon {
    inner: CponImpl,
}

#[cfg(feature = "python")]
#[pymethods]
impl Cpon {
    #[new]
    #[pyo3(signature = (bins=None, significance=None))]
    fn new(bins: Option<usize>, significance: Option<f64>) -> PyResult<Self> {
        let config = FitConfig {
            bins,
            significance,
            ..FitConfig::default()
        };
        Ok(Cpon {
            inner: CponImpl::with_config(config)?,
        })
    }

    fn insert(&mut self, key: &str, value: &PyAny) -> PyResult<()> {
        self.inner.insert(key, &extract_scores(value)?);
        Ok(())
    }

    fn insert_many(&mut self, kvmap: &PyDict) -> PyResult<()> {
        for (key, value) in kvmap.iter() {
            let key: String = key.extract()?;
            self.inner.insert(&key, &extract_scores(value)?);
        }
        Ok(())
    }

    fn update(&mut self, key: &str, value: &PyAny) -> PyResult<()> {
        self.inner.update(key, &extract_scores(value)?)?;
        Ok(())
    }

    fn update_many(&mut self, kvmap: &PyDict) -> PyResult<()> {
        for (key, value) in kvmap.iter() {
            let key: String = key.extract()?;
            self.inner.update(&key, &extract_scores(value)?)?;
        }
        Ok(())
    }

    /// Fits every class; returns `{name: (d, pvalue)}`.
    fn build_network(&mut self, py: Python<'_>) -> PyResult<HashMap<String, (f64, f64)>> {
        let inner = &mut self.inner;
        let results = py.allow_threads(|| inner.build_network())?;
        Ok(results
            .into_iter()
            .map(|(name, ksr)| (name, (ksr.d, ksr.pval)))
            .collect())
    }

    fn cls_prob(&self, key: &str, rv: f64) -> PyResult<f64> {
        Ok(self.inner.probability(key, rv)?)
    }

    fn cls_probs(&self, rv: f64) -> HashMap<String, f64> {
        self.inner.probabilities(rv).into_iter().collect()
    }

    fn getcsnames(&self) -> Vec<String> {
        self.inner.class_names()
    }

    fn __len__(&self) -> usize {
        self.inner.len()
    }
}
