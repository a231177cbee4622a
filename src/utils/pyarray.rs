//! Conversions between Python inputs and score vectors.

use ndarray::Array1;
use numpy::{PyArray1, ToPyArray};
use pyo3::exceptions::PyTypeError;
use pyo3::prelude::*;
use pyo3::types::PyAny;

fn cast_err(e: PyErr) -> PyErr {
    PyTypeError::new_err(format!("Failed to cast array to f64: {}", e))
}

// numpy arrays of f64 pass through; other numeric dtypes are cast
fn get_array_f64(x: &PyAny) -> PyResult<&PyArray1<f64>> {
    if let Ok(arr) = x.extract::<&PyArray1<f64>>() {
        Ok(arr)
    } else if let Ok(arr) = x.extract::<&PyArray1<f32>>() {
        arr.cast::<f64>(false).map_err(cast_err)
    } else if let Ok(arr) = x.extract::<&PyArray1<i64>>() {
        arr.cast::<f64>(false).map_err(cast_err)
    } else if let Ok(arr) = x.extract::<&PyArray1<i32>>() {
        arr.cast::<f64>(false).map_err(cast_err)
    } else if let Ok(arr) = x.extract::<&PyArray1<u32>>() {
        arr.cast::<f64>(false).map_err(cast_err)
    } else if let Ok(arr) = x.extract::<&PyArray1<u16>>() {
        arr.cast::<f64>(false).map_err(cast_err)
    } else if let Ok(arr) = x.extract::<&PyArray1<u8>>() {
        arr.cast::<f64>(false).map_err(cast_err)
    } else {
        Err(PyTypeError::new_err("not a 1-D numeric numpy array"))
    }
}

/// Reads scores from a 1-D numpy array or any Python sequence of floats.
pub fn extract_scores(x: &PyAny) -> PyResult<Vec<f64>> {
    if let Ok(arr) = get_array_f64(x) {
        let owned: Array1<f64> = arr.to_owned_array();
        return Ok(owned.to_vec());
    }
    x.extract::<Vec<f64>>().map_err(|_| {
        PyTypeError::new_err(
            "Unsupported input for scores: expected a 1-D numpy array or a sequence of floats",
        )
    })
}

pub fn to_pyarray(py: Python<'_>, values: &[f64]) -> Py<PyArray1<f64>> {
    Array1::from_vec(values.to_vec()).to_pyarray(py).into_py(py)
}
