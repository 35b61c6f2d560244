use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::env::{Normalizer, NormalizerConfig, UnrecognizedShape};

/// Normalize a JSON step response and return the canonical step as JSON.
///
/// With `lenient=True`, payloads of unsupported shape become a not-done step
/// whose observation is the payload itself instead of raising `ValueError`.
#[pyfunction]
#[pyo3(signature = (payload, lenient = false))]
fn normalize_json(payload: &str, lenient: bool) -> PyResult<String> {
    let on_unrecognized = if lenient {
        UnrecognizedShape::TreatAsScalar
    } else {
        UnrecognizedShape::Reject
    };
    let normalizer = Normalizer::new(NormalizerConfig { on_unrecognized });
    let step = normalizer
        .normalize_slice(payload.as_bytes())
        .map_err(|e| PyValueError::new_err(e.to_string()))?;
    serde_json::to_string(&step).map_err(|e| PyValueError::new_err(e.to_string()))
}

/// The name of this function must match the lib.name in Cargo.toml
#[pymodule]
fn stepnorm(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(normalize_json, m)?)?;
    Ok(())
}
