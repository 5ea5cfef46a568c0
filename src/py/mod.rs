use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::affine::Affine;
use crate::error::ResampleError;

mod plan;
mod resample;

/// Register all Python-visible functions and types.
pub fn register(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(resample::resample_array, m)?)?;
    m.add_function(wrap_pyfunction!(resample::build_pyramid, m)?)?;
    m.add_function(wrap_pyfunction!(plan::plan_resample, m)?)?;
    Ok(())
}

/// Affine from a rasterio-ordered `(a, b, c, d, e, f)` tuple.
fn affine(t: [f64; 6]) -> Affine {
    Affine::new(t[0], t[1], t[2], t[3], t[4], t[5])
}

fn to_py_err(err: ResampleError) -> PyErr {
    PyValueError::new_err(err.to_string())
}
