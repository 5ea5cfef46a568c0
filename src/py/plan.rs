//! PyO3 binding for plan_resample, the chunk planner for dask integration.

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyDict;

use super::{affine, to_py_err};
use crate::aggregate::{AggregationMethod, FlagAggregationMethod};
use crate::chunk::planner;
use crate::grid::GridMapper;
use crate::interpolate::InterpolationMethod;

/// Plan the chunk-level resampling tasks for a raster dataset.
///
/// Divides the destination grid into tiles and computes the corresponding source
/// ROI (with halo padding) for each tile.
///
/// Args:
///     src_transform: Source affine transform as 6-element tuple.
///     src_shape: Source raster shape as (rows, cols).
///     dst_transform: Destination affine transform as 6-element tuple.
///     dst_shape: Destination raster shape as (rows, cols).
///     dst_chunks: Optional chunk size as (rows, cols). Defaults to full image.
///     resampling: Interpolation or aggregation method name. Defaults to "bilinear".
///
/// Returns:
///     List of tile plan dicts, each with keys:
///     - dst_slice: (row_start, row_end, col_start, col_end)
///     - src_slice: (row_start, row_end, col_start, col_end)
///     - tile_transform: (a, b, c, d, e, f) tile pixel -> source ROI pixel
///     - dst_tile_shape: (rows, cols)
///     - has_data: bool
#[pyfunction]
#[pyo3(signature = (src_transform, src_shape, dst_transform, dst_shape, dst_chunks=None, resampling="bilinear"))]
pub fn plan_resample(
    py: Python<'_>,
    src_transform: [f64; 6],
    src_shape: (usize, usize),
    dst_transform: [f64; 6],
    dst_shape: (usize, usize),
    dst_chunks: Option<(usize, usize)>,
    resampling: &str,
) -> PyResult<Vec<PyObject>> {
    let kernel_radius = kernel_radius(resampling).ok_or_else(|| {
        PyValueError::new_err(format!("Unknown resampling method: '{resampling}'"))
    })?;

    let mapper =
        GridMapper::new(&affine(src_transform), &affine(dst_transform)).map_err(to_py_err)?;
    let tile_size = dst_chunks.unwrap_or(dst_shape);

    let plans = py
        .allow_threads(move || {
            planner::plan_tiles(&mapper, src_shape, dst_shape, tile_size, kernel_radius)
        })
        .map_err(to_py_err)?;

    let result: Vec<PyObject> = plans
        .iter()
        .map(|plan| -> PyResult<PyObject> {
            let dict = PyDict::new(py);
            dict.set_item("dst_slice", plan.dst_slice)?;
            dict.set_item("src_slice", plan.src_slice)?;
            dict.set_item("tile_transform", plan.mapper.transform().to_tuple())?;
            dict.set_item("dst_tile_shape", plan.dst_tile_shape)?;
            dict.set_item("has_data", plan.has_data)?;
            Ok(dict.into_any().unbind())
        })
        .collect::<PyResult<Vec<_>>>()?;

    Ok(result)
}

fn kernel_radius(name: &str) -> Option<usize> {
    if let Some(method) = InterpolationMethod::from_name(name) {
        return Some(method.kernel_radius());
    }
    if AggregationMethod::from_name(name).is_some()
        || FlagAggregationMethod::from_name(name).is_some()
    {
        return Some(1);
    }
    None
}
