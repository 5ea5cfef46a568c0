//! PyO3 bindings for resample_array and build_pyramid.

use numpy::{PyArray2, PyReadonlyArray2};
use pyo3::prelude::*;

use super::{affine, to_py_err};
use crate::config::parse_methods;
use crate::error::ResampleError;
use crate::grid::TargetGrid;
use crate::pyramid::{BuildOptions, ResampleMethods};
use crate::raster::Raster;
use crate::resampler::{resample, resample_flag_words};

/// Resample a 2D f64 array onto another grid.
///
/// Args:
///     src: Input 2D array (f64). For other dtypes, cast on the Python side.
///     src_transform: Source affine transform as 6-element tuple (a, b, c, d, e, f)
///         in rasterio convention.
///     dst_transform: Destination affine transform (same convention).
///     dst_shape: Output shape as (rows, cols) tuple.
///     upsampling: "nearest", "bilinear" or "cubic".
///     downsampling: "first", "mean", "median", "min" or "max".
///     flag_downsampling: "and", "or", "median_and" or "median_or".
///     is_flag: Treat samples as bit masks (integers stored as floats).
///     nodata: Optional nodata value.
///     tile_size: Optional tile size as (rows, cols) for parallel processing.
///
/// Returns:
///     Resampled 2D array (f64).
#[pyfunction]
#[pyo3(signature = (src, src_transform, dst_transform, dst_shape, upsampling="nearest", downsampling="first", flag_downsampling="or", is_flag=false, nodata=None, tile_size=None))]
#[allow(clippy::too_many_arguments)]
pub fn resample_array<'py>(
    py: Python<'py>,
    src: PyReadonlyArray2<'py, f64>,
    src_transform: [f64; 6],
    dst_transform: [f64; 6],
    dst_shape: (usize, usize),
    upsampling: &str,
    downsampling: &str,
    flag_downsampling: &str,
    is_flag: bool,
    nodata: Option<f64>,
    tile_size: Option<(usize, usize)>,
) -> PyResult<Bound<'py, PyArray2<f64>>> {
    let levels = build_pyramid(
        py,
        src,
        src_transform,
        dst_transform,
        dst_shape,
        1,
        upsampling,
        downsampling,
        flag_downsampling,
        is_flag,
        nodata,
        tile_size,
    )?;
    levels
        .into_iter()
        .next()
        .ok_or_else(|| to_py_err(ResampleError::LevelNotBuilt(0)))
}

/// Resample a 2D f64 array onto every level of a target pyramid.
///
/// Level 0 has `dst_shape` and `dst_transform`; each further level halves
/// the resolution. Arguments are as for `resample_array`.
///
/// Returns:
///     List of 2D arrays (f64), finest level first.
#[pyfunction]
#[pyo3(signature = (src, src_transform, dst_transform, dst_shape, level_count=1, upsampling="nearest", downsampling="first", flag_downsampling="or", is_flag=false, nodata=None, tile_size=None))]
#[allow(clippy::too_many_arguments)]
pub fn build_pyramid<'py>(
    py: Python<'py>,
    src: PyReadonlyArray2<'py, f64>,
    src_transform: [f64; 6],
    dst_transform: [f64; 6],
    dst_shape: (usize, usize),
    level_count: usize,
    upsampling: &str,
    downsampling: &str,
    flag_downsampling: &str,
    is_flag: bool,
    nodata: Option<f64>,
    tile_size: Option<(usize, usize)>,
) -> PyResult<Vec<Bound<'py, PyArray2<f64>>>> {
    let methods = parse_methods(upsampling, downsampling, flag_downsampling)
        .map_err(|e| to_py_err(e.into()))?;

    let grid = TargetGrid::new(dst_shape.1, dst_shape.0, affine(dst_transform))
        .and_then(|g| g.with_levels(level_count))
        .map_err(to_py_err)?;

    let options = BuildOptions {
        tile_size: tile_size.unwrap_or((256, 256)),
        ..BuildOptions::default()
    };

    // Copy array to owned ndarray before releasing the GIL
    let source = Raster::new(src.as_array().to_owned(), affine(src_transform), nodata);

    let levels = py
        .allow_threads(move || run(&source, &grid, &methods, is_flag, &options))
        .map_err(to_py_err)?;

    Ok(levels
        .into_iter()
        .map(|level| PyArray2::from_owned_array(py, level.into_data()))
        .collect())
}

fn run(
    source: &Raster<f64>,
    grid: &TargetGrid,
    methods: &ResampleMethods,
    is_flag: bool,
    options: &BuildOptions,
) -> Result<Vec<Raster<f64>>, ResampleError> {
    if is_flag {
        return resample_flag_words(source, grid, methods, options);
    }
    resample(source, grid, methods, false, options).into_levels()
}
