//! Nearest-neighbor interpolation kernel.

use ndarray::ArrayView2;

use super::{clamp_index, within_extent};
use crate::raster::{is_nodata_value, Sample};

/// Sample a 2D array using nearest-neighbor interpolation.
///
/// Uses GDAL corner-based pixel convention: pixel (0,0) has its upper-left
/// corner at coordinate (0.0, 0.0) and its center at (0.5, 0.5).
/// Nearest-neighbor simply uses `floor()` to find the containing pixel,
/// which is the pixel whose center is nearest.
///
/// Returns `None` if the coordinate is outside the raster extent
/// `[0, cols] x [0, rows]` or if the sampled value is nodata or NaN.
pub fn sample<T: Sample>(src: &ArrayView2<'_, T>, x: f64, y: f64, nodata: Option<T>) -> Option<T> {
    if !within_extent(src, x, y) {
        return None;
    }
    // The far edges x == cols and y == rows belong to the last pixel
    let col = clamp_index(x.floor() as isize, src.ncols());
    let row = clamp_index(y.floor() as isize, src.nrows());

    let val = src[(row, col)];
    if is_nodata_value(val, nodata) {
        return None;
    }

    Some(val)
}
