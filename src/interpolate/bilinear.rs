//! Bilinear interpolation kernel.

use ndarray::ArrayView2;

use super::{clamp_index, within_extent};
use crate::raster::{is_nodata_value, Sample};

/// Sample a 2D array using bilinear interpolation.
///
/// Subtracts 0.5 from input coordinates to center on pixel centers
/// (GDAL convention: pixel center at col+0.5, row+0.5).
///
/// Performs 2×2 weighted interpolation. Near the raster edge the missing
/// neighbours are replaced by the edge pixel. Returns `None` if the position
/// is outside the raster or any neighbour with non-zero weight is nodata
/// or NaN.
pub fn sample<T: Sample>(src: &ArrayView2<'_, T>, x: f64, y: f64, nodata: Option<T>) -> Option<T> {
    if !within_extent(src, x, y) {
        return None;
    }
    let (rows, cols) = src.dim();

    // Convert from corner-based to center-based coordinates
    let cx = x - 0.5;
    let cy = y - 0.5;

    let x0 = cx.floor() as isize;
    let y0 = cy.floor() as isize;
    let dx = cx - x0 as f64;
    let dy = cy - y0 as f64;

    let (x0u, x1u) = (clamp_index(x0, cols), clamp_index(x0 + 1, cols));
    let (y0u, y1u) = (clamp_index(y0, rows), clamp_index(y0 + 1, rows));

    let neighbours = [
        src[(y0u, x0u)],
        src[(y0u, x1u)],
        src[(y1u, x0u)],
        src[(y1u, x1u)],
    ];
    let weights = [
        (1.0 - dx) * (1.0 - dy),
        dx * (1.0 - dy),
        (1.0 - dx) * dy,
        dx * dy,
    ];

    let mut result = 0.0;
    for (&val, &w) in neighbours.iter().zip(weights.iter()) {
        if w == 0.0 {
            continue;
        }
        if is_nodata_value(val, nodata) {
            return None;
        }
        result += w * val.as_f64();
    }

    T::clamp_from_f64(result)
}
