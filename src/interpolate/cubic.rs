//! Cubic convolution interpolation kernel (Keys 1981, a = -0.5).
//!
//! Uses a 4×4 neighborhood with the classic Keys weight function, applied
//! separably: along X within each row, then along Y across the row sums.

use ndarray::ArrayView2;

use super::{clamp_index, within_extent};
use crate::raster::{is_nodata_value, Sample};

/// Cubic convolution weight function (Keys 1981, a = -0.5).
///
/// ```text
/// W(t) = (a+2)|t|³ - (a+3)|t|² + 1       for 0 ≤ |t| ≤ 1
/// W(t) = a|t|³ - 5a|t|² + 8a|t| - 4a     for 1 < |t| ≤ 2
/// W(t) = 0                                 for |t| > 2
/// ```
fn cubic_weight(t: f64) -> f64 {
    const A: f64 = -0.5;
    let t = t.abs();
    if t <= 1.0 {
        (A + 2.0) * t * t * t - (A + 3.0) * t * t + 1.0
    } else if t <= 2.0 {
        A * t * t * t - 5.0 * A * t * t + 8.0 * A * t - 4.0 * A
    } else {
        0.0
    }
}

/// Sample a 2D array using cubic convolution interpolation.
///
/// Corner-to-center conversion (-0.5 offset), anchor at `floor()`. Neighbours
/// beyond the raster edge repeat the edge row/column.
///
/// Returns `None` if the position is outside the raster or any of the 16
/// neighbours with non-zero weight is nodata or NaN.
pub fn sample<T: Sample>(src: &ArrayView2<'_, T>, x: f64, y: f64, nodata: Option<T>) -> Option<T> {
    if !within_extent(src, x, y) {
        return None;
    }
    let (rows, cols) = src.dim();

    // Convert from corner-based to center-based coordinates
    let cx = x - 0.5;
    let cy = y - 0.5;

    let ix = cx.floor() as isize;
    let iy = cy.floor() as isize;
    let dx = cx - ix as f64;
    let dy = cy - iy as f64;

    let wx: [f64; 4] = std::array::from_fn(|i| cubic_weight(dx - (i as f64 - 1.0)));
    let col_idx: [usize; 4] = std::array::from_fn(|i| clamp_index(ix + i as isize - 1, cols));

    let mut result = 0.0;
    for j in -1..=2_isize {
        let wy = cubic_weight(dy - j as f64);
        if wy == 0.0 {
            continue;
        }
        let row = clamp_index(iy + j, rows);

        let mut row_sum = 0.0;
        for (&col, &w) in col_idx.iter().zip(wx.iter()) {
            if w == 0.0 {
                continue;
            }
            let val = src[(row, col)];
            if is_nodata_value(val, nodata) {
                return None;
            }
            row_sum += w * val.as_f64();
        }

        result += wy * row_sum;
    }

    T::clamp_from_f64(result)
}
