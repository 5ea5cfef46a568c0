//! Median aggregation.

use ndarray::ArrayView2;

use super::qualifying;
use crate::raster::Sample;

/// Median of the qualifying samples: the middle order statistic for odd
/// counts, the mean of the two middle ones for even counts.
pub fn aggregate<T: Sample>(window: &ArrayView2<'_, T>, nodata: Option<T>) -> Option<T> {
    let mut values: Vec<f64> = qualifying(window, nodata).map(Sample::as_f64).collect();
    if values.is_empty() {
        return None;
    }
    values.sort_unstable_by(f64::total_cmp);

    let mid = values.len() / 2;
    let median = if values.len() % 2 == 1 {
        values[mid]
    } else {
        (values[mid - 1] + values[mid]) / 2.0
    };
    T::cast_from_f64(median)
}
