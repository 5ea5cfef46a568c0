//! Min / max aggregation.

use ndarray::ArrayView2;

use super::qualifying;
use crate::raster::Sample;

pub fn min<T: Sample>(window: &ArrayView2<'_, T>, nodata: Option<T>) -> Option<T> {
    extremum(window, nodata, |candidate, best| candidate < best)
}

pub fn max<T: Sample>(window: &ArrayView2<'_, T>, nodata: Option<T>) -> Option<T> {
    extremum(window, nodata, |candidate, best| candidate > best)
}

/// The sample itself is returned, so no precision is lost for any kind.
fn extremum<T, F>(window: &ArrayView2<'_, T>, nodata: Option<T>, better: F) -> Option<T>
where
    T: Sample,
    F: Fn(f64, f64) -> bool,
{
    qualifying(window, nodata).fold(None, |best: Option<T>, v| match best {
        Some(b) if !better(v.as_f64(), b.as_f64()) => Some(b),
        _ => Some(v),
    })
}
