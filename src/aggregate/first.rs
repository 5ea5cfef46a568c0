//! First-sample aggregation.

use ndarray::ArrayView2;

use crate::raster::{is_nodata_value, Sample};

/// The sample at the window's first raster-order position.
///
/// Position (0, 0) wins even when later samples qualify: if it is no-data or
/// NaN the result is no-data.
pub fn aggregate<T: Sample>(window: &ArrayView2<'_, T>, nodata: Option<T>) -> Option<T> {
    let first = *window.iter().next()?;
    if is_nodata_value(first, nodata) {
        None
    } else {
        Some(first)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_takes_top_left() {
        let arr = array![[3, 1], [2, 0]];
        assert_eq!(aggregate(&arr.view(), None), Some(3));
    }

    #[test]
    fn test_later_nodata_ignored() {
        let arr = array![[3.0, -1.0], [-1.0, -1.0]];
        assert_eq!(aggregate(&arr.view(), Some(-1.0)), Some(3.0));
    }

    #[test]
    fn test_first_nodata_gives_nodata() {
        let arr = array![[-1.0, 5.0], [6.0, 7.0]];
        assert_eq!(aggregate(&arr.view(), Some(-1.0)), None);

        let arr = array![[f32::NAN, 5.0]];
        assert_eq!(aggregate(&arr.view(), None), None);
    }

    #[test]
    fn test_sliced_window_uses_its_own_origin() {
        let arr = array![[1, 2, 3], [4, 5, 6], [7, 8, 9]];
        let view = arr.slice(ndarray::s![1..3, 1..3]);
        assert_eq!(aggregate(&view, None), Some(5));
    }
}
