//! Mean aggregation.

use ndarray::ArrayView2;

use super::qualifying;
use crate::raster::Sample;

/// Arithmetic mean of the qualifying samples.
///
/// Unlike the bilinear and cubic kernels, no-data/NaN samples are skipped
/// rather than propagated. Integer kinds truncate the mean.
pub fn aggregate<T: Sample>(window: &ArrayView2<'_, T>, nodata: Option<T>) -> Option<T> {
    let (sum, count) = qualifying(window, nodata)
        .fold((0.0_f64, 0usize), |(sum, n), v| (sum + v.as_f64(), n + 1));
    if count == 0 {
        return None;
    }
    T::cast_from_f64(sum / count as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{array, Array2};

    #[test]
    fn test_uniform_window() {
        let arr = Array2::from_elem((4, 4), 10.0_f64);
        assert_relative_eq!(aggregate(&arr.view(), None).unwrap(), 10.0, epsilon = 1e-10);
    }

    #[test]
    fn test_matches_arithmetic_average() {
        let arr = array![[0.1, 0.2, 0.3], [1.5, 2.5, 3.5]];
        let expected = (0.1 + 0.2 + 0.3 + 1.5 + 2.5 + 3.5) / 6.0;
        assert_relative_eq!(aggregate(&arr.view(), None).unwrap(), expected, epsilon = 1e-8);
    }

    #[test]
    fn test_nodata_skipping() {
        let mut arr = Array2::from_elem((3, 3), 100.0);
        arr[(1, 1)] = -9999.0;
        let val = aggregate(&arr.view(), Some(-9999.0)).unwrap();
        // Remaining 8 pixels are all 100.0
        assert_relative_eq!(val, 100.0, epsilon = 1e-10);
    }

    #[test]
    fn test_nan_skipping() {
        let arr = array![[f64::NAN, 2.0], [4.0, f64::NAN]];
        assert_relative_eq!(aggregate(&arr.view(), None).unwrap(), 3.0, epsilon = 1e-10);
    }

    #[test]
    fn test_all_nan() {
        let arr = Array2::from_elem((2, 2), f32::NAN);
        assert!(aggregate(&arr.view(), None).is_none());
    }

    #[test]
    fn test_integer_type_truncates() {
        let arr = array![[5i32, 7], [9, 9]];
        // 30 / 4 = 7.5
        assert_eq!(aggregate(&arr.view(), None), Some(7));
    }
}
