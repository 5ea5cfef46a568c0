//! Inverse-mapping tile engine.
//!
//! For each output pixel of a tile, maps back into the source region and
//! applies the resampling policy. The mapping is affine, so it is evaluated
//! exactly per pixel.

use ndarray::{s, Array2, ArrayView2};

use super::ResamplePolicy;
use crate::aggregate::{self, AggregationMethod};
use crate::chunk::planner::TilePlan;
use crate::interpolate;
use crate::raster::Sample;

/// Resample one destination tile from its source region.
///
/// `src_region` must be the source slice described by `plan.src_slice`;
/// `plan.mapper` maps tile pixels into it.
pub fn resample_tile<T: Sample>(
    src_region: &ArrayView2<'_, T>,
    plan: &TilePlan,
    policy: ResamplePolicy,
    nodata: Option<T>,
) -> Array2<T> {
    let fill = nodata.unwrap_or_else(T::fill_value);
    let (rows, cols) = plan.dst_tile_shape;
    let mut dst = Array2::from_elem((rows, cols), fill);

    if !plan.has_data || src_region.is_empty() {
        return dst;
    }

    let region_shape = src_region.dim();
    let mapper = &plan.mapper;

    for row in 0..rows {
        for col in 0..cols {
            let val = match policy {
                ResamplePolicy::Interpolate(method) => {
                    // Pixel center in source region coordinates
                    let (x, y) = mapper.map(col as f64 + 0.5, row as f64 + 0.5);
                    interpolate::sample(method, src_region, x, y, nodata)
                }
                ResamplePolicy::Aggregate(method) => mapper
                    .footprint(col, row, region_shape)
                    .and_then(|fp| {
                        // First reads position (0, 0), which is off the source here
                        if fp.origin_clipped && method == AggregationMethod::First {
                            return None;
                        }
                        let w = fp.window;
                        let window = src_region.slice(s![w.rows, w.cols]);
                        aggregate::aggregate(&window, nodata, method)
                    }),
                ResamplePolicy::AggregateFlags(method) => mapper
                    .footprint(col, row, region_shape)
                    .and_then(|fp| {
                        let w = fp.window;
                        let window = src_region.slice(s![w.rows, w.cols]);
                        aggregate::aggregate_flags(&window, nodata, method)
                    }),
            };

            if let Some(v) = val {
                dst[(row, col)] = v;
            }
        }
    }

    dst
}
