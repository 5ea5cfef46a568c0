//! Chunk planner: maps destination tiles to source ROIs for chunked resampling.

use crate::error::{ConfigError, ResampleError};
use crate::grid::GridMapper;

/// A plan for resampling a single destination tile.
#[derive(Clone, Debug)]
pub struct TilePlan {
    /// Destination tile bounds (row_start, row_end, col_start, col_end), end-exclusive.
    pub dst_slice: (usize, usize, usize, usize),
    /// Source ROI with halo, clipped to source bounds (row_start, row_end, col_start, col_end).
    pub src_slice: (usize, usize, usize, usize),
    /// Maps tile pixel coordinates to ROI pixel coordinates.
    pub mapper: GridMapper,
    /// Shape of this destination tile (rows, cols).
    pub dst_tile_shape: (usize, usize),
    /// Whether the source ROI has valid coverage.
    pub has_data: bool,
}

impl TilePlan {
    /// (rows, cols) of the source ROI.
    pub fn src_shape(&self) -> (usize, usize) {
        let (r0, r1, c0, c1) = self.src_slice;
        (r1 - r0, c1 - c0)
    }
}

/// Plan tile-level resampling from source to destination grids.
///
/// Divides the destination grid into tiles of `dst_tile_size` and for each tile,
/// computes the corresponding source ROI (with halo padding for the resampling kernel).
pub fn plan_tiles(
    mapper: &GridMapper,
    src_shape: (usize, usize),
    dst_shape: (usize, usize),
    dst_tile_size: (usize, usize),
    kernel_radius: usize,
) -> Result<Vec<TilePlan>, ResampleError> {
    let (dst_rows, dst_cols) = dst_shape;
    let (tile_h, tile_w) = dst_tile_size;

    if tile_h == 0 || tile_w == 0 {
        return Err(ConfigError::InvalidTileSize(tile_h, tile_w).into());
    }

    let mut plans = Vec::with_capacity(dst_rows.div_ceil(tile_h) * dst_cols.div_ceil(tile_w));

    let mut row0 = 0;
    while row0 < dst_rows {
        let row1 = (row0 + tile_h).min(dst_rows);

        let mut col0 = 0;
        while col0 < dst_cols {
            let col1 = (col0 + tile_w).min(dst_cols);

            let source = mapper.source_window(row0..row1, col0..col1, kernel_radius, src_shape);
            let rows = &source.window.rows;
            let cols = &source.window.cols;
            let src_slice = (rows.start, rows.end, cols.start, cols.end);

            plans.push(TilePlan {
                dst_slice: (row0, row1, col0, col1),
                src_slice,
                mapper: mapper.shifted((row0, col0), (rows.start, cols.start)),
                dst_tile_shape: (row1 - row0, col1 - col0),
                has_data: source.has_data,
            });

            col0 = col1;
        }
        row0 = row1;
    }

    Ok(plans)
}
