//! Builds one pyramid level from the base source.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ndarray::{s, Array2};
use rayon::prelude::*;

use super::methods::{ResampleMethods, Selection};
use crate::chunk::planner::plan_tiles;
use crate::error::ResampleError;
use crate::grid::{GridMapper, LevelGrid};
use crate::raster::{Raster, RasterSource, Sample};
use crate::warp::resample_tile;

/// Shared cancellation signal, checked before each tile.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub fn check(&self) -> Result<(), ResampleError> {
        if self.is_cancelled() {
            Err(ResampleError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Execution knobs for level building.
#[derive(Clone, Debug)]
pub struct BuildOptions {
    /// Destination tile size (rows, cols).
    pub tile_size: (usize, usize),
    pub cancel: CancelFlag,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            tile_size: (256, 256),
            cancel: CancelFlag::default(),
        }
    }
}

/// Build the raster of one pyramid level.
///
/// The level is always computed from `source` directly, never from another
/// level. The result carries the level transform and the source no-data value.
pub fn build_level<S: RasterSource>(
    source: &S,
    level: &LevelGrid,
    methods: &ResampleMethods,
    is_flag: bool,
    options: &BuildOptions,
) -> Result<Raster<S::Sample>, ResampleError> {
    let src_shape = source.shape();
    let dst_shape = level.shape();
    let nodata = source.nodata();
    let mapper = GridMapper::new(&source.transform(), &level.transform)?;

    let policy = match methods.select(&mapper, src_shape, dst_shape, is_flag) {
        Selection::Passthrough => {
            options.cancel.check()?;
            log::debug!("level {}: passthrough {}x{}", level.index, dst_shape.1, dst_shape.0);
            let data = source.read_region(0..src_shape.0, 0..src_shape.1)?;
            return Ok(Raster::new(data.into_owned(), level.transform, nodata));
        }
        Selection::Resample(policy) => policy,
    };

    let plans = plan_tiles(
        &mapper,
        src_shape,
        dst_shape,
        options.tile_size,
        policy.kernel_radius(),
    )?;
    log::debug!(
        "level {}: {:?} {}x{} -> {}x{} in {} tiles",
        level.index,
        policy,
        src_shape.1,
        src_shape.0,
        dst_shape.1,
        dst_shape.0,
        plans.len()
    );

    let tiles = plans
        .par_iter()
        .map(|plan| {
            options.cancel.check()?;
            let (r0, r1, c0, c1) = plan.src_slice;
            let region = source.read_region(r0..r1, c0..c1)?;
            Ok(resample_tile(&region.view(), plan, policy, nodata))
        })
        .collect::<Result<Vec<_>, ResampleError>>()?;

    let fill = nodata.unwrap_or_else(S::Sample::fill_value);
    let mut data = Array2::from_elem(dst_shape, fill);
    for (plan, tile) in plans.iter().zip(tiles) {
        let (r0, r1, c0, c1) = plan.dst_slice;
        data.slice_mut(s![r0..r1, c0..c1]).assign(&tile);
    }

    Ok(Raster::new(data, level.transform, nodata))
}
