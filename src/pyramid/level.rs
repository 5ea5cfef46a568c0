//! Per-level build state of a multi-resolution raster.

use rayon::prelude::*;

use super::builder::{build_level, BuildOptions};
use super::methods::ResampleMethods;
use crate::error::ResampleError;
use crate::grid::TargetGrid;
use crate::raster::{Raster, RasterSource, Sample};

/// Lifecycle of one pyramid level. A level is computed at most once.
#[derive(Clone, Debug, PartialEq)]
pub enum LevelState<T> {
    NotBuilt,
    Building,
    Built(Raster<T>),
    Failed(ResampleError),
}

impl<T> LevelState<T> {
    pub fn raster(&self) -> Option<&Raster<T>> {
        match self {
            Self::Built(raster) => Some(raster),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ResampleError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }

    fn settle(&self, index: usize) -> Result<&Raster<T>, ResampleError> {
        match self {
            Self::Built(raster) => Ok(raster),
            Self::Failed(err) => Err(err.clone()),
            Self::NotBuilt | Self::Building => Err(ResampleError::LevelNotBuilt(index)),
        }
    }
}

/// A resampled band: one raster per level of its target grid.
#[derive(Debug)]
pub struct MultiLevelRaster<T> {
    grid: TargetGrid,
    levels: Vec<LevelState<T>>,
}

impl<T: Sample> MultiLevelRaster<T> {
    pub fn new(grid: TargetGrid) -> Self {
        Self {
            grid,
            levels: (0..grid.level_count).map(|_| LevelState::NotBuilt).collect(),
        }
    }

    pub fn grid(&self) -> &TargetGrid {
        &self.grid
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn state(&self, index: usize) -> Option<&LevelState<T>> {
        self.levels.get(index)
    }

    /// The raster of a built level.
    pub fn level(&self, index: usize) -> Option<&Raster<T>> {
        self.levels.get(index).and_then(LevelState::raster)
    }

    /// Build level `index` from `source` unless it was already attempted.
    ///
    /// A built level is returned as is; a failed level returns its stored error.
    pub fn build_level<S>(
        &mut self,
        index: usize,
        source: &S,
        methods: &ResampleMethods,
        is_flag: bool,
        options: &BuildOptions,
    ) -> Result<&Raster<T>, ResampleError>
    where
        S: RasterSource<Sample = T>,
    {
        let level = self.grid.level(index)?;
        if matches!(self.levels[index], LevelState::NotBuilt) {
            self.levels[index] = LevelState::Building;
            let result = build_level(source, &level, methods, is_flag, options);
            self.levels[index] = settled(index, result);
        }
        self.levels[index].settle(index)
    }

    /// Build every level that has not been attempted yet, in parallel.
    ///
    /// Levels are independent: a failing level leaves its siblings untouched.
    pub fn build_all<S>(
        &mut self,
        source: &S,
        methods: &ResampleMethods,
        is_flag: bool,
        options: &BuildOptions,
    ) where
        S: RasterSource<Sample = T>,
    {
        let pending: Vec<usize> = self
            .levels
            .iter()
            .enumerate()
            .filter(|(_, state)| matches!(state, LevelState::NotBuilt))
            .map(|(k, _)| k)
            .collect();
        for &k in &pending {
            self.levels[k] = LevelState::Building;
        }

        let grid = &self.grid;
        let results: Vec<(usize, LevelState<T>)> = pending
            .into_par_iter()
            .map(|k| {
                let result = grid
                    .level(k)
                    .and_then(|level| build_level(source, &level, methods, is_flag, options));
                (k, settled(k, result))
            })
            .collect();

        for (k, state) in results {
            self.levels[k] = state;
        }
    }

    /// Levels that failed, with their errors.
    pub fn failures(&self) -> Vec<(usize, &ResampleError)> {
        self.levels
            .iter()
            .enumerate()
            .filter_map(|(k, state)| state.error().map(|err| (k, err)))
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.levels
            .iter()
            .all(|state| matches!(state, LevelState::Built(_)))
    }

    /// All level rasters, finest first, or the first level's error.
    pub fn into_levels(self) -> Result<Vec<Raster<T>>, ResampleError> {
        self.levels
            .into_iter()
            .enumerate()
            .map(|(k, state)| match state {
                LevelState::Built(raster) => Ok(raster),
                LevelState::Failed(err) => Err(err),
                LevelState::NotBuilt | LevelState::Building => Err(ResampleError::LevelNotBuilt(k)),
            })
            .collect()
    }
}

fn settled<T>(index: usize, result: Result<Raster<T>, ResampleError>) -> LevelState<T> {
    match result {
        Ok(raster) => LevelState::Built(raster),
        Err(err) => {
            log::warn!("level {index} failed: {err}");
            LevelState::Failed(err)
        }
    }
}
