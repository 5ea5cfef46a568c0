//! Target grid descriptor and its pyramid levels.

use crate::affine::Affine;
use crate::error::{ConfigError, ResampleError};

/// Target raster grid, optionally with several resolution levels.
///
/// Level 0 is the finest. Each further level doubles the pixel size, keeps
/// the origin, and rounds the dimensions up so the extent stays covered.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetGrid {
    pub width: usize,
    pub height: usize,
    pub transform: Affine,
    pub level_count: usize,
}

/// The geometry of one pyramid level.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LevelGrid {
    pub index: usize,
    pub width: usize,
    pub height: usize,
    pub transform: Affine,
}

impl LevelGrid {
    /// (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }
}

impl TargetGrid {
    pub fn new(width: usize, height: usize, transform: Affine) -> Result<Self, ResampleError> {
        if width == 0 || height == 0 {
            return Err(ConfigError::InvalidSize { width, height }.into());
        }
        Ok(Self {
            width,
            height,
            transform,
            level_count: 1,
        })
    }

    /// Grid of `width x height` pixels covering the extent of a source raster.
    pub fn covering(
        src_shape: (usize, usize),
        src_transform: &Affine,
        width: usize,
        height: usize,
    ) -> Result<Self, ResampleError> {
        let (rows, cols) = src_shape;
        if width == 0 || height == 0 {
            return Err(ConfigError::InvalidSize { width, height }.into());
        }
        let sx = cols as f64 / width as f64;
        let sy = rows as f64 / height as f64;
        let t = src_transform;
        let transform = Affine::new(t.a * sx, t.b * sy, t.c, t.d * sx, t.e * sy, t.f);
        Self::new(width, height, transform)
    }

    pub fn with_levels(mut self, level_count: usize) -> Result<Self, ResampleError> {
        if level_count == 0 {
            return Err(ConfigError::InvalidLevel {
                level: 0,
                level_count,
            }
            .into());
        }
        self.level_count = level_count;
        Ok(self)
    }

    /// (rows, cols) of level 0.
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    pub fn level(&self, index: usize) -> Result<LevelGrid, ResampleError> {
        if index >= self.level_count {
            return Err(ConfigError::InvalidLevel {
                level: index,
                level_count: self.level_count,
            }
            .into());
        }
        let factor = (1u64 << index.min(63)) as f64;
        Ok(LevelGrid {
            index,
            width: level_dim(self.width, factor),
            height: level_dim(self.height, factor),
            transform: self.transform.scaled(factor),
        })
    }

    pub fn levels(&self) -> impl Iterator<Item = LevelGrid> + '_ {
        (0..self.level_count).filter_map(move |k| self.level(k).ok())
    }
}

fn level_dim(base: usize, factor: f64) -> usize {
    ((base as f64 / factor).ceil() as usize).max(1)
}
