//! Interpolators: compute a target sample from a continuous source position.

pub mod bilinear;
pub mod cubic;
pub mod nearest;

use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};

use crate::raster::Sample;

/// Available interpolation methods.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InterpolationMethod {
    #[default]
    Nearest,
    Bilinear,
    CubicConvolution,
}

impl InterpolationMethod {
    /// Parse from a string name.
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "nearest" => Some(Self::Nearest),
            "bilinear" => Some(Self::Bilinear),
            "cubic" | "cubic_convolution" | "bicubic" => Some(Self::CubicConvolution),
            _ => None,
        }
    }

    /// Kernel radius in whole pixels (how far from center the kernel reaches).
    pub fn kernel_radius(&self) -> usize {
        match self {
            Self::Nearest => 0,
            Self::Bilinear => 1,
            Self::CubicConvolution => 2,
        }
    }
}

/// Sample `src` at corner-based pixel position (x, y).
pub fn sample<T: Sample>(
    method: InterpolationMethod,
    src: &ArrayView2<'_, T>,
    x: f64,
    y: f64,
    nodata: Option<T>,
) -> Option<T> {
    match method {
        InterpolationMethod::Nearest => nearest::sample(src, x, y, nodata),
        InterpolationMethod::Bilinear => bilinear::sample(src, x, y, nodata),
        InterpolationMethod::CubicConvolution => cubic::sample(src, x, y, nodata),
    }
}

/// True if (x, y) lies within the raster's extent `[0, cols] x [0, rows]`.
#[inline]
pub(crate) fn within_extent<T>(src: &ArrayView2<'_, T>, x: f64, y: f64) -> bool {
    let (rows, cols) = src.dim();
    rows > 0 && cols > 0 && x >= 0.0 && y >= 0.0 && x <= cols as f64 && y <= rows as f64
}

/// Clamp a neighbour index to the raster, duplicating edge pixels outward.
#[inline]
pub(crate) fn clamp_index(i: isize, len: usize) -> usize {
    i.clamp(0, len as isize - 1) as usize
}
