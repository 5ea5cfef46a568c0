//! Resampling of raster bands onto a common affine grid, with aggregation
//! for downsampling, interpolation for upsampling and multi-level pyramids.

pub mod affine;
pub mod aggregate;
pub mod chunk;
pub mod config;
pub mod error;
pub mod grid;
pub mod interpolate;
pub mod product;
pub mod pyramid;
pub mod raster;
pub mod resampler;
pub mod warp;

#[cfg(feature = "python")]
mod py;

pub use affine::Affine;
pub use config::{ResampleParams, TargetSizing};
pub use error::{ConfigError, ResampleError};
pub use grid::{GridMapper, TargetGrid};
pub use product::{Band, Product, SceneGrid, SceneTransform};
pub use pyramid::{BuildOptions, CancelFlag, LevelState, MultiLevelRaster, ResampleMethods};
pub use raster::{Raster, RasterSource, Sample, SampleKind, TypedRaster};
pub use resampler::{
    resample, resample_flag_words, resample_to_size, ResampledProduct, Resampler,
};

/// A Python module implemented in Rust.
#[cfg(feature = "python")]
#[pyo3::pymodule]
fn _rust(m: &pyo3::Bound<'_, pyo3::types::PyModule>) -> pyo3::PyResult<()> {
    py::register(m)?;
    Ok(())
}
