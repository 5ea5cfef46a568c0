//! Resampling parameters.

use serde::{Deserialize, Serialize};

use crate::aggregate::{AggregationMethod, FlagAggregationMethod};
use crate::error::ConfigError;
use crate::interpolate::InterpolationMethod;
use crate::pyramid::ResampleMethods;
use crate::raster::SampleKind;

/// How the target grid is defined. Exactly one is allowed.
#[derive(Debug, Clone, PartialEq)]
pub enum TargetSizing {
    /// Copy the grid of a named band of the product.
    ReferenceBand(String),
    /// Divide the scene extent into `width x height` pixels.
    Size { width: usize, height: usize },
    /// Square pixels of this size in model units.
    Resolution(f64),
}

/// Parameters of a product resampling run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResampleParams {
    /// Name of the band whose grid becomes the target grid.
    pub reference_band: Option<String>,

    pub target_width: Option<usize>,
    pub target_height: Option<usize>,

    /// Target pixel size in model units.
    pub target_resolution: Option<f64>,

    /// Interpolation used where the target is as fine as or finer than the source.
    pub upsampling: InterpolationMethod,

    /// Aggregation used where the target is coarser than the source.
    pub downsampling: AggregationMethod,

    /// Aggregation used for flag bands where the target is coarser.
    pub flag_downsampling: FlagAggregationMethod,

    /// Number of pyramid levels to produce (level 0 included).
    pub level_count: usize,

    /// Destination tile size (rows, cols) for parallel processing.
    pub tile_size: (usize, usize),

    /// Sample kind of the output bands; `None` keeps each band's kind.
    pub output_kind: Option<SampleKind>,
}

impl Default for ResampleParams {
    fn default() -> Self {
        Self {
            reference_band: None,
            target_width: None,
            target_height: None,
            target_resolution: None,
            upsampling: InterpolationMethod::Nearest,
            downsampling: AggregationMethod::First,
            flag_downsampling: FlagAggregationMethod::Or,
            level_count: 1,
            tile_size: (256, 256),
            output_kind: None,
        }
    }
}

impl ResampleParams {
    pub fn with_reference_band(name: impl Into<String>) -> Self {
        Self {
            reference_band: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_size(width: usize, height: usize) -> Self {
        Self {
            target_width: Some(width),
            target_height: Some(height),
            ..Self::default()
        }
    }

    pub fn with_resolution(resolution: f64) -> Self {
        Self {
            target_resolution: Some(resolution),
            ..Self::default()
        }
    }

    /// Load method and tiling overrides from environment variables.
    ///
    /// Unparseable values are ignored. The target sizing is never read from
    /// the environment.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("RESAMPLE_UPSAMPLING") {
            if let Some(method) = InterpolationMethod::from_name(&val) {
                config.upsampling = method;
            }
        }

        if let Ok(val) = std::env::var("RESAMPLE_DOWNSAMPLING") {
            if let Some(method) = AggregationMethod::from_name(&val) {
                config.downsampling = method;
            }
        }

        if let Ok(val) = std::env::var("RESAMPLE_FLAG_DOWNSAMPLING") {
            if let Some(method) = FlagAggregationMethod::from_name(&val) {
                config.flag_downsampling = method;
            }
        }

        if let Ok(val) = std::env::var("RESAMPLE_LEVELS") {
            if let Ok(levels) = val.parse() {
                config.level_count = levels;
            }
        }

        if let Ok(val) = std::env::var("RESAMPLE_TILE_SIZE") {
            if let Some(size) = parse_tile_size(&val) {
                config.tile_size = size;
            }
        }

        config
    }

    /// Check the parameter rules and resolve the target sizing.
    pub fn validate(&self) -> Result<TargetSizing, ConfigError> {
        let has_size = self.target_width.is_some() || self.target_height.is_some();
        let groups = [
            self.reference_band.is_some(),
            has_size,
            self.target_resolution.is_some(),
        ];
        match groups.iter().filter(|&&given| given).count() {
            0 => return Err(ConfigError::MissingSizing),
            1 => {}
            _ => return Err(ConfigError::ConflictingSizing),
        }

        if self.level_count == 0 {
            return Err(ConfigError::InvalidLevel {
                level: 0,
                level_count: 0,
            });
        }
        let (tile_h, tile_w) = self.tile_size;
        if tile_h == 0 || tile_w == 0 {
            return Err(ConfigError::InvalidTileSize(tile_h, tile_w));
        }

        if let Some(name) = &self.reference_band {
            return Ok(TargetSizing::ReferenceBand(name.clone()));
        }
        if let Some(resolution) = self.target_resolution {
            if !resolution.is_finite() || resolution <= 0.0 {
                return Err(ConfigError::InvalidResolution(resolution));
            }
            return Ok(TargetSizing::Resolution(resolution));
        }
        match (self.target_width, self.target_height) {
            (Some(width), Some(height)) if width == 0 || height == 0 => {
                Err(ConfigError::InvalidSize { width, height })
            }
            (Some(width), Some(height)) => Ok(TargetSizing::Size { width, height }),
            _ => Err(ConfigError::IncompleteSize),
        }
    }

    pub fn methods(&self) -> ResampleMethods {
        ResampleMethods::new(self.upsampling, self.downsampling, self.flag_downsampling)
    }
}

/// Resolve method names, reporting the first unknown one.
pub fn parse_methods(
    upsampling: &str,
    downsampling: &str,
    flag_downsampling: &str,
) -> Result<ResampleMethods, ConfigError> {
    let unknown = |name: &str| ConfigError::UnknownMethod(name.to_string());
    Ok(ResampleMethods::new(
        InterpolationMethod::from_name(upsampling).ok_or_else(|| unknown(upsampling))?,
        AggregationMethod::from_name(downsampling).ok_or_else(|| unknown(downsampling))?,
        FlagAggregationMethod::from_name(flag_downsampling)
            .ok_or_else(|| unknown(flag_downsampling))?,
    ))
}

/// Accepts `"256"` (square) or `"256x512"` (rows x cols).
fn parse_tile_size(s: &str) -> Option<(usize, usize)> {
    let s = s.trim().to_lowercase();
    match s.split_once('x') {
        Some((rows, cols)) => Some((rows.trim().parse().ok()?, cols.trim().parse().ok()?)),
        None => s.parse().ok().map(|n| (n, n)),
    }
}
