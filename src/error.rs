use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResampleError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid affine transform: {0}")]
    Affine(String),

    #[error("Region {rows:?} x {cols:?} is outside the source raster of shape {shape:?}")]
    Region {
        rows: (usize, usize),
        cols: (usize, usize),
        shape: (usize, usize),
    },

    #[error("Invalid shape: {0}")]
    Shape(String),

    #[error("Pyramid level {0} has not been built")]
    LevelNotBuilt(usize),

    #[error("Resampling was cancelled")]
    Cancelled,
}

/// Violations of the resampling parameter rules. Raised before any pixel work.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("only one of referenceBand, targetWidth/targetHeight or targetResolution may be given")]
    ConflictingSizing,

    #[error("one of referenceBand, targetWidth/targetHeight or targetResolution must be given")]
    MissingSizing,

    #[error("targetWidth and targetHeight must be given together")]
    IncompleteSize,

    #[error("reference band '{0}' not found")]
    UnknownReferenceBand(String),

    #[error("band '{0}' has a non-identity model-to-scene transform")]
    SceneTransform(String),

    #[error("invalid target size {width}x{height}")]
    InvalidSize { width: usize, height: usize },

    #[error("invalid target resolution {0}")]
    InvalidResolution(f64),

    #[error("invalid tile size {0}x{1}")]
    InvalidTileSize(usize, usize),

    #[error("invalid pyramid level {level} (level count {level_count})")]
    InvalidLevel { level: usize, level_count: usize },

    #[error("unknown resampling method: '{0}'")]
    UnknownMethod(String),
}
