//! Minimal multi-band product model driving the orchestrator.

use crate::affine::Affine;
use crate::raster::TypedRaster;

/// Mapping from a band's model coordinates to the product scene.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum SceneTransform {
    #[default]
    Identity,
    Affine(Affine),
}

impl SceneTransform {
    pub fn is_identity(&self) -> bool {
        match self {
            Self::Identity => true,
            Self::Affine(t) => t.is_identity(),
        }
    }
}

/// One named band with its own grid.
#[derive(Clone, Debug)]
pub struct Band {
    pub name: String,
    pub raster: TypedRaster,
    /// Samples are bit masks; downsampling uses the flag methods.
    pub flag: bool,
    pub scene_transform: SceneTransform,
}

impl Band {
    pub fn new(name: impl Into<String>, raster: impl Into<TypedRaster>) -> Self {
        Self {
            name: name.into(),
            raster: raster.into(),
            flag: false,
            scene_transform: SceneTransform::Identity,
        }
    }

    pub fn flag(name: impl Into<String>, raster: impl Into<TypedRaster>) -> Self {
        Self {
            flag: true,
            ..Self::new(name, raster)
        }
    }

    pub fn with_scene_transform(mut self, transform: SceneTransform) -> Self {
        self.scene_transform = transform;
        self
    }

    /// (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.raster.shape()
    }
}

/// The product scene raster: size in pixels and its pixel-to-model transform.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneGrid {
    pub width: usize,
    pub height: usize,
    pub transform: Affine,
}

impl SceneGrid {
    pub fn new(width: usize, height: usize, transform: Affine) -> Self {
        Self {
            width,
            height,
            transform,
        }
    }

    /// (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    /// Extent along the pixel axes, in model units.
    pub fn model_size(&self) -> (f64, f64) {
        let (gsd_x, gsd_y) = self.transform.ground_sampling_distance();
        (self.width as f64 * gsd_x, self.height as f64 * gsd_y)
    }
}

#[derive(Clone, Debug)]
pub struct Product {
    pub name: String,
    pub scene: SceneGrid,
    bands: Vec<Band>,
}

impl Product {
    pub fn new(name: impl Into<String>, scene: SceneGrid) -> Self {
        Self {
            name: name.into(),
            scene,
            bands: Vec::new(),
        }
    }

    pub fn with_band(mut self, band: Band) -> Self {
        self.bands.push(band);
        self
    }

    pub fn add_band(&mut self, band: Band) {
        self.bands.push(band);
    }

    pub fn bands(&self) -> &[Band] {
        &self.bands
    }

    pub fn band(&self, name: &str) -> Option<&Band> {
        self.bands.iter().find(|b| b.name == name)
    }
}
