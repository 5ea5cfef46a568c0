//! Resample orchestrator: brings every band of a product onto one target grid.

use rayon::prelude::*;

use crate::affine::Affine;
use crate::config::{ResampleParams, TargetSizing};
use crate::error::{ConfigError, ResampleError};
use crate::grid::TargetGrid;
use crate::pyramid::{self, BuildOptions, CancelFlag, MultiLevelRaster, ResampleMethods};
use crate::raster::{Raster, RasterSource, Sample, SampleKind, TypedRaster};
use crate::product::Product;
use crate::with_typed_raster;

/// Resample `source` onto every level of `grid`.
///
/// Levels that fail are reported by [`MultiLevelRaster::failures`].
pub fn resample<S: RasterSource>(
    source: &S,
    grid: &TargetGrid,
    methods: &ResampleMethods,
    is_flag: bool,
    options: &BuildOptions,
) -> MultiLevelRaster<S::Sample> {
    let mut levels = MultiLevelRaster::new(*grid);
    levels.build_all(source, methods, is_flag, options);
    levels
}

/// Resample `source` to `width x height` pixels covering its own extent.
pub fn resample_to_size<S: RasterSource>(
    source: &S,
    width: usize,
    height: usize,
    methods: &ResampleMethods,
    is_flag: bool,
    options: &BuildOptions,
) -> Result<Raster<S::Sample>, ResampleError> {
    let grid = TargetGrid::covering(source.shape(), &source.transform(), width, height)?;
    pyramid::build_level(source, &grid.level(0)?, methods, is_flag, options)
}

/// Resample flag words carried in an `f64` raster onto every level of `grid`.
///
/// Samples are aggregated as `u32` bit patterns. No-data and NaN samples are
/// kept out of the bit reduction; they come back as the source's no-data
/// value, or NaN when none is declared. `u32::MAX` is reserved as the
/// interim marker unless the declared no-data value fits in a `u32`.
pub fn resample_flag_words(
    source: &Raster<f64>,
    grid: &TargetGrid,
    methods: &ResampleMethods,
    options: &BuildOptions,
) -> Result<Vec<Raster<f64>>, ResampleError> {
    let marker = source
        .nodata()
        .and_then(u32::cast_from_f64)
        .unwrap_or(u32::MAX);
    let words = source.convert_with_nodata(Some(marker));
    let levels = resample(&words, grid, methods, true, options).into_levels()?;
    Ok(levels
        .iter()
        .map(|level| level.convert_with_nodata(source.nodata()))
        .collect())
}

/// A band on the target grid, finest level first.
#[derive(Clone, Debug)]
pub struct ResampledBand {
    pub name: String,
    pub flag: bool,
    pub levels: Vec<TypedRaster>,
}

/// A band left out of the output because one of its levels failed.
#[derive(Clone, Debug, PartialEq)]
pub struct BandFailure {
    pub band: String,
    pub level: usize,
    pub error: ResampleError,
}

#[derive(Clone, Debug)]
pub struct ResampledProduct {
    pub grid: TargetGrid,
    pub bands: Vec<ResampledBand>,
    pub failures: Vec<BandFailure>,
}

impl ResampledProduct {
    pub fn band(&self, name: &str) -> Option<&ResampledBand> {
        self.bands.iter().find(|b| b.name == name)
    }
}

/// Validated resampling run over whole products.
#[derive(Debug)]
pub struct Resampler {
    params: ResampleParams,
    sizing: TargetSizing,
    cancel: CancelFlag,
}

impl Resampler {
    pub fn new(params: ResampleParams) -> Result<Self, ResampleError> {
        let sizing = params.validate()?;
        Ok(Self {
            params,
            sizing,
            cancel: CancelFlag::new(),
        })
    }

    pub fn params(&self) -> &ResampleParams {
        &self.params
    }

    /// Handle that cancels running and future work of this resampler.
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Target grid of `product` under the configured sizing, level 0 only.
    pub fn target_grid(&self, product: &Product) -> Result<TargetGrid, ResampleError> {
        let scene = &product.scene;
        match &self.sizing {
            TargetSizing::ReferenceBand(name) => {
                let band = product
                    .band(name)
                    .ok_or_else(|| ConfigError::UnknownReferenceBand(name.clone()))?;
                let (rows, cols) = band.shape();
                TargetGrid::new(cols, rows, band.raster.transform())
            }
            TargetSizing::Size { width, height } => {
                TargetGrid::covering(scene.shape(), &scene.transform, *width, *height)
            }
            TargetSizing::Resolution(resolution) => {
                let (model_w, model_h) = scene.model_size();
                let width = ((model_w / resolution).round() as usize).max(1);
                let height = ((model_h / resolution).round() as usize).max(1);
                let transform = with_pixel_size(&scene.transform, *resolution)?;
                TargetGrid::new(width, height, transform)
            }
        }
    }

    /// Resample every band of `product` onto the target grid.
    ///
    /// Configuration problems abort before any band is touched. A band whose
    /// levels fail is reported in [`ResampledProduct::failures`] and left out.
    pub fn resample_product(&self, product: &Product) -> Result<ResampledProduct, ResampleError> {
        if let Some(band) = product
            .bands()
            .iter()
            .find(|b| !b.scene_transform.is_identity())
        {
            return Err(ConfigError::SceneTransform(band.name.clone()).into());
        }

        let grid = self
            .target_grid(product)?
            .with_levels(self.params.level_count)?;
        log::info!(
            "resampling product '{}' ({} bands) to {}x{}, {} level(s)",
            product.name,
            product.bands().len(),
            grid.width,
            grid.height,
            grid.level_count
        );

        let methods = self.params.methods();
        let options = BuildOptions {
            tile_size: self.params.tile_size,
            cancel: self.cancel.clone(),
        };
        let output_kind = self.params.output_kind;

        let results: Vec<Result<ResampledBand, BandFailure>> = product
            .bands()
            .par_iter()
            .map(|band| {
                log::debug!("band '{}': {:?} {:?}", band.name, band.raster.kind(), band.shape());
                let levels = with_typed_raster!(&band.raster, raster => {
                    let levels = resample(raster, &grid, &methods, band.flag, &options);
                    collect_levels(levels, output_kind)
                });
                levels
                    .map(|levels| ResampledBand {
                        name: band.name.clone(),
                        flag: band.flag,
                        levels,
                    })
                    .map_err(|(level, error)| BandFailure {
                        band: band.name.clone(),
                        level,
                        error,
                    })
            })
            .collect();

        if self.cancel.is_cancelled() {
            return Err(ResampleError::Cancelled);
        }

        let mut bands = Vec::with_capacity(results.len());
        let mut failures = Vec::new();
        for result in results {
            match result {
                Ok(band) => bands.push(band),
                Err(failure) => {
                    log::warn!(
                        "band '{}' failed at level {}: {}",
                        failure.band,
                        failure.level,
                        failure.error
                    );
                    failures.push(failure);
                }
            }
        }

        log::info!(
            "resampled product '{}': {} band(s), {} failure(s)",
            product.name,
            bands.len(),
            failures.len()
        );
        Ok(ResampledProduct {
            grid,
            bands,
            failures,
        })
    }
}

/// Keep the orientation of `transform`, with square pixels of `size`.
fn with_pixel_size(transform: &Affine, size: f64) -> Result<Affine, ResampleError> {
    let (gsd_x, gsd_y) = transform.ground_sampling_distance();
    if gsd_x == 0.0 || gsd_y == 0.0 {
        return Err(ResampleError::Affine(format!(
            "scene transform has a degenerate axis: {transform:?}"
        )));
    }
    let (sx, sy) = (size / gsd_x, size / gsd_y);
    let t = transform;
    Ok(Affine::new(t.a * sx, t.b * sy, t.c, t.d * sx, t.e * sy, t.f))
}

fn collect_levels<T: Sample>(
    levels: MultiLevelRaster<T>,
    output_kind: Option<SampleKind>,
) -> Result<Vec<TypedRaster>, (usize, ResampleError)> {
    if let Some((level, err)) = levels.failures().first() {
        return Err((*level, (*err).clone()));
    }
    let rasters = levels.into_levels().map_err(|err| (0, err))?;
    Ok(rasters
        .into_iter()
        .map(|raster| {
            let typed = TypedRaster::from(raster);
            match output_kind {
                Some(kind) if kind != typed.kind() => typed.convert(kind),
                _ => typed,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{AggregationMethod, FlagAggregationMethod};
    use crate::interpolate::InterpolationMethod;
    use crate::product::{Band, SceneGrid, SceneTransform};
    use approx::assert_relative_eq;
    use ndarray::{array, Array2};

    fn ten_metre() -> Affine {
        Affine::new(10.0, 0.0, 300000.0, 0.0, -10.0, 5000040.0)
    }

    fn twenty_metre() -> Affine {
        ten_metre().scaled(2.0)
    }

    /// 4x4 at 10 m, 2x2 at 20 m and a 4x4 flag band.
    fn product() -> Product {
        let scene = SceneGrid::new(4, 4, ten_metre());
        let fine = Raster::new(
            array![
                [5.0, 7.0, 9.0, 11.0],
                [9.0, 9.0, 7.0, 9.0],
                [13.0, 15.0, 15.0, 15.0],
                [12.0, 14.0, 15.0, 15.0],
            ],
            ten_metre(),
            None,
        );
        let coarse = Raster::new(array![[1u16, 2], [3, 4]], twenty_metre(), Some(0));
        let mask = Raster::new(
            array![[1u8, 2, 0, 0], [4, 0, 0, 0], [0, 0, 8, 8], [0, 0, 8, 16]],
            ten_metre(),
            None,
        );
        Product::new("test", scene)
            .with_band(Band::new("fine", fine))
            .with_band(Band::new("coarse", coarse))
            .with_band(Band::flag("mask", mask))
    }

    fn params(base: ResampleParams) -> ResampleParams {
        ResampleParams {
            downsampling: AggregationMethod::Mean,
            tile_size: (1, 1),
            ..base
        }
    }

    #[test]
    fn test_reference_band_grid() {
        let resampler = Resampler::new(ResampleParams::with_reference_band("coarse")).unwrap();
        let grid = resampler.target_grid(&product()).unwrap();
        assert_eq!(grid.shape(), (2, 2));
        assert_eq!(grid.transform, twenty_metre());
    }

    #[test]
    fn test_size_grid_covers_scene() {
        let resampler = Resampler::new(ResampleParams::with_size(8, 2)).unwrap();
        let grid = resampler.target_grid(&product()).unwrap();
        assert_eq!((grid.width, grid.height), (8, 2));
        assert_relative_eq!(grid.transform.a, 5.0);
        assert_relative_eq!(grid.transform.e, -20.0);
        assert_relative_eq!(grid.transform.c, 300000.0);
        assert_relative_eq!(grid.transform.f, 5000040.0);
    }

    #[test]
    fn test_resolution_grid() {
        let resampler = Resampler::new(ResampleParams::with_resolution(20.0)).unwrap();
        let grid = resampler.target_grid(&product()).unwrap();
        assert_eq!((grid.width, grid.height), (2, 2));
        assert_eq!(grid.transform, twenty_metre());

        // 40 m / 15 m = 2.67 rounds to 3
        let resampler = Resampler::new(ResampleParams::with_resolution(15.0)).unwrap();
        let grid = resampler.target_grid(&product()).unwrap();
        assert_eq!((grid.width, grid.height), (3, 3));
        assert_relative_eq!(grid.transform.a, 15.0);
        assert_relative_eq!(grid.transform.e, -15.0);

        // Never fewer than one pixel
        let resampler = Resampler::new(ResampleParams::with_resolution(1000.0)).unwrap();
        let grid = resampler.target_grid(&product()).unwrap();
        assert_eq!((grid.width, grid.height), (1, 1));
    }

    #[test]
    fn test_unknown_reference_band() {
        let resampler = Resampler::new(ResampleParams::with_reference_band("B12")).unwrap();
        assert_eq!(
            resampler.resample_product(&product()).unwrap_err(),
            ResampleError::Config(ConfigError::UnknownReferenceBand("B12".to_string()))
        );
    }

    #[test]
    fn test_invalid_params_rejected_eagerly() {
        let params = ResampleParams {
            target_width: Some(4),
            ..ResampleParams::default()
        };
        assert_eq!(
            Resampler::new(params).unwrap_err(),
            ResampleError::Config(ConfigError::IncompleteSize)
        );
    }

    #[test]
    fn test_scene_transform_rejected_before_work() {
        let shifted = SceneTransform::Affine(Affine::new(1.0, 0.0, 3.0, 0.0, 1.0, 0.0));
        let band = Band::new("shifted", Raster::new(Array2::<f32>::zeros((4, 4)), ten_metre(), None))
            .with_scene_transform(shifted);
        let product = product().with_band(band);

        let resampler = Resampler::new(ResampleParams::with_reference_band("fine")).unwrap();
        assert_eq!(
            resampler.resample_product(&product).unwrap_err(),
            ResampleError::Config(ConfigError::SceneTransform("shifted".to_string()))
        );
    }

    #[test]
    fn test_resample_to_coarse_reference() {
        let resampler = Resampler::new(params(ResampleParams::with_reference_band("coarse"))).unwrap();
        let out = resampler.resample_product(&product()).unwrap();

        assert!(out.failures.is_empty());
        assert_eq!(out.bands.len(), 3);

        let fine = out.band("fine").unwrap();
        assert_eq!(fine.levels.len(), 1);
        match &fine.levels[0] {
            TypedRaster::F64(r) => assert_eq!(r.data(), array![[7.5, 9.0], [13.5, 15.0]]),
            other => panic!("unexpected kind {:?}", other.kind()),
        }

        // Already on the target grid: copied unchanged
        let coarse = out.band("coarse").unwrap();
        assert_eq!(coarse.levels[0], product().band("coarse").unwrap().raster);

        let mask = out.band("mask").unwrap();
        assert!(mask.flag);
        match &mask.levels[0] {
            TypedRaster::U8(r) => assert_eq!(r.data(), array![[7u8, 0], [0, 24]]),
            other => panic!("unexpected kind {:?}", other.kind()),
        }
    }

    #[test]
    fn test_upsample_to_fine_reference() {
        let resampler = Resampler::new(ResampleParams::with_reference_band("fine")).unwrap();
        let out = resampler.resample_product(&product()).unwrap();

        let coarse = out.band("coarse").unwrap();
        match &coarse.levels[0] {
            TypedRaster::U16(r) => {
                assert_eq!(r.shape(), (4, 4));
                assert_eq!(r.transform(), ten_metre());
                assert_eq!(
                    r.data(),
                    array![[1u16, 1, 2, 2], [1, 1, 2, 2], [3, 3, 4, 4], [3, 3, 4, 4]]
                );
                assert_eq!(r.nodata(), Some(0));
            }
            other => panic!("unexpected kind {:?}", other.kind()),
        }
    }

    #[test]
    fn test_levels_and_output_kind() {
        let base = ResampleParams {
            level_count: 2,
            output_kind: Some(SampleKind::I32),
            ..ResampleParams::with_size(2, 2)
        };
        let resampler = Resampler::new(params(base)).unwrap();
        let out = resampler.resample_product(&product()).unwrap();

        assert_eq!(out.grid.level_count, 2);
        let fine = out.band("fine").unwrap();
        assert_eq!(fine.levels.len(), 2);
        assert!(fine.levels.iter().all(|l| l.kind() == SampleKind::I32));
        match (&fine.levels[0], &fine.levels[1]) {
            (TypedRaster::I32(l0), TypedRaster::I32(l1)) => {
                // Means are computed in floating point and truncated on output
                assert_eq!(l0.data(), array![[7, 9], [13, 15]]);
                assert_eq!(l1.shape(), (1, 1));
            }
            _ => panic!("expected i32 levels"),
        }
    }

    #[test]
    fn test_failed_band_is_reported_and_omitted() {
        let broken = Raster::new(
            Array2::<f32>::zeros((2, 2)),
            Affine::new(0.0, 0.0, 0.0, 0.0, 0.0, 0.0),
            None,
        );
        let product = product().with_band(Band::new("broken", broken));

        let resampler = Resampler::new(params(ResampleParams::with_size(2, 2))).unwrap();
        let out = resampler.resample_product(&product).unwrap();

        assert_eq!(out.bands.len(), 3);
        assert!(out.band("broken").is_none());
        assert_eq!(out.failures.len(), 1);
        assert_eq!(out.failures[0].band, "broken");
        assert_eq!(out.failures[0].level, 0);
        assert!(matches!(out.failures[0].error, ResampleError::Affine(_)));
    }

    #[test]
    fn test_cancelled_run() {
        let resampler = Resampler::new(params(ResampleParams::with_size(2, 2))).unwrap();
        resampler.cancel_flag().cancel();
        assert_eq!(
            resampler.resample_product(&product()).unwrap_err(),
            ResampleError::Cancelled
        );
    }

    #[test]
    fn test_identity_resample_is_idempotent() {
        let product = product();
        let resampler = Resampler::new(ResampleParams {
            upsampling: InterpolationMethod::CubicConvolution,
            downsampling: AggregationMethod::Median,
            flag_downsampling: FlagAggregationMethod::MedianAnd,
            ..ResampleParams::with_reference_band("fine")
        })
        .unwrap();
        let out = resampler.resample_product(&product).unwrap();

        for name in ["fine", "mask"] {
            assert_eq!(
                out.band(name).unwrap().levels[0],
                product.band(name).unwrap().raster,
                "{name}"
            );
        }
    }

    #[test]
    fn test_resample_to_size() {
        let source = Raster::from_fn((4, 4), Affine::identity(), None, |(r, c)| (5 + c + 4 * r) as f64);
        let methods = ResampleMethods {
            downsampling: AggregationMethod::Min,
            ..ResampleMethods::default()
        };
        let out = resample_to_size(&source, 2, 2, &methods, false, &BuildOptions::default()).unwrap();
        assert_eq!(out.data(), array![[5.0, 7.0], [13.0, 15.0]]);

        assert!(resample_to_size(&source, 0, 2, &methods, false, &BuildOptions::default()).is_err());
    }

    #[test]
    fn test_flag_words_exclude_nodata() {
        let source = Raster::new(
            array![
                [3.0, -1.0, 1.0, 1.0],
                [f64::NAN, 1.0, -1.0, -1.0],
                [6.0, 2.0, 8.0, 8.0],
                [2.0, 6.0, 8.0, 9.0],
            ],
            Affine::identity(),
            Some(-1.0),
        );
        let grid = TargetGrid::covering((4, 4), &Affine::identity(), 2, 2).unwrap();
        let methods = ResampleMethods {
            flag_downsampling: FlagAggregationMethod::And,
            ..ResampleMethods::default()
        };

        let levels =
            resample_flag_words(&source, &grid, &methods, &BuildOptions::default()).unwrap();
        assert_eq!(levels.len(), 1);
        assert_eq!(levels[0].nodata(), Some(-1.0));
        // 3 & 1 with the no-data and NaN samples skipped; 1 & 1 likewise
        assert_eq!(levels[0].data(), array![[1.0, 1.0], [2.0, 8.0]]);
    }

    #[test]
    fn test_flag_words_all_nodata_window() {
        let source = Raster::new(
            array![[f64::NAN, f64::NAN], [f64::NAN, f64::NAN]],
            Affine::identity(),
            None,
        );
        let grid = TargetGrid::covering((2, 2), &Affine::identity(), 1, 1).unwrap();
        let levels = resample_flag_words(
            &source,
            &grid,
            &ResampleMethods::default(),
            &BuildOptions::default(),
        )
        .unwrap();
        assert!(levels[0].get(0, 0).is_some_and(|v| v.is_nan()));
    }

    #[test]
    fn test_resample_pyramid() {
        let source = Raster::from_fn((4, 4), Affine::identity(), None, |(r, c)| (5 + c + 4 * r) as u16);
        let grid = TargetGrid::covering((4, 4), &Affine::identity(), 2, 2)
            .unwrap()
            .with_levels(2)
            .unwrap();
        let methods = ResampleMethods {
            downsampling: AggregationMethod::Min,
            ..ResampleMethods::default()
        };

        let pyramid = resample(&source, &grid, &methods, false, &BuildOptions::default());
        assert!(pyramid.is_complete());
        assert_eq!(pyramid.level(0).unwrap().data(), array![[5u16, 7], [13, 15]]);
        assert_eq!(pyramid.level(1).unwrap().data(), array![[5u16]]);
    }
}
