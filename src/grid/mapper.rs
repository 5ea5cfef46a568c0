//! Maps target pixel coordinates onto the source pixel grid.

use std::ops::Range;

use crate::affine::Affine;
use crate::error::ResampleError;

/// A rectangle of source pixels, end-exclusive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelWindow {
    pub rows: Range<usize>,
    pub cols: Range<usize>,
}

impl PixelWindow {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.cols.is_empty()
    }

    /// (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.cols.len())
    }
}

/// Source pixels aggregated into one target pixel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Footprint {
    pub window: PixelWindow,
    /// The footprint's first raster-order position lies outside the source.
    pub origin_clipped: bool,
}

/// Source region needed for a target rectangle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceWindow {
    pub window: PixelWindow,
    /// Part of the required region lay outside the source and was cut away.
    /// Target pixels depending on it resolve to no-data.
    pub clipped: bool,
    /// False when nothing of the required region overlaps the source.
    pub has_data: bool,
}

/// Composed transform `S⁻¹ ∘ T` from target pixel to source pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridMapper {
    transform: Affine,
}

impl GridMapper {
    /// Compose target pixel -> model -> source pixel.
    ///
    /// Fails when the source transform is not invertible.
    pub fn new(source: &Affine, target: &Affine) -> Result<Self, ResampleError> {
        let source_inv = source.inverse()?;
        Ok(Self {
            transform: target.then(&source_inv),
        })
    }

    pub fn from_transform(transform: Affine) -> Self {
        Self { transform }
    }

    pub fn transform(&self) -> &Affine {
        &self.transform
    }

    /// Target pixel coordinate -> source pixel coordinate.
    #[inline]
    pub fn map(&self, col: f64, row: f64) -> (f64, f64) {
        self.transform.forward(col, row)
    }

    /// Size of one target pixel measured in source pixels, per axis.
    pub fn scale(&self) -> (f64, f64) {
        self.transform.ground_sampling_distance()
    }

    pub fn is_identity(&self) -> bool {
        self.transform.is_identity()
    }

    /// Re-base on a target tile starting at `dst_origin` and a source region
    /// starting at `src_origin`, both given as (row, col).
    pub fn shifted(&self, dst_origin: (usize, usize), src_origin: (usize, usize)) -> Self {
        let into_tile = Affine::new(
            1.0,
            0.0,
            dst_origin.1 as f64,
            0.0,
            1.0,
            dst_origin.0 as f64,
        );
        let into_region = Affine::new(
            1.0,
            0.0,
            -(src_origin.1 as f64),
            0.0,
            1.0,
            -(src_origin.0 as f64),
        );
        Self {
            transform: into_tile.then(&self.transform).then(&into_region),
        }
    }

    /// Bounding box `(min_col, max_col, min_row, max_row)` in source pixel
    /// coordinates of the continuous target rectangle.
    fn bounds(&self, col0: f64, col1: f64, row0: f64, row1: f64) -> (f64, f64, f64, f64) {
        let corners = [
            self.map(col0, row0),
            self.map(col1, row0),
            self.map(col0, row1),
            self.map(col1, row1),
        ];
        corners.iter().fold(
            (
                f64::INFINITY,
                f64::NEG_INFINITY,
                f64::INFINITY,
                f64::NEG_INFINITY,
            ),
            |(min_c, max_c, min_r, max_r), &(c, r)| {
                (min_c.min(c), max_c.max(c), min_r.min(r), max_r.max(r))
            },
        )
    }

    /// Source pixels contributing to target pixel (col, row).
    ///
    /// These are the pixels whose centers fall inside the footprint's
    /// bounding box. When the footprint is narrower than a source pixel on an
    /// axis, the pixel under the mapped center is used. The window is clipped
    /// to `src_shape`; `None` means nothing is left.
    pub fn footprint(&self, col: usize, row: usize, src_shape: (usize, usize)) -> Option<Footprint> {
        let (c, r) = (col as f64, row as f64);
        let (min_c, max_c, min_r, max_r) = self.bounds(c, c + 1.0, r, r + 1.0);
        let (center_c, center_r) = self.map(c + 0.5, r + 0.5);

        let (cols, cols_clipped) = center_range(min_c, max_c, center_c, src_shape.1)?;
        let (rows, rows_clipped) = center_range(min_r, max_r, center_r, src_shape.0)?;
        Some(Footprint {
            window: PixelWindow { rows, cols },
            origin_clipped: cols_clipped || rows_clipped,
        })
    }

    /// Minimal source region enclosing the target rectangle, inflated by
    /// `margin` pixels of kernel support and clipped to `src_shape`.
    pub fn source_window(
        &self,
        rows: Range<usize>,
        cols: Range<usize>,
        margin: usize,
        src_shape: (usize, usize),
    ) -> SourceWindow {
        let (min_c, max_c, min_r, max_r) = self.bounds(
            cols.start as f64,
            cols.end as f64,
            rows.start as f64,
            rows.end as f64,
        );
        let halo = margin as f64;

        let r0 = (min_r - halo).floor();
        let r1 = (max_r + halo).ceil() + 1.0;
        let c0 = (min_c - halo).floor();
        let c1 = (max_c + halo).ceil() + 1.0;

        let (src_rows, src_cols) = (src_shape.0 as f64, src_shape.1 as f64);
        let clipped = r0 < 0.0 || c0 < 0.0 || r1 > src_rows || c1 > src_cols;

        let sr0 = r0.clamp(0.0, src_rows) as usize;
        let sr1 = r1.clamp(0.0, src_rows) as usize;
        let sc0 = c0.clamp(0.0, src_cols) as usize;
        let sc1 = c1.clamp(0.0, src_cols) as usize;

        let has_data = sr1 > sr0 && sc1 > sc0;
        let window = if has_data {
            PixelWindow {
                rows: sr0..sr1,
                cols: sc0..sc1,
            }
        } else {
            PixelWindow {
                rows: 0..0,
                cols: 0..0,
            }
        };

        SourceWindow {
            window,
            clipped,
            has_data,
        }
    }
}

/// Pixel indices along one axis whose centers lie in `[lo, hi)`, falling back
/// to the pixel containing `center`, clipped to `0..len`. The flag tells
/// whether the start was cut off.
fn center_range(lo: f64, hi: f64, center: f64, len: usize) -> Option<(Range<usize>, bool)> {
    let mut start = (lo - 0.5).ceil();
    let mut end = (hi - 0.5).ceil();
    if end <= start {
        start = center.floor();
        end = start + 1.0;
    }

    let len_f = len as f64;
    let start_clipped = start < 0.0;
    let start = start.clamp(0.0, len_f) as usize;
    let end = end.clamp(0.0, len_f) as usize;
    if end > start {
        Some((start..end, start_clipped))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn utm_affine(pixel_size: f64) -> Affine {
        Affine::new(pixel_size, 0.0, 500000.0, 0.0, -pixel_size, 6600000.0)
    }

    #[test]
    fn test_identity_mapping() {
        let mapper = GridMapper::new(&utm_affine(10.0), &utm_affine(10.0)).unwrap();
        assert!(mapper.is_identity());
        let (c, r) = mapper.map(3.5, 7.5);
        assert_relative_eq!(c, 3.5, epsilon = 1e-9);
        assert_relative_eq!(r, 7.5, epsilon = 1e-9);
    }

    #[test]
    fn test_downscale_mapping() {
        // Target pixels are 20 m, source pixels 10 m
        let mapper = GridMapper::new(&utm_affine(10.0), &utm_affine(20.0)).unwrap();
        let (c, r) = mapper.map(1.0, 2.0);
        assert_relative_eq!(c, 2.0, epsilon = 1e-9);
        assert_relative_eq!(r, 4.0, epsilon = 1e-9);

        let (sx, sy) = mapper.scale();
        assert_relative_eq!(sx, 2.0, epsilon = 1e-12);
        assert_relative_eq!(sy, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_singular_source_is_error() {
        let singular = Affine::new(0.0, 0.0, 1.0, 0.0, 0.0, 1.0);
        assert!(GridMapper::new(&singular, &utm_affine(10.0)).is_err());
    }

    #[test]
    fn test_footprint_2x() {
        let mapper = GridMapper::from_transform(Affine::new(2.0, 0.0, 0.0, 0.0, 2.0, 0.0));
        let fp = mapper.footprint(1, 0, (4, 4)).unwrap();
        assert!(!fp.origin_clipped);
        let w = fp.window;
        assert_eq!(w.rows, 0..2);
        assert_eq!(w.cols, 2..4);
        assert_eq!(w.shape(), (2, 2));
    }

    #[test]
    fn test_footprint_identity_is_single_pixel() {
        let mapper = GridMapper::from_transform(Affine::identity());
        let w = mapper.footprint(2, 3, (5, 5)).unwrap().window;
        assert_eq!(w, PixelWindow { rows: 3..4, cols: 2..3 });
    }

    #[test]
    fn test_footprint_smaller_than_source_pixel() {
        // Target pixels are a quarter of a source pixel wide
        let mapper = GridMapper::from_transform(Affine::new(0.25, 0.0, 0.0, 0.0, 0.25, 0.0));
        let w = mapper.footprint(5, 1, (4, 4)).unwrap().window;
        // Center (1.375, 0.375) lies in source pixel (row 0, col 1)
        assert_eq!(w, PixelWindow { rows: 0..1, cols: 1..2 });
    }

    #[test]
    fn test_footprint_partially_outside_is_clipped() {
        let mapper = GridMapper::from_transform(Affine::new(3.0, 0.0, -1.0, 0.0, 3.0, -1.0));
        let fp = mapper.footprint(0, 0, (4, 4)).unwrap();
        // Covers source centers in [-1, 2) -> pixels -1..2, clipped to 0..2
        assert_eq!(fp.window.cols, 0..2);
        assert_eq!(fp.window.rows, 0..2);
        assert!(fp.origin_clipped);
    }

    #[test]
    fn test_footprint_clipped_at_far_edge_keeps_origin() {
        let mapper = GridMapper::from_transform(Affine::new(3.0, 0.0, 0.0, 0.0, 3.0, 0.0));
        let fp = mapper.footprint(1, 1, (4, 4)).unwrap();
        assert_eq!(fp.window, PixelWindow { rows: 3..4, cols: 3..4 });
        assert!(!fp.origin_clipped);
    }

    #[test]
    fn test_footprint_outside_is_none() {
        let mapper = GridMapper::from_transform(Affine::new(1.0, 0.0, 10.0, 0.0, 1.0, 0.0));
        assert!(mapper.footprint(0, 0, (4, 4)).is_none());
    }

    #[test]
    fn test_source_window_with_margin() {
        let mapper = GridMapper::from_transform(Affine::identity());
        let sw = mapper.source_window(4..8, 4..8, 2, (16, 16));
        assert!(sw.has_data);
        assert!(!sw.clipped);
        assert_eq!(sw.window.rows, 2..11);
        assert_eq!(sw.window.cols, 2..11);
    }

    #[test]
    fn test_source_window_clipped_at_edges() {
        let mapper = GridMapper::from_transform(Affine::identity());
        let sw = mapper.source_window(0..4, 12..16, 1, (16, 16));
        assert!(sw.has_data);
        assert!(sw.clipped);
        assert_eq!(sw.window.rows, 0..6);
        assert_eq!(sw.window.cols, 11..16);
    }

    #[test]
    fn test_source_window_fully_outside() {
        let mapper = GridMapper::from_transform(Affine::new(1.0, 0.0, 100.0, 0.0, 1.0, 100.0));
        let sw = mapper.source_window(0..4, 0..4, 1, (16, 16));
        assert!(!sw.has_data);
        assert!(sw.clipped);
        assert!(sw.window.is_empty());
    }

    #[test]
    fn test_shifted_mapper() {
        let mapper = GridMapper::from_transform(Affine::new(2.0, 0.0, 0.0, 0.0, 2.0, 0.0));
        let local = mapper.shifted((4, 8), (6, 14));
        // Tile pixel (0,0) is target (row 4, col 8) -> source (8, 16) -> region (2, 2)
        let (c, r) = local.map(0.0, 0.0);
        assert_relative_eq!(c, 2.0);
        assert_relative_eq!(r, 2.0);
    }
}
