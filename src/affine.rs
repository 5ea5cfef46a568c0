use crate::error::ResampleError;

/// A 2D affine transform representing a pixel-to-model transform.
///
/// Maps pixel coordinates (col, row) to model coordinates (x, y):
///   x = a * col + b * row + c
///   y = d * col + e * row + f
///
/// Pixel coordinates are corner based: pixel (0,0) covers `[0,1) x [0,1)`
/// and its center sits at (0.5, 0.5).
///
/// In GDAL convention: [c, a, b, f, d, e]
/// We store as: [a, b, c, d, e, f]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Affine {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Affine {
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 0.0, 1.0, 0.0)
    }

    /// Create from a GDAL-style geotransform array [c, a, b, f, d, e].
    pub fn from_gdal(gt: &[f64; 6]) -> Self {
        Self {
            a: gt[1],
            b: gt[2],
            c: gt[0],
            d: gt[4],
            e: gt[5],
            f: gt[3],
        }
    }

    /// Convert to GDAL-style geotransform array [c, a, b, f, d, e].
    pub fn to_gdal(&self) -> [f64; 6] {
        [self.c, self.a, self.b, self.f, self.d, self.e]
    }

    pub fn to_tuple(&self) -> (f64, f64, f64, f64, f64, f64) {
        (self.a, self.b, self.c, self.d, self.e, self.f)
    }

    /// Apply the forward transform: (col, row) -> (x, y).
    pub fn forward(&self, col: f64, row: f64) -> (f64, f64) {
        let x = self.a * col + self.b * row + self.c;
        let y = self.d * col + self.e * row + self.f;
        (x, y)
    }

    pub fn determinant(&self) -> f64 {
        self.a * self.e - self.b * self.d
    }

    /// Compute the inverse affine transform.
    pub fn inverse(&self) -> Result<Affine, ResampleError> {
        let det = self.determinant();
        if det.abs() < f64::EPSILON {
            return Err(ResampleError::Affine(
                "Singular affine transform (determinant is zero)".into(),
            ));
        }
        let inv_det = 1.0 / det;
        Ok(Affine {
            a: self.e * inv_det,
            b: -self.b * inv_det,
            c: (self.b * self.f - self.e * self.c) * inv_det,
            d: -self.d * inv_det,
            e: self.a * inv_det,
            f: (self.d * self.c - self.a * self.f) * inv_det,
        })
    }

    /// Composition `other ∘ self`: apply `self` first, then `other`.
    pub fn then(&self, other: &Affine) -> Affine {
        Affine {
            a: other.a * self.a + other.b * self.d,
            b: other.a * self.b + other.b * self.e,
            c: other.a * self.c + other.b * self.f + other.c,
            d: other.d * self.a + other.e * self.d,
            e: other.d * self.b + other.e * self.e,
            f: other.d * self.c + other.e * self.f + other.f,
        }
    }

    /// Same origin, pixels `factor` times larger.
    pub fn scaled(&self, factor: f64) -> Affine {
        Affine {
            a: self.a * factor,
            b: self.b * factor,
            d: self.d * factor,
            e: self.e * factor,
            ..*self
        }
    }

    /// Move the origin to pixel (col, row) of this grid.
    pub fn translated_pixels(&self, col: f64, row: f64) -> Affine {
        let (c, f) = self.forward(col, row);
        Affine { c, f, ..*self }
    }

    /// Ground sampling distance along the column and row axes.
    pub fn ground_sampling_distance(&self) -> (f64, f64) {
        (self.a.hypot(self.d), self.b.hypot(self.e))
    }

    pub fn is_identity(&self) -> bool {
        const EPS: f64 = 1e-9;
        (self.a - 1.0).abs() < EPS
            && self.b.abs() < EPS
            && self.c.abs() < EPS
            && self.d.abs() < EPS
            && (self.e - 1.0).abs() < EPS
            && self.f.abs() < EPS
    }
}

impl Default for Affine {
    fn default() -> Self {
        Self::identity()
    }
}
