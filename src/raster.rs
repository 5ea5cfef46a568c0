//! Raster sample sources: sample kinds, the read-only source trait and the
//! owned in-memory raster.

use std::fmt::Debug;
use std::ops::Range;

use ndarray::{s, Array2, ArrayView2, CowArray, Ix2};
use num_traits::{Bounded, NumCast};
use serde::{Deserialize, Serialize};

use crate::affine::Affine;
use crate::error::ResampleError;

/// Numeric storage kind of a raster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleKind {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    F32,
    F64,
}

impl SampleKind {
    pub fn is_float(&self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }
}

/// A primitive sample type a raster can be stored in.
pub trait Sample: Copy + PartialEq + NumCast + Bounded + Debug + Send + Sync + 'static {
    const KIND: SampleKind;

    /// Value written where no output could be computed and no no-data
    /// value is declared.
    fn fill_value() -> Self;

    /// Unsigned bit pattern, used by flag aggregation.
    fn to_flag_bits(self) -> u64;

    fn from_flag_bits(bits: u64) -> Self;

    fn into_typed(raster: Raster<Self>) -> TypedRaster;

    fn as_f64(self) -> f64 {
        <f64 as NumCast>::from(self).unwrap_or(f64::NAN)
    }

    /// Integer kinds truncate toward zero; NaN or out-of-range values yield `None`.
    fn cast_from_f64(value: f64) -> Option<Self> {
        NumCast::from(value)
    }

    /// Like `cast_from_f64`, but saturates at the kind's range. Only NaN
    /// yields `None`.
    fn clamp_from_f64(value: f64) -> Option<Self> {
        if value.is_nan() {
            return None;
        }
        let lo = <Self as Bounded>::min_value().as_f64();
        let hi = <Self as Bounded>::max_value().as_f64();
        Self::cast_from_f64(value.clamp(lo, hi))
    }
}

macro_rules! impl_int_sample {
    ($t:ty, $unsigned:ty, $kind:ident) => {
        impl Sample for $t {
            const KIND: SampleKind = SampleKind::$kind;

            fn fill_value() -> Self {
                0
            }

            fn to_flag_bits(self) -> u64 {
                self as $unsigned as u64
            }

            fn from_flag_bits(bits: u64) -> Self {
                bits as $unsigned as $t
            }

            fn into_typed(raster: Raster<Self>) -> TypedRaster {
                TypedRaster::$kind(raster)
            }
        }
    };
}

impl_int_sample!(u8, u8, U8);
impl_int_sample!(i8, u8, I8);
impl_int_sample!(u16, u16, U16);
impl_int_sample!(i16, u16, I16);
impl_int_sample!(u32, u32, U32);
impl_int_sample!(i32, u32, I32);

impl Sample for f32 {
    const KIND: SampleKind = SampleKind::F32;

    fn fill_value() -> Self {
        f32::NAN
    }

    fn to_flag_bits(self) -> u64 {
        self.to_bits() as u64
    }

    fn from_flag_bits(bits: u64) -> Self {
        f32::from_bits(bits as u32)
    }

    fn into_typed(raster: Raster<Self>) -> TypedRaster {
        TypedRaster::F32(raster)
    }
}

impl Sample for f64 {
    const KIND: SampleKind = SampleKind::F64;

    fn fill_value() -> Self {
        f64::NAN
    }

    fn to_flag_bits(self) -> u64 {
        self.to_bits()
    }

    fn from_flag_bits(bits: u64) -> Self {
        f64::from_bits(bits)
    }

    fn into_typed(raster: Raster<Self>) -> TypedRaster {
        TypedRaster::F64(raster)
    }
}

/// True if `val` is the declared no-data value or NaN.
#[inline]
pub fn is_nodata_value<T: Sample>(val: T, nodata: Option<T>) -> bool {
    if let Some(nd) = nodata {
        if val == nd {
            return true;
        }
    }
    val.as_f64().is_nan()
}

/// Read-only 2D grid of samples with a pixel-to-model transform.
///
/// Implementations must tolerate concurrent reads of non-overlapping regions.
pub trait RasterSource: Sync {
    type Sample: Sample;

    /// (rows, cols)
    fn shape(&self) -> (usize, usize);

    fn transform(&self) -> Affine;

    fn nodata(&self) -> Option<Self::Sample>;

    /// Read the rectangular region `rows x cols` (end-exclusive).
    fn read_region(
        &self,
        rows: Range<usize>,
        cols: Range<usize>,
    ) -> Result<CowArray<'_, Self::Sample, Ix2>, ResampleError>;
}

/// Owned in-memory raster.
#[derive(Clone, Debug, PartialEq)]
pub struct Raster<T> {
    data: Array2<T>,
    transform: Affine,
    nodata: Option<T>,
}

impl<T: Sample> Raster<T> {
    pub fn new(data: Array2<T>, transform: Affine, nodata: Option<T>) -> Self {
        Self {
            data,
            transform,
            nodata,
        }
    }

    /// Build a raster by evaluating `f(row, col)` for every pixel.
    pub fn from_fn<F>(shape: (usize, usize), transform: Affine, nodata: Option<T>, f: F) -> Self
    where
        F: FnMut((usize, usize)) -> T,
    {
        Self::new(Array2::from_shape_fn(shape, f), transform, nodata)
    }

    pub fn data(&self) -> ArrayView2<'_, T> {
        self.data.view()
    }

    pub fn into_data(self) -> Array2<T> {
        self.data
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<T> {
        self.data.get((row, col)).copied()
    }

    /// Convert to another sample kind. Samples that cannot be represented
    /// (no-data, NaN, out of range) become the target's no-data or fill value.
    ///
    /// A declared no-data value the target kind cannot hold is replaced by the
    /// kind's maximum for integer kinds. Float kinds rely on NaN instead.
    pub fn convert<U: Sample>(&self) -> Raster<U> {
        let nodata: Option<U> = self.nodata.and_then(|nd| match U::cast_from_f64(nd.as_f64()) {
            Some(v) => Some(v),
            None if U::KIND.is_float() => None,
            None => Some(<U as Bounded>::max_value()),
        });
        self.convert_with_nodata(nodata)
    }

    /// Convert to another sample kind, declaring `nodata` on the result.
    /// No-data samples and samples the target kind cannot represent are
    /// written as `nodata`, or as the fill value when it is `None`.
    pub fn convert_with_nodata<U: Sample>(&self, nodata: Option<U>) -> Raster<U> {
        let fill = nodata.unwrap_or_else(U::fill_value);
        let data = self.data.mapv(|v| {
            if is_nodata_value(v, self.nodata) {
                fill
            } else {
                U::cast_from_f64(v.as_f64()).unwrap_or(fill)
            }
        });
        Raster::new(data, self.transform, nodata)
    }
}

impl<T: Sample> RasterSource for Raster<T> {
    type Sample = T;

    fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    fn transform(&self) -> Affine {
        self.transform
    }

    fn nodata(&self) -> Option<T> {
        self.nodata
    }

    fn read_region(
        &self,
        rows: Range<usize>,
        cols: Range<usize>,
    ) -> Result<CowArray<'_, T, Ix2>, ResampleError> {
        let shape = self.data.dim();
        if rows.start > rows.end || cols.start > cols.end || rows.end > shape.0 || cols.end > shape.1
        {
            return Err(ResampleError::Region {
                rows: (rows.start, rows.end),
                cols: (cols.start, cols.end),
                shape,
            });
        }
        Ok(CowArray::from(self.data.slice(s![rows, cols])))
    }
}

/// A raster of any supported sample kind.
#[derive(Clone, Debug, PartialEq)]
pub enum TypedRaster {
    U8(Raster<u8>),
    I8(Raster<i8>),
    U16(Raster<u16>),
    I16(Raster<i16>),
    U32(Raster<u32>),
    I32(Raster<i32>),
    F32(Raster<f32>),
    F64(Raster<f64>),
}

/// Evaluate `$body` with `$r` bound to the inner `Raster<T>`.
#[macro_export]
macro_rules! with_typed_raster {
    ($raster:expr, $r:ident => $body:expr) => {
        match $raster {
            $crate::raster::TypedRaster::U8($r) => $body,
            $crate::raster::TypedRaster::I8($r) => $body,
            $crate::raster::TypedRaster::U16($r) => $body,
            $crate::raster::TypedRaster::I16($r) => $body,
            $crate::raster::TypedRaster::U32($r) => $body,
            $crate::raster::TypedRaster::I32($r) => $body,
            $crate::raster::TypedRaster::F32($r) => $body,
            $crate::raster::TypedRaster::F64($r) => $body,
        }
    };
}

impl TypedRaster {
    pub fn kind(&self) -> SampleKind {
        match self {
            Self::U8(_) => SampleKind::U8,
            Self::I8(_) => SampleKind::I8,
            Self::U16(_) => SampleKind::U16,
            Self::I16(_) => SampleKind::I16,
            Self::U32(_) => SampleKind::U32,
            Self::I32(_) => SampleKind::I32,
            Self::F32(_) => SampleKind::F32,
            Self::F64(_) => SampleKind::F64,
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        with_typed_raster!(self, r => r.shape())
    }

    pub fn transform(&self) -> Affine {
        with_typed_raster!(self, r => r.transform())
    }

    pub fn convert(&self, kind: SampleKind) -> TypedRaster {
        with_typed_raster!(self, r => convert_raster(r, kind))
    }

    pub fn as_f64(&self) -> Raster<f64> {
        with_typed_raster!(self, r => r.convert::<f64>())
    }
}

fn convert_raster<T: Sample>(raster: &Raster<T>, kind: SampleKind) -> TypedRaster {
    if kind == T::KIND {
        return T::into_typed(raster.clone());
    }
    match kind {
        SampleKind::U8 => TypedRaster::U8(raster.convert()),
        SampleKind::I8 => TypedRaster::I8(raster.convert()),
        SampleKind::U16 => TypedRaster::U16(raster.convert()),
        SampleKind::I16 => TypedRaster::I16(raster.convert()),
        SampleKind::U32 => TypedRaster::U32(raster.convert()),
        SampleKind::I32 => TypedRaster::I32(raster.convert()),
        SampleKind::F32 => TypedRaster::F32(raster.convert()),
        SampleKind::F64 => TypedRaster::F64(raster.convert()),
    }
}

impl<T: Sample> From<Raster<T>> for TypedRaster {
    fn from(raster: Raster<T>) -> Self {
        T::into_typed(raster)
    }
}
