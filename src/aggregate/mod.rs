//! Aggregators: reduce a window of source samples to one target sample.
//!
//! A sample qualifies when it is neither the declared no-data value nor NaN.
//! Every aggregator returns `None` (no-data) when nothing qualifies.

pub mod extrema;
pub mod first;
pub mod flag;
pub mod mean;
pub mod median;

use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};

use crate::raster::{is_nodata_value, Sample};

/// Numeric aggregation methods.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AggregationMethod {
    Mean,
    Median,
    Min,
    Max,
    #[default]
    First,
}

impl AggregationMethod {
    /// Parse from a string name.
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "mean" | "average" => Some(Self::Mean),
            "median" => Some(Self::Median),
            "min" => Some(Self::Min),
            "max" => Some(Self::Max),
            "first" => Some(Self::First),
            _ => None,
        }
    }
}

/// Bitwise aggregation methods for flag rasters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FlagAggregationMethod {
    And,
    #[default]
    Or,
    MedianAnd,
    MedianOr,
}

impl FlagAggregationMethod {
    /// Parse from a string name. The `flag_` prefix is optional.
    pub fn from_name(s: &str) -> Option<Self> {
        let name = s.to_lowercase();
        match name.strip_prefix("flag_").unwrap_or(&name) {
            "and" => Some(Self::And),
            "or" => Some(Self::Or),
            "median_and" => Some(Self::MedianAnd),
            "median_or" => Some(Self::MedianOr),
            _ => None,
        }
    }
}

/// Reduce `window` with a numeric aggregation method.
pub fn aggregate<T: Sample>(
    window: &ArrayView2<'_, T>,
    nodata: Option<T>,
    method: AggregationMethod,
) -> Option<T> {
    match method {
        AggregationMethod::Mean => mean::aggregate(window, nodata),
        AggregationMethod::Median => median::aggregate(window, nodata),
        AggregationMethod::Min => extrema::min(window, nodata),
        AggregationMethod::Max => extrema::max(window, nodata),
        AggregationMethod::First => first::aggregate(window, nodata),
    }
}

/// Reduce `window` with a bitwise flag aggregation method.
pub fn aggregate_flags<T: Sample>(
    window: &ArrayView2<'_, T>,
    nodata: Option<T>,
    method: FlagAggregationMethod,
) -> Option<T> {
    match method {
        FlagAggregationMethod::And => flag::and(window, nodata),
        FlagAggregationMethod::Or => flag::or(window, nodata),
        FlagAggregationMethod::MedianAnd => flag::median_and(window, nodata),
        FlagAggregationMethod::MedianOr => flag::median_or(window, nodata),
    }
}

/// Qualifying samples of the window in raster order.
pub(crate) fn qualifying<'a, T: Sample>(
    window: &'a ArrayView2<'_, T>,
    nodata: Option<T>,
) -> impl Iterator<Item = T> + 'a {
    window
        .iter()
        .copied()
        .filter(move |&v| !is_nodata_value(v, nodata))
}
