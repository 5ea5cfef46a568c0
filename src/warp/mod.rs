//! Per-tile resampling.

pub mod engine;

use serde::{Deserialize, Serialize};

use crate::aggregate::{AggregationMethod, FlagAggregationMethod};
use crate::interpolate::InterpolationMethod;

/// How one (band, level) pair computes its target samples.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "method", rename_all = "snake_case")]
pub enum ResamplePolicy {
    Aggregate(AggregationMethod),
    AggregateFlags(FlagAggregationMethod),
    Interpolate(InterpolationMethod),
}

impl ResamplePolicy {
    /// Source pixels of support needed around a tile's footprint.
    pub fn kernel_radius(&self) -> usize {
        match self {
            Self::Aggregate(_) | Self::AggregateFlags(_) => 1,
            Self::Interpolate(method) => method.kernel_radius(),
        }
    }
}

pub use engine::resample_tile;
