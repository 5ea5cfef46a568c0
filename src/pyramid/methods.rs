//! Policy selection per (band, level).

use serde::{Deserialize, Serialize};

use crate::aggregate::{AggregationMethod, FlagAggregationMethod};
use crate::grid::GridMapper;
use crate::interpolate::InterpolationMethod;
use crate::warp::ResamplePolicy;

/// Scale above which a target pixel counts as coarser than a source pixel.
const DOWNSAMPLE_EPS: f64 = 1e-9;

/// The methods to use when a band has to be resampled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResampleMethods {
    pub upsampling: InterpolationMethod,
    pub downsampling: AggregationMethod,
    pub flag_downsampling: FlagAggregationMethod,
}

/// Outcome of policy selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Selection {
    /// Source and target grids coincide; samples are copied unchanged.
    Passthrough,
    Resample(ResamplePolicy),
}

impl ResampleMethods {
    pub fn new(
        upsampling: InterpolationMethod,
        downsampling: AggregationMethod,
        flag_downsampling: FlagAggregationMethod,
    ) -> Self {
        Self {
            upsampling,
            downsampling,
            flag_downsampling,
        }
    }

    /// Pick the policy for one band at one level.
    ///
    /// A target pixel larger than a source pixel on either axis aggregates;
    /// flag bands use the flag methods. Everything else interpolates.
    pub fn select(
        &self,
        mapper: &GridMapper,
        src_shape: (usize, usize),
        dst_shape: (usize, usize),
        is_flag: bool,
    ) -> Selection {
        if src_shape == dst_shape && mapper.is_identity() {
            return Selection::Passthrough;
        }

        let (sx, sy) = mapper.scale();
        let policy = if sx > 1.0 + DOWNSAMPLE_EPS || sy > 1.0 + DOWNSAMPLE_EPS {
            if is_flag {
                ResamplePolicy::AggregateFlags(self.flag_downsampling)
            } else {
                ResamplePolicy::Aggregate(self.downsampling)
            }
        } else {
            ResamplePolicy::Interpolate(self.upsampling)
        };
        Selection::Resample(policy)
    }
}
