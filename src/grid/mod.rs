//! Target grid geometry and the target-to-source pixel mapping.

pub mod mapper;
pub mod target;

pub use mapper::{Footprint, GridMapper, PixelWindow, SourceWindow};
pub use target::{LevelGrid, TargetGrid};
