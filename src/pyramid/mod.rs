//! Multi-resolution output: policy selection, level building and level state.

pub mod builder;
pub mod level;
pub mod methods;

pub use builder::{build_level, BuildOptions, CancelFlag};
pub use level::{LevelState, MultiLevelRaster};
pub use methods::{ResampleMethods, Selection};
