//! Tile planning for chunked resampling.

pub mod planner;

pub use planner::{plan_tiles, TilePlan};
