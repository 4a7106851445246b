//! Utility modules for grid_rrt

pub mod geometry;
pub mod grid_map;
pub mod visualization;

pub use geometry::*;
pub use grid_map::*;
pub use visualization::{colors, PathStyle, PointStyle, Visualizer};
