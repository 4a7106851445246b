//! Common types, traits, and error definitions for grid_rrt
//!
//! This module provides the building blocks shared by the occupancy field,
//! the tree store and the planner.

pub mod types;
pub mod traits;
pub mod error;

pub use types::*;
pub use traits::*;
pub use error::*;
