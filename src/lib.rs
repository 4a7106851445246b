//! grid_rrt - RRT and RRT* path planning on a discrete occupancy grid
//!
//! This crate grows a rapidly-exploring random tree from a start cell to an
//! end-cell block inside an N x N grid, one sample per tick, and reports
//! every cell-state change so an external renderer can follow along.

// Core modules
pub mod common;
pub mod utils;

// Algorithm modules
pub mod mapping;
pub mod path_planning;
pub mod mission_planning;

// Re-export common types for convenience
pub use common::{Cell, CellChange, CellState, EdgeSide};
pub use common::{CellObserver, OccupancyGrid, Visualizable};
pub use common::{RrtError, RrtResult};
pub use mapping::ObstacleLayout;
pub use mission_planning::{Session, SessionPhase, SessionSignals, Simulation, TickOutcome};
pub use path_planning::{Planner, PlannerConfig, PlannerState, RetryReason, StepOutcome, Strategy};
pub use utils::{ChangeRecorder, OccupancyField, Visualizer};
