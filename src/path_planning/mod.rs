// Path planning: tree store and the RRT / RRT* planner

pub mod tree;
pub mod planner;
pub mod rrt;
pub mod rrt_star;

pub use tree::*;
pub use planner::{Planner, PlannerConfig, PlannerState, RetryReason, StepOutcome, Strategy};
