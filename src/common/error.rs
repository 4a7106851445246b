//! Error types for grid_rrt

use std::fmt;

/// Main error type for the planner
#[derive(Debug, Clone, PartialEq)]
pub enum RrtError {
    /// Configuration rejected at construction
    InvalidConfig(String),
    /// Free-cell sampling hit its iteration cap without an accepted sample
    SamplingExhausted { attempts: usize },
    /// A session signal requested an impossible start/end selection
    InvalidSelection(String),
    /// Snapshot rendering failed
    VisualizationError(String),
}

impl fmt::Display for RrtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RrtError::InvalidConfig(msg) => write!(f, "Invalid config: {}", msg),
            RrtError::SamplingExhausted { attempts } => write!(
                f,
                "Sampling exhausted: no free cell found in {} attempts",
                attempts
            ),
            RrtError::InvalidSelection(msg) => write!(f, "Invalid selection: {}", msg),
            RrtError::VisualizationError(msg) => write!(f, "Visualization error: {}", msg),
        }
    }
}

impl std::error::Error for RrtError {}

/// Result type alias for planner operations
pub type RrtResult<T> = Result<T, RrtError>;
