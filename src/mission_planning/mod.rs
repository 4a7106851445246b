// Mission planning: selection lifecycle and the tick driver

pub mod state_machine;
pub mod simulation;

pub use state_machine::*;
pub use simulation::*;
