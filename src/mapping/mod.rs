// Mapping: arena authoring on the occupancy field

pub mod obstacle_layout;

pub use obstacle_layout::*;
