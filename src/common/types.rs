//! Common types used throughout grid_rrt

use std::fmt;

/// Integer grid coordinate `(i, j)`, the universal key of the occupancy
/// field and the tree store.
///
/// Ordering is lexicographic on `(i, j)`; every "first encountered" rule in
/// the planner follows this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    pub i: i32,
    pub j: i32,
}

impl Cell {
    pub fn new(i: i32, j: i32) -> Self {
        Self { i, j }
    }

    /// Euclidean distance between cell centers
    pub fn distance(&self, other: &Cell) -> f64 {
        (((self.i - other.i).pow(2) + (self.j - other.j).pow(2)) as f64).sqrt()
    }

    /// Chessboard distance, i.e. the ring of the 8-neighborhood `other` sits in
    pub fn chebyshev(&self, other: &Cell) -> i32 {
        (self.i - other.i).abs().max((self.j - other.j).abs())
    }

    pub fn offset(&self, di: i32, dj: i32) -> Cell {
        Cell::new(self.i + di, self.j + dj)
    }
}

impl From<(i32, i32)> for Cell {
    fn from(tuple: (i32, i32)) -> Self {
        Self { i: tuple.0, j: tuple.1 }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.i, self.j)
    }
}

/// State of a single grid cell. Every cell holds exactly one state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CellState {
    #[default]
    Free,
    Obstacle,
    /// Cell occupied by a tree node
    Node,
    /// Rasterized overlay of an edge between two nodes
    NodeConnection,
    StartCell,
    EndCell,
}

impl CellState {
    /// Anything that is neither free space nor an obstacle
    pub fn is_marked(&self) -> bool {
        !matches!(self, CellState::Free | CellState::Obstacle)
    }
}

/// Side of a wall on which its defining line lies. Walls are thickened
/// away from this side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeSide {
    Bottom,
    Right,
    Top,
    Left,
}

impl EdgeSide {
    /// Unit step `(di, dj)` used when thickening a wall
    pub fn thickening_direction(&self) -> (i32, i32) {
        match self {
            EdgeSide::Bottom => (0, 1),
            EdgeSide::Right => (-1, 0),
            EdgeSide::Top => (0, -1),
            EdgeSide::Left => (1, 0),
        }
    }
}

/// A single cell-state transition, as reported to the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellChange {
    pub cell: Cell,
    pub state: CellState,
}

impl CellChange {
    pub fn new(cell: Cell, state: CellState) -> Self {
        Self { cell, state }
    }
}
