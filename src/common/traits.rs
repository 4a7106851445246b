//! Common traits defining the seams between the planner and its collaborators

use crate::common::types::*;
use crate::utils::geometry::{rasterize_segment, square_block};

/// Occupancy query/mutation interface consumed by the planner.
///
/// Implementors supply storage (`size`, `state`, `set_state`); the block,
/// stream and overlay writes are provided on top of those and carry the
/// write policies the planner relies on.
pub trait OccupancyGrid {
    /// Grid dimension N of the N x N field
    fn size(&self) -> usize;

    /// State of `cell`, `None` when out of bounds
    fn state(&self, cell: Cell) -> Option<CellState>;

    /// Unconditional write. Out-of-bounds writes are silently skipped.
    fn set_state(&mut self, cell: Cell, state: CellState);

    fn in_bounds(&self, cell: Cell) -> bool {
        let n = self.size() as i32;
        cell.i >= 0 && cell.j >= 0 && cell.i < n && cell.j < n
    }

    fn is_free(&self, cell: Cell) -> bool {
        self.state(cell) == Some(CellState::Free)
    }

    fn is_obstacle(&self, cell: Cell) -> bool {
        self.state(cell) == Some(CellState::Obstacle)
    }

    fn is_end_cell(&self, cell: Cell) -> bool {
        self.state(cell) == Some(CellState::EndCell)
    }

    /// Rasterize `from -> to` with the grid's sample count
    fn segment(&self, from: Cell, to: Cell) -> Vec<Cell> {
        rasterize_segment(from, to, self.size())
    }

    /// Apply `state` to the square of half-width `width` around `center`,
    /// only on cells that are currently free. Writing `Free` is therefore a
    /// no-op; use [`OccupancyGrid::clear_block`] for the reverse direction.
    fn set_block(&mut self, center: Cell, state: CellState, width: i32) {
        for cell in square_block(center, width) {
            if self.is_free(cell) {
                self.set_state(cell, state);
            }
        }
    }

    /// Return every cell of the block currently in `cleared` to free space,
    /// leaving all other states untouched.
    fn clear_block(&mut self, center: Cell, cleared: CellState, width: i32) {
        for cell in square_block(center, width) {
            if self.state(cell) == Some(cleared) {
                self.set_state(cell, CellState::Free);
            }
        }
    }

    /// Draw a straight wall from `from` to `to`, `width` cells thick,
    /// growing away from `side`.
    fn set_obstacle_stream(&mut self, from: Cell, to: Cell, width: i32, side: EdgeSide) {
        let (di, dj) = side.thickening_direction();
        for point in self.segment(from, to) {
            for k in 0..width.max(1) {
                let cell = point.offset(k * di, k * dj);
                if self.in_bounds(cell) {
                    self.set_state(cell, CellState::Obstacle);
                }
            }
        }
    }

    /// Overlay the edge `from -> to`; only free cells are written.
    fn set_connection_stream(&mut self, from: Cell, to: Cell) {
        for cell in self.segment(from, to) {
            if self.is_free(cell) {
                self.set_state(cell, CellState::NodeConnection);
            }
        }
    }

    /// Remove the overlay of the edge `from -> to`, except on cells for
    /// which `shared` holds because another edge still passes through them.
    fn clear_connection_stream<F: Fn(Cell) -> bool>(&mut self, from: Cell, to: Cell, shared: F) {
        for cell in self.segment(from, to) {
            if !shared(cell) && self.state(cell) == Some(CellState::NodeConnection) {
                self.set_state(cell, CellState::Free);
            }
        }
    }
}

/// Receives every cell-state transition of an occupancy field.
///
/// This is the hook for an external renderer; the planner never depends on
/// what the observer does with the notification.
pub trait CellObserver {
    fn on_cell_changed(&mut self, change: CellChange);
}

/// Trait for things that can draw themselves onto a snapshot
pub trait Visualizable {
    fn visualize(&self, vis: &mut crate::utils::Visualizer);
}
