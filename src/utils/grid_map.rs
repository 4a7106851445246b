// Occupancy field: authoritative N x N cell-state array

use std::cell::RefCell;
use std::ops::Deref;
use std::rc::Rc;

extern crate nalgebra as na;

use crate::common::{Cell, CellChange, CellObserver, CellState, OccupancyGrid, RrtError, RrtResult};

/// Smallest grid the planner accepts
pub const MIN_GRID_SIZE: usize = 4;

/// N x N occupancy field owning every cell's state.
///
/// Indexing is `(i, j)` with `i` the column (x) and `j` the row (y) of the
/// rendered grid. Writes are forwarded to an optional [`CellObserver`].
pub struct OccupancyField {
    grid: na::DMatrix<CellState>,
    observer: Option<Box<dyn CellObserver>>,
}

impl OccupancyField {
    /// Create an all-free field. The dimension must be even and at least
    /// [`MIN_GRID_SIZE`].
    pub fn new(size: usize) -> RrtResult<Self> {
        if size < MIN_GRID_SIZE {
            return Err(RrtError::InvalidConfig(format!(
                "grid size {} is smaller than {}",
                size, MIN_GRID_SIZE
            )));
        }
        if size % 2 != 0 {
            return Err(RrtError::InvalidConfig(format!(
                "grid size {} must be even",
                size
            )));
        }
        Ok(Self {
            grid: na::DMatrix::from_element(size, size, CellState::Free),
            observer: None,
        })
    }

    /// Attach the renderer-side observer, replacing any previous one
    pub fn set_observer(&mut self, observer: Box<dyn CellObserver>) {
        self.observer = Some(observer);
    }

    pub fn clear_observer(&mut self) {
        self.observer = None;
    }

    /// All cells currently in `state`, in lexicographic order
    pub fn cells_with(&self, state: CellState) -> Vec<Cell> {
        let n = self.grid.nrows();
        (0..n)
            .flat_map(|i| (0..n).map(move |j| (i, j)))
            .filter(|&(i, j)| self.grid[(i, j)] == state)
            .map(|(i, j)| Cell::new(i as i32, j as i32))
            .collect()
    }

    pub fn count(&self, state: CellState) -> usize {
        self.grid.iter().filter(|&&s| s == state).count()
    }

    fn index(&self, cell: Cell) -> Option<(usize, usize)> {
        if self.in_bounds(cell) {
            Some((cell.i as usize, cell.j as usize))
        } else {
            None
        }
    }
}

impl OccupancyGrid for OccupancyField {
    fn size(&self) -> usize {
        self.grid.nrows()
    }

    fn state(&self, cell: Cell) -> Option<CellState> {
        self.index(cell).map(|ix| self.grid[ix])
    }

    fn set_state(&mut self, cell: Cell, state: CellState) {
        if let Some(ix) = self.index(cell) {
            if self.grid[ix] == state {
                return;
            }
            self.grid[ix] = state;
            if let Some(observer) = self.observer.as_mut() {
                observer.on_cell_changed(CellChange::new(cell, state));
            }
        }
    }
}

impl Deref for OccupancyField {
    type Target = na::DMatrix<CellState>;

    fn deref(&self) -> &Self::Target {
        &self.grid
    }
}

/// Observer that records every change into a shared buffer.
///
/// Clones share the buffer, so one clone can be handed to the field while
/// the other is drained by the caller.
#[derive(Debug, Clone, Default)]
pub struct ChangeRecorder {
    changes: Rc<RefCell<Vec<CellChange>>>,
}

impl ChangeRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain all recorded changes
    pub fn take(&self) -> Vec<CellChange> {
        self.changes.borrow_mut().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.changes.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.borrow().is_empty()
    }
}

impl CellObserver for ChangeRecorder {
    fn on_cell_changed(&mut self, change: CellChange) {
        self.changes.borrow_mut().push(change);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::EdgeSide;

    #[test]
    fn test_rejects_odd_or_tiny_grid() {
        assert!(matches!(OccupancyField::new(21), Err(RrtError::InvalidConfig(_))));
        assert!(matches!(OccupancyField::new(2), Err(RrtError::InvalidConfig(_))));
        assert!(OccupancyField::new(20).is_ok());
    }

    #[test]
    fn test_new_field_is_free() {
        let field = OccupancyField::new(8).unwrap();
        assert_eq!(field.size(), 8);
        assert_eq!(field.count(CellState::Free), 64);
        assert_eq!(field.state(Cell::new(8, 0)), None);
    }

    #[test]
    fn test_set_state_out_of_bounds_is_skipped() {
        let mut field = OccupancyField::new(8).unwrap();
        field.set_state(Cell::new(-1, 3), CellState::Obstacle);
        field.set_state(Cell::new(3, 8), CellState::Obstacle);
        assert_eq!(field.count(CellState::Obstacle), 0);
    }

    #[test]
    fn test_observer_sees_writes() {
        let mut field = OccupancyField::new(8).unwrap();
        let recorder = ChangeRecorder::new();
        field.set_observer(Box::new(recorder.clone()));

        field.set_state(Cell::new(1, 2), CellState::Node);
        field.set_block(Cell::new(5, 5), CellState::EndCell, 1);

        let changes = recorder.take();
        assert_eq!(changes.len(), 10);
        assert_eq!(changes[0], CellChange::new(Cell::new(1, 2), CellState::Node));
        assert!(recorder.is_empty());

        field.clear_observer();
        field.set_state(Cell::new(0, 0), CellState::Obstacle);
        assert_eq!(recorder.len(), 0);
    }

    #[test]
    fn test_unchanged_write_is_not_reported() {
        let mut field = OccupancyField::new(8).unwrap();
        let recorder = ChangeRecorder::new();
        field.set_observer(Box::new(recorder.clone()));

        field.set_obstacle_stream(Cell::new(0, 3), Cell::new(7, 3), 1, EdgeSide::Bottom);
        field.set_obstacle_stream(Cell::new(3, 3), Cell::new(5, 3), 1, EdgeSide::Bottom);
        assert_eq!(recorder.len(), 8);
        assert_eq!(field.count(CellState::Obstacle), 8);
    }

    #[test]
    fn test_cells_with_is_ordered() {
        let mut field = OccupancyField::new(8).unwrap();
        field.set_state(Cell::new(3, 1), CellState::Node);
        field.set_state(Cell::new(1, 6), CellState::Node);
        assert_eq!(
            field.cells_with(CellState::Node),
            vec![Cell::new(1, 6), Cell::new(3, 1)]
        );
    }

    #[test]
    fn test_deref_exposes_matrix() {
        let mut field = OccupancyField::new(6).unwrap();
        field.set_state(Cell::new(2, 4), CellState::Obstacle);
        assert_eq!(field[(2, 4)], CellState::Obstacle);
        assert_eq!(field.shape(), (6, 6));
    }
}
