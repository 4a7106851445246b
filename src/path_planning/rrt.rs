//! RRT (Rapidly-exploring Random Tree) node placement
//!
//! Extends the nearest tree node one step towards the sample and inserts
//! the result when the connecting segment is obstacle free.

use crate::common::{Cell, OccupancyGrid};
use crate::path_planning::planner::{Placement, Planner, RetryReason};

impl Planner {
    /// Place one node for `sample` using plain RRT
    pub(crate) fn place_node_rrt<M: OccupancyGrid>(&mut self, map: &mut M, sample: Cell) -> Placement {
        match self.compute_candidate(map, sample) {
            Some(candidate) => {
                self.create_and_connect(map, candidate.nearest, candidate.cell, candidate.reaches_goal)
            }
            None => Placement::Retry(RetryReason::InvalidSegment),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{CellState, EdgeSide};
    use crate::path_planning::planner::{PlannerConfig, PlannerState, StepOutcome, Strategy};
    use crate::utils::OccupancyField;

    fn create_test_planner() -> Planner {
        let config = PlannerConfig {
            grid_size: 20,
            step: 3.0,
            neighborhood: 3.0,
            end_cell_width: 1,
            border_width: 1,
            max_sample_attempts: 1000,
            seed: Some(42),
            strategy: Strategy::Rrt,
        };
        Planner::new(config).unwrap()
    }

    #[test]
    fn test_extends_one_step_towards_sample() {
        let mut field = OccupancyField::new(20).unwrap();
        let mut planner = create_test_planner();
        planner.begin(Cell::new(2, 10));

        let placement = planner.place_node_rrt(&mut field, Cell::new(15, 10));
        assert_eq!(
            placement,
            Placement::Inserted {
                node: Cell::new(5, 10),
                parent: Cell::new(2, 10),
                rewired: 0,
                reaches_goal: false,
            }
        );
        assert_eq!(field.state(Cell::new(5, 10)), Some(CellState::Node));
        assert_eq!(field.state(Cell::new(3, 10)), Some(CellState::NodeConnection));
        assert_eq!(planner.nodes_added(), 1);
        assert_eq!(planner.tree().node(Cell::new(5, 10)).unwrap().distance_from_parent(), Some(3));
    }

    #[test]
    fn test_blocked_segment_is_retry() {
        let mut field = OccupancyField::new(20).unwrap();
        field.set_obstacle_stream(Cell::new(5, 0), Cell::new(5, 19), 1, EdgeSide::Left);
        let mut planner = create_test_planner();
        planner.begin(Cell::new(2, 10));

        assert_eq!(
            planner.place_node_rrt(&mut field, Cell::new(15, 10)),
            Placement::Retry(RetryReason::InvalidSegment)
        );
        assert_eq!(planner.tree().len(), 1);
        assert_eq!(planner.nodes_added(), 0);
    }

    #[test]
    fn test_segment_through_end_block_snaps_to_end_cell() {
        let mut field = OccupancyField::new(20).unwrap();
        field.set_state(Cell::new(4, 2), CellState::EndCell);
        let mut planner = create_test_planner();
        planner.begin(Cell::new(2, 2));

        let placement = planner.place_node_rrt(&mut field, Cell::new(12, 2));
        assert_eq!(
            placement,
            Placement::Inserted {
                node: Cell::new(4, 2),
                parent: Cell::new(2, 2),
                rewired: 0,
                reaches_goal: true,
            }
        );
        assert!(planner.tree().contains(Cell::new(4, 2)));
        assert!(!planner.tree().contains(Cell::new(5, 2)));
    }

    #[test]
    fn test_rrt_finds_path_in_open_field() {
        let mut field = OccupancyField::new(20).unwrap();
        field.set_block(Cell::new(16, 16), CellState::EndCell, 1);
        let mut planner = create_test_planner();
        planner.begin(Cell::new(2, 2));

        let mut path = None;
        for _ in 0..5000 {
            if let StepOutcome::PathFound(p) = planner.step(&mut field).unwrap() {
                path = Some(p);
                break;
            }
        }
        let path = path.expect("RRT should reach an open goal");
        assert_eq!(path.last(), Some(&Cell::new(2, 2)));
        assert!(path.len() >= 2);
        assert_eq!(planner.state(), PlannerState::PathFound);
        assert_eq!(planner.path(), Some(path.as_slice()));
        // consecutive path cells are tree edges no longer than one step
        for pair in path.windows(2) {
            assert_eq!(planner.tree().parent_of(pair[0]), Some(pair[1]));
            assert!(pair[0].distance(&pair[1]) <= 3.0 + 1.0);
        }
    }
}
