//! RRT* node placement
//!
//! Same extension as RRT, then the new node is attached to the cheapest
//! visible neighbor within the neighborhood radius, and every other visible
//! neighbor that becomes cheaper through the new node is rewired to it.

use log::debug;
use ordered_float::OrderedFloat;

use crate::common::{Cell, OccupancyGrid};
use crate::path_planning::planner::{Placement, Planner, RetryReason, SegmentCheck};

impl Planner {
    /// Place one node for `sample` using RRT*
    pub(crate) fn place_node_rrt_star<M: OccupancyGrid>(&mut self, map: &mut M, sample: Cell) -> Placement {
        let candidate = match self.compute_candidate(map, sample) {
            Some(candidate) => candidate,
            None => return Placement::Retry(RetryReason::InvalidSegment),
        };
        if candidate.reaches_goal {
            return self.create_and_connect(map, candidate.nearest, candidate.cell, true);
        }
        if self.tree.contains(candidate.cell) {
            return Placement::Retry(RetryReason::DuplicateNode);
        }

        let new_cell = candidate.cell;
        let neighbors = match self.find_visible_neighbors(map, new_cell) {
            Ok(neighbors) => neighbors,
            Err((neighbor, end)) => {
                debug!("path found while validating neighbor {}", neighbor);
                return self.create_and_connect(map, neighbor, end, true);
            }
        };

        // first minimum wins, scan order is lexicographic
        let parent = match neighbors.iter().min_by_key(|(_, cost)| OrderedFloat(*cost)) {
            Some(&(cell, cost)) => {
                debug!("min cost neighbor {} with cost {:.3}", cell, cost);
                cell
            }
            None => return Placement::Retry(RetryReason::NoValidParent),
        };

        match self.create_and_connect(map, parent, new_cell, false) {
            Placement::Inserted { node, parent, reaches_goal, .. } => {
                let rewired = self.rewire(map, node, parent, &neighbors);
                Placement::Inserted {
                    node,
                    parent,
                    rewired,
                    reaches_goal,
                }
            }
            retry => retry,
        }
    }

    /// Tree nodes within the neighborhood radius of `target` that see it
    /// through a clear segment, with the cost of reaching `target` through
    /// each of them.
    ///
    /// Fails with `(neighbor, end_cell)` as soon as one segment enters the
    /// end block.
    fn find_visible_neighbors<M: OccupancyGrid>(
        &self,
        map: &M,
        target: Cell,
    ) -> Result<Vec<(Cell, f64)>, (Cell, Cell)> {
        let radius = self.config.neighborhood;
        let mut neighbors = Vec::new();

        for cell in self.tree.cells().filter(|c| c.distance(&target) <= radius) {
            match Self::check_segment(map, cell, target) {
                SegmentCheck::Blocked => continue,
                SegmentCheck::ReachesGoal(end) => {
                    if Self::check_segment(map, cell, end) != SegmentCheck::Blocked {
                        return Err((cell, end));
                    }
                }
                SegmentCheck::Clear => {
                    let cost = self.walked_cost(cell) + cell.distance(&target);
                    neighbors.push((cell, cost));
                }
            }
        }
        Ok(neighbors)
    }

    /// Re-parent every neighbor that gets strictly cheaper through `new_node`
    fn rewire<M: OccupancyGrid>(
        &mut self,
        map: &mut M,
        new_node: Cell,
        parent: Cell,
        neighbors: &[(Cell, f64)],
    ) -> usize {
        let new_cost = self.walked_cost(new_node);
        let mut rewired = 0;

        for &(cell, _) in neighbors.iter().filter(|(c, _)| *c != parent) {
            let current = self.walked_cost(cell);
            let bridge = new_node.distance(&cell);
            let route = new_cost + bridge;
            if route >= current {
                continue;
            }
            // rasterization is not symmetric, check the edge as it will be drawn
            if Self::check_segment(map, new_node, cell) != SegmentCheck::Clear {
                continue;
            }
            let old_parent = match self.tree.parent_of(cell) {
                Some(p) => p,
                None => continue,
            };
            debug!(
                "rerouting {} through {}: {:.3} -> {:.3}",
                cell, new_node, current, route
            );
            if !self.tree.remove_edge(old_parent, cell) {
                panic!("rewire: {} is not the parent of {}", old_parent, cell);
            }
            if !self.tree.add_edge(new_node, cell, bridge) {
                panic!("rewire: edge {} -> {} references a missing node", new_node, cell);
            }
            self.erase_edge(map, old_parent, cell);
            self.draw_edge(map, new_node, cell);
            rewired += 1;
        }
        rewired
    }

    fn walked_cost(&self, cell: Cell) -> f64 {
        self.tree
            .distance_to_root(cell)
            .unwrap_or_else(|| panic!("{} is not connected to the root", cell))
    }
}
