//! Tick-driven RRT / RRT* planner on an occupancy grid
//!
//! One call to [`Planner::step`] performs one sample -> extend -> validate ->
//! insert attempt. Failed attempts are the normal steady state and are
//! reported as [`StepOutcome::Retry`]; only configuration problems and an
//! exhausted sampler surface as errors. Tree inconsistencies panic.

use std::collections::HashMap;

use log::{debug, info};
use ordered_float::OrderedFloat;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Uniform};

use crate::common::{Cell, CellState, OccupancyGrid, RrtError, RrtResult};
use crate::path_planning::tree::{TreeMode, TreeStore};
use crate::utils::geometry::{neighborhood, steer};
use crate::utils::grid_map::MIN_GRID_SIZE;

/// Tree growth strategy, chosen once per planner
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Strategy {
    Rrt,
    RrtStar,
}

impl From<Strategy> for TreeMode {
    fn from(strategy: Strategy) -> Self {
        match strategy {
            Strategy::Rrt => TreeMode::Rrt,
            Strategy::RrtStar => TreeMode::RrtStar,
        }
    }
}

/// Configuration for the planner
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    /// Grid dimension N (N x N cells, even)
    pub grid_size: usize,
    /// Maximum edge length when extending towards a sample
    pub step: f64,
    /// RRT* radius for parent selection and rewiring
    pub neighborhood: f64,
    /// Half-width of the end-cell block
    pub end_cell_width: i32,
    /// Thickness of the arena border and walls
    pub border_width: i32,
    /// Cap on obstacle-rejected draws per sample
    pub max_sample_attempts: usize,
    /// Fixed seed for reproducible runs, entropy when `None`
    pub seed: Option<u64>,
    pub strategy: Strategy,
}

impl PlannerConfig {
    /// Defaults scaled to an `n x n` grid
    pub fn for_grid(n: usize) -> Self {
        let step = 5.0;
        Self {
            grid_size: n,
            step,
            neighborhood: 4.0 * step,
            end_cell_width: (0.02 * n as f64) as i32,
            border_width: ((0.03 * n as f64) as i32).max(1),
            max_sample_attempts: 100_000,
            seed: None,
            strategy: Strategy::RrtStar,
        }
    }

    pub fn validate(&self) -> RrtResult<()> {
        let n = self.grid_size;
        if n < MIN_GRID_SIZE || n % 2 != 0 {
            return Err(RrtError::InvalidConfig(format!(
                "grid size {} must be even and at least {}",
                n, MIN_GRID_SIZE
            )));
        }
        if self.step.is_nan() || self.step < 1.0 {
            return Err(RrtError::InvalidConfig(format!(
                "step {} must be at least one cell",
                self.step
            )));
        }
        if self.strategy == Strategy::RrtStar && (self.neighborhood.is_nan() || self.neighborhood < self.step) {
            return Err(RrtError::InvalidConfig(format!(
                "neighborhood {} must not be smaller than step {}",
                self.neighborhood, self.step
            )));
        }
        let half = (n / 2) as i32;
        if self.end_cell_width < 0 || self.end_cell_width >= half {
            return Err(RrtError::InvalidConfig(format!(
                "end cell width {} does not fit a {}x{} grid",
                self.end_cell_width, n, n
            )));
        }
        if self.border_width < 0 || self.border_width >= half {
            return Err(RrtError::InvalidConfig(format!(
                "border width {} does not fit a {}x{} grid",
                self.border_width, n, n
            )));
        }
        if self.max_sample_attempts == 0 {
            return Err(RrtError::InvalidConfig(
                "max sample attempts must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self::for_grid(800)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannerState {
    /// No confirmed endpoints yet, or waiting for a new goal
    AwaitingEndpoints,
    /// Growing the tree, one attempt per step
    Planning,
    /// Tree growth frozen; the path is available
    PathFound,
}

/// Why an attempt was abandoned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryReason {
    /// The edge to the candidate crosses an obstacle
    InvalidSegment,
    /// A node already exists at the candidate cell
    DuplicateNode,
    /// No neighbor could reach the candidate with a clear line
    NoValidParent,
}

/// Result of a single planner step
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// Planning is not running
    Idle,
    Retry(RetryReason),
    Inserted {
        node: Cell,
        parent: Cell,
        /// Neighbors re-parented through the new node (RRT* only)
        rewired: usize,
    },
    /// Goal reached; path runs from the goal-adjacent node to the root
    PathFound(Vec<Cell>),
}

/// What a placement routine did with one sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Placement {
    Retry(RetryReason),
    Inserted {
        node: Cell,
        parent: Cell,
        rewired: usize,
        reaches_goal: bool,
    },
}

/// Result of checking a candidate edge against the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SegmentCheck {
    Clear,
    Blocked,
    /// The segment enters the end block at this cell
    ReachesGoal(Cell),
}

/// Validated extension target for the current sample
#[derive(Debug, Clone, Copy)]
pub(crate) struct Candidate {
    pub nearest: Cell,
    pub cell: Cell,
    pub reaches_goal: bool,
}

/// Incremental RRT / RRT* planner.
///
/// The planner owns the tree and the random source; the occupancy grid is
/// passed into every step so the caller keeps ownership of the cell states.
pub struct Planner {
    pub(crate) config: PlannerConfig,
    pub(crate) tree: TreeStore,
    rng: StdRng,
    state: PlannerState,
    path: Option<Vec<Cell>>,
    pub(crate) nodes_added: usize,
    /// Number of live edges whose rasterization covers each cell
    overlay: HashMap<Cell, usize>,
}

impl Planner {
    pub fn new(config: PlannerConfig) -> RrtResult<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Planner {
            tree: TreeStore::new(config.strategy.into()),
            config,
            rng,
            state: PlannerState::AwaitingEndpoints,
            path: None,
            nodes_added: 0,
            overlay: HashMap::new(),
        })
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn tree(&self) -> &TreeStore {
        &self.tree
    }

    pub fn state(&self) -> PlannerState {
        self.state
    }

    /// Most recently captured path, goal-adjacent node first
    pub fn path(&self) -> Option<&[Cell]> {
        self.path.as_deref()
    }

    /// Number of nodes inserted since construction (root excluded)
    pub fn nodes_added(&self) -> usize {
        self.nodes_added
    }

    /// Start or resume planning from `start`.
    ///
    /// Creates the root on the first call; later calls keep the existing
    /// tree and only resume growth. Returns whether a root was created.
    pub fn begin(&mut self, start: Cell) -> bool {
        let created = self.tree.create_node(start);
        if created {
            info!("added start cell {} to tree", start);
        } else {
            info!("start cell {} already in tree, resuming", start);
        }
        self.state = PlannerState::Planning;
        created
    }

    /// Leave `PathFound` and keep growing the existing tree
    pub fn reset(&mut self) {
        if self.state == PlannerState::PathFound {
            self.state = PlannerState::Planning;
        }
    }

    /// Discard the whole tree and path for a new episode
    pub fn clear(&mut self) {
        self.tree.clear();
        self.overlay.clear();
        self.path = None;
        self.state = PlannerState::AwaitingEndpoints;
    }

    /// Run one planning step against `map`
    pub fn step<M: OccupancyGrid>(&mut self, map: &mut M) -> RrtResult<StepOutcome> {
        if self.state != PlannerState::Planning {
            return Ok(StepOutcome::Idle);
        }

        // the goal may have been moved onto an existing branch
        if let Some(node) = self.find_goal_reaching_node(map) {
            return Ok(self.finish(node));
        }

        let sample = self.sample_free_cell(map)?;
        debug!("random cell {}", sample);

        let placement = match self.config.strategy {
            Strategy::Rrt => self.place_node_rrt(map, sample),
            Strategy::RrtStar => self.place_node_rrt_star(map, sample),
        };

        match placement {
            Placement::Retry(reason) => {
                debug!("retrying: {:?}", reason);
                Ok(StepOutcome::Retry(reason))
            }
            Placement::Inserted { node, reaches_goal: true, .. } => Ok(self.finish(node)),
            Placement::Inserted { node, parent, rewired, .. } => Ok(StepOutcome::Inserted {
                node,
                parent,
                rewired,
            }),
        }
    }

    /// True when `cell` or any of its 8 neighbors is an end cell
    pub fn is_goal_reached<M: OccupancyGrid>(&self, map: &M, cell: Cell) -> bool {
        neighborhood(cell).any(|c| map.is_end_cell(c))
    }

    /// First tree node (lexicographic order) that touches the end block
    pub fn find_goal_reaching_node<M: OccupancyGrid>(&self, map: &M) -> Option<Cell> {
        self.tree.cells().find(|&c| self.is_goal_reached(map, c))
    }

    /// Draw uniformly random cells until one is not an obstacle
    pub(crate) fn sample_free_cell<M: OccupancyGrid>(&mut self, map: &M) -> RrtResult<Cell> {
        let range = Uniform::new(0, map.size() as i32);
        for _ in 0..self.config.max_sample_attempts {
            let cell = Cell::new(range.sample(&mut self.rng), range.sample(&mut self.rng));
            if !map.is_obstacle(cell) {
                return Ok(cell);
            }
        }
        Err(RrtError::SamplingExhausted {
            attempts: self.config.max_sample_attempts,
        })
    }

    /// Closest tree node to `target`; ties go to the lexicographically
    /// smallest cell.
    pub(crate) fn nearest_node(&self, target: Cell) -> Option<Cell> {
        self.tree
            .cells()
            .min_by_key(|c| OrderedFloat(c.distance(&target)))
    }

    /// Check the edge `from -> to` cell by cell, skipping `from` itself
    pub(crate) fn check_segment<M: OccupancyGrid>(map: &M, from: Cell, to: Cell) -> SegmentCheck {
        for cell in map.segment(from, to) {
            if cell == from {
                continue;
            }
            if map.is_obstacle(cell) {
                return SegmentCheck::Blocked;
            }
            if map.is_end_cell(cell) {
                return SegmentCheck::ReachesGoal(cell);
            }
        }
        SegmentCheck::Clear
    }

    /// Steer from the nearest node towards `sample` and validate the edge.
    /// `None` when the edge is blocked.
    pub(crate) fn compute_candidate<M: OccupancyGrid>(&self, map: &M, sample: Cell) -> Option<Candidate> {
        let nearest = self
            .nearest_node(sample)
            .unwrap_or_else(|| panic!("planning with an empty tree"));
        let cell = steer(nearest, sample, self.config.step);

        match Self::check_segment(map, nearest, cell) {
            SegmentCheck::Blocked => None,
            SegmentCheck::Clear => Some(Candidate {
                nearest,
                cell,
                reaches_goal: false,
            }),
            SegmentCheck::ReachesGoal(end) => {
                // the shortened edge rasterizes on its own
                if Self::check_segment(map, nearest, end) == SegmentCheck::Blocked {
                    return None;
                }
                debug!("path found while validating {} -> {}", nearest, cell);
                Some(Candidate {
                    nearest,
                    cell: end,
                    reaches_goal: true,
                })
            }
        }
    }

    /// Insert `cell` under `parent` and mark it on the grid
    pub(crate) fn create_and_connect<M: OccupancyGrid>(
        &mut self,
        map: &mut M,
        parent: Cell,
        cell: Cell,
        reaches_goal: bool,
    ) -> Placement {
        if !self.tree.create_node(cell) {
            return Placement::Retry(RetryReason::DuplicateNode);
        }
        if !self.tree.add_edge(parent, cell, parent.distance(&cell)) {
            panic!("edge {} -> {} references a missing node", parent, cell);
        }

        let reaches_goal = reaches_goal || self.is_goal_reached(map, cell);
        map.set_state(cell, CellState::Node);
        self.draw_edge(map, parent, cell);
        self.nodes_added += 1;
        debug!("new node {} under {}", cell, parent);

        Placement::Inserted {
            node: cell,
            parent,
            rewired: 0,
            reaches_goal,
        }
    }

    /// Overlay the edge `from -> to` and count it on every cell it covers
    pub(crate) fn draw_edge<M: OccupancyGrid>(&mut self, map: &mut M, from: Cell, to: Cell) {
        for cell in map.segment(from, to) {
            *self.overlay.entry(cell).or_insert(0) += 1;
        }
        map.set_connection_stream(from, to);
    }

    /// Drop the edge `from -> to` from the overlay; cells still covered by
    /// another live edge keep their connection state.
    pub(crate) fn erase_edge<M: OccupancyGrid>(&mut self, map: &mut M, from: Cell, to: Cell) {
        for cell in map.segment(from, to) {
            if let Some(count) = self.overlay.get_mut(&cell) {
                *count -= 1;
                if *count == 0 {
                    self.overlay.remove(&cell);
                }
            }
        }
        let overlay = &self.overlay;
        map.clear_connection_stream(from, to, |cell| overlay.contains_key(&cell));
    }

    fn finish(&mut self, node: Cell) -> StepOutcome {
        let path = self
            .tree
            .reconstruct_path(node)
            .unwrap_or_else(|| panic!("goal node {} is not part of the tree", node));
        if path.len() < 2 {
            panic!("path from {} has {} node(s); the root itself touches the goal", node, path.len());
        }

        info!(
            "goal reached at {}, path of {} cells, {} nodes added",
            node,
            path.len(),
            self.nodes_added
        );
        self.state = PlannerState::PathFound;
        self.path = Some(path.clone());
        StepOutcome::PathFound(path)
    }
}
