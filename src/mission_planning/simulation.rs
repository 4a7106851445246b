//! Per-tick driver combining the session, the planner and the field

use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::common::{Cell, OccupancyGrid, RrtError, RrtResult};
use crate::mapping::ObstacleLayout;
use crate::mission_planning::state_machine::{Session, SessionPhase, SessionSignals};
use crate::path_planning::{Planner, PlannerConfig, StepOutcome, TreeStore};
use crate::utils::{OccupancyField, PathStyle, Visualizer};

/// Mixed into the seed so obstacle placement does not replay the
/// planner's sample stream
const LAYOUT_SEED_MASK: u64 = 0x9E37_79B9_7F4A_7C15;

fn layout_seed(seed: u64) -> u64 {
    seed ^ LAYOUT_SEED_MASK
}

/// What one tick did
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Endpoints are still being selected; the planner did not run
    Selecting(SessionPhase),
    /// A selection signal was refused; nothing else ran this tick
    Rejected(RrtError),
    /// One planner step ran
    Planned(StepOutcome),
}

/// A planning session on one occupancy field
pub struct Simulation {
    field: OccupancyField,
    planner: Planner,
    session: Session,
    layout: ObstacleLayout,
    ticks: usize,
}

impl Simulation {
    /// Build the field, author `layout` on it and set up an idle planner
    pub fn new(config: PlannerConfig, layout: ObstacleLayout) -> RrtResult<Self> {
        let border_width = config.border_width;
        let end_cell_width = config.end_cell_width;
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(layout_seed(seed)),
            None => StdRng::from_entropy(),
        };

        let planner = Planner::new(config)?;
        let mut field = OccupancyField::new(planner.config().grid_size)?;
        layout.apply(&mut field, border_width, &mut rng);
        info!(
            "simulation ready: {}x{} grid, {:?}",
            field.size(),
            field.size(),
            planner.config().strategy
        );

        Ok(Simulation {
            field,
            planner,
            session: Session::new(end_cell_width),
            layout,
            ticks: 0,
        })
    }

    /// Process `signals`, then run one planner step when the session is ready
    pub fn tick(&mut self, signals: &SessionSignals) -> RrtResult<TickOutcome> {
        self.ticks += 1;
        match self.session.update(&mut self.field, &mut self.planner, signals) {
            Ok(()) => {}
            Err(err @ RrtError::InvalidSelection(_)) => {
                warn!("{}", err);
                return Ok(TickOutcome::Rejected(err));
            }
            Err(err) => return Err(err),
        }
        if !self.session.is_ready() {
            return Ok(TickOutcome::Selecting(self.session.phase()));
        }

        let outcome = self.planner.step(&mut self.field)?;
        if let StepOutcome::PathFound(_) = outcome {
            self.session.path_found();
        }
        Ok(TickOutcome::Planned(outcome))
    }

    /// Tick without input until a path is found or `max_ticks` have run
    pub fn run_until_path(&mut self, max_ticks: usize) -> RrtResult<Option<Vec<Cell>>> {
        let idle = SessionSignals::default();
        for _ in 0..max_ticks {
            match self.tick(&idle)? {
                TickOutcome::Planned(StepOutcome::PathFound(path)) => return Ok(Some(path)),
                TickOutcome::Selecting(_) => return Ok(None),
                _ => {}
            }
        }
        Ok(None)
    }

    pub fn field(&self) -> &OccupancyField {
        &self.field
    }

    pub fn field_mut(&mut self) -> &mut OccupancyField {
        &mut self.field
    }

    pub fn planner(&self) -> &Planner {
        &self.planner
    }

    pub fn tree(&self) -> &TreeStore {
        self.planner.tree()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn layout(&self) -> ObstacleLayout {
        self.layout
    }

    /// Last path found, goal-adjacent node first
    pub fn path(&self) -> Option<&[Cell]> {
        self.planner.path()
    }

    pub fn nodes_added(&self) -> usize {
        self.planner.nodes_added()
    }

    pub fn ticks(&self) -> usize {
        self.ticks
    }

    /// Field, tree and path drawn into a fresh visualizer
    pub fn snapshot(&self, title: &str) -> Visualizer {
        let mut vis = Visualizer::for_grid(self.field.size());
        vis.set_title(title);
        vis.plot(&self.field).plot(self.planner.tree());
        if let Some(path) = self.planner.path() {
            vis.plot_path(path, &PathStyle::default());
        }
        vis
    }
}
