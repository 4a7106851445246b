/*!
 * Session state machine for start / end selection
 *
 * The session decides when the planner may run. It walks through
 * `SelectingStart -> SelectingEnd -> Ready`, driven by the
 * [`SessionSignals`] the input layer hands over every tick, and drops back
 * to `SelectingEnd` whenever a path has been found so a new goal can be
 * chosen while the tree is kept.
 */

use std::fmt;

use log::{debug, info};

use crate::common::{Cell, CellState, OccupancyGrid, RrtError, RrtResult};
use crate::path_planning::{Planner, PlannerState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    SelectingStart,
    SelectingEnd,
    Ready,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionPhase::SelectingStart => "selecting_start",
            SessionPhase::SelectingEnd => "selecting_end",
            SessionPhase::Ready => "ready",
        };
        write!(f, "{}", name)
    }
}

/// Events that move the session between phases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    StartConfirmed,
    EndConfirmed,
    PathFound,
}

/// Input for one tick, owned by the input-handling layer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSignals {
    /// Cell under the last click, if any
    pub clicked: Option<Cell>,
    pub start_confirmed: bool,
    pub end_confirmed: bool,
}

impl SessionSignals {
    pub fn click(cell: Cell) -> Self {
        SessionSignals {
            clicked: Some(cell),
            ..Default::default()
        }
    }

    pub fn confirm_start() -> Self {
        SessionSignals {
            start_confirmed: true,
            ..Default::default()
        }
    }

    pub fn confirm_end() -> Self {
        SessionSignals {
            end_confirmed: true,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Start / end selection lifecycle
pub struct Session {
    phase: SessionPhase,
    start: Option<Cell>,
    end: Option<Cell>,
    end_cell_width: i32,
    transition_history: Vec<(SessionPhase, SessionEvent, SessionPhase)>,
}

impl Session {
    pub fn new(end_cell_width: i32) -> Self {
        Session {
            phase: SessionPhase::SelectingStart,
            start: None,
            end: None,
            end_cell_width,
            transition_history: Vec::new(),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_ready(&self) -> bool {
        self.phase == SessionPhase::Ready
    }

    pub fn start(&self) -> Option<Cell> {
        self.start
    }

    /// Center of the current end block
    pub fn end(&self) -> Option<Cell> {
        self.end
    }

    /// (from, event, to) for every transition taken so far
    pub fn transition_history(&self) -> &[(SessionPhase, SessionEvent, SessionPhase)] {
        &self.transition_history
    }

    /// Apply one tick worth of signals.
    ///
    /// A click is consumed by the phase active when it is processed, so a
    /// click and a start confirmation in the same tick select the start
    /// before confirming it. Signals not meaningful in the current phase
    /// are ignored.
    pub fn update<M: OccupancyGrid>(
        &mut self,
        map: &mut M,
        planner: &mut Planner,
        signals: &SessionSignals,
    ) -> RrtResult<()> {
        let mut clicked = signals.clicked;

        if self.phase == SessionPhase::SelectingStart {
            if let Some(cell) = clicked.take() {
                self.select_start(map, cell)?;
            }
            if signals.start_confirmed {
                self.confirm_start()?;
            }
        }
        if self.phase == SessionPhase::SelectingEnd {
            if let Some(cell) = clicked.take() {
                self.select_end(map, cell)?;
            }
            if signals.end_confirmed {
                self.confirm_end(planner)?;
            }
        }
        if let Some(cell) = clicked {
            debug!("click on {} ignored while {}", cell, self.phase);
        }
        Ok(())
    }

    /// Move the start marker to `cell`, which must be free
    pub fn select_start<M: OccupancyGrid>(&mut self, map: &mut M, cell: Cell) -> RrtResult<()> {
        self.expect_phase(SessionPhase::SelectingStart, "start")?;
        if !map.is_free(cell) {
            return Err(RrtError::InvalidSelection(format!(
                "start cell {} is not free",
                cell
            )));
        }
        if let Some(previous) = self.start.take() {
            if map.state(previous) == Some(CellState::StartCell) {
                map.set_state(previous, CellState::Free);
            }
        }
        map.set_state(cell, CellState::StartCell);
        self.start = Some(cell);
        debug!("start cell selected at {}", cell);
        Ok(())
    }

    /// Paint a new end block around `cell`, replacing the previous one.
    ///
    /// The block must stay clear of the start cell's 8-neighborhood,
    /// otherwise the root alone would already reach the goal.
    pub fn select_end<M: OccupancyGrid>(&mut self, map: &mut M, cell: Cell) -> RrtResult<()> {
        self.expect_phase(SessionPhase::SelectingEnd, "end")?;
        if !map.is_free(cell) {
            return Err(RrtError::InvalidSelection(format!(
                "end cell {} is not free",
                cell
            )));
        }
        if let Some(start) = self.start {
            if cell.chebyshev(&start) <= self.end_cell_width + 1 {
                return Err(RrtError::InvalidSelection(format!(
                    "end block around {} touches start cell {}",
                    cell, start
                )));
            }
        }
        if let Some(previous) = self.end.take() {
            map.clear_block(previous, CellState::EndCell, self.end_cell_width);
        }
        map.set_block(cell, CellState::EndCell, self.end_cell_width);
        self.end = Some(cell);
        debug!("end cell selected at {}", cell);
        Ok(())
    }

    pub fn confirm_start(&mut self) -> RrtResult<()> {
        self.expect_phase(SessionPhase::SelectingStart, "start confirmation")?;
        if self.start.is_none() {
            return Err(RrtError::InvalidSelection(
                "start confirmed before a start cell was selected".to_string(),
            ));
        }
        self.transition(SessionEvent::StartConfirmed, SessionPhase::SelectingEnd);
        Ok(())
    }

    /// Confirm the end block and hand the start cell to the planner, or
    /// let it resume the existing tree after a found path
    pub fn confirm_end(&mut self, planner: &mut Planner) -> RrtResult<()> {
        self.expect_phase(SessionPhase::SelectingEnd, "end confirmation")?;
        let (start, end) = match (self.start, self.end) {
            (Some(start), Some(end)) => (start, end),
            _ => {
                return Err(RrtError::InvalidSelection(
                    "end confirmed before an end cell was selected".to_string(),
                ))
            }
        };
        info!("start cell {} end cell {}", start, end);
        self.transition(SessionEvent::EndConfirmed, SessionPhase::Ready);
        if planner.state() == PlannerState::PathFound {
            planner.reset();
        } else {
            planner.begin(start);
        }
        Ok(())
    }

    /// Drop back to end selection; start, tree and current end are kept
    pub fn path_found(&mut self) {
        if self.phase == SessionPhase::Ready {
            self.transition(SessionEvent::PathFound, SessionPhase::SelectingEnd);
        }
    }

    fn expect_phase(&self, phase: SessionPhase, what: &str) -> RrtResult<()> {
        if self.phase == phase {
            Ok(())
        } else {
            Err(RrtError::InvalidSelection(format!(
                "{} not accepted while {}",
                what, self.phase
            )))
        }
    }

    fn transition(&mut self, event: SessionEvent, to: SessionPhase) {
        let from = self.phase;
        info!("session <{}> --{:?}--> <{}>", from, event, to);
        self.transition_history.push((from, event, to));
        self.phase = to;
    }
}
