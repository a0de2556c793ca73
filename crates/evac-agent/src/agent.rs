//! The evacuating agent and its lifecycle.

use std::fmt;

use evac_core::{AgentId, Cell, ExitId};

use crate::Profile;

/// Where an agent is in its evacuation.
///
/// ```text
/// MOVING ──adjacent to target──▶ WAITING ──served by gate──▶ EVACUATED
///    ▲                              │
///    └──target closed / panicked────┘
/// ```
///
/// `Evacuated` is terminal.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Lifecycle {
    #[default]
    Moving,
    Waiting,
    Evacuated,
}

impl Lifecycle {
    pub fn label(self) -> &'static str {
        match self {
            Lifecycle::Moving => "moving",
            Lifecycle::Waiting => "waiting",
            Lifecycle::Evacuated => "evacuated",
        }
    }
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One person in the room.
#[derive(Clone, Debug)]
pub struct EvacuatingAgent {
    pub id:            AgentId,
    /// Mirrors the grid position; updated together with every grid move.
    pub cell:          Cell,
    pub profile:       Profile,
    /// Micro-steps per tick, at least 1.
    pub movement_rate: u32,
    pub state:         Lifecycle,
    /// Exit the agent is heading for or queued at.  May be stale until the
    /// agent's next turn if the exit closes.
    pub target:        Option<ExitId>,
    /// First exit ever chosen.  Written once, never overwritten.
    pub preferred:     Option<ExitId>,
    /// Times the agent switched from one exit to a different one.
    pub retargets:     u32,
    /// Target dropped by [`release`](Self::release), consumed by the next
    /// exit choice so a forced switch counts like a self-detected one.
    pub released_from: Option<ExitId>,
    /// Simulated time of evacuation, set by the serving gate.
    pub exit_time:     Option<f64>,
}

impl EvacuatingAgent {
    pub fn new(id: AgentId, cell: Cell, profile: Profile, speed_per_cell_step: f64) -> Self {
        let movement_rate = profile.movement_rate(speed_per_cell_step);
        Self {
            id,
            cell,
            profile,
            movement_rate,
            state: Lifecycle::Moving,
            target: None,
            preferred: None,
            retargets: 0,
            released_from: None,
            exit_time: None,
        }
    }

    #[inline]
    pub fn is_waiting_for(&self, exit: ExitId) -> bool {
        self.state == Lifecycle::Waiting && self.target == Some(exit)
    }

    /// Drop the current target and go back to moving.  The next turn picks a
    /// new exit.
    pub fn release(&mut self) {
        debug_assert_ne!(self.state, Lifecycle::Evacuated);
        self.state = Lifecycle::Moving;
        if let Some(old) = self.target.take() {
            self.released_from = Some(old);
        }
    }

    /// Terminal transition, applied by the gate that served this agent.
    pub fn mark_evacuated(&mut self, time_secs: f64) {
        self.state = Lifecycle::Evacuated;
        self.exit_time = Some(time_secs);
    }
}
