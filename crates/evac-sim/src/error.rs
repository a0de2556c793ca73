use thiserror::Error;

use evac_core::{AgentId, Cell, EvError};
use evac_spatial::SpatialError;

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] EvError),

    #[error("{what} length {got} does not match population {expected}")]
    PopulationMismatch {
        expected: usize,
        got:      usize,
        what:     &'static str,
    },

    #[error("{agent} cannot start at {cell}: not a free cell")]
    InvalidPosition { agent: AgentId, cell: Cell },

    #[error("spatial error: {0}")]
    Spatial(#[from] SpatialError),

    /// Internal consistency check failed; the run cannot continue.
    #[error("invariant violated: {0}")]
    Invariant(String),
}

pub type SimResult<T> = Result<T, SimError>;
