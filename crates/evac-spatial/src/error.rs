//! Spatial-subsystem error type.

use thiserror::Error;

use evac_core::Cell;

use crate::Occupant;

/// Errors produced by `evac-spatial`.
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("cell {0} lies outside the grid")]
    OutOfBounds(Cell),

    #[error("{0} is already placed on the grid")]
    AlreadyPlaced(Occupant),

    #[error("{0} is not on the grid")]
    NotPlaced(Occupant),
}

pub type SpatialResult<T> = Result<T, SpatialError>;
