//! `evac-spatial` — grid occupancy, exit topology, and distance fields.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                    |
//! |--------------|-------------------------------------------------------------|
//! | [`grid`]     | `Grid` (multi-occupancy cells), `Occupant` tag              |
//! | [`field`]    | `DistanceField`: multi-source BFS hop counts               |
//! | [`topology`] | `Topology`: obstacles, live exit registry, cached fields   |
//! | [`error`]    | `SpatialError`, `SpatialResult<T>`                          |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Propagates `Serialize`/`Deserialize` to `evac-core` types.   |

pub mod error;
pub mod field;
pub mod grid;
pub mod topology;


pub use error::{SpatialError, SpatialResult};
pub use field::DistanceField;
pub use grid::{Grid, Occupant};
pub use topology::{ExitSite, Topology};
