//! `evac-core` — foundational types for the evacuation simulator.
//!
//! This crate is a dependency of every other `evac-*` crate.  It has no
//! `evac-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `AgentId`, `ExitId`                                   |
//! | [`cell`]        | `Cell` grid coordinate, Chebyshev/Manhattan metrics   |
//! | [`time`]        | `Tick`, `SimClock`                                    |
//! | [`rng`]         | `SimRng` (simulation-scoped)                          |
//! | [`config`]      | `EvacConfig`, `ExitLayout`, `Closure`, `BehaviorParams` |
//! | [`error`]       | `EvError`, `EvResult`                                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types, which  |
//! |         | lets the CLI load `EvacConfig` from JSON.                  |

pub mod cell;
pub mod config;
pub mod error;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use cell::Cell;
pub use config::{BehaviorParams, Closure, EvacConfig, ExitLayout, SPECIFIC_FLOW_PS_PER_M};
pub use error::{EvError, EvResult};
pub use ids::{AgentId, ExitId};
pub use rng::SimRng;
pub use time::{SimClock, Tick};
