//! `evac-agent` — evacuating people: who they are, what they decide, and
//! where they are stored.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                    |
//! |---------------|-------------------------------------------------------------|
//! | [`profile`]   | `Category`, `Profile` and demographic sampling              |
//! | [`agent`]     | `EvacuatingAgent`, `Lifecycle`                              |
//! | [`decision`]  | `TurnContext`, exit choice, movement, the per-tick turn     |
//! | [`roster`]    | `Roster`: active agents by id plus the evacuated archive   |
//!
//! # Design notes
//!
//! An agent's turn runs while the agent is checked out of the [`Roster`]
//! (`take` → `take_turn` → `restore`).  That lets the turn hold `&mut self`
//! alongside a shared view of every *other* agent, which is exactly what the
//! congestion estimate needs, and it keeps the agent out of its own queue
//! counts without special-casing.
//!
//! Agents never hold references to exits, only `ExitId`s.  Every use goes
//! through `Topology::resolve`, so a closed exit is noticed on the next turn.
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                      |
//! |---------|-------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on `Profile`, `Lifecycle`.|

pub mod agent;
pub mod decision;
pub mod profile;
pub mod roster;

#[cfg(test)]
mod tests;

pub use agent::{EvacuatingAgent, Lifecycle};
pub use decision::{TurnContext, softmax_pick};
pub use profile::{Category, Profile};
pub use roster::Roster;
