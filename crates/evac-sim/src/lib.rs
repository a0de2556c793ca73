//! `evac-sim` — tick loop, exit service queues, and run driver for the
//! evacuation simulator.
//!
//! # Tick
//!
//! ```text
//! before tick t:  apply every scripted closure with trigger ≤ t × dt
//! tick t:
//!   ① Snapshot:   live exits + people still inside.
//!   ② Shuffle:    one permutation from the run RNG.
//!   ③ Activate:   each entity once, in that order:
//!                   person → choose / move / queue   (evac-agent)
//!                   exit   → accrue credit, serve up to floor(credit)
//!                 People served earlier in the tick are skipped.
//!   ④ Stats:      TickStats to the observer; running = false if empty.
//!   ⑤ Clock:      advance.
//! ```
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Runs sweep points on Rayon's thread pool.              |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use evac_core::EvacConfig;
//!
//! let outcome = evac_sim::run(EvacConfig::baseline().with_closure(60.0, 1))?;
//! println!("makespan {:?}", outcome.metrics.makespan_secs);
//! ```

pub mod builder;
pub mod engine;
pub mod error;
pub mod gate;
pub mod metrics;
pub mod observer;
pub mod scenario;
pub mod sweep;

#[cfg(test)]
mod tests;

pub use builder::EngineBuilder;
pub use engine::{ClosureReport, Engine, ExitEvent, TickStats};
pub use error::{SimError, SimResult};
pub use gate::ExitGate;
pub use metrics::{CurvePoint, RunMetrics, evacuation_curve, percentile};
pub use observer::{EngineObserver, NoopObserver};
pub use scenario::{RunOutcome, ScenarioController, run};
pub use sweep::{SweepPoint, sweep_exit_counts};
