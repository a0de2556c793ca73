//! Engine observer trait for progress reporting and data collection.

use evac_agent::EvacuatingAgent;
use evac_core::Tick;

use crate::{ClosureReport, ExitEvent, TickStats};

/// Callbacks invoked by the [`Engine`][crate::Engine] at key points in a run.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example: progress printer
///
/// ```rust,ignore
/// struct Progress;
///
/// impl EngineObserver for Progress {
///     fn on_tick_end(&mut self, stats: &TickStats) {
///         if stats.tick.0 % 100 == 0 {
///             println!("{}: {} still inside", stats.tick, stats.active);
///         }
///     }
/// }
/// ```
pub trait EngineObserver {
    /// Called at the very start of each tick, before any activation.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called after every entity of the tick has been activated.
    fn on_tick_end(&mut self, _stats: &TickStats) {}

    /// Called once per person, the moment a gate lets them out.  `agent` is
    /// the archived record with its exit time set.
    fn on_evacuation(&mut self, _event: &ExitEvent, _agent: &EvacuatingAgent) {}

    /// Called after an exit has been closed and its queue released.
    fn on_exit_closed(&mut self, _report: &ClosureReport) {}

    /// Called once when the run stops, for whatever reason.
    fn on_run_end(&mut self, _final_tick: Tick) {}
}

/// An [`EngineObserver`] that does nothing.
pub struct NoopObserver;

impl EngineObserver for NoopObserver {}
