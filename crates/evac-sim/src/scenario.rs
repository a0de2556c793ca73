//! Run driver: scripted closures, the step budget, and the final reduction.

use std::collections::VecDeque;

use tracing::{info, warn};

use evac_core::{Closure, EvacConfig, ExitId};

use crate::{
    ClosureReport, Engine, EngineBuilder, EngineObserver, ExitEvent, NoopObserver, RunMetrics,
    SimResult,
};

/// Everything a finished run reports.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Exit events in the order they happened.
    pub events:           Vec<ExitEvent>,
    /// Ticks executed.
    pub ticks:            u64,
    /// People still inside when the run stopped.
    pub remaining:        usize,
    /// `true` if the step budget ran out before everybody was out.
    pub running:          bool,
    pub live_exits:       usize,
    pub closures_applied: Vec<ClosureReport>,
    pub metrics:          RunMetrics,
}

/// Drives one run of a config to completion.
///
/// Before each tick, every scripted closure whose trigger time has been
/// reached (`tick × dt ≥ trigger`) is applied, in trigger order, once.
/// The run stops when everybody is out or after `max_steps` ticks.
pub struct ScenarioController {
    config: EvacConfig,
}

impl ScenarioController {
    pub fn new(config: EvacConfig) -> Self {
        Self { config }
    }

    #[inline]
    pub fn config(&self) -> &EvacConfig {
        &self.config
    }

    pub fn run(&self) -> SimResult<RunOutcome> {
        self.run_with(&mut NoopObserver)
    }

    pub fn run_with<O: EngineObserver>(&self, observer: &mut O) -> SimResult<RunOutcome> {
        let engine = EngineBuilder::new(self.config.clone()).build()?;
        Self::drive(engine, observer)
    }

    /// Run a prepared engine (for example one with scripted positions) to
    /// completion.  Closures and the step budget come from its config.
    pub fn drive<O: EngineObserver>(mut engine: Engine, observer: &mut O) -> SimResult<RunOutcome> {
        let mut pending: Vec<Closure> = engine.config().closures.clone();
        pending.sort_by(|a, b| a.trigger_secs.total_cmp(&b.trigger_secs));
        let mut pending = VecDeque::from(pending);
        let max_steps = engine.config().max_steps;
        let mut closures_applied = Vec::new();

        while engine.is_running() && engine.clock().current_tick.0 < max_steps {
            let now_secs = engine.clock().elapsed_secs();
            while let Some(closure) = pending.pop_front() {
                if now_secs < closure.trigger_secs {
                    pending.push_front(closure);
                    break;
                }
                let Ok(exit) = ExitId::try_from(closure.exit_index) else {
                    continue;
                };
                if let Some(report) = engine.close_exit(exit, observer)? {
                    closures_applied.push(report);
                }
            }
            engine.step(observer)?;
        }

        let ticks = engine.clock().current_tick.0;
        observer.on_run_end(engine.clock().current_tick);

        let population = engine.roster().initial_count();
        let remaining = engine.roster().active_count();
        let running = engine.is_running();
        if running {
            warn!(ticks, remaining, "step budget exhausted before everybody got out");
        }
        let live_exits = engine.topology().live_count();
        let tick_duration_secs = engine.clock().tick_duration_secs;
        let events = engine.into_events();
        let metrics = RunMetrics::from_events(&events, population, tick_duration_secs, ticks);
        info!(
            ticks,
            evacuated = metrics.evacuated,
            remaining,
            makespan_secs = metrics.makespan_secs.unwrap_or(0.0),
            "run finished"
        );

        Ok(RunOutcome {
            events,
            ticks,
            remaining,
            running,
            live_exits,
            closures_applied,
            metrics,
        })
    }
}

/// Run `config` to completion with no observer.
pub fn run(config: EvacConfig) -> SimResult<RunOutcome> {
    ScenarioController::new(config).run()
}
