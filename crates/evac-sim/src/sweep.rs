//! Repeated runs of one config over several exit counts.
//!
//! Each point builds its own engine from its own config; nothing is shared,
//! so with the `parallel` feature the points run on Rayon's thread pool and
//! still give the same results as a sequential sweep.

use evac_core::{EvacConfig, ExitLayout};

use crate::{RunOutcome, ScenarioController, SimResult};

#[derive(Debug, Clone)]
pub struct SweepPoint {
    pub exit_count: usize,
    pub outcome:    RunOutcome,
}

/// Run `base` once per entry of `exit_counts`, with that many 1 m exits.
///
/// Scripted closures are dropped: their exit indices refer to the base
/// layout.  Results come back in `exit_counts` order.
pub fn sweep_exit_counts(base: &EvacConfig, exit_counts: &[usize]) -> SimResult<Vec<SweepPoint>> {
    let run_point = |&exit_count: &usize| -> SimResult<SweepPoint> {
        let config = EvacConfig {
            exits: ExitLayout::Count(exit_count),
            closures: Vec::new(),
            ..base.clone()
        };
        let outcome = ScenarioController::new(config).run()?;
        Ok(SweepPoint { exit_count, outcome })
    };

    #[cfg(not(feature = "parallel"))]
    {
        exit_counts.iter().map(run_point).collect()
    }

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        exit_counts.par_iter().map(run_point).collect()
    }
}
