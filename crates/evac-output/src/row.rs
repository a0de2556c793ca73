//! Plain data row types written by output backends.

use evac_agent::EvacuatingAgent;
use evac_sim::{ExitEvent, RunOutcome, TickStats};

/// One evacuated person.
#[derive(Debug, Clone, PartialEq)]
pub struct ExitTimeRow {
    pub agent_id:       u32,
    pub exit_id:        u32,
    pub exit_time_secs: f64,
    pub category:       &'static str,
    pub age:            u8,
    pub retargets:      u32,
}

impl ExitTimeRow {
    pub fn new(event: &ExitEvent, agent: &EvacuatingAgent) -> Self {
        Self {
            agent_id:       event.agent.0,
            exit_id:        event.exit.0,
            exit_time_secs: event.time_secs,
            category:       agent.profile.category.label(),
            age:            agent.profile.age,
            retargets:      agent.retargets,
        }
    }
}

/// Head counts at the end of one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickSummaryRow {
    pub tick:       u64,
    pub time_secs:  f64,
    pub moving:     u64,
    pub waiting:    u64,
    pub evacuated:  u64,
    pub served:     u64,
    pub live_exits: u64,
}

impl TickSummaryRow {
    pub fn new(stats: &TickStats, tick_duration_secs: f64) -> Self {
        Self {
            tick:       stats.tick.0,
            time_secs:  stats.tick.0 as f64 * tick_duration_secs,
            moving:     stats.moving as u64,
            waiting:    stats.waiting as u64,
            evacuated:  stats.evacuated as u64,
            served:     stats.served as u64,
            live_exits: stats.live_exits as u64,
        }
    }
}

/// Summary of one labelled run.  Time columns are empty when nobody left.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsRow {
    pub run:           String,
    pub population:    u64,
    pub evacuated:     u64,
    pub remaining:     u64,
    pub ticks:         u64,
    pub live_exits:    u64,
    pub makespan_secs: Option<f64>,
    pub mean_secs:     Option<f64>,
    pub p50_secs:      Option<f64>,
    pub p90_secs:      Option<f64>,
}

impl MetricsRow {
    pub fn new(run: impl Into<String>, outcome: &RunOutcome) -> Self {
        let m = &outcome.metrics;
        Self {
            run:           run.into(),
            population:    m.population as u64,
            evacuated:     m.evacuated as u64,
            remaining:     outcome.remaining as u64,
            ticks:         outcome.ticks,
            live_exits:    outcome.live_exits as u64,
            makespan_secs: m.makespan_secs,
            mean_secs:     m.mean_secs,
            p50_secs:      m.p50_secs,
            p90_secs:      m.p90_secs,
        }
    }
}

/// One point of a labelled evacuation curve.
#[derive(Debug, Clone, PartialEq)]
pub struct CurvePointRow {
    pub run:       String,
    pub time_secs: f64,
    pub evacuated: u64,
    pub percent:   f64,
}

impl CurvePointRow {
    /// Every curve point of `outcome`, tagged with `run`.
    pub fn from_outcome(run: &str, outcome: &RunOutcome) -> Vec<Self> {
        outcome
            .metrics
            .curve
            .iter()
            .map(|p| Self {
                run:       run.to_owned(),
                time_secs: p.time_secs,
                evacuated: p.evacuated as u64,
                percent:   p.percent,
            })
            .collect()
    }
}
