//! Reduction of the exit-event log into summary statistics.

use std::collections::BTreeMap;

use evac_core::ExitId;

use crate::ExitEvent;

/// One point of the evacuation curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurvePoint {
    pub time_secs: f64,
    /// People out by `time_secs` (inclusive).
    pub evacuated: usize,
    /// `evacuated` as a percentage of the initial population.
    pub percent:   f64,
}

/// Summary of one run.  Time statistics are `None` when nobody got out.
#[derive(Debug, Clone, PartialEq)]
pub struct RunMetrics {
    pub population:    usize,
    pub evacuated:     usize,
    pub remaining:     usize,
    /// Latest exit time.
    pub makespan_secs: Option<f64>,
    pub mean_secs:     Option<f64>,
    pub p50_secs:      Option<f64>,
    pub p90_secs:      Option<f64>,
    /// People served by each exit, closed exits included.
    pub per_exit:      BTreeMap<ExitId, usize>,
    pub curve:         Vec<CurvePoint>,
}

impl RunMetrics {
    /// Reduce `events` from a run of `steps` ticks of `tick_duration_secs`.
    pub fn from_events(
        events:             &[ExitEvent],
        population:         usize,
        tick_duration_secs: f64,
        steps:              u64,
    ) -> Self {
        let mut times: Vec<f64> = events.iter().map(|e| e.time_secs).collect();
        times.sort_by(f64::total_cmp);

        let mut per_exit = BTreeMap::new();
        for e in events {
            *per_exit.entry(e.exit).or_insert(0) += 1;
        }

        let mean_secs = (!times.is_empty()).then(|| times.iter().sum::<f64>() / times.len() as f64);

        Self {
            population,
            evacuated: times.len(),
            remaining: population.saturating_sub(times.len()),
            makespan_secs: times.last().copied(),
            mean_secs,
            p50_secs: percentile(&times, 0.5),
            p90_secs: percentile(&times, 0.9),
            per_exit,
            curve: evacuation_curve(&times, population, tick_duration_secs, steps),
        }
    }

    /// Share of the population that got out, 0–100.
    pub fn percent_evacuated(&self) -> f64 {
        percent(self.evacuated, self.population)
    }
}

/// Quantile `q` of ascending `sorted`, interpolating linearly between the
/// two nearest ranks.  `None` for an empty slice.
pub fn percentile(sorted: &[f64], q: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let pos = q.clamp(0.0, 1.0) * last as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Cumulative evacuations at `t = s × dt` for `s` in `0..=steps`.
pub fn evacuation_curve(
    sorted_times:       &[f64],
    population:         usize,
    tick_duration_secs: f64,
    steps:              u64,
) -> Vec<CurvePoint> {
    (0..=steps)
        .map(|s| {
            let time_secs = s as f64 * tick_duration_secs;
            let evacuated = sorted_times.partition_point(|&t| t <= time_secs);
            CurvePoint { time_secs, evacuated, percent: percent(evacuated, population) }
        })
        .collect()
}

fn percent(n: usize, of: usize) -> f64 {
    if of == 0 {
        0.0
    } else {
        100.0 * n as f64 / of as f64
    }
}
