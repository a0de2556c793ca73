//! Run configuration.
//!
//! `EvacConfig` is the single input of a run.  It is validated in full by
//! [`EvacConfig::validate`] before any simulation state is constructed, so an
//! invalid config never produces a partially initialised engine.

use std::collections::HashSet;

use crate::{Cell, EvError, EvResult};

/// Door throughput per metre of clear width, persons/second.
///
/// An exit described only by count gets exactly this capacity (a 1 m door).
pub const SPECIFIC_FLOW_PS_PER_M: f64 = 1.3;

// ── ExitLayout ────────────────────────────────────────────────────────────────

/// How many exits the room has and how wide each one is.
///
/// Exits are always placed on the bottom row (`y = 0`), evenly spaced:
/// exit `i` of `n` sits at `x = (i + 1) * width / (n + 1)`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ExitLayout {
    /// `n` identical 1 m exits.
    Count(usize),
    /// One exit per entry, width in metres.
    Widths(Vec<f64>),
}

impl ExitLayout {
    pub fn len(&self) -> usize {
        match self {
            ExitLayout::Count(n) => *n,
            ExitLayout::Widths(w) => w.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Service capacity of each exit in persons/second, in exit order.
    pub fn capacities(&self) -> Vec<f64> {
        match self {
            ExitLayout::Count(n) => vec![SPECIFIC_FLOW_PS_PER_M; *n],
            ExitLayout::Widths(w) => w.iter().map(|m| m * SPECIFIC_FLOW_PS_PER_M).collect(),
        }
    }
}

// ── Closure ───────────────────────────────────────────────────────────────────

/// Scripted exit closure: exit `exit_index` is removed before the first tick
/// whose start time reaches `trigger_secs`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Closure {
    pub trigger_secs: f64,
    pub exit_index: usize,
}

// ── BehaviorParams ────────────────────────────────────────────────────────────

/// Tunables of the agent decision model.  Defaults reproduce the reference
/// behaviour; tests override individual fields.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BehaviorParams {
    /// Utility subtracted from a familiar agent's remembered exit.
    pub familiarity_bonus: f64,
    /// Utility added per agent already queued at an exit.
    pub congestion_weight: f64,
    /// Panic above this adds uniform noise to every utility.
    pub noise_panic_threshold: f64,
    /// Half-width of that noise: samples fall in `[-panic_noise, panic_noise]`.
    pub panic_noise: f64,
    /// Panic above this lets a queued agent abandon its queue.
    pub reconsider_panic_threshold: f64,
    /// Per-tick probability of abandoning, for agents above the threshold.
    pub reconsider_probability: f64,
    /// A moving agent re-chooses its exit whenever `tick % interval == 0`.
    pub retarget_interval_ticks: u64,
    /// Softmax temperature; lower values approach a hard arg-min.
    pub softmax_temperature: f64,
    /// Walking speed (m/s) worth one cell per tick.  Movement rate is
    /// `max(1, round(base_speed / speed_per_cell_step))`.
    pub speed_per_cell_step: f64,
}

impl Default for BehaviorParams {
    fn default() -> Self {
        Self {
            familiarity_bonus:          0.3,
            congestion_weight:          1.0,
            noise_panic_threshold:      0.6,
            panic_noise:                0.4,
            reconsider_panic_threshold: 0.7,
            reconsider_probability:     0.05,
            retarget_interval_ticks:    10,
            softmax_temperature:        1.0,
            speed_per_cell_step:        0.75,
        }
    }
}

impl BehaviorParams {
    pub fn validate(&self) -> EvResult<()> {
        if !(self.softmax_temperature.is_finite() && self.softmax_temperature > 0.0) {
            return Err(config_err(format!(
                "softmax temperature must be positive, got {}",
                self.softmax_temperature
            )));
        }
        if !(self.speed_per_cell_step.is_finite() && self.speed_per_cell_step > 0.0) {
            return Err(config_err(format!(
                "speed per cell step must be positive, got {}",
                self.speed_per_cell_step
            )));
        }
        if self.retarget_interval_ticks == 0 {
            return Err(config_err("retarget interval must be at least one tick"));
        }
        if !(0.0..=1.0).contains(&self.reconsider_probability) {
            return Err(config_err(format!(
                "reconsider probability must lie in [0, 1], got {}",
                self.reconsider_probability
            )));
        }
        if !(self.panic_noise.is_finite() && self.panic_noise >= 0.0) {
            return Err(config_err(format!("panic noise must be non-negative, got {}", self.panic_noise)));
        }
        Ok(())
    }
}

// ── EvacConfig ────────────────────────────────────────────────────────────────

/// Top-level run configuration.
///
/// Typically built in code (`EvacConfig::baseline()` plus field updates) or
/// loaded from JSON by the CLI with the `serde` feature.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EvacConfig {
    /// Grid columns.
    pub width: u32,
    /// Grid rows.
    pub height: u32,
    /// Number of people placed at tick 0.
    pub population: usize,
    pub exits: ExitLayout,
    /// Impassable cells.  Never hold people or exits.
    pub obstacles: Vec<Cell>,
    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,
    /// Simulated seconds per tick.
    pub tick_duration_secs: f64,
    /// Step budget.  The run stops here even if people remain.
    pub max_steps: u64,
    /// Scripted exit closures, applied in trigger order.
    pub closures: Vec<Closure>,
    pub behavior: BehaviorParams,
}

impl Default for EvacConfig {
    fn default() -> Self {
        Self {
            width:              20,
            height:             20,
            population:         50,
            exits:              ExitLayout::Count(2),
            obstacles:          Vec::new(),
            seed:               42,
            tick_duration_secs: 0.1,
            max_steps:          5_000,
            closures:           Vec::new(),
            behavior:           BehaviorParams::default(),
        }
    }
}

impl EvacConfig {
    /// The reference scenario: 300 people, 25×25 room, 3 exits, seed 42.
    pub fn baseline() -> Self {
        Self {
            width:      25,
            height:     25,
            population: 300,
            exits:      ExitLayout::Count(3),
            ..Self::default()
        }
    }

    /// Add a closure of exit `exit_index` at `trigger_secs`.
    pub fn with_closure(mut self, trigger_secs: f64, exit_index: usize) -> Self {
        self.closures.push(Closure { trigger_secs, exit_index });
        self
    }

    #[inline]
    pub fn exit_count(&self) -> usize {
        self.exits.len()
    }

    /// Cell of each exit, in exit order.
    pub fn exit_cells(&self) -> Vec<Cell> {
        let n = self.exit_count() as u64;
        (0..n)
            .map(|i| Cell::new(((i + 1) * self.width as u64 / (n + 1)) as u32, 0))
            .collect()
    }

    /// Check every field.  Must pass before any engine state is built.
    pub fn validate(&self) -> EvResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(config_err(format!(
                "grid must be at least 1x1, got {}x{}",
                self.width, self.height
            )));
        }
        if self.population == 0 {
            return Err(config_err("population must be positive"));
        }
        let n = self.exit_count();
        if n == 0 {
            return Err(config_err("at least one exit is required"));
        }
        if n > self.width as usize {
            return Err(config_err(format!(
                "{n} exits do not fit on a bottom row of {} cells",
                self.width
            )));
        }
        if let ExitLayout::Widths(w) = &self.exits {
            if let Some(bad) = w.iter().find(|m| !(m.is_finite() && **m > 0.0)) {
                return Err(config_err(format!("exit width must be positive, got {bad}")));
            }
        }
        if !(self.tick_duration_secs.is_finite() && self.tick_duration_secs > 0.0) {
            return Err(config_err(format!(
                "tick duration must be positive, got {}",
                self.tick_duration_secs
            )));
        }

        let obstacles: HashSet<Cell> = self.obstacles.iter().copied().collect();
        if let Some(c) = obstacles.iter().find(|c| c.x >= self.width || c.y >= self.height) {
            return Err(config_err(format!("obstacle {c} lies outside the grid")));
        }
        let exits = self.exit_cells();
        if let Some(c) = exits.iter().find(|c| obstacles.contains(c)) {
            return Err(config_err(format!("exit cell {c} is an obstacle")));
        }
        let free = self.width as u64 * self.height as u64 - obstacles.len() as u64 - exits.len() as u64;
        if free == 0 {
            return Err(config_err("no free cell left to place people"));
        }

        self.behavior.validate()?;

        for closure in &self.closures {
            if closure.exit_index >= n {
                return Err(config_err(format!(
                    "closure targets exit {} but only {n} exits exist",
                    closure.exit_index
                )));
            }
            if !(closure.trigger_secs.is_finite() && closure.trigger_secs >= 0.0) {
                return Err(config_err(format!(
                    "closure trigger must be a non-negative time, got {}",
                    closure.trigger_secs
                )));
            }
        }
        Ok(())
    }
}

fn config_err(msg: impl Into<String>) -> EvError {
    EvError::Config(msg.into())
}
