//! Exit choice, movement, and the per-tick turn of an agent.
//!
//! # Turn outline
//!
//! ```text
//! WAITING:  target closed, or (panic > 0.7 and 5 % roll)?
//!             no  → stay queued, done
//!             yes → MOVING, re-choose, fall through to movement
//! MOVING:   target missing/closed, or tick % 10 == 0 → re-choose
//!           no reachable exit → idle
//!           up to `movement_rate` micro-steps down the target's field,
//!           WAITING the moment the target is within one king move
//! ```

use evac_core::{BehaviorParams, Cell, ExitId, SimRng, Tick};
use evac_spatial::{DistanceField, ExitSite, Grid, Occupant, SpatialResult, Topology};

use crate::{EvacuatingAgent, Lifecycle, Roster};

/// Read-only state shared by every agent turn in a tick.
pub struct TurnContext<'a> {
    pub tick:     Tick,
    pub topology: &'a Topology,
    pub params:   &'a BehaviorParams,
}

impl<'a> TurnContext<'a> {
    #[inline]
    pub fn new(tick: Tick, topology: &'a Topology, params: &'a BehaviorParams) -> Self {
        Self { tick, topology, params }
    }
}

/// Sample an index with probability `∝ exp(-(u_i - u_min) / temperature)`.
///
/// Lower utility is better.  Shifting by the minimum keeps the best option's
/// weight at exactly 1, so the weights never all underflow.
pub fn softmax_pick(utilities: &[f64], temperature: f64, rng: &mut SimRng) -> Option<usize> {
    let best = utilities.iter().copied().fold(f64::INFINITY, f64::min);
    if !best.is_finite() {
        return None;
    }
    let weights: Vec<f64> = utilities
        .iter()
        .map(|u| (-(u - best) / temperature).exp())
        .collect();
    rng.choose_weighted(&weights)
}

impl EvacuatingAgent {
    /// Run one activation.
    ///
    /// The caller must have checked this agent out of `others` so the
    /// congestion counts exclude it.  Grid moves are mirrored in `self.cell`.
    pub fn take_turn(
        &mut self,
        grid:   &mut Grid,
        others: &Roster,
        ctx:    &TurnContext<'_>,
        rng:    &mut SimRng,
    ) -> SpatialResult<()> {
        let params = ctx.params;
        let stale = self.target.is_none_or(|t| !ctx.topology.is_live(t));

        match self.state {
            Lifecycle::Evacuated => return Ok(()),
            Lifecycle::Waiting => {
                let panicked = self.profile.panic > params.reconsider_panic_threshold
                    && rng.gen_bool(params.reconsider_probability);
                if !stale && !panicked {
                    return Ok(());
                }
                self.state = Lifecycle::Moving;
                self.retarget(grid, others, ctx, rng);
            }
            Lifecycle::Moving => {
                let interval = params.retarget_interval_ticks.max(1);
                if stale || ctx.tick.0.is_multiple_of(interval) {
                    self.retarget(grid, others, ctx, rng);
                }
            }
        }

        self.advance(grid, ctx.topology, rng)
    }

    /// Pick an exit by softmax over utilities.
    ///
    /// Utility of a live exit reachable from the current cell:
    ///
    ///   hops to that exit
    ///   + congestion_weight × (agents already queued there)
    ///   − familiarity_bonus   (familiar agents, remembered exit only)
    ///   + U(−panic_noise, panic_noise)   (panic above the noise threshold)
    ///
    /// Returns `None` when no live exit is reachable.
    pub fn choose_exit(
        &self,
        grid:   &Grid,
        others: &Roster,
        ctx:    &TurnContext<'_>,
        rng:    &mut SimRng,
    ) -> Option<ExitId> {
        let params = ctx.params;
        let mut ids = Vec::with_capacity(ctx.topology.live_count());
        let mut utilities = Vec::with_capacity(ctx.topology.live_count());

        for site in ctx.topology.exits() {
            let Some(hops) = ctx.topology.exit_field(site.id).and_then(|f| f.get(self.cell)) else {
                continue;
            };
            let queued = others
                .queue_for(grid, site)
                .into_iter()
                .filter(|&id| id != self.id)
                .count();

            let mut utility = hops as f64 + params.congestion_weight * queued as f64;
            if self.profile.familiar && self.preferred == Some(site.id) {
                utility -= params.familiarity_bonus;
            }
            if self.profile.panic > params.noise_panic_threshold {
                utility += rng.gen_range(-params.panic_noise..=params.panic_noise);
            }
            ids.push(site.id);
            utilities.push(utility);
        }

        softmax_pick(&utilities, params.softmax_temperature, rng).map(|i| ids[i])
    }

    /// Cell to step to: the current cell or a non-obstacle Moore neighbour
    /// with the lowest value in `field`, ties broken uniformly.  Staying put
    /// is one of the candidates, so an agent at a local minimum stays.
    pub fn best_neighbor_step(
        &self,
        grid:     &Grid,
        field:    &DistanceField,
        topology: &Topology,
        rng:      &mut SimRng,
    ) -> Cell {
        let mut best = field.raw(self.cell);
        let mut candidates = vec![self.cell];
        for n in grid.neighbors(self.cell, true) {
            if topology.is_obstacle(n) {
                continue;
            }
            let d = field.raw(n);
            if d < best {
                best = d;
                candidates.clear();
                candidates.push(n);
            } else if d == best {
                candidates.push(n);
            }
        }
        rng.choose(&candidates).copied().unwrap_or(self.cell)
    }

    /// Within one king move of `site`, its own cell included.
    #[inline]
    pub fn is_adjacent(&self, site: &ExitSite) -> bool {
        self.cell.chebyshev(site.cell) <= 1
    }

    fn retarget(
        &mut self,
        grid:   &Grid,
        others: &Roster,
        ctx:    &TurnContext<'_>,
        rng:    &mut SimRng,
    ) {
        let previous = self.target.take().or(self.released_from.take());
        let chosen = self.choose_exit(grid, others, ctx, rng);
        if let (Some(old), Some(new)) = (previous, chosen) {
            if old != new {
                self.retargets += 1;
            }
        }
        if self.preferred.is_none() {
            self.preferred = chosen;
        }
        self.target = chosen;
    }

    fn advance(
        &mut self,
        grid:     &mut Grid,
        topology: &Topology,
        rng:      &mut SimRng,
    ) -> SpatialResult<()> {
        let Some(site) = self.target.and_then(|t| topology.resolve(t)).copied() else {
            return Ok(());
        };
        let Some(field) = topology.exit_field(site.id) else {
            return Ok(());
        };

        if self.is_adjacent(&site) {
            self.state = Lifecycle::Waiting;
            return Ok(());
        }
        for _ in 0..self.movement_rate {
            let next = self.best_neighbor_step(grid, field, topology, rng);
            if next != self.cell {
                grid.move_to(Occupant::Person(self.id), next)?;
                self.cell = next;
            }
            if self.is_adjacent(&site) {
                self.state = Lifecycle::Waiting;
                break;
            }
        }
        Ok(())
    }
}
