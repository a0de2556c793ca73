//! The `Engine` struct and its tick loop.

use std::collections::BTreeMap;

use tracing::{debug, info};

use evac_agent::{Lifecycle, Roster, TurnContext};
use evac_core::{AgentId, EvacConfig, ExitId, SimClock, SimRng, Tick};
use evac_spatial::{Grid, Occupant, Topology};

use crate::{EngineObserver, ExitGate, SimError, SimResult};

// ── Records ───────────────────────────────────────────────────────────────────

/// One person leaving through one exit.  Appended exactly once per person.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExitEvent {
    pub agent:     AgentId,
    pub exit:      ExitId,
    /// Start of the tick in which the person was served.
    pub time_secs: f64,
}

/// Head counts at the end of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickStats {
    pub tick:         Tick,
    pub moving:       usize,
    pub waiting:      usize,
    /// People still inside.
    pub active:       usize,
    pub evacuated:    usize,
    /// Served during this tick.
    pub served:       usize,
    pub live_exits:   usize,
}

/// What an applied closure did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClosureReport {
    pub exit:     ExitId,
    /// Tick before which the exit was removed.
    pub tick:     Tick,
    /// Queued people sent back to `MOVING`.
    pub released: usize,
}

// ── Engine ────────────────────────────────────────────────────────────────────

/// The main simulation runner.
///
/// `Engine` owns every piece of run state: the grid, the exit topology and
/// its distance fields, the gates, the roster and the exit-event log.  One
/// tick activates every live exit and every person still inside exactly
/// once, in an order reshuffled each tick.
///
/// Create via [`EngineBuilder`][crate::EngineBuilder].
pub struct Engine {
    pub(crate) config:   EvacConfig,
    pub(crate) clock:    SimClock,
    pub(crate) grid:     Grid,
    pub(crate) topology: Topology,
    pub(crate) gates:    BTreeMap<ExitId, ExitGate>,
    pub(crate) roster:   Roster,
    pub(crate) events:   Vec<ExitEvent>,
    pub(crate) rng:      SimRng,
    pub(crate) running:  bool,
}

impl Engine {
    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn config(&self) -> &EvacConfig {
        &self.config
    }

    #[inline]
    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[inline]
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    #[inline]
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Exit events in the order they happened.
    #[inline]
    pub fn events(&self) -> &[ExitEvent] {
        &self.events
    }

    #[inline]
    pub fn gate(&self, id: ExitId) -> Option<&ExitGate> {
        self.gates.get(&id)
    }

    /// Open gates in ascending id order.
    pub fn gates(&self) -> impl Iterator<Item = &ExitGate> + '_ {
        self.gates.values()
    }

    /// `false` once everybody is out.
    #[inline]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Consume the engine, keeping only the event log.
    pub fn into_events(self) -> Vec<ExitEvent> {
        self.events
    }

    // ── Stepping ──────────────────────────────────────────────────────────

    /// Run exactly `n` ticks, ignoring the step budget and the running flag.
    ///
    /// Useful for tests and incremental stepping.
    pub fn run_ticks<O: EngineObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<()> {
        for _ in 0..n {
            self.step(observer)?;
        }
        Ok(())
    }

    /// Advance one tick.
    pub fn step<O: EngineObserver>(&mut self, observer: &mut O) -> SimResult<TickStats> {
        let now = self.clock.current_tick;
        observer.on_tick_start(now);

        let mut order: Vec<Occupant> = self
            .topology
            .exits()
            .iter()
            .map(|site| Occupant::Exit(site.id))
            .chain(self.roster.active_ids().map(Occupant::Person))
            .collect();
        self.rng.shuffle(&mut order);

        let before = self.events.len();
        for entity in order {
            match entity {
                Occupant::Person(id) => self.activate_agent(id, now)?,
                Occupant::Exit(id) => self.activate_exit(id, observer)?,
            }
        }

        let stats = TickStats {
            tick:       now,
            moving:     self.roster.count_in(Lifecycle::Moving),
            waiting:    self.roster.count_in(Lifecycle::Waiting),
            active:     self.roster.active_count(),
            evacuated:  self.events.len(),
            served:     self.events.len() - before,
            live_exits: self.topology.live_count(),
        };
        debug!(
            tick = now.0,
            moving = stats.moving,
            waiting = stats.waiting,
            served = stats.served,
            evacuated = stats.evacuated,
            "tick complete"
        );
        observer.on_tick_end(&stats);

        if self.roster.active_count() == 0 {
            self.running = false;
        }
        self.clock.advance();
        Ok(stats)
    }

    /// Agents evacuated earlier in the same tick are no longer in the
    /// roster and are skipped.
    fn activate_agent(&mut self, id: AgentId, now: Tick) -> SimResult<()> {
        let Some(mut agent) = self.roster.take(id) else {
            return Ok(());
        };
        let ctx = TurnContext::new(now, &self.topology, &self.config.behavior);
        let turn = agent.take_turn(&mut self.grid, &self.roster, &ctx, &mut self.rng);
        self.roster.restore(agent);
        Ok(turn?)
    }

    fn activate_exit<O: EngineObserver>(&mut self, id: ExitId, observer: &mut O) -> SimResult<()> {
        let Some(site) = self.topology.resolve(id).copied() else {
            return Ok(());
        };
        let Some(gate) = self.gates.get_mut(&id) else {
            return Err(SimError::Invariant(format!("live {id} has no gate")));
        };

        gate.accrue(self.clock.tick_duration_secs);
        let queue = self.roster.queue_for(&self.grid, &site);
        let served = gate.discharge(queue, &mut self.rng)?;

        let time_secs = self.clock.elapsed_secs();
        for agent in served {
            self.grid.remove(Occupant::Person(agent));
            if let Some(record) = self.roster.evacuate(agent, time_secs) {
                let event = ExitEvent { agent, exit: id, time_secs };
                observer.on_evacuation(&event, record);
                self.events.push(event);
            }
        }
        Ok(())
    }

    // ── Perturbation ──────────────────────────────────────────────────────

    /// Close exit `id` between ticks.
    ///
    /// Removes it from the grid, the live exit set and the gate map and
    /// rebuilds the distance field once.  Then every person queued on it is
    /// released back to `MOVING` with no target.  The queue is collected
    /// before anyone is released.
    ///
    /// Returns `Ok(None)` and changes nothing if `id` is not open.
    pub fn close_exit<O: EngineObserver>(
        &mut self,
        id:       ExitId,
        observer: &mut O,
    ) -> SimResult<Option<ClosureReport>> {
        let Some(site) = self.topology.close(id) else {
            return Ok(None);
        };
        self.grid.remove(Occupant::Exit(id));
        self.gates.remove(&id);

        let stranded: Vec<AgentId> = self
            .grid
            .occupants_in_neighborhood(site.cell, 1, true, true)
            .into_iter()
            .filter_map(Occupant::person)
            .filter(|&a| self.roster.get(a).is_some_and(|a| a.is_waiting_for(id)))
            .collect();
        for &a in &stranded {
            if let Some(agent) = self.roster.get_mut(a) {
                agent.release();
            }
        }

        let anchored = self.roster.anchored_to(id);
        if !anchored.is_empty() {
            return Err(SimError::Invariant(format!(
                "{} people still queued on closed {id}",
                anchored.len()
            )));
        }

        let report = ClosureReport {
            exit:     id,
            tick:     self.clock.current_tick,
            released: stranded.len(),
        };
        info!(
            exit = %id,
            tick = report.tick.0,
            released = report.released,
            live_exits = self.topology.live_count(),
            "exit closed"
        );
        observer.on_exit_closed(&report);
        Ok(Some(report))
    }
}
