//! Exit service queues.
//!
//! A gate earns `capacity × dt` of service credit on every activation and
//! lets out one queued person per whole unit of credit.  Unused credit
//! carries over, so a gate whose queue ran dry serves a short burst when
//! people arrive again.

use evac_core::{AgentId, Cell, ExitId, SimRng};

use crate::{SimError, SimResult};

#[derive(Debug, Clone)]
pub struct ExitGate {
    pub id:          ExitId,
    pub cell:        Cell,
    /// Persons per second.
    pub capacity_ps: f64,
    credit:          f64,
    served_total:    u64,
}

impl ExitGate {
    pub fn new(id: ExitId, cell: Cell, capacity_ps: f64) -> Self {
        Self { id, cell, capacity_ps, credit: 0.0, served_total: 0 }
    }

    #[inline]
    pub fn credit(&self) -> f64 {
        self.credit
    }

    /// People let out over the gate's lifetime.
    #[inline]
    pub fn served_total(&self) -> u64 {
        self.served_total
    }

    #[inline]
    pub fn accrue(&mut self, tick_duration_secs: f64) {
        self.credit += self.capacity_ps * tick_duration_secs;
    }

    /// Pick who leaves this tick: a uniform random subset of `queue` of size
    /// `min(queue.len(), floor(credit))`.  Credit is charged one unit per
    /// person served.
    pub fn discharge(&mut self, mut queue: Vec<AgentId>, rng: &mut SimRng) -> SimResult<Vec<AgentId>> {
        rng.shuffle(&mut queue);
        let slots = self.credit.floor().max(0.0) as usize;
        queue.truncate(slots);

        self.credit -= queue.len() as f64;
        if self.credit < 0.0 {
            return Err(SimError::Invariant(format!(
                "{} service credit went negative ({})",
                self.id, self.credit
            )));
        }
        self.served_total += queue.len() as u64;
        Ok(queue)
    }
}
