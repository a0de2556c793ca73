//! Agent storage: active agents by id, plus an archive of evacuated ones.
//!
//! Slots are indexed by `AgentId`, so lookups are O(1) and ids never move.
//! An evacuated agent leaves its slot empty and is appended to the archive;
//! `active_count() + departed().len()` therefore always equals the initial
//! population.

use evac_core::{AgentId, ExitId};
use evac_spatial::{ExitSite, Grid};

use crate::{EvacuatingAgent, Lifecycle};

pub struct Roster {
    slots:    Vec<Option<EvacuatingAgent>>,
    departed: Vec<EvacuatingAgent>,
    active:   usize,
    /// Agent currently checked out by [`take`](Self::take).
    loaned:   Option<AgentId>,
}

impl Roster {
    /// Build from agents whose ids are exactly `0..agents.len()` in order.
    ///
    /// # Panics
    /// Panics if an agent's id does not match its position.
    pub fn new(agents: Vec<EvacuatingAgent>) -> Self {
        for (i, a) in agents.iter().enumerate() {
            assert_eq!(a.id.index(), i, "roster ids must be dense and ordered");
        }
        let active = agents.len();
        Self {
            slots: agents.into_iter().map(Some).collect(),
            departed: Vec::new(),
            active,
            loaned: None,
        }
    }

    /// Number of agents the run started with.
    #[inline]
    pub fn initial_count(&self) -> usize {
        self.slots.len()
    }

    /// Agents not yet evacuated (including one that is checked out).
    #[inline]
    pub fn active_count(&self) -> usize {
        self.active
    }

    /// Evacuated agents in evacuation order.
    #[inline]
    pub fn departed(&self) -> &[EvacuatingAgent] {
        &self.departed
    }

    #[inline]
    pub fn get(&self, id: AgentId) -> Option<&EvacuatingAgent> {
        self.slots.get(id.index())?.as_ref()
    }

    #[inline]
    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut EvacuatingAgent> {
        self.slots.get_mut(id.index())?.as_mut()
    }

    /// Ids of active agents in ascending order.
    pub fn active_ids(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.slots
            .iter()
            .filter_map(|s| s.as_ref().map(|a| a.id))
    }

    /// Active agents in ascending id order.
    pub fn active(&self) -> impl Iterator<Item = &EvacuatingAgent> + '_ {
        self.slots.iter().filter_map(Option::as_ref)
    }

    /// Number of active agents in `state`.
    pub fn count_in(&self, state: Lifecycle) -> usize {
        self.active().filter(|a| a.state == state).count()
    }

    /// Check an agent out for its turn.  Must be followed by
    /// [`restore`](Self::restore) before anything else is checked out.
    pub fn take(&mut self, id: AgentId) -> Option<EvacuatingAgent> {
        debug_assert!(self.loaned.is_none(), "agent {:?} still checked out", self.loaned);
        let agent = self.slots.get_mut(id.index())?.take()?;
        self.loaned = Some(id);
        Some(agent)
    }

    /// Return an agent checked out with [`take`](Self::take).
    pub fn restore(&mut self, agent: EvacuatingAgent) {
        debug_assert_eq!(self.loaned, Some(agent.id));
        self.loaned = None;
        let i = agent.id.index();
        self.slots[i] = Some(agent);
    }

    /// Move an active agent to the archive as evacuated at `time_secs`.
    ///
    /// Returns `None` if the agent is not active (already evacuated or
    /// checked out).
    pub fn evacuate(&mut self, id: AgentId, time_secs: f64) -> Option<&EvacuatingAgent> {
        let mut agent = self.slots.get_mut(id.index())?.take()?;
        agent.mark_evacuated(time_secs);
        self.active -= 1;
        self.departed.push(agent);
        self.departed.last()
    }

    /// Active agents queued at `site`: in its Moore neighbourhood (gate cell
    /// included), `WAITING`, with `site` as their target.
    ///
    /// Order follows the grid scan, so it is deterministic.  A checked-out
    /// agent is never included.
    pub fn queue_for(&self, grid: &Grid, site: &ExitSite) -> Vec<AgentId> {
        grid.occupants_in_neighborhood(site.cell, 1, true, true)
            .into_iter()
            .filter_map(|o| o.person())
            .filter(|&id| self.get(id).is_some_and(|a| a.is_waiting_for(site.id)))
            .collect()
    }

    /// Active agents still `WAITING` on `exit`, anywhere on the grid.
    pub fn anchored_to(&self, exit: ExitId) -> Vec<AgentId> {
        self.active()
            .filter(|a| a.is_waiting_for(exit))
            .map(|a| a.id)
            .collect()
    }
}
