//! Static room layout plus the live exit set.
//!
//! `Topology` is the single authority on which exits are open.  Every held
//! `ExitId` (an agent's target, its remembered exit, a gate key) is
//! resolved through [`Topology::resolve`] before use, so a closed exit is
//! detected in one place instead of at each call site.
//!
//! # Field caching
//!
//! Distance fields depend only on obstacles and the live exit set, so they
//! are computed when the topology is built and again only when an exit
//! closes.  [`Topology::recomputations`] counts those rebuilds.

use std::collections::BTreeMap;

use rustc_hash::FxHashSet;

use evac_core::{Cell, ExitId};

use crate::DistanceField;

/// An open exit and the cell it occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitSite {
    pub id:   ExitId,
    pub cell: Cell,
}

/// Obstacles, live exits, and their cached distance fields.
#[derive(Debug, Clone)]
pub struct Topology {
    width:          u32,
    height:         u32,
    obstacles:      FxHashSet<Cell>,
    /// Live exits in ascending id order.
    exits:          Vec<ExitSite>,
    /// Hops to the nearest live exit.
    nearest:        DistanceField,
    /// Hops to each individual live exit.
    per_exit:       BTreeMap<ExitId, DistanceField>,
    recomputations: u64,
}

impl Topology {
    /// Build the topology and compute every field once.
    ///
    /// Exit ids are assigned in slice order: `exits[i]` becomes `ExitId(i)`.
    pub fn new(width: u32, height: u32, exits: &[Cell], obstacles: &[Cell]) -> Self {
        let obstacles: FxHashSet<Cell> = obstacles.iter().copied().collect();
        let exits: Vec<ExitSite> = exits
            .iter()
            .enumerate()
            .map(|(i, &cell)| ExitSite { id: ExitId(i as u32), cell })
            .collect();
        let per_exit = exits
            .iter()
            .map(|site| {
                let field = DistanceField::compute(width, height, &[site.cell], &obstacles);
                (site.id, field)
            })
            .collect();
        let sources: Vec<Cell> = exits.iter().map(|s| s.cell).collect();
        Self {
            width,
            height,
            nearest: DistanceField::compute(width, height, &sources, &obstacles),
            obstacles,
            exits,
            per_exit,
            recomputations: 1,
        }
    }

    // ── Liveness registry ─────────────────────────────────────────────────

    /// Live exits in ascending id order.
    #[inline]
    pub fn exits(&self) -> &[ExitSite] {
        &self.exits
    }

    /// Look up a held exit id.  `None` means the exit has been closed (or
    /// never existed) and the reference is stale.
    #[inline]
    pub fn resolve(&self, id: ExitId) -> Option<&ExitSite> {
        self.exits
            .binary_search_by_key(&id, |s| s.id)
            .ok()
            .map(|i| &self.exits[i])
    }

    #[inline]
    pub fn is_live(&self, id: ExitId) -> bool {
        self.resolve(id).is_some()
    }

    #[inline]
    pub fn live_count(&self) -> usize {
        self.exits.len()
    }

    /// Remove exit `id` from the live set and rebuild the nearest-exit field.
    ///
    /// Returns the removed site, or `None` (and does nothing) if `id` is not
    /// live, so closing twice is harmless.
    pub fn close(&mut self, id: ExitId) -> Option<ExitSite> {
        let pos = self.exits.binary_search_by_key(&id, |s| s.id).ok()?;
        let site = self.exits.remove(pos);
        self.per_exit.remove(&id);
        self.recompute_nearest();
        Some(site)
    }

    // ── Fields ────────────────────────────────────────────────────────────

    /// Hops to the nearest live exit.
    #[inline]
    pub fn nearest_field(&self) -> &DistanceField {
        &self.nearest
    }

    /// Hops to one live exit; `None` once it has closed.
    #[inline]
    pub fn exit_field(&self, id: ExitId) -> Option<&DistanceField> {
        self.per_exit.get(&id)
    }

    /// How many times the nearest-exit field has been built.
    #[inline]
    pub fn recomputations(&self) -> u64 {
        self.recomputations
    }

    // ── Static layout ─────────────────────────────────────────────────────

    #[inline]
    pub fn is_obstacle(&self, cell: Cell) -> bool {
        self.obstacles.contains(&cell)
    }

    /// `true` if `cell` is in bounds, not an obstacle, and not a live exit.
    pub fn is_free(&self, cell: Cell) -> bool {
        cell.x < self.width
            && cell.y < self.height
            && !self.is_obstacle(cell)
            && !self.exits.iter().any(|s| s.cell == cell)
    }

    fn recompute_nearest(&mut self) {
        let sources: Vec<Cell> = self.exits.iter().map(|s| s.cell).collect();
        self.nearest = DistanceField::compute(self.width, self.height, &sources, &self.obstacles);
        self.recomputations += 1;
    }
}
