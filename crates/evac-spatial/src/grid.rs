//! Bounded 2-D cell space with unbounded occupancy per cell.
//!
//! The grid does not model crowding: any number of occupants may share a
//! cell.  Throughput limits live entirely in the exit service queues.
//!
//! Each occupant carries an explicit tag ([`Occupant`]) so that callers
//! dispatch on cell contents with a `match`, never by probing what kind of
//! entity they are holding.

use std::fmt;

use rustc_hash::FxHashMap;

use evac_core::{AgentId, Cell, ExitId};

use crate::{SpatialError, SpatialResult};

/// Offsets of the 8 Moore neighbours, in a fixed scan order.
const MOORE: [(i64, i64); 8] = [
    (-1, -1), (0, -1), (1, -1),
    (-1,  0),          (1,  0),
    (-1,  1), (0,  1), (1,  1),
];

/// Offsets of the 4 von Neumann neighbours.
const VON_NEUMANN: [(i64, i64); 4] = [(0, -1), (-1, 0), (1, 0), (0, 1)];

// ── Occupant ──────────────────────────────────────────────────────────────────

/// Anything that can stand in a cell.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Occupant {
    Exit(ExitId),
    Person(AgentId),
}

impl Occupant {
    /// The agent id if this is a person.
    #[inline]
    pub fn person(self) -> Option<AgentId> {
        match self {
            Occupant::Person(a) => Some(a),
            Occupant::Exit(_) => None,
        }
    }
}

impl fmt::Display for Occupant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Occupant::Exit(e) => write!(f, "{e}"),
            Occupant::Person(a) => write!(f, "{a}"),
        }
    }
}

// ── Grid ──────────────────────────────────────────────────────────────────────

/// Multi-occupancy grid.
///
/// Occupants are stored per cell in insertion order, which keeps every scan
/// deterministic.  A reverse index maps each occupant to its cell so that
/// `remove` and `move_to` do not need the caller to remember positions.
#[derive(Debug, Clone)]
pub struct Grid {
    width:     u32,
    height:    u32,
    cells:     Vec<Vec<Occupant>>,
    positions: FxHashMap<Occupant, Cell>,
}

impl Grid {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![Vec::new(); width as usize * height as usize],
            positions: FxHashMap::default(),
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn contains(&self, cell: Cell) -> bool {
        cell.x < self.width && cell.y < self.height
    }

    /// Total number of occupants currently on the grid.
    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Put `occupant` in `cell`.
    pub fn place(&mut self, occupant: Occupant, cell: Cell) -> SpatialResult<()> {
        if !self.contains(cell) {
            return Err(SpatialError::OutOfBounds(cell));
        }
        if self.positions.contains_key(&occupant) {
            return Err(SpatialError::AlreadyPlaced(occupant));
        }
        let i = self.idx(cell);
        self.cells[i].push(occupant);
        self.positions.insert(occupant, cell);
        Ok(())
    }

    /// Take `occupant` off the grid, returning the cell it was in.
    ///
    /// Returns `None` if it was not placed; removal is idempotent.
    pub fn remove(&mut self, occupant: Occupant) -> Option<Cell> {
        let cell = self.positions.remove(&occupant)?;
        let i = self.idx(cell);
        let slot = &mut self.cells[i];
        if let Some(pos) = slot.iter().position(|&o| o == occupant) {
            slot.remove(pos);
        }
        Some(cell)
    }

    /// Relocate `occupant` to `cell`.
    ///
    /// The destination is validated before anything changes, so a failed
    /// move leaves the grid untouched.
    pub fn move_to(&mut self, occupant: Occupant, cell: Cell) -> SpatialResult<()> {
        if !self.contains(cell) {
            return Err(SpatialError::OutOfBounds(cell));
        }
        let from = self
            .position(occupant)
            .ok_or(SpatialError::NotPlaced(occupant))?;
        if from == cell {
            return Ok(());
        }
        self.remove(occupant);
        self.place(occupant, cell)
    }

    /// Current cell of `occupant`.
    #[inline]
    pub fn position(&self, occupant: Occupant) -> Option<Cell> {
        self.positions.get(&occupant).copied()
    }

    /// Occupants of `cell` in insertion order.  Empty for out-of-bounds cells.
    pub fn occupants_in(&self, cell: Cell) -> &[Occupant] {
        if self.contains(cell) {
            &self.cells[self.idx(cell)]
        } else {
            &[]
        }
    }

    /// In-bounds neighbours of `cell` (Moore: 8, von Neumann: 4).
    pub fn neighbors(&self, cell: Cell, moore: bool) -> Vec<Cell> {
        let offsets: &[(i64, i64)] = if moore { &MOORE } else { &VON_NEUMANN };
        offsets
            .iter()
            .filter_map(|&(dx, dy)| cell.offset(dx, dy))
            .filter(|&c| self.contains(c))
            .collect()
    }

    /// Every cell within `radius` of `cell`, in row-major order.
    ///
    /// Moore neighbourhoods use Chebyshev distance, von Neumann ones use
    /// Manhattan distance.
    pub fn neighborhood(
        &self,
        cell:           Cell,
        radius:         u32,
        moore:          bool,
        include_center: bool,
    ) -> Vec<Cell> {
        let r = radius as i64;
        let mut out = Vec::new();
        for dy in -r..=r {
            for dx in -r..=r {
                if dx == 0 && dy == 0 && !include_center {
                    continue;
                }
                if !moore && dx.abs() + dy.abs() > r {
                    continue;
                }
                if let Some(c) = cell.offset(dx, dy).filter(|&c| self.contains(c)) {
                    out.push(c);
                }
            }
        }
        out
    }

    /// All occupants of [`neighborhood`](Self::neighborhood)`(cell, ..)`.
    pub fn occupants_in_neighborhood(
        &self,
        cell:           Cell,
        radius:         u32,
        moore:          bool,
        include_center: bool,
    ) -> Vec<Occupant> {
        self.neighborhood(cell, radius, moore, include_center)
            .into_iter()
            .flat_map(|c| self.occupants_in(c).iter().copied())
            .collect()
    }

    #[inline]
    fn idx(&self, cell: Cell) -> usize {
        cell.y as usize * self.width as usize + cell.x as usize
    }
}
