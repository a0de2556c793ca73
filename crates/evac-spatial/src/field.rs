//! Shortest-path distance fields over the grid.
//!
//! # Algorithm
//!
//! Multi-source breadth-first search.  Every source cell enters the queue at
//! distance 0 before expansion starts; the frontier then grows one hop at a
//! time along 4-connected, non-obstacle neighbours.  Because BFS dequeues
//! cells in non-decreasing distance order, the first time a cell is reached
//! is along a shortest path, and the result does not depend on the order in
//! which sources were supplied.
//!
//! Unit edge weights make BFS exact; no heap is needed.

use std::collections::VecDeque;

use rustc_hash::FxHashSet;

use evac_core::Cell;

/// 4-connected step offsets used for expansion.
const VON_NEUMANN: [(i64, i64); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Hop count from every cell to the nearest source.
///
/// Stored row-major (`y * width + x`).  Cells that cannot reach any source
/// hold [`DistanceField::UNREACHABLE`]; [`get`](Self::get) reports them as
/// `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistanceField {
    width:  u32,
    height: u32,
    hops:   Vec<u32>,
}

impl DistanceField {
    /// Sentinel for "no path to any source".
    pub const UNREACHABLE: u32 = u32::MAX;

    /// Run the BFS.
    ///
    /// Sources outside the grid or on an obstacle are ignored.  With no
    /// usable source every cell is unreachable.
    pub fn compute(
        width:     u32,
        height:    u32,
        sources:   &[Cell],
        obstacles: &FxHashSet<Cell>,
    ) -> Self {
        let mut field = Self {
            width,
            height,
            hops: vec![Self::UNREACHABLE; width as usize * height as usize],
        };

        let mut queue: VecDeque<Cell> = VecDeque::with_capacity(sources.len());
        for &src in sources {
            if field.in_bounds(src) && !obstacles.contains(&src) {
                let i = field.idx(src);
                if field.hops[i] != 0 {
                    field.hops[i] = 0;
                    queue.push_back(src);
                }
            }
        }

        while let Some(cell) = queue.pop_front() {
            let next = field.hops[field.idx(cell)] + 1;
            for (dx, dy) in VON_NEUMANN {
                let Some(n) = cell.offset(dx, dy) else { continue };
                if !field.in_bounds(n) || obstacles.contains(&n) {
                    continue;
                }
                let i = field.idx(n);
                if field.hops[i] == Self::UNREACHABLE {
                    field.hops[i] = next;
                    queue.push_back(n);
                }
            }
        }

        field
    }

    /// Hop count at `cell`, or `None` if unreachable or out of bounds.
    #[inline]
    pub fn get(&self, cell: Cell) -> Option<u32> {
        if !self.in_bounds(cell) {
            return None;
        }
        match self.hops[self.idx(cell)] {
            Self::UNREACHABLE => None,
            d => Some(d),
        }
    }

    /// Raw value at `cell` with unreachable cells as [`Self::UNREACHABLE`].
    /// Convenient for min-comparisons where unreachable sorts last.
    #[inline]
    pub fn raw(&self, cell: Cell) -> u32 {
        if self.in_bounds(cell) {
            self.hops[self.idx(cell)]
        } else {
            Self::UNREACHABLE
        }
    }

    #[inline]
    pub fn is_reachable(&self, cell: Cell) -> bool {
        self.get(cell).is_some()
    }

    /// Number of cells that can reach a source.
    pub fn reachable_count(&self) -> usize {
        self.hops.iter().filter(|&&d| d != Self::UNREACHABLE).count()
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
    fn in_bounds(&self, cell: Cell) -> bool {
        cell.x < self.width && cell.y < self.height
    }

    #[inline]
    fn idx(&self, cell: Cell) -> usize {
        cell.y as usize * self.width as usize + cell.x as usize
    }
}
