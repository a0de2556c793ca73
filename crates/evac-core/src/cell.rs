//! Integer grid coordinates.

use std::fmt;

/// A grid cell `(x, y)` with `0 <= x < width` and `0 <= y < height`.
///
/// Bounds are owned by the grid, not the cell; a `Cell` on its own is just a
/// coordinate pair.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    pub x: u32,
    pub y: u32,
}

impl Cell {
    #[inline]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Chessboard distance: the number of king moves between two cells.
    /// Two cells are Moore neighbours when this is 1.
    #[inline]
    pub fn chebyshev(self, other: Cell) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }

    #[inline]
    pub fn manhattan(self, other: Cell) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Offset by `(dx, dy)`, or `None` if either coordinate would go negative.
    /// The upper bound is checked by the caller.
    #[inline]
    pub fn offset(self, dx: i64, dy: i64) -> Option<Cell> {
        let x = u32::try_from(self.x as i64 + dx).ok()?;
        let y = u32::try_from(self.y as i64 + dy).ok()?;
        Some(Cell { x, y })
    }
}

impl From<(u32, u32)> for Cell {
    #[inline]
    fn from((x, y): (u32, u32)) -> Self {
        Cell { x, y }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
