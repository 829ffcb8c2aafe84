//! Board positions.

use std::fmt::{self, Debug, Display};

use crate::{DigitPositions, House};

/// A cell on the 9×9 board.
///
/// Cells are numbered row by row, so index `y * 9 + x` is the cell in
/// column `x` and row `y`. Positions display as `r{row}c{column}` with
/// one-based coordinates.
///
/// # Examples
///
/// ```
/// use chainlace_core::Position;
///
/// let pos = Position::new(2, 7);
/// assert_eq!(pos.index(), 65);
/// assert_eq!(pos.box_index(), 6);
/// assert_eq!(pos.to_string(), "r8c3");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    index: u8,
}

impl Position {
    /// Creates a position from column `x` and row `y` (both 0-8).
    ///
    /// # Panics
    ///
    /// Panics if either coordinate is 9 or more.
    #[must_use]
    pub const fn new(x: u8, y: u8) -> Self {
        assert!(x < 9 && y < 9);
        Self { index: y * 9 + x }
    }

    /// Creates a position from its cell index (0-80).
    ///
    /// # Panics
    ///
    /// Panics if `index` is 81 or more.
    #[must_use]
    pub const fn from_index(index: usize) -> Self {
        assert!(index < 81);
        #[expect(clippy::cast_possible_truncation)]
        Self { index: index as u8 }
    }

    /// Creates the `i`-th position (0-8, row-major) inside box `box_index`.
    ///
    /// # Panics
    ///
    /// Panics if either argument is 9 or more.
    #[must_use]
    pub const fn from_box(box_index: u8, i: u8) -> Self {
        assert!(box_index < 9 && i < 9);
        Self::new((box_index % 3) * 3 + i % 3, (box_index / 3) * 3 + i / 3)
    }

    /// Returns the cell index (0-80).
    #[must_use]
    pub const fn index(self) -> usize {
        self.index as usize
    }

    /// Returns the column (0-8).
    #[must_use]
    pub const fn x(self) -> u8 {
        self.index % 9
    }

    /// Returns the row (0-8).
    #[must_use]
    pub const fn y(self) -> u8 {
        self.index / 9
    }

    /// Returns the box index (0-8).
    #[must_use]
    pub const fn box_index(self) -> u8 {
        (self.y() / 3) * 3 + self.x() / 3
    }

    /// Iterates over all 81 positions in index order.
    pub fn all() -> impl DoubleEndedIterator<Item = Self> + ExactSizeIterator {
        (0..81).map(Self::from_index)
    }

    /// Returns the row, column and box containing this cell.
    #[must_use]
    pub const fn houses(self) -> [House; 3] {
        [
            House::Row { y: self.y() },
            House::Column { x: self.x() },
            House::Box {
                index: self.box_index(),
            },
        ]
    }

    /// Returns the 20 cells sharing a house with this one.
    #[must_use]
    pub const fn house_peers(self) -> DigitPositions {
        DigitPositions::PEERS[self.index()]
    }

    /// Returns `true` if the two cells are distinct and share a house.
    #[must_use]
    pub const fn sees(self, other: Self) -> bool {
        self.house_peers().contains(other)
    }
}

impl Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}c{}", self.y() + 1, self.x() + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinates_round_trip() {
        for pos in Position::all() {
            assert_eq!(Position::new(pos.x(), pos.y()), pos);
            assert_eq!(Position::from_index(pos.index()), pos);
        }
    }

    #[test]
    fn test_from_box_covers_box() {
        for b in 0..9 {
            for i in 0..9 {
                assert_eq!(Position::from_box(b, i).box_index(), b);
            }
        }
        assert_eq!(Position::from_box(4, 0), Position::new(3, 3));
        assert_eq!(Position::from_box(8, 8), Position::new(8, 8));
    }

    #[test]
    fn test_peers() {
        let pos = Position::new(4, 4);
        assert_eq!(pos.house_peers().len(), 20);
        assert!(!pos.sees(pos));
        assert!(pos.sees(Position::new(4, 0)));
        assert!(pos.sees(Position::new(3, 5)));
        assert!(!pos.sees(Position::new(0, 0)));
    }
}
