//! Rows, columns and boxes.

use std::fmt::{self, Display};

use crate::{Digit, DigitPositions, Position};

/// A Sudoku house (row, column, or 3×3 box).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum House {
    /// A row identified by its y coordinate (0-8).
    Row {
        /// Row index (0-8).
        y: u8,
    },
    /// A column identified by its x coordinate (0-8).
    Column {
        /// Column index (0-8).
        x: u8,
    },
    /// A 3×3 box identified by its index (0-8, left to right, top to bottom).
    Box {
        /// Box index (0-8).
        index: u8,
    },
}

impl House {
    /// All houses in row, column, box order.
    pub const ALL: [Self; 27] = {
        let mut all = [Self::Row { y: 0 }; 27];
        let mut i = 0;
        #[expect(clippy::cast_possible_truncation)]
        while i < 9 {
            all[i] = Self::Row { y: i as u8 };
            all[i + 9] = Self::Column { x: i as u8 };
            all[i + 18] = Self::Box { index: i as u8 };
            i += 1;
        }
        all
    };

    /// Returns all positions contained in this house.
    #[must_use]
    pub const fn positions(self) -> DigitPositions {
        match self {
            House::Row { y } => DigitPositions::ROW_POSITIONS[y as usize],
            House::Column { x } => DigitPositions::COLUMN_POSITIONS[x as usize],
            House::Box { index } => DigitPositions::BOX_POSITIONS[index as usize],
        }
    }

    /// Returns `true` if `pos` lies in this house.
    #[must_use]
    pub const fn contains(self, pos: Position) -> bool {
        self.positions().contains(pos)
    }

    /// Returns `true` for rows and columns.
    #[must_use]
    pub const fn is_line(self) -> bool {
        !matches!(self, House::Box { .. })
    }
}

impl Display for House {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            House::Row { y } => write!(f, "row {}", y + 1),
            House::Column { x } => write!(f, "column {}", x + 1),
            House::Box { index } => write!(f, "box {}", index + 1),
        }
    }
}

/// Returns an iterator over all `(Digit, House)` pairs, digit-major.
pub fn all_digit_houses() -> impl Iterator<Item = (Digit, House)> + Clone {
    Digit::ALL
        .into_iter()
        .flat_map(|digit| House::ALL.into_iter().map(move |house| (digit, house)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_digit_houses_order() {
        let mut iter = all_digit_houses();
        assert_eq!(iter.next(), Some((Digit::D1, House::Row { y: 0 })));
        assert_eq!(iter.clone().count(), 9 * 27 - 1);
        assert_eq!(iter.last(), Some((Digit::D9, House::Box { index: 8 })));
    }

    #[test]
    fn test_positions_match_membership() {
        for house in House::ALL {
            assert_eq!(house.positions().len(), 9);
            for pos in house.positions() {
                assert!(pos.houses().contains(&house));
            }
        }
        assert_eq!(House::Column { x: 2 }.to_string(), "column 3");
        assert!(!House::Box { index: 0 }.is_line());
    }
}
