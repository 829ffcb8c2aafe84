//! Naked and hidden singles.
//!
//! The chain engine uses singles as a cheap oracle when following an
//! assumption in forcing nets; the singles techniques wrap the same search.

use chainlace_core::{CandidateGrid, Digit, DigitPositions, House, Position};

/// Why a single is forced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::IsVariant)]
pub enum SingleKind {
    /// The cell has one candidate left.
    Naked,
    /// The digit has one position left in the house.
    Hidden(House),
}

/// A digit that must be placed in a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Single {
    /// The cell.
    pub position: Position,
    /// The digit to place.
    pub digit: Digit,
    /// Why the digit is forced.
    pub kind: SingleKind,
}

/// Finds every single on `grid`, at most one per cell.
///
/// Naked singles come first in cell order, then hidden singles digit by
/// digit over rows, columns and boxes. A cell that is both keeps its naked
/// single.
///
/// # Examples
///
/// ```
/// use chainlace_core::{CandidateGrid, Digit, Position};
/// use chainlace_solver::singles::{SingleKind, find_singles};
///
/// let mut grid = CandidateGrid::new();
/// for digit in Digit::ALL.into_iter().skip(1) {
///     grid.remove_candidate(Position::new(4, 4), digit);
/// }
/// let singles = find_singles(&grid);
/// assert_eq!(singles[0].digit, Digit::D1);
/// assert_eq!(singles[0].kind, SingleKind::Naked);
/// ```
#[must_use]
pub fn find_singles(grid: &CandidateGrid) -> Vec<Single> {
    let mut singles = Vec::new();
    let mut taken = DigitPositions::EMPTY;
    for position in grid.unsolved_cells() {
        if let Some(digit) = grid.candidates_at(position).as_single() {
            singles.push(Single {
                position,
                digit,
                kind: SingleKind::Naked,
            });
            taken.insert(position);
        }
    }
    for digit in Digit::ALL {
        let positions = grid.digit_positions(digit);
        for house in House::ALL {
            if let Some(position) = (positions & house.positions()).as_single()
                && taken.insert(position)
            {
                singles.push(Single {
                    position,
                    digit,
                    kind: SingleKind::Hidden(house),
                });
            }
        }
    }
    singles
}

#[cfg(test)]
mod tests {
    use chainlace_core::Digit::*;

    use super::*;

    #[test]
    fn test_empty_grid_has_no_single() {
        assert!(find_singles(&CandidateGrid::new()).is_empty());
    }

    #[test]
    fn test_hidden_single_records_house() {
        let mut grid = CandidateGrid::new();
        let target = Position::new(3, 2);
        for pos in (House::Row { y: 2 }).positions() {
            if pos != target {
                grid.remove_candidate(pos, D6);
            }
        }
        let singles = find_singles(&grid);
        assert_eq!(
            singles,
            vec![Single {
                position: target,
                digit: D6,
                kind: SingleKind::Hidden(House::Row { y: 2 }),
            }]
        );
    }

    #[test]
    fn test_one_single_per_cell() {
        let mut grid = CandidateGrid::new();
        let target = Position::new(0, 0);
        for digit in Digit::ALL {
            if digit != D3 {
                grid.remove_candidate(target, digit);
            }
        }
        // also the last place for 3 in column 1
        for pos in (House::Column { x: 0 }).positions() {
            if pos != target {
                grid.remove_candidate(pos, D3);
            }
        }
        let singles = find_singles(&grid);
        assert_eq!(singles.len(), 1);
        assert!(singles[0].kind.is_naked());
    }

    #[test]
    fn test_solved_cells_are_skipped() {
        let grid: CandidateGrid = "
            534678912 672195348 198342567
            859761423 426853791 713924856
            961537284 287419635 345286179
        "
        .parse()
        .unwrap();
        assert!(grid.is_solved());
        assert!(find_singles(&grid).is_empty());
    }
}
