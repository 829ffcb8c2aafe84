//! Board state with incrementally maintained candidates.
//!
//! [`CandidateGrid`] stores, for every cell, either a placed value or the
//! digits still possible there, and for every digit the cells where it can
//! still go. Both views are updated together by [`CandidateGrid::set_value`]
//! and [`CandidateGrid::remove_candidate`].
//!
//! # Examples
//!
//! ```
//! use chainlace_core::{CandidateGrid, Digit, Position};
//!
//! let grid: CandidateGrid = "
//!     53..7....
//!     6..195...
//!     .98....6.
//!     8...6...3
//!     4..8.3..1
//!     7...2...6
//!     .6....28.
//!     ...419..5
//!     ....8..79
//! "
//! .parse()
//! .unwrap();
//!
//! assert_eq!(grid.value(Position::new(0, 0)), Some(Digit::D5));
//! assert!(grid.check_consistency().is_ok());
//! ```

use std::{
    fmt::{self, Display},
    str::FromStr,
};

use crate::{Digit, DigitPositions, DigitSet, House, Position};

/// A reason why a board cannot lead to a solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ConsistencyError {
    /// An unsolved cell has no candidate left.
    #[display("no candidate left at {position}")]
    EmptyCell {
        /// The empty cell.
        position: Position,
    },
    /// A digit is placed twice in one house.
    #[display("digit {digit} placed twice in {house}")]
    DuplicateValue {
        /// The house holding the duplicate.
        house: House,
        /// The duplicated digit.
        digit: Digit,
    },
    /// A digit is neither placed nor possible anywhere in a house.
    #[display("digit {digit} has no position left in {house}")]
    MissingDigit {
        /// The house missing the digit.
        house: House,
        /// The missing digit.
        digit: Digit,
    },
}

/// Errors produced when parsing a [`CandidateGrid`] from text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ParseGridError {
    /// A character other than a digit, `.`, `_`, `0` or whitespace.
    #[display("invalid character {ch:?} at cell {index}")]
    InvalidCharacter {
        /// The offending character.
        ch: char,
        /// Index of the cell being read.
        index: usize,
    },
    /// The input does not describe exactly 81 cells.
    #[display("expected 81 cells, found {count}")]
    WrongLength {
        /// Number of cells read.
        count: usize,
    },
    /// A given contradicts an earlier given in the same house.
    #[display("given {digit} at {position} conflicts with an earlier given")]
    ConflictingGiven {
        /// The cell of the conflicting given.
        position: Position,
        /// The conflicting digit.
        digit: Digit,
    },
}

/// The board state consumed by the deduction engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateGrid {
    values: [Option<Digit>; 81],
    candidates: [DigitSet; 81],
    positions: [DigitPositions; 9],
}

impl Default for CandidateGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl CandidateGrid {
    /// Creates an empty board where every digit is possible everywhere.
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: [None; 81],
            candidates: [DigitSet::FULL; 81],
            positions: [DigitPositions::FULL; 9],
        }
    }

    /// Places `digit` at `pos`.
    ///
    /// The cell's candidates are cleared and `digit` is removed from every
    /// peer. Returns `false` (and changes nothing) if the cell already holds
    /// a value.
    pub fn set_value(&mut self, pos: Position, digit: Digit) -> bool {
        if self.values[pos.index()].is_some() {
            return false;
        }
        self.values[pos.index()] = Some(digit);
        for d in self.candidates[pos.index()] {
            self.positions[d.index()].remove(pos);
        }
        self.candidates[pos.index()] = DigitSet::EMPTY;
        let peers = pos.house_peers() & self.positions[digit.index()];
        self.remove_candidate_with_mask(peers, digit);
        true
    }

    /// Removes `digit` from the candidates of `pos`.
    ///
    /// Returns `true` if the candidate was present.
    pub fn remove_candidate(&mut self, pos: Position, digit: Digit) -> bool {
        if !self.candidates[pos.index()].remove(digit) {
            return false;
        }
        self.positions[digit.index()].remove(pos);
        true
    }

    /// Removes `digit` from every cell in `mask`.
    ///
    /// Returns `true` if at least one candidate was removed.
    pub fn remove_candidate_with_mask(&mut self, mask: DigitPositions, digit: Digit) -> bool {
        let hit = mask & self.positions[digit.index()];
        for pos in hit {
            self.candidates[pos.index()].remove(digit);
        }
        self.positions[digit.index()] = self.positions[digit.index()].difference(hit);
        !hit.is_empty()
    }

    /// Returns the value placed at `pos`, if any.
    #[must_use]
    pub fn value(&self, pos: Position) -> Option<Digit> {
        self.values[pos.index()]
    }

    /// Returns the remaining candidates at `pos` (empty for solved cells).
    #[must_use]
    pub fn candidates_at(&self, pos: Position) -> DigitSet {
        self.candidates[pos.index()]
    }

    /// Returns the cells where `digit` is still a candidate.
    #[must_use]
    pub fn digit_positions(&self, digit: Digit) -> DigitPositions {
        self.positions[digit.index()]
    }

    /// Returns `true` if `digit` is still a candidate at `pos`.
    #[must_use]
    pub fn has_candidate(&self, pos: Position, digit: Digit) -> bool {
        self.positions[digit.index()].contains(pos)
    }

    /// Returns the cells without a placed value.
    #[must_use]
    pub fn unsolved_cells(&self) -> DigitPositions {
        Position::all()
            .filter(|pos| self.values[pos.index()].is_none())
            .collect()
    }

    /// Returns the unsolved cells with exactly two candidates.
    #[must_use]
    pub fn bivalue_cells(&self) -> DigitPositions {
        Position::all()
            .filter(|pos| self.candidates[pos.index()].len() == 2)
            .collect()
    }

    /// Returns the number of remaining candidates on the board.
    #[must_use]
    pub fn candidate_count(&self) -> usize {
        self.positions.iter().map(|p| p.len()).sum()
    }

    /// Returns `true` if every cell holds a value.
    #[must_use]
    pub fn is_solved(&self) -> bool {
        self.values.iter().all(Option::is_some)
    }

    /// Checks that the board can still lead to a solution.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConsistencyError`] found, scanning cells before
    /// houses.
    pub fn check_consistency(&self) -> Result<(), ConsistencyError> {
        for pos in self.unsolved_cells() {
            if self.candidates_at(pos).is_empty() {
                return Err(ConsistencyError::EmptyCell { position: pos });
            }
        }
        for house in House::ALL {
            let mut placed = DigitSet::EMPTY;
            for pos in house.positions() {
                if let Some(digit) = self.value(pos)
                    && !placed.insert(digit)
                {
                    return Err(ConsistencyError::DuplicateValue { house, digit });
                }
            }
            for digit in !placed {
                if (self.digit_positions(digit) & house.positions()).is_empty() {
                    return Err(ConsistencyError::MissingDigit { house, digit });
                }
            }
        }
        Ok(())
    }
}

impl FromStr for CandidateGrid {
    type Err = ParseGridError;

    /// Parses 81 cells in row-major order: `1`-`9` for givens and `.`, `_` or
    /// `0` for empty cells. Whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut grid = Self::new();
        let mut count = 0;
        for ch in s.chars().filter(|ch| !ch.is_whitespace()) {
            let value = match ch {
                '.' | '_' | '0' => None,
                '1'..='9' => ch
                    .to_digit(10)
                    .and_then(|v| u8::try_from(v).ok())
                    .and_then(Digit::try_from_value),
                _ => return Err(ParseGridError::InvalidCharacter { ch, index: count }),
            };
            if count >= 81 {
                count += 1;
                continue;
            }
            let pos = Position::from_index(count);
            if let Some(digit) = value {
                if !grid.has_candidate(pos, digit) {
                    return Err(ParseGridError::ConflictingGiven {
                        position: pos,
                        digit,
                    });
                }
                grid.set_value(pos, digit);
            }
            count += 1;
        }
        if count != 81 {
            return Err(ParseGridError::WrongLength { count });
        }
        Ok(grid)
    }
}

/// Formats the board as nine lines; placed values print as the digit,
/// unsolved cells as their candidates in braces.
impl Display for CandidateGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..9 {
            for x in 0..9 {
                let pos = Position::new(x, y);
                if x > 0 {
                    f.write_str(" ")?;
                }
                match self.value(pos) {
                    Some(digit) => write!(f, "{digit:<11}")?,
                    None => write!(f, "{:<11}", format!("{{{}}}", self.candidates_at(pos)))?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Digit::*;

    const CLASSIC: &str = "
        53..7....
        6..195...
        .98....6.
        8...6...3
        4..8.3..1
        7...2...6
        .6....28.
        ...419..5
        ....8..79
    ";

    #[test]
    fn test_new_has_all_candidates() {
        let grid = CandidateGrid::new();
        assert_eq!(grid.candidate_count(), 729);
        assert_eq!(grid.unsolved_cells(), DigitPositions::FULL);
        assert!(!grid.is_solved());
    }

    #[test]
    fn test_set_value_removes_from_peers() {
        let mut grid = CandidateGrid::new();
        let pos = Position::new(4, 4);
        assert!(grid.set_value(pos, D5));
        assert!(!grid.set_value(pos, D6));

        assert_eq!(grid.value(pos), Some(D5));
        assert!(grid.candidates_at(pos).is_empty());
        for peer in pos.house_peers() {
            assert!(!grid.has_candidate(peer, D5));
            assert_eq!(grid.candidates_at(peer).len(), 8);
        }
        assert!(grid.has_candidate(Position::new(0, 0), D5));
        assert_eq!(grid.digit_positions(D5).len(), 60);
        assert_eq!(grid.digit_positions(D6).len(), 80);
    }

    #[test]
    fn test_remove_candidate_keeps_views_in_sync() {
        let mut grid = CandidateGrid::new();
        let pos = Position::new(1, 2);
        assert!(grid.remove_candidate(pos, D3));
        assert!(!grid.remove_candidate(pos, D3));
        assert!(!grid.candidates_at(pos).contains(D3));
        assert!(!grid.digit_positions(D3).contains(pos));

        let row = House::Row { y: 0 }.positions();
        assert!(grid.remove_candidate_with_mask(row, D7));
        assert!(!grid.remove_candidate_with_mask(row, D7));
        assert!((grid.digit_positions(D7) & row).is_empty());
    }

    #[test]
    fn test_bivalue_cells() {
        let mut grid = CandidateGrid::new();
        let pos = Position::new(6, 6);
        for digit in Digit::ALL.into_iter().skip(2) {
            grid.remove_candidate(pos, digit);
        }
        assert_eq!(grid.bivalue_cells(), DigitPositions::from_elem(pos));
    }

    #[test]
    fn test_parse_classic() {
        let grid: CandidateGrid = CLASSIC.parse().unwrap();
        assert_eq!(grid.value(Position::new(1, 0)), Some(D3));
        assert_eq!(grid.value(Position::new(2, 0)), None);
        assert_eq!(grid.unsolved_cells().len(), 81 - 30);
        assert!(!grid.candidates_at(Position::new(2, 0)).contains(D5));
        assert!(grid.check_consistency().is_ok());
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            "12x".parse::<CandidateGrid>(),
            Err(ParseGridError::InvalidCharacter { ch: 'x', index: 2 })
        );
        assert_eq!(
            "123".parse::<CandidateGrid>(),
            Err(ParseGridError::WrongLength { count: 3 })
        );
        let conflict = format!("11{}", ".".repeat(79));
        assert_eq!(
            conflict.parse::<CandidateGrid>(),
            Err(ParseGridError::ConflictingGiven {
                position: Position::new(1, 0),
                digit: D1,
            })
        );
    }

    #[test]
    fn test_consistency_errors() {
        let mut grid = CandidateGrid::new();
        let pos = Position::new(0, 0);
        grid.remove_candidate_with_mask(DigitPositions::from_elem(pos), D1);
        for digit in Digit::ALL {
            grid.remove_candidate(pos, digit);
        }
        assert_eq!(
            grid.check_consistency(),
            Err(ConsistencyError::EmptyCell { position: pos })
        );

        let mut grid = CandidateGrid::new();
        grid.remove_candidate_with_mask(House::Row { y: 3 }.positions(), D4);
        assert_eq!(
            grid.check_consistency(),
            Err(ConsistencyError::MissingDigit {
                house: House::Row { y: 3 },
                digit: D4,
            })
        );
    }

    #[test]
    fn test_display_shows_values_and_candidates() {
        let grid: CandidateGrid = CLASSIC.parse().unwrap();
        let text = grid.to_string();
        let first = text.lines().next().unwrap();
        assert!(first.starts_with('5'));
        assert!(first.contains("{124}"));
        assert_eq!(text.lines().count(), 9);
    }
}
