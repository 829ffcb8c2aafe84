//! Core board types for the chainlace deduction engine.
//!
//! This crate holds everything the engine needs to know about a Sudoku board
//! without knowing anything about solving techniques:
//!
//! - [`Digit`], [`Position`] and [`House`]: type-safe coordinates.
//! - [`DigitSet`] and [`DigitPositions`]: fixed-width bitsets over digits and
//!   over the 81 cells.
//! - [`CandidateGrid`]: the board state. Each cell holds either a placed value
//!   or its remaining candidates, and per-digit position sets are kept in sync
//!   incrementally.
//!
//! # Examples
//!
//! ```
//! use chainlace_core::{CandidateGrid, Digit, Position};
//!
//! let mut grid = CandidateGrid::new();
//! grid.set_value(Position::new(4, 4), Digit::D5);
//!
//! // 5 is gone from the rest of the column
//! assert!(!grid.candidates_at(Position::new(4, 0)).contains(Digit::D5));
//! assert_eq!(grid.digit_positions(Digit::D5).len(), 81 - 21);
//! ```

pub mod candidate_grid;
pub mod digit;
pub mod digit_positions;
pub mod digit_set;
pub mod house;
pub mod position;

pub use self::{
    candidate_grid::{CandidateGrid, ConsistencyError, ParseGridError},
    digit::Digit,
    digit_positions::DigitPositions,
    digit_set::DigitSet,
    house::{House, all_digit_houses},
    position::Position,
};
