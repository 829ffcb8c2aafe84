//! Test utilities for technique implementations.
//!
//! [`TechniqueTester`] keeps the initial and current state of a board,
//! applies a technique and compares the two.
//!
//! # Example
//!
//! ```
//! use chainlace_core::Position;
//! use chainlace_solver::{ChainMode, technique::ChainTechnique, testing::TechniqueTester};
//!
//! TechniqueTester::from_str(
//!     "
//!     8__ ___ ___
//!     __3 6__ ___
//!     _7_ _9_ 2__
//!     _5_ __7 ___
//!     ___ _45 7__
//!     ___ 1__ _3_
//!     __1 ___ _68
//!     __8 5__ _1_
//!     _9_ ___ 4__
//!     ",
//! )
//! .apply_once(&ChainTechnique::new(ChainMode::XChain))
//! .assert_no_change(Position::new(0, 0))
//! .assert_placed_none();
//! ```

use chainlace_core::{CandidateGrid, Digit, DigitSet, Position};

use crate::{BoxedTechniqueStep, TechniqueApplication, technique::Technique};

/// A test harness for verifying technique implementations.
///
/// All methods return `self`, so tests read as one chain of calls. Every
/// `apply_*` call also checks that the technique's `find_step` agrees with
/// what `apply` did, unless disabled with
/// [`without_find_step_consistency`](Self::without_find_step_consistency).
///
/// # Panics
///
/// All assertion methods panic with detailed messages on failure, using
/// `#[track_caller]` to report the correct source location.
#[derive(Debug)]
pub struct TechniqueTester {
    initial: CandidateGrid,
    current: CandidateGrid,
    check_find_step_consistency: bool,
}

impl TechniqueTester {
    /// Creates a new tester from an initial board.
    #[must_use]
    pub fn new(initial: CandidateGrid) -> Self {
        let current = initial.clone();
        Self {
            initial,
            current,
            check_find_step_consistency: true,
        }
    }

    /// Creates a new tester from a grid string.
    ///
    /// Digits `1`-`9` are givens; `.`, `_` or `0` are empty cells.
    /// Whitespace is ignored.
    ///
    /// # Panics
    ///
    /// Panics if the string cannot be parsed as a grid.
    #[track_caller]
    #[must_use]
    pub fn from_str(s: &str) -> Self {
        let grid = s.parse::<CandidateGrid>().unwrap();
        Self::new(grid)
    }

    /// Enables or disables `find_step` consistency checks.
    #[must_use]
    pub fn with_find_step_consistency(mut self, enabled: bool) -> Self {
        self.check_find_step_consistency = enabled;
        self
    }

    /// Disables `find_step`/`apply` consistency checks for this tester.
    #[must_use]
    pub fn without_find_step_consistency(self) -> Self {
        self.with_find_step_consistency(false)
    }

    /// Returns the current board.
    #[must_use]
    pub fn grid(&self) -> &CandidateGrid {
        &self.current
    }

    /// Applies the technique once.
    ///
    /// # Panics
    ///
    /// Panics if the technique returns an error.
    #[track_caller]
    pub fn apply_once<T>(mut self, technique: &T) -> Self
    where
        T: Technique,
    {
        self.apply_checked(technique);
        self
    }

    /// Applies the technique until it makes no more progress.
    ///
    /// # Panics
    ///
    /// Panics if the technique returns an error.
    #[track_caller]
    pub fn apply_until_stuck<T>(mut self, technique: &T) -> Self
    where
        T: Technique,
    {
        while self.apply_checked(technique) {}
        self
    }

    /// Applies the technique `times` times.
    ///
    /// # Panics
    ///
    /// Panics if the technique returns an error.
    #[track_caller]
    pub fn apply_times<T>(mut self, technique: &T, times: usize) -> Self
    where
        T: Technique,
    {
        for _ in 0..times {
            self.apply_checked(technique);
        }
        self
    }

    #[track_caller]
    fn apply_checked<T>(&mut self, technique: &T) -> bool
    where
        T: Technique,
    {
        let before = self.current.clone();
        let changed = technique.apply(&mut self.current).unwrap();
        if self.check_find_step_consistency {
            let name = technique.name();
            match technique.find_step(&before).unwrap() {
                None => {
                    assert!(
                        !changed,
                        "Expected {name} to report no change when find_step returned None"
                    );
                    assert_candidates_unchanged(&before, &self.current);
                }
                Some(step) => {
                    assert!(
                        changed,
                        "Expected {name} to report a change when find_step returned a step"
                    );
                    assert_step_applied(&before, &step, &self.current);
                }
            }
        }
        changed
    }

    /// Asserts that `digit` was placed at a previously unsolved cell.
    ///
    /// # Panics
    ///
    /// Panics if the cell was not placed as expected.
    #[track_caller]
    pub fn assert_placed(self, pos: Position, digit: Digit) -> Self {
        let initial = self.initial.value(pos);
        let current = self.current.value(pos);
        assert!(
            initial.is_none(),
            "Expected initial cell at {pos:?} to be unsolved, but it holds {initial:?}"
        );
        assert_eq!(
            current,
            Some(digit),
            "Expected cell at {pos:?} to hold {digit:?}, but it holds {current:?} with candidates {:?}",
            self.current.candidates_at(pos)
        );
        self
    }

    /// Asserts that no value was placed anywhere.
    ///
    /// # Panics
    ///
    /// Panics if any cell gained a value.
    #[track_caller]
    pub fn assert_placed_none(self) -> Self {
        for pos in Position::all() {
            assert_eq!(
                self.initial.value(pos),
                self.current.value(pos),
                "Expected no placement, but {pos:?} was placed"
            );
        }
        self
    }

    /// Asserts that all specified candidates were removed from a cell.
    ///
    /// Other candidates may also have been removed.
    ///
    /// # Panics
    ///
    /// Panics if a digit was not initially a candidate or is still one.
    #[track_caller]
    pub fn assert_removed_includes<C>(self, pos: Position, digits: C) -> Self
    where
        C: IntoIterator<Item = Digit>,
    {
        let digits = DigitSet::from_iter(digits);
        let initial = self.initial.candidates_at(pos);
        let current = self.current.candidates_at(pos);
        assert_eq!(
            initial & digits,
            digits,
            "Expected initial candidates at {pos:?} to include {digits:?}, but initial candidates are: {initial:?}"
        );
        assert!(
            (current & digits).is_empty(),
            "Expected all of {digits:?} to be removed from {pos:?}, but {current:?} still contains some: {:?}",
            current & digits
        );
        self
    }

    /// Asserts that exactly the specified candidates were removed from an
    /// unsolved cell.
    ///
    /// # Panics
    ///
    /// Panics if the removed candidates don't match, or the cell was placed.
    #[track_caller]
    pub fn assert_removed_exact<C>(self, pos: Position, digits: C) -> Self
    where
        C: IntoIterator<Item = Digit>,
    {
        let digits = DigitSet::from_iter(digits);
        let initial = self.initial.candidates_at(pos);
        let current = self.current.candidates_at(pos);
        assert!(
            self.current.value(pos).is_none(),
            "Expected {pos:?} to stay unsolved, but it holds {:?}",
            self.current.value(pos)
        );
        let removed = initial.difference(current);
        assert_eq!(
            removed, digits,
            "Expected exactly {digits:?} to be removed from {pos:?}, but removed candidates are: {removed:?} (initial: {initial:?}, current: {current:?})"
        );
        self
    }

    /// Asserts that a cell's value and candidates have not changed.
    ///
    /// # Panics
    ///
    /// Panics if the cell differs from the initial state.
    #[track_caller]
    pub fn assert_no_change(self, pos: Position) -> Self {
        let initial = (self.initial.value(pos), self.initial.candidates_at(pos));
        let current = (self.current.value(pos), self.current.candidates_at(pos));
        assert_eq!(
            initial, current,
            "Expected no change at {pos:?}, but cell changed from {initial:?} to {current:?}"
        );
        self
    }
}

#[track_caller]
fn assert_candidates_unchanged(before: &CandidateGrid, after: &CandidateGrid) {
    for digit in Digit::ALL {
        assert_eq!(
            before.digit_positions(digit),
            after.digit_positions(digit),
            "Expected candidates to remain unchanged for {digit:?}"
        );
    }
}

#[track_caller]
fn assert_step_applied(before: &CandidateGrid, step: &BoxedTechniqueStep, after: &CandidateGrid) {
    let name = step.technique_name();
    for application in step.application() {
        match application {
            TechniqueApplication::Placement { position, digit } => {
                assert_eq!(
                    after.value(position),
                    Some(digit),
                    "Expected {position:?} to hold {digit:?} after applying {name}"
                );
            }
            TechniqueApplication::CandidateElimination { positions, digits } => {
                for pos in positions {
                    for digit in digits {
                        if before.has_candidate(pos, digit) {
                            assert!(
                                !after.has_candidate(pos, digit),
                                "Expected {digit:?} to be removed from {pos:?} after applying {name}, but candidates are {:?}",
                                after.candidates_at(pos)
                            );
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chainlace_core::DigitPositions;

    use super::*;
    use crate::{
        SolverError,
        technique::{BoxedTechnique, TechniqueStepData},
    };

    const EMPTY: &str = "
        ___ ___ ___
        ___ ___ ___
        ___ ___ ___
        ___ ___ ___
        ___ ___ ___
        ___ ___ ___
        ___ ___ ___
        ___ ___ ___
        ___ ___ ___
    ";

    #[derive(Debug)]
    struct NoOpTechnique;

    impl Technique for NoOpTechnique {
        fn name(&self) -> &'static str {
            "no-op"
        }

        fn clone_box(&self) -> BoxedTechnique {
            Box::new(NoOpTechnique)
        }

        fn find_steps(&self, _grid: &CandidateGrid) -> Result<Vec<BoxedTechniqueStep>, SolverError> {
            Ok(Vec::new())
        }
    }

    fn place_d1_at_00() -> BoxedTechniqueStep {
        let cell = DigitPositions::from_elem(Position::new(0, 0));
        Box::new(TechniqueStepData::new(
            "place-d1-at-00",
            cell,
            vec![(cell, DigitSet::from_elem(Digit::D1))],
            vec![TechniqueApplication::Placement {
                position: Position::new(0, 0),
                digit: Digit::D1,
            }],
        ))
    }

    // Places 1 at r1c1 while the cell is unsolved.
    #[derive(Debug)]
    struct PlaceD1At00;

    impl Technique for PlaceD1At00 {
        fn name(&self) -> &'static str {
            "place-d1-at-00"
        }

        fn clone_box(&self) -> BoxedTechnique {
            Box::new(PlaceD1At00)
        }

        fn find_steps(&self, grid: &CandidateGrid) -> Result<Vec<BoxedTechniqueStep>, SolverError> {
            if grid.value(Position::new(0, 0)).is_some() {
                Ok(Vec::new())
            } else {
                Ok(vec![place_d1_at_00()])
            }
        }
    }

    // Reports a step but never applies it.
    #[derive(Debug)]
    struct InconsistentTechnique;

    impl Technique for InconsistentTechnique {
        fn name(&self) -> &'static str {
            "inconsistent"
        }

        fn clone_box(&self) -> BoxedTechnique {
            Box::new(InconsistentTechnique)
        }

        fn find_steps(&self, _grid: &CandidateGrid) -> Result<Vec<BoxedTechniqueStep>, SolverError> {
            Ok(vec![place_d1_at_00()])
        }

        fn apply(&self, _grid: &mut CandidateGrid) -> Result<bool, SolverError> {
            Ok(false)
        }
    }

    #[test]
    fn test_apply_until_stuck_stops() {
        let tester = TechniqueTester::from_str(EMPTY).apply_until_stuck(&PlaceD1At00);
        assert_eq!(tester.grid().value(Position::new(0, 0)), Some(Digit::D1));
    }

    #[test]
    fn test_apply_times() {
        let _ = TechniqueTester::from_str(EMPTY).apply_times(&NoOpTechnique, 5);
    }

    #[test]
    #[should_panic(expected = "Expected inconsistent to report a change")]
    fn test_find_step_consistency_panics_on_inconsistent_apply() {
        let _ = TechniqueTester::from_str(EMPTY).apply_once(&InconsistentTechnique);
    }

    #[test]
    fn test_find_step_consistency_opt_out() {
        let _ = TechniqueTester::from_str(EMPTY)
            .without_find_step_consistency()
            .apply_once(&InconsistentTechnique);
    }

    #[test]
    fn test_assert_placed() {
        let _ = TechniqueTester::from_str(EMPTY)
            .apply_once(&PlaceD1At00)
            .assert_placed(Position::new(0, 0), Digit::D1)
            .assert_removed_includes(Position::new(8, 0), [Digit::D1]);
    }

    #[test]
    #[should_panic(expected = "Expected cell at")]
    fn test_assert_placed_fails_when_not_placed() {
        let _ = TechniqueTester::from_str(EMPTY)
            .apply_once(&NoOpTechnique)
            .assert_placed(Position::new(0, 0), Digit::D1);
    }

    #[test]
    #[should_panic(expected = "Expected no placement")]
    fn test_assert_placed_none_fails_after_placement() {
        let _ = TechniqueTester::from_str(EMPTY)
            .apply_once(&PlaceD1At00)
            .assert_placed_none();
    }

    #[test]
    fn test_assert_no_change_on_given() {
        let _ = TechniqueTester::from_str(
            "
            1__ ___ ___
            ___ ___ ___
            ___ ___ ___
            ___ ___ ___
            ___ ___ ___
            ___ ___ ___
            ___ ___ ___
            ___ ___ ___
            ___ ___ ___
            ",
        )
        .apply_once(&PlaceD1At00)
        .assert_no_change(Position::new(0, 0))
        .assert_no_change(Position::new(5, 5));
    }

    #[test]
    #[should_panic(expected = "Expected no change at")]
    fn test_assert_no_change_fails_when_changed() {
        let _ = TechniqueTester::from_str(EMPTY)
            .apply_once(&PlaceD1At00)
            .assert_no_change(Position::new(0, 0));
    }
}
