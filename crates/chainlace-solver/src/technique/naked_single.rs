use chainlace_core::{CandidateGrid, DigitPositions, DigitSet};

use crate::{
    SolverError, TechniqueApplication,
    singles::find_singles,
    technique::{BoxedTechnique, BoxedTechniqueStep, Technique},
    technique_step::TechniqueStepData,
};

const NAME: &str = "Naked Single";

/// A technique that places the last candidate of a cell.
///
/// # Examples
///
/// ```
/// use chainlace_core::{CandidateGrid, Digit, Position};
/// use chainlace_solver::technique::{NakedSingle, Technique};
///
/// let mut grid = CandidateGrid::new();
/// for digit in Digit::ALL.into_iter().skip(1) {
///     grid.remove_candidate(Position::new(2, 2), digit);
/// }
/// assert!(NakedSingle::new().apply(&mut grid)?);
/// assert_eq!(grid.value(Position::new(2, 2)), Some(Digit::D1));
/// # Ok::<(), chainlace_solver::SolverError>(())
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct NakedSingle;

impl NakedSingle {
    /// Creates a new `NakedSingle` technique.
    #[must_use]
    pub const fn new() -> Self {
        NakedSingle
    }
}

impl Technique for NakedSingle {
    fn name(&self) -> &'static str {
        NAME
    }

    fn clone_box(&self) -> BoxedTechnique {
        Box::new(*self)
    }

    fn find_steps(&self, grid: &CandidateGrid) -> Result<Vec<BoxedTechniqueStep>, SolverError> {
        grid.check_consistency()?;
        Ok(find_singles(grid)
            .into_iter()
            .filter(|single| single.kind.is_naked())
            .map(|single| {
                let cell = DigitPositions::from_elem(single.position);
                let step: BoxedTechniqueStep = Box::new(TechniqueStepData::new(
                    NAME,
                    cell,
                    vec![(cell, DigitSet::from_elem(single.digit))],
                    vec![TechniqueApplication::Placement {
                        position: single.position,
                        digit: single.digit,
                    }],
                ));
                step
            })
            .collect())
    }

    /// Places every naked single at once.
    fn apply(&self, grid: &mut CandidateGrid) -> Result<bool, SolverError> {
        let mut changed = false;
        for step in self.find_steps(grid)? {
            changed |= step.apply_to(grid);
        }
        Ok(changed)
    }
}
