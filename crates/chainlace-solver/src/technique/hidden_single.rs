use chainlace_core::{CandidateGrid, DigitSet};

use crate::{
    SolverError, TechniqueApplication,
    singles::{SingleKind, find_singles},
    technique::{BoxedTechnique, BoxedTechniqueStep, Technique},
    technique_step::TechniqueStepData,
};

const NAME: &str = "Hidden Single";

/// A technique that finds digits that can only go in one position within a house.
///
/// A "hidden single" occurs when a digit has only one possible position in a row,
/// column, or box, even though that cell may have multiple candidates.
///
/// # Examples
///
/// ```
/// use chainlace_core::CandidateGrid;
/// use chainlace_solver::technique::{HiddenSingle, Technique};
///
/// let mut grid = CandidateGrid::new();
/// let changed = HiddenSingle::new().apply(&mut grid)?;
/// assert!(!changed);
/// # Ok::<(), chainlace_solver::SolverError>(())
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct HiddenSingle {}

impl HiddenSingle {
    /// Creates a new `HiddenSingle` technique.
    #[must_use]
    pub const fn new() -> Self {
        Self {}
    }
}

impl Technique for HiddenSingle {
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
            .filter_map(|single| {
                let SingleKind::Hidden(house) = single.kind else {
                    return None;
                };
                let step: BoxedTechniqueStep = Box::new(TechniqueStepData::new(
                    NAME,
                    house.positions(),
                    vec![(house.positions(), DigitSet::from_elem(single.digit))],
                    vec![TechniqueApplication::Placement {
                        position: single.position,
                        digit: single.digit,
                    }],
                ));
                Some(step)
            })
            .collect())
    }

    /// Places every hidden single at once.
    fn apply(&self, grid: &mut CandidateGrid) -> Result<bool, SolverError> {
        let mut changed = false;
        for step in self.find_steps(grid)? {
            changed |= step.apply_to(grid);
        }
        Ok(changed)
    }
}
