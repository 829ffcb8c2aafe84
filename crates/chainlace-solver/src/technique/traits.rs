use std::fmt::Debug;

use chainlace_core::CandidateGrid;

use crate::{BoxedTechniqueStep, SolverError};

/// A solving technique over a [`CandidateGrid`].
///
/// Implementations report steps without touching the grid; applying a step
/// is a separate call, so hint systems can show a step before it is played.
pub trait Technique: Debug + Send + Sync {
    /// Returns the name of the technique.
    fn name(&self) -> &'static str;

    /// Returns a boxed clone of the technique.
    fn clone_box(&self) -> BoxedTechnique;

    /// Finds every step the technique allows on `grid`, best first.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::Inconsistent`] if the grid cannot lead to a
    /// solution.
    fn find_steps(&self, grid: &CandidateGrid) -> Result<Vec<BoxedTechniqueStep>, SolverError>;

    /// Finds the best step without mutating the grid.
    ///
    /// Returns `Ok(None)` when this technique has no applicable step.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::Inconsistent`] if the grid cannot lead to a
    /// solution.
    fn find_step(&self, grid: &CandidateGrid) -> Result<Option<BoxedTechniqueStep>, SolverError> {
        Ok(self.find_steps(grid)?.into_iter().next())
    }

    /// Applies the best step to `grid`.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The technique was applied and the grid was updated
    /// * `Ok(false)` - The technique found nothing to change
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::Inconsistent`] if the grid cannot lead to a
    /// solution.
    fn apply(&self, grid: &mut CandidateGrid) -> Result<bool, SolverError> {
        Ok(self
            .find_step(grid)?
            .is_some_and(|step| step.apply_to(grid)))
    }
}

/// A boxed technique.
pub type BoxedTechnique = Box<dyn Technique>;

impl Clone for BoxedTechnique {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}
