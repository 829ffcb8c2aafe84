use chainlace_core::CandidateGrid;
use log::trace;

use crate::{
    BoxedTechniqueStep, SolverError,
    technique::{self, BoxedTechnique},
};

/// Per-technique application counts of a [`TechniqueSolver`] run.
#[derive(Debug, Clone)]
pub struct TechniqueSolverStats {
    applications: Vec<usize>,
    total_steps: usize,
}

impl TechniqueSolverStats {
    /// Returns technique application counts in solver order.
    ///
    /// Includes techniques that were never applied with a count of `0`.
    #[must_use]
    pub fn applications(&self) -> &[usize] {
        &self.applications
    }

    /// Returns the total number of solving steps taken.
    #[must_use]
    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    /// Returns `true` if any technique was applied at least once.
    #[must_use]
    pub fn has_progress(&self) -> bool {
        self.total_steps > 0
    }
}

/// A solver that applies techniques to a grid in a fixed order.
///
/// Each [`step`](Self::step) applies the first technique that changes the
/// grid and starts over from the first technique on the next call, so the
/// chain techniques of [`with_all_techniques`](Self::with_all_techniques)
/// only run when the singles are stuck.
///
/// # Examples
///
/// ```
/// use chainlace_core::CandidateGrid;
/// use chainlace_solver::{TechniqueSolver, technique};
///
/// let solver = TechniqueSolver::new(technique::fundamental_techniques());
/// let mut grid: CandidateGrid =
///     "53..7....6..195....98....6.8...6...34..8.3..17...2...6.6....28....419..5....8..79"
///         .parse()?;
///
/// let (solved, stats) = solver.solve(&mut grid)?;
/// assert!(solved);
/// assert!(stats.total_steps() > 0);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct TechniqueSolver {
    techniques: Vec<BoxedTechnique>,
}

impl TechniqueSolver {
    /// Creates a solver applying `techniques` in order.
    ///
    /// # Examples
    ///
    /// ```
    /// use chainlace_solver::{
    ///     ChainMode, TechniqueSolver,
    ///     technique::{BoxedTechnique, ChainTechnique, NakedSingle},
    /// };
    ///
    /// let techniques: Vec<BoxedTechnique> = vec![
    ///     Box::new(NakedSingle::new()),
    ///     Box::new(ChainTechnique::new(ChainMode::XyChain)),
    /// ];
    /// let solver = TechniqueSolver::new(techniques);
    /// assert_eq!(solver.techniques()[1].name(), "XY-Chain");
    /// ```
    #[must_use]
    pub fn new(techniques: Vec<BoxedTechnique>) -> Self {
        Self { techniques }
    }

    /// Creates a solver with the singles followed by every chain mode.
    #[must_use]
    pub fn with_all_techniques() -> Self {
        Self {
            techniques: technique::all_techniques(),
        }
    }

    /// Creates a statistics object aligned with this solver's technique order.
    #[must_use]
    pub fn new_stats(&self) -> TechniqueSolverStats {
        TechniqueSolverStats {
            applications: vec![0; self.techniques.len()],
            total_steps: 0,
        }
    }

    /// Returns the configured techniques in application order.
    ///
    /// The returned slice defines the index mapping used by
    /// [`TechniqueSolverStats::applications`].
    #[must_use]
    pub fn techniques(&self) -> &[BoxedTechnique] {
        &self.techniques
    }

    /// Applies the first technique that changes `grid`.
    ///
    /// Returns `Ok(false)` when no technique makes progress.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::Inconsistent`] if the grid is, or becomes,
    /// inconsistent.
    pub fn step(
        &self,
        grid: &mut CandidateGrid,
        stats: &mut TechniqueSolverStats,
    ) -> Result<bool, SolverError> {
        debug_assert_eq!(self.techniques.len(), stats.applications.len());
        grid.check_consistency()?;

        for (i, technique) in self.techniques.iter().enumerate() {
            if technique.apply(grid)? {
                trace!("applied {}", technique.name());
                stats.applications[i] += 1;
                stats.total_steps += 1;
                grid.check_consistency()?;
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Finds the next available hint step without mutating the grid.
    ///
    /// Returns `Ok(None)` when no technique can provide a step.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::Inconsistent`] if the grid is inconsistent.
    pub fn find_step(&self, grid: &CandidateGrid) -> Result<Option<BoxedTechniqueStep>, SolverError> {
        grid.check_consistency()?;
        for technique in &self.techniques {
            if let Some(step) = technique.find_step(grid)? {
                return Ok(Some(step));
            }
        }
        Ok(None)
    }

    /// Applies techniques until the grid is solved or no progress can be made.
    ///
    /// Returns whether the grid is solved, with fresh statistics.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::Inconsistent`] if the grid becomes inconsistent
    /// during solving.
    pub fn solve(&self, grid: &mut CandidateGrid) -> Result<(bool, TechniqueSolverStats), SolverError> {
        let mut stats = self.new_stats();
        let solved = self.solve_with_stats(grid, &mut stats)?;
        Ok((solved, stats))
    }

    /// Like [`solve`](Self::solve), accumulating into existing statistics.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::Inconsistent`] if the grid becomes inconsistent
    /// during solving.
    pub fn solve_with_stats(
        &self,
        grid: &mut CandidateGrid,
        stats: &mut TechniqueSolverStats,
    ) -> Result<bool, SolverError> {
        while self.step(grid, stats)? {
            if grid.is_solved() {
                return Ok(true);
            }
        }
        Ok(grid.is_solved())
    }
}
