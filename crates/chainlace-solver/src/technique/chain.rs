use chainlace_core::CandidateGrid;

use crate::{
    ChainMode, ChainSearchConfig, ChainSolver, SolverError,
    technique::{BoxedTechnique, BoxedTechniqueStep, Technique},
};

/// A technique backed by one [`ChainMode`] of the chain engine.
///
/// Each call runs a fresh [`ChainSolver`], so the technique itself holds no
/// mutable state and can be shared between threads.
///
/// # Examples
///
/// ```
/// use chainlace_core::CandidateGrid;
/// use chainlace_solver::{
///     ChainMode,
///     technique::{ChainTechnique, Technique},
/// };
///
/// let technique = ChainTechnique::new(ChainMode::XChain);
/// assert_eq!(technique.name(), "X-Chain");
/// assert!(technique.find_step(&CandidateGrid::new())?.is_none());
/// # Ok::<(), chainlace_solver::SolverError>(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ChainTechnique {
    mode: ChainMode,
    config: ChainSearchConfig,
}

impl ChainTechnique {
    /// Creates a technique for `mode` with default limits.
    #[must_use]
    pub fn new(mode: ChainMode) -> Self {
        Self::with_config(mode, ChainSearchConfig::default())
    }

    /// Creates a technique for `mode` with the given limits.
    #[must_use]
    pub const fn with_config(mode: ChainMode, config: ChainSearchConfig) -> Self {
        Self { mode, config }
    }

    /// Returns the mode searched.
    #[must_use]
    pub const fn mode(&self) -> ChainMode {
        self.mode
    }
}

impl Technique for ChainTechnique {
    fn name(&self) -> &'static str {
        self.mode.name()
    }

    fn clone_box(&self) -> BoxedTechnique {
        Box::new(*self)
    }

    fn find_steps(&self, grid: &CandidateGrid) -> Result<Vec<BoxedTechniqueStep>, SolverError> {
        grid.check_consistency()?;
        Ok(ChainSolver::new(self.config)
            .find_chains(grid, self.mode)
            .into_iter()
            .map(|step| Box::new(step) as BoxedTechniqueStep)
            .collect())
    }
}
