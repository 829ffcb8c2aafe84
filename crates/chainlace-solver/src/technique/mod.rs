//! Solving techniques.
//!
//! Each technique implements the [`Technique`] trait and reports steps on a
//! [`CandidateGrid`](chainlace_core::CandidateGrid). The singles wrap the
//! single-candidate oracle; every [`ChainMode`] of the chain engine is
//! available as a [`ChainTechnique`].

use crate::ChainMode;
pub use crate::technique_step::{BoxedTechniqueStep, TechniqueStep, TechniqueStepData};
pub use self::{
    chain::ChainTechnique, hidden_single::HiddenSingle, naked_single::NakedSingle,
    traits::{BoxedTechnique, Technique},
};

mod chain;
mod hidden_single;
mod naked_single;
mod traits;

/// Returns all available techniques, from easiest to hardest.
#[must_use]
pub fn all_techniques() -> Vec<BoxedTechnique> {
    let mut techniques = fundamental_techniques();
    techniques.extend(all_chain_techniques());
    techniques
}

/// Returns the singles.
///
/// # Examples
///
/// ```
/// use chainlace_solver::technique;
///
/// let techniques = technique::fundamental_techniques();
/// assert_eq!(techniques.len(), 2);
/// ```
#[must_use]
pub fn fundamental_techniques() -> Vec<BoxedTechnique> {
    vec![Box::new(NakedSingle::new()), Box::new(HiddenSingle::new())]
}

/// Returns one [`ChainTechnique`] per [`ChainMode`], in [`ChainMode::ALL`]
/// order.
#[must_use]
pub fn all_chain_techniques() -> Vec<BoxedTechnique> {
    ChainMode::ALL
        .into_iter()
        .map(|mode| Box::new(ChainTechnique::new(mode)) as BoxedTechnique)
        .collect()
}
