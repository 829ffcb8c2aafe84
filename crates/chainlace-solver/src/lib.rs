//! Chain-based deduction engine for Sudoku.
//!
//! Given a [`CandidateGrid`](chainlace_core::CandidateGrid), the engine finds
//! eliminations and placements that follow from chains of strong and weak
//! links between candidates, and explains each one with the chains that
//! prove it.
//!
//! - [`ChainSolver`] searches one [`ChainMode`] at a time and returns
//!   ranked [`Deduction`]s.
//! - [`technique`] wraps the singles and every chain mode behind the
//!   [`Technique`](technique::Technique) trait.
//! - [`TechniqueSolver`] applies techniques in order until a board is solved
//!   or stuck.
//!
//! # Examples
//!
//! ```
//! use chainlace_core::CandidateGrid;
//! use chainlace_solver::{ChainMode, ChainSolver};
//!
//! let grid: CandidateGrid =
//!     "8..........36......7..9.2...5...7.......457.....1...3...1....68..85...1..9....4.."
//!         .parse()?;
//! let mut solver = ChainSolver::default();
//! for step in solver.find_chains(&grid, ChainMode::Aic).iter().take(3) {
//!     assert!(!step.chains().is_empty());
//!     println!("{step}");
//! }
//! # Ok::<(), chainlace_core::ParseGridError>(())
//! ```

pub use self::{
    chain::Chain,
    config::ChainSearchConfig,
    error::SolverError,
    links::LinkStrength,
    node::{Candidate, CandidateState, ChainNode, NodeKind, Polarity},
    solver::{ChainMode, ChainSolver},
    step::{Deduction, DeductionKind, TechniqueApplication, rank_deductions},
    technique_solver::{TechniqueSolver, TechniqueSolverStats},
    technique_step::{
        BoxedTechniqueStep, ConditionCells, ConditionDigitCells, TechniqueStep, TechniqueStepData,
    },
};

mod catalog;
mod chain;
mod chain_search;
mod checks;
mod config;
mod error;
mod links;
mod node;
mod reconstruct;
pub mod singles;
mod solver;
mod step;
mod table;
pub mod technique;
mod technique_solver;
mod technique_step;
pub mod testing;
