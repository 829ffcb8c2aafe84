use chainlace_core::ConsistencyError;

use crate::node::NodeState;

/// Errors reported by techniques and the technique solver.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    derive_more::Display,
    derive_more::Error,
    derive_more::From,
    derive_more::IsVariant,
)]
pub enum SolverError {
    /// The grid cannot lead to a solution.
    #[display("inconsistency detected: {_0}")]
    Inconsistent(#[from] ConsistencyError),
}

/// Internal failures of the implication-table engine.
///
/// These never reach callers of the engine; the affected table or chain is
/// abandoned and the failure is logged.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    derive_more::Display,
    derive_more::Error,
    derive_more::IsVariant,
)]
pub(crate) enum TableError {
    /// A table would grow beyond its fixed number of entries.
    #[display("table for {root} exceeded its capacity of {capacity} entries")]
    CapacityExceeded {
        /// Starting state of the overflowing table.
        root: NodeState,
        /// Configured capacity.
        capacity: usize,
    },
    /// A back-reference or expanded entry could not be resolved.
    #[display("no entry for {state} in the table for {root}")]
    MissingEntry {
        /// Starting state of the table being read.
        root: NodeState,
        /// State that was looked up.
        state: NodeState,
    },
    /// Chain reconstruction descended too deep into nested tables.
    #[display("chain reconstruction exceeded depth {depth}")]
    DepthExceeded {
        /// Configured depth limit.
        depth: usize,
    },
}
