/// Limits and tuning knobs for [`ChainSolver`](crate::ChainSolver).
///
/// # Examples
///
/// ```
/// use chainlace_solver::ChainSearchConfig;
///
/// let config = ChainSearchConfig::default()
///     .with_max_chain_length(12)
///     .with_net_lookahead(2);
/// assert_eq!(config.max_chain_length, 12);
/// assert_eq!(config.table_capacity, 2048);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainSearchConfig {
    /// Maximum number of nodes in a chain found by depth-first search.
    pub max_chain_length: usize,
    /// Maximum number of entries in one implication table.
    pub table_capacity: usize,
    /// Rounds of singles run after each assumption in forcing nets.
    pub net_lookahead: usize,
    /// Largest almost locked set considered, in cells.
    pub max_als_size: usize,
    /// Maximum side branches attached to one reconstructed chain.
    pub max_branches: usize,
    /// Maximum nesting of tables followed while rebuilding one chain.
    pub max_reconstruction_depth: usize,
}

impl Default for ChainSearchConfig {
    fn default() -> Self {
        Self {
            max_chain_length: 20,
            table_capacity: 2048,
            net_lookahead: 4,
            max_als_size: 4,
            max_branches: 16,
            max_reconstruction_depth: 64,
        }
    }
}

impl ChainSearchConfig {
    /// Sets [`max_chain_length`](Self::max_chain_length).
    #[must_use]
    pub fn with_max_chain_length(mut self, value: usize) -> Self {
        self.max_chain_length = value;
        self
    }

    /// Sets [`table_capacity`](Self::table_capacity).
    #[must_use]
    pub fn with_table_capacity(mut self, value: usize) -> Self {
        self.table_capacity = value;
        self
    }

    /// Sets [`net_lookahead`](Self::net_lookahead).
    #[must_use]
    pub fn with_net_lookahead(mut self, value: usize) -> Self {
        self.net_lookahead = value;
        self
    }

    /// Sets [`max_als_size`](Self::max_als_size).
    #[must_use]
    pub fn with_max_als_size(mut self, value: usize) -> Self {
        self.max_als_size = value;
        self
    }

    /// Sets [`max_branches`](Self::max_branches).
    #[must_use]
    pub fn with_max_branches(mut self, value: usize) -> Self {
        self.max_branches = value;
        self
    }

    /// Sets [`max_reconstruction_depth`](Self::max_reconstruction_depth).
    #[must_use]
    pub fn with_max_reconstruction_depth(mut self, value: usize) -> Self {
        self.max_reconstruction_depth = value;
        self
    }
}
