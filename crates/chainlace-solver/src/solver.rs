//! The chain engine entry point.

use std::fmt::{self, Display};

use chainlace_core::{CandidateGrid, Digit};
use log::debug;

use crate::{
    catalog::Catalog,
    chain_search::{SimpleChainSearch, SimpleMode},
    checks::Checker,
    config::ChainSearchConfig,
    links::LinkGraph,
    node::{Candidate, NodeKind},
    step::{Deduction, StepCollector},
    table::{TableBuilder, TableStore, expand_tables},
};

/// Family of deductions searched by one [`ChainSolver::find_chains`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::IsVariant)]
pub enum ChainMode {
    /// Single-digit alternating chains.
    XChain,
    /// Chains through bivalue cells.
    XyChain,
    /// XY-Chains over one repeated pair.
    RemotePair,
    /// Nice loops over normal nodes.
    NiceLoop,
    /// Nice loops with group and ALS nodes.
    GroupedNiceLoop,
    /// Alternating inference chains over normal nodes.
    Aic,
    /// Alternating inference chains with group and ALS nodes.
    GroupedAic,
    /// Contradictions and verities from implication tables.
    ForcingChain,
    /// Forcing chains that also follow singles.
    ForcingNet,
}

impl ChainMode {
    /// Every mode, from easiest to hardest.
    pub const ALL: [Self; 9] = [
        Self::XChain,
        Self::XyChain,
        Self::RemotePair,
        Self::NiceLoop,
        Self::GroupedNiceLoop,
        Self::Aic,
        Self::GroupedAic,
        Self::ForcingChain,
        Self::ForcingNet,
    ];

    /// Returns the human-readable name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::XChain => "X-Chain",
            Self::XyChain => "XY-Chain",
            Self::RemotePair => "Remote Pair",
            Self::NiceLoop => "Nice Loop",
            Self::GroupedNiceLoop => "Grouped Nice Loop",
            Self::Aic => "AIC",
            Self::GroupedAic => "Grouped AIC",
            Self::ForcingChain => "Forcing Chain",
            Self::ForcingNet => "Forcing Net",
        }
    }

    /// Returns `true` if the mode uses group and ALS nodes.
    #[must_use]
    pub const fn is_grouped(self) -> bool {
        matches!(self, Self::GroupedNiceLoop | Self::GroupedAic)
    }

    const fn simple(self) -> Option<SimpleMode> {
        match self {
            Self::XChain => Some(SimpleMode::XChain),
            Self::XyChain => Some(SimpleMode::XyChain),
            Self::RemotePair => Some(SimpleMode::RemotePair),
            _ => None,
        }
    }
}

impl Display for ChainMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Finds chain-based deductions on a candidate grid.
///
/// The solver owns every scratch buffer of the search: the link graph, the
/// group and ALS catalog, the implication tables and a scratch grid for
/// forcing nets. Buffers are reset at the start of each call and reused
/// across calls. The caller's grid is never modified.
///
/// # Examples
///
/// ```
/// use chainlace_core::CandidateGrid;
/// use chainlace_solver::{ChainMode, ChainSolver};
///
/// let grid: CandidateGrid =
///     "8..........36......7..9.2...5...7.......457.....1...3...1....68..85...1..9....4.."
///         .parse()?;
/// let mut solver = ChainSolver::default();
/// for step in solver.find_chains(&grid, ChainMode::XChain) {
///     println!("{step}");
/// }
/// # Ok::<(), chainlace_core::ParseGridError>(())
/// ```
#[derive(Debug)]
pub struct ChainSolver {
    config: ChainSearchConfig,
    links: LinkGraph,
    store: TableStore,
    catalog: Catalog,
    scratch: CandidateGrid,
    collector: StepCollector,
}

impl Default for ChainSolver {
    fn default() -> Self {
        Self::new(ChainSearchConfig::default())
    }
}

impl ChainSolver {
    /// Creates a solver with the given limits.
    #[must_use]
    pub fn new(config: ChainSearchConfig) -> Self {
        Self {
            config,
            links: LinkGraph::default(),
            store: TableStore::default(),
            catalog: Catalog::default(),
            scratch: CandidateGrid::new(),
            collector: StepCollector::default(),
        }
    }

    /// Returns the limits in use.
    #[must_use]
    pub fn config(&self) -> &ChainSearchConfig {
        &self.config
    }

    /// Returns every deduction of `mode` on `grid`, best first.
    ///
    /// Deductions with the same effect are reported once, with the shortest
    /// justification found. An empty list means nothing was found.
    pub fn find_chains(&mut self, grid: &CandidateGrid, mode: ChainMode) -> Vec<Deduction> {
        self.collector.clear();
        if let Some(simple) = mode.simple() {
            self.links.rebuild(grid);
            SimpleChainSearch::new(grid, &self.links, self.config.max_chain_length, &mut self.collector)
                .run(simple);
        } else {
            self.search_tables(grid, mode);
        }
        let steps = self.collector.take_ranked();
        debug!("{mode}: {} deductions", steps.len());
        steps
    }

    fn search_tables(&mut self, grid: &CandidateGrid, mode: ChainMode) {
        let grouped = mode.is_grouped();
        let nets = mode == ChainMode::ForcingNet;
        self.store.clear();
        self.catalog.clear();
        if grouped {
            self.catalog.rebuild(grid, self.config.max_als_size);
            debug!(
                "{mode}: {} group nodes, {} almost locked sets",
                self.catalog.len(NodeKind::Group),
                self.catalog.len(NodeKind::Als)
            );
        }
        TableBuilder::new(grid, &self.catalog, &self.config, grouped, nets)
            .build_all(&mut self.store, &mut self.scratch);
        expand_tables(&mut self.store);
        let (tables, entries) = self.store.size();
        debug!("{mode}: {tables} tables, {entries} entries");

        let checker = Checker::new(grid, &self.store, &self.catalog, &self.config, nets);
        let out = &mut self.collector;
        match mode {
            ChainMode::NiceLoop | ChainMode::GroupedNiceLoop => {
                for table in self.store.normal_tables() {
                    checker.check_nice_loops(table, out);
                }
            }
            ChainMode::Aic | ChainMode::GroupedAic => {
                for table in self.store.normal_tables() {
                    checker.check_aics(table, out);
                }
            }
            ChainMode::ForcingChain | ChainMode::ForcingNet => {
                for table in self.store.normal_tables() {
                    checker.check_one_chain(table, out);
                }
                for digit in Digit::ALL {
                    for position in grid.digit_positions(digit) {
                        checker.check_two_chains(Candidate::new(position, digit), out);
                    }
                }
                checker.check_all_chains(out);
            }
            ChainMode::XChain | ChainMode::XyChain | ChainMode::RemotePair => {}
        }
    }
}
