//! Deductions, their ranking and signature-based deduplication.

use std::{
    cmp::Ordering,
    fmt::{self, Display},
    mem,
};

use chainlace_core::{CandidateGrid, Digit, DigitPositions, DigitSet, Position};
use log::trace;
use rustc_hash::FxHashMap;

use crate::{
    chain::Chain,
    node::{Candidate, CandidateState, NodeKind},
};

/// Classification of a deduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::IsVariant)]
pub enum DeductionKind {
    /// Alternating single-digit chain.
    XChain,
    /// Chain through bivalue cells.
    XyChain,
    /// XY-Chain where every cell holds the same pair.
    RemotePair,
    /// Nice loop whose every link holds in both directions.
    ContinuousNiceLoop,
    /// Nice loop broken at its start cell.
    DiscontinuousNiceLoop,
    /// Continuous nice loop using group or ALS nodes.
    GroupedContinuousNiceLoop,
    /// Discontinuous nice loop using group or ALS nodes.
    GroupedDiscontinuousNiceLoop,
    /// Alternating inference chain.
    Aic,
    /// Alternating inference chain using group or ALS nodes.
    GroupedAic,
    /// An assumption leads to a contradiction.
    ForcingChainContradiction,
    /// Every alternative leads to the same conclusion.
    ForcingChainVerity,
    /// An assumption leads to a contradiction, singles included.
    ForcingNetContradiction,
    /// Every alternative leads to the same conclusion, singles included.
    ForcingNetVerity,
}

impl DeductionKind {
    /// Returns the human-readable technique name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            DeductionKind::XChain => "X-Chain",
            DeductionKind::XyChain => "XY-Chain",
            DeductionKind::RemotePair => "Remote Pair",
            DeductionKind::ContinuousNiceLoop => "Continuous Nice Loop",
            DeductionKind::DiscontinuousNiceLoop => "Discontinuous Nice Loop",
            DeductionKind::GroupedContinuousNiceLoop => "Grouped Continuous Nice Loop",
            DeductionKind::GroupedDiscontinuousNiceLoop => "Grouped Discontinuous Nice Loop",
            DeductionKind::Aic => "AIC",
            DeductionKind::GroupedAic => "Grouped AIC",
            DeductionKind::ForcingChainContradiction => "Forcing Chain Contradiction",
            DeductionKind::ForcingChainVerity => "Forcing Chain Verity",
            DeductionKind::ForcingNetContradiction => "Forcing Net Contradiction",
            DeductionKind::ForcingNetVerity => "Forcing Net Verity",
        }
    }
}

impl Display for DeductionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Concrete changes produced by applying a deduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TechniqueApplication {
    /// Place a digit in a single cell.
    Placement {
        /// Cell to place the digit into.
        position: Position,
        /// Digit to place.
        digit: Digit,
    },
    /// Remove candidates from the specified positions.
    CandidateElimination {
        /// Positions where candidates are removed.
        positions: DigitPositions,
        /// Digits to remove from the specified positions.
        digits: DigitSet,
    },
}

/// A logical deduction: placements and/or eliminations with the chains
/// that justify them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deduction {
    kind: DeductionKind,
    placements: Vec<Candidate>,
    eliminations: Vec<Candidate>,
    chains: Vec<Chain>,
}

impl Deduction {
    pub(crate) fn new(
        kind: DeductionKind,
        mut placements: Vec<Candidate>,
        mut eliminations: Vec<Candidate>,
        chains: Vec<Chain>,
    ) -> Self {
        placements.sort_unstable();
        placements.dedup();
        eliminations.sort_unstable();
        eliminations.dedup();
        Self {
            kind,
            placements,
            eliminations,
            chains,
        }
    }

    pub(crate) fn eliminate(kind: DeductionKind, eliminations: Vec<Candidate>, chains: Vec<Chain>) -> Self {
        Self::new(kind, Vec::new(), eliminations, chains)
    }

    pub(crate) fn place(kind: DeductionKind, placement: Candidate, chains: Vec<Chain>) -> Self {
        Self::new(kind, vec![placement], Vec::new(), chains)
    }

    /// Returns the classification.
    #[must_use]
    pub fn kind(&self) -> DeductionKind {
        self.kind
    }

    /// Returns the candidates proven true.
    #[must_use]
    pub fn placements(&self) -> &[Candidate] {
        &self.placements
    }

    /// Returns the candidates proven false.
    #[must_use]
    pub fn eliminations(&self) -> &[Candidate] {
        &self.eliminations
    }

    /// Returns the justifying chains.
    #[must_use]
    pub fn chains(&self) -> &[Chain] {
        &self.chains
    }

    /// Returns `true` if the deduction places at least one digit.
    #[must_use]
    pub fn is_placement(&self) -> bool {
        !self.placements.is_empty()
    }

    /// Returns the number of placements and eliminations.
    #[must_use]
    pub fn affected_candidates(&self) -> usize {
        self.placements.len() + self.eliminations.len()
    }

    /// Returns the number of chain nodes needed to justify the deduction.
    #[must_use]
    pub fn justification_length(&self) -> usize {
        self.chains.iter().map(Chain::total_len).sum()
    }

    /// Returns the most complex node kind used by the justification.
    #[must_use]
    pub fn complexity(&self) -> NodeKind {
        self.chains
            .iter()
            .map(Chain::max_kind)
            .max()
            .unwrap_or(NodeKind::Normal)
    }

    /// Returns a string identifying the effect of the deduction.
    ///
    /// Two deductions with the same signature change the board in the same
    /// way, whatever their justification.
    #[must_use]
    pub fn signature(&self) -> String {
        let mut states = self
            .placements
            .iter()
            .map(|c| c.on())
            .chain(self.eliminations.iter().map(|c| c.off()))
            .collect::<Vec<CandidateState>>();
        states.sort_unstable();
        states
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Returns the board changes grouped the way hint displays expect.
    #[must_use]
    pub fn application(&self) -> Vec<TechniqueApplication> {
        let mut app = self
            .placements
            .iter()
            .map(|c| TechniqueApplication::Placement {
                position: c.position,
                digit: c.digit,
            })
            .collect::<Vec<_>>();
        for digit in Digit::ALL {
            let positions = self
                .eliminations
                .iter()
                .filter(|c| c.digit == digit)
                .map(|c| c.position)
                .collect::<DigitPositions>();
            if !positions.is_empty() {
                app.push(TechniqueApplication::CandidateElimination {
                    positions,
                    digits: DigitSet::from_elem(digit),
                });
            }
        }
        app
    }

    /// Returns every cell touched by the justifying chains.
    #[must_use]
    pub fn condition_cells(&self) -> DigitPositions {
        self.chains
            .iter()
            .fold(DigitPositions::EMPTY, |acc, chain| acc | chain.cells())
    }

    /// Returns (cells, digit) pairs of every chain node, for highlighting.
    #[must_use]
    pub fn condition_digit_cells(&self) -> Vec<(DigitPositions, DigitSet)> {
        fn walk(chain: &Chain, out: &mut Vec<(DigitPositions, DigitSet)>) {
            for node in chain.nodes() {
                let item = (node.cells(), DigitSet::from_elem(node.digit()));
                if !out.contains(&item) {
                    out.push(item);
                }
            }
            for branch in chain.branches() {
                walk(branch, out);
            }
        }
        let mut out = Vec::new();
        for chain in &self.chains {
            walk(chain, &mut out);
        }
        out
    }

    /// Applies the deduction to `grid`.
    ///
    /// Returns `true` if the grid changed.
    pub fn apply_to(&self, grid: &mut CandidateGrid) -> bool {
        let mut changed = false;
        for c in &self.placements {
            if grid.has_candidate(c.position, c.digit) {
                changed |= grid.set_value(c.position, c.digit);
            }
        }
        for c in &self.eliminations {
            changed |= grid.remove_candidate(c.position, c.digit);
        }
        changed
    }

    fn is_simpler_than(&self, other: &Self) -> bool {
        (self.justification_length(), self.complexity())
            < (other.justification_length(), other.complexity())
    }
}

/// Formats as `X-Chain: r7c1<>2`, placements before eliminations.
impl Display for Deduction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.kind)?;
        let effects = self
            .placements
            .iter()
            .map(|c| c.on().to_string())
            .chain(self.eliminations.iter().map(|c| c.off().to_string()))
            .collect::<Vec<_>>();
        f.write_str(&effects.join(", "))
    }
}

fn compare_rank(a: &Deduction, b: &Deduction) -> Ordering {
    b.is_placement()
        .cmp(&a.is_placement())
        .then_with(|| b.affected_candidates().cmp(&a.affected_candidates()))
        .then_with(|| a.justification_length().cmp(&b.justification_length()))
}

/// Removes duplicate signatures and sorts deductions best first.
///
/// Placements come first, then deductions affecting more candidates, then
/// shorter justifications; remaining ties keep their order. Among duplicates
/// the shortest (then simplest) justification survives, at the position of
/// the first occurrence.
///
/// # Examples
///
/// ```
/// use chainlace_core::CandidateGrid;
/// use chainlace_solver::{ChainMode, ChainSolver, rank_deductions};
///
/// let mut steps = ChainSolver::default().find_chains(&CandidateGrid::new(), ChainMode::XChain);
/// rank_deductions(&mut steps);
/// assert!(steps.is_empty());
/// ```
pub fn rank_deductions(deductions: &mut Vec<Deduction>) {
    let mut collector = StepCollector::default();
    for deduction in deductions.drain(..) {
        collector.insert(deduction);
    }
    *deductions = collector.take_ranked();
}

/// Accumulates deductions, keeping one per signature.
#[derive(Debug, Default)]
pub(crate) struct StepCollector {
    steps: Vec<Deduction>,
    index: FxHashMap<String, usize>,
}

impl StepCollector {
    pub(crate) fn clear(&mut self) {
        self.steps.clear();
        self.index.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.steps.len()
    }

    /// Records `step`, or replaces the recorded step with the same
    /// signature if `step` is shorter. Steps without effect are dropped.
    pub(crate) fn insert(&mut self, step: Deduction) -> bool {
        if step.affected_candidates() == 0 {
            return false;
        }
        let signature = step.signature();
        if let Some(&i) = self.index.get(&signature) {
            if step.is_simpler_than(&self.steps[i]) {
                trace!("shorter justification for {step}");
                self.steps[i] = step;
                return true;
            }
            return false;
        }
        trace!("found {step}");
        self.index.insert(signature, self.steps.len());
        self.steps.push(step);
        true
    }

    pub(crate) fn take_ranked(&mut self) -> Vec<Deduction> {
        self.index.clear();
        let mut steps = mem::take(&mut self.steps);
        steps.sort_by(compare_rank);
        steps
    }
}
