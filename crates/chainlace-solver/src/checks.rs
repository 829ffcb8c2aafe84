//! Deductions read off expanded implication tables.
//!
//! * One table: a starting state implying a contradiction is false.
//! * Two tables: a state implied by both polarities of a candidate is true.
//! * All tables of a house or cell: a state implied by every alternative is
//!   true.
//! * Nice loops and AICs: table entries that return to, or see, the start.

use chainlace_core::{CandidateGrid, Digit, DigitPositions, DigitSet, Position, all_digit_houses};
use log::{trace, warn};

use crate::{
    catalog::Catalog,
    chain::{Chain, continuous_loop_eliminations, is_valid_chain, starts_inside_cell},
    config::ChainSearchConfig,
    node::{Candidate, CandidateState, ChainNode, Node, NodeKind, NodeState, Polarity},
    reconstruct::ChainBuilder,
    step::{Deduction, DeductionKind, StepCollector},
    table::{Table, TableStore},
};

/// Shortest AIC reported, in nodes (three links).
const MIN_AIC_NODES: usize = 4;

/// Shortest nice loop reported, in nodes (four links).
const MIN_LOOP_NODES: usize = 5;

pub(crate) struct Checker<'a> {
    grid: &'a CandidateGrid,
    store: &'a TableStore,
    chains: ChainBuilder<'a>,
    nets: bool,
}

impl<'a> Checker<'a> {
    pub(crate) fn new(
        grid: &'a CandidateGrid,
        store: &'a TableStore,
        catalog: &'a Catalog,
        config: &ChainSearchConfig,
        nets: bool,
    ) -> Self {
        Self {
            grid,
            store,
            chains: ChainBuilder::new(store, catalog, config),
            nets,
        }
    }

    fn contradiction_kind(&self) -> DeductionKind {
        if self.nets {
            DeductionKind::ForcingNetContradiction
        } else {
            DeductionKind::ForcingChainContradiction
        }
    }

    fn verity_kind(&self) -> DeductionKind {
        if self.nets {
            DeductionKind::ForcingNetVerity
        } else {
            DeductionKind::ForcingChainVerity
        }
    }

    fn chain(&self, table: &'a Table, target: NodeState) -> Option<Chain> {
        match self.chains.build(table, target) {
            Ok(chain) => Some(chain),
            Err(err) => {
                warn!("{err}; chain dropped");
                None
            }
        }
    }

    /// Chains to every target, or `None` if one cannot be rebuilt.
    fn chains_to(&self, tables: &[&'a Table], targets: &[NodeState]) -> Option<Vec<Chain>> {
        tables
            .iter()
            .zip(targets)
            .map(|(table, &target)| self.chain(table, target))
            .collect()
    }

    /// Looks for a contradiction implied by the root of `table`.
    ///
    /// Of all contradictions found, the one with the shortest total distance
    /// is reported.
    pub(crate) fn check_one_chain(&self, table: &'a Table, out: &mut StepCollector) {
        let Some(
            root @ NodeState {
                node: Node::Normal(start),
                polarity,
            },
        ) = table.root()
        else {
            return;
        };
        let cost = |targets: &Vec<NodeState>| {
            targets
                .iter()
                .filter_map(|&t| table.find(t))
                .map(|i| u32::from(table.distance_of(i)))
                .sum::<u32>()
        };
        let Some(targets) = self.contradictions(table).into_iter().min_by_key(cost) else {
            return;
        };
        let tables = vec![table; targets.len()];
        let Some(chains) = self.chains_to(&tables, &targets) else {
            return;
        };
        trace!("contradiction from {root}");
        let step = match polarity {
            Polarity::On => Deduction::eliminate(self.contradiction_kind(), vec![start], chains),
            Polarity::Off => Deduction::place(self.contradiction_kind(), start, chains),
        };
        out.insert(step);
    }

    /// Every contradiction implied by the root of `table`, each given as the
    /// states that prove it.
    fn contradictions(&self, table: &Table) -> Vec<Vec<NodeState>> {
        let mut found = Vec::new();
        let Some(root) = table.root() else {
            return found;
        };
        if table.is_empty() {
            return found;
        }

        // the root implies its own negation
        if table.find(root.negate()).is_some() {
            found.push(vec![root.negate()]);
        }
        // two digits on in one cell
        for (i, d1) in Digit::ALL.into_iter().enumerate() {
            for d2 in Digit::ALL.into_iter().skip(i + 1) {
                if let Some(pos) = (table.on_positions(d1) & table.on_positions(d2)).first() {
                    found.push(vec![on(pos, d1), on(pos, d2)]);
                }
            }
        }
        // one digit on twice in a house
        for (digit, house) in all_digit_houses() {
            let mut twice = (table.on_positions(digit) & house.positions()).iter();
            if let (Some(p1), Some(p2)) = (twice.next(), twice.next()) {
                found.push(vec![on(p1, digit), on(p2, digit)]);
            }
        }
        // a cell loses every candidate
        for pos in self.grid.unsolved_cells() {
            let candidates = self.grid.candidates_at(pos);
            if !candidates.is_empty()
                && candidates
                    .iter()
                    .all(|d| table.off_positions(d).contains(pos))
            {
                found.push(candidates.iter().map(|d| off(pos, d)).collect());
            }
        }
        // a digit loses every position in a house
        for (digit, house) in all_digit_houses() {
            let positions = self.grid.digit_positions(digit) & house.positions();
            if !positions.is_empty() && positions.is_subset(table.off_positions(digit)) {
                found.push(positions.iter().map(|pos| off(pos, digit)).collect());
            }
        }
        found
    }

    /// Reports every state implied by both polarities of `candidate`.
    pub(crate) fn check_two_chains(&self, candidate: Candidate, out: &mut StepCollector) {
        let (Some(on_table), Some(off_table)) = (
            self.store.normal_table(candidate, Polarity::On),
            self.store.normal_table(candidate, Polarity::Off),
        ) else {
            return;
        };
        for entry in on_table.entries() {
            let Some(state) = entry.state.as_candidate_state() else {
                continue;
            };
            if state.candidate == candidate || off_table.find(entry.state).is_none() {
                continue;
            }
            self.report_verity(&[on_table, off_table], entry.state, out);
        }
    }

    /// Reports every state implied by all alternatives of a house or cell.
    pub(crate) fn check_all_chains(&self, out: &mut StepCollector) {
        for (digit, house) in all_digit_houses() {
            let positions = self.grid.digit_positions(digit) & house.positions();
            if positions.len() >= 2 {
                let alternatives = positions.iter().map(|pos| Candidate::new(pos, digit));
                self.check_alternatives(alternatives, out);
            }
        }
        for pos in self.grid.unsolved_cells() {
            let candidates = self.grid.candidates_at(pos);
            if candidates.len() >= 2 {
                let alternatives = candidates.iter().map(|d| Candidate::new(pos, d));
                self.check_alternatives(alternatives, out);
            }
        }
    }

    fn check_alternatives(&self, alternatives: impl Iterator<Item = Candidate>, out: &mut StepCollector) {
        let Some(tables) = alternatives
            .map(|c| self.store.normal_table(c, Polarity::On).filter(|t| !t.is_empty()))
            .collect::<Option<Vec<_>>>()
        else {
            return;
        };
        for digit in Digit::ALL {
            let common = |f: fn(&Table, Digit) -> DigitPositions| {
                tables
                    .iter()
                    .fold(DigitPositions::FULL, |acc, &t| acc & f(t, digit))
            };
            for (positions, polarity) in [
                (common(Table::on_positions), Polarity::On),
                (common(Table::off_positions), Polarity::Off),
            ] {
                for pos in positions {
                    let state = NodeState::normal(Candidate::new(pos, digit), polarity);
                    if tables.iter().any(|t| t.root() == Some(state)) {
                        continue;
                    }
                    self.report_verity(&tables, state, out);
                }
            }
        }
    }

    fn report_verity(&self, tables: &[&'a Table], state: NodeState, out: &mut StepCollector) {
        let Some(conclusion) = state.as_candidate_state() else {
            return;
        };
        let targets = vec![state; tables.len()];
        let Some(chains) = self.chains_to(tables, &targets) else {
            return;
        };
        if chains.iter().all(|chain| chain.len() <= 2) {
            return;
        }
        let step = match conclusion.polarity {
            Polarity::On => Deduction::place(self.verity_kind(), conclusion.candidate, chains),
            Polarity::Off => {
                Deduction::eliminate(self.verity_kind(), vec![conclusion.candidate], chains)
            }
        };
        out.insert(step);
    }

    /// Looks for nice loops starting and ending in the root cell.
    pub(crate) fn check_nice_loops(&self, table: &'a Table, out: &mut StepCollector) {
        let Some(NodeState {
            node: Node::Normal(start),
            polarity,
        }) = table.root()
        else {
            return;
        };
        for entry in table.entries() {
            let Some(end) = entry.state.as_candidate_state() else {
                continue;
            };
            if end.candidate.position != start.position {
                // an on-state seeing a bivalue start closes through a weak
                // link onto its other digit
                if let Some(closing) = self.bivalue_closing(start, polarity, end)
                    && usize::from(entry.distance) + 2 >= MIN_LOOP_NODES
                {
                    self.report_loop(table, entry.state, LoopEffect::Continuous(Some(closing)), out);
                }
                continue;
            }
            if usize::from(entry.distance) + 1 < MIN_LOOP_NODES {
                continue;
            }
            let same_digit = end.candidate.digit == start.digit;
            let effect = match (polarity, end.polarity, same_digit) {
                (Polarity::On, Polarity::Off, true) | (Polarity::On, Polarity::On, false) => {
                    LoopEffect::Eliminate(vec![start])
                }
                (Polarity::Off, Polarity::On, true) => LoopEffect::Place,
                (Polarity::Off, Polarity::Off, false) => LoopEffect::Eliminate(vec![end.candidate]),
                (Polarity::Off, Polarity::On, false) => LoopEffect::Continuous(None),
                _ => continue,
            };
            self.report_loop(table, entry.state, effect, out);
        }
    }

    /// The other candidate of a bivalue start cell when `end` is an on-state
    /// of that digit seeing the start.
    fn bivalue_closing(&self, start: Candidate, polarity: Polarity, end: CandidateState) -> Option<Candidate> {
        if polarity != Polarity::On
            || end.polarity != Polarity::On
            || !end.candidate.position.sees(start.position)
        {
            return None;
        }
        let other = self
            .grid
            .candidates_at(start.position)
            .difference(DigitSet::from_elem(start.digit))
            .as_single()?;
        (end.candidate.digit == other).then(|| Candidate::new(start.position, other))
    }

    /// Rebuilds and records one nice loop.
    fn report_loop(&self, table: &'a Table, end: NodeState, effect: LoopEffect, out: &mut StepCollector) {
        let Some(chain) = self.chain(table, end) else {
            return;
        };
        let mut nodes = chain.nodes().to_vec();
        if let LoopEffect::Continuous(Some(closing)) = effect {
            nodes.push(ChainNode::from_state(closing.off()));
        }
        if nodes.len() < MIN_LOOP_NODES
            || starts_inside_cell(&nodes)
            || !is_valid_chain(&nodes, true)
        {
            return;
        }
        let grouped = chain.max_kind() > NodeKind::Normal;
        let step = match effect {
            LoopEffect::Continuous(_) => {
                nodes.extend(chain.first().copied());
                let eliminations = continuous_loop_eliminations(self.grid, &nodes);
                if eliminations.is_empty() {
                    return;
                }
                let kind = if grouped {
                    DeductionKind::GroupedContinuousNiceLoop
                } else {
                    DeductionKind::ContinuousNiceLoop
                };
                Deduction::eliminate(kind, eliminations, vec![Chain::new(nodes)])
            }
            LoopEffect::Eliminate(eliminations) => {
                Deduction::eliminate(discontinuous_kind(grouped), eliminations, vec![chain])
            }
            LoopEffect::Place => {
                let Some(start) = chain.first().and_then(ChainNode::candidate_state) else {
                    return;
                };
                Deduction::place(discontinuous_kind(grouped), start.candidate, vec![chain])
            }
        };
        out.insert(step);
    }

    /// Looks for AICs from an off root to an on entry outside its cell.
    pub(crate) fn check_aics(&self, table: &'a Table, out: &mut StepCollector) {
        let Some(NodeState {
            node: Node::Normal(start),
            polarity: Polarity::Off,
        }) = table.root()
        else {
            return;
        };
        for entry in table.entries() {
            let Some(end) = entry.state.as_candidate_state() else {
                continue;
            };
            if end.polarity != Polarity::On
                || end.candidate.position == start.position
                || usize::from(entry.distance) + 1 < MIN_AIC_NODES
            {
                continue;
            }
            let end = end.candidate;
            let eliminations = if end.digit == start.digit {
                let cells = DigitPositions::from_elem(start.position) | DigitPositions::from_elem(end.position);
                (cells.common_peers() & self.grid.digit_positions(start.digit))
                    .iter()
                    .map(|pos| Candidate::new(pos, start.digit))
                    .collect::<Vec<_>>()
            } else if start.position.sees(end.position) {
                [
                    Candidate::new(end.position, start.digit),
                    Candidate::new(start.position, end.digit),
                ]
                .into_iter()
                .filter(|c| self.grid.has_candidate(c.position, c.digit))
                .collect()
            } else {
                continue;
            };
            if eliminations.is_empty() {
                continue;
            }
            let Some(chain) = self.chain(table, entry.state) else {
                continue;
            };
            if chain.len() < MIN_AIC_NODES
                || starts_inside_cell(chain.nodes())
                || !is_valid_chain(chain.nodes(), false)
            {
                continue;
            }
            let kind = if chain.max_kind() > NodeKind::Normal {
                DeductionKind::GroupedAic
            } else {
                DeductionKind::Aic
            };
            out.insert(Deduction::eliminate(kind, eliminations, vec![chain]));
        }
    }
}

/// What a nice loop proves.
#[derive(Debug, Clone)]
enum LoopEffect {
    /// Discontinuous, removing the listed candidates.
    Eliminate(Vec<Candidate>),
    /// Discontinuous, placing the start.
    Place,
    /// Continuous, optionally closed by one more weak link into the start
    /// cell.
    Continuous(Option<Candidate>),
}

fn discontinuous_kind(grouped: bool) -> DeductionKind {
    if grouped {
        DeductionKind::GroupedDiscontinuousNiceLoop
    } else {
        DeductionKind::DiscontinuousNiceLoop
    }
}

fn on(pos: Position, digit: Digit) -> NodeState {
    NodeState::normal(Candidate::new(pos, digit), Polarity::On)
}

fn off(pos: Position, digit: Digit) -> NodeState {
    NodeState::normal(Candidate::new(pos, digit), Polarity::Off)
}
