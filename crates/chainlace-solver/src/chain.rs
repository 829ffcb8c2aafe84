//! Reconstructed proof chains.

use std::fmt::{self, Display};

use chainlace_core::{CandidateGrid, DigitPositions};

use crate::{
    links::LinkStrength,
    node::{Candidate, ChainNode, NodeKind, Polarity},
};

/// An ordered sequence of candidate-states justifying a deduction.
///
/// Consecutive nodes are joined by a link whose strength follows from the
/// polarity of the later node: arriving at an on-state needs a strong link,
/// arriving at an off-state a weak one. Forcing nets attach side branches,
/// each ending at the node that needs more than one premise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    nodes: Vec<ChainNode>,
    branches: Vec<Chain>,
}

impl Chain {
    pub(crate) fn new(nodes: Vec<ChainNode>) -> Self {
        Self {
            nodes,
            branches: Vec::new(),
        }
    }

    pub(crate) fn with_branches(nodes: Vec<ChainNode>, branches: Vec<Chain>) -> Self {
        Self { nodes, branches }
    }

    /// Returns the nodes of the main line, start first.
    #[must_use]
    pub fn nodes(&self) -> &[ChainNode] {
        &self.nodes
    }

    /// Returns the side branches of a forcing net.
    #[must_use]
    pub fn branches(&self) -> &[Chain] {
        &self.branches
    }

    /// Returns the number of nodes on the main line.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the chain has no node.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the number of nodes including every side branch.
    #[must_use]
    pub fn total_len(&self) -> usize {
        self.nodes.len() + self.branches.iter().map(Chain::total_len).sum::<usize>()
    }

    /// Returns the first node.
    #[must_use]
    pub fn first(&self) -> Option<&ChainNode> {
        self.nodes.first()
    }

    /// Returns the last node.
    #[must_use]
    pub fn last(&self) -> Option<&ChainNode> {
        self.nodes.last()
    }

    /// Returns every cell touched by the chain and its branches.
    #[must_use]
    pub fn cells(&self) -> DigitPositions {
        self.branches.iter().fold(
            self.nodes
                .iter()
                .fold(DigitPositions::EMPTY, |acc, node| acc | node.cells()),
            |acc, branch| acc | branch.cells(),
        )
    }

    /// Returns the most complex node kind used anywhere in the chain.
    #[must_use]
    pub fn max_kind(&self) -> NodeKind {
        self.nodes
            .iter()
            .map(ChainNode::kind)
            .chain(self.branches.iter().map(Chain::max_kind))
            .max()
            .unwrap_or(NodeKind::Normal)
    }

    /// Returns the strength of the link from node `i` to node `i + 1`.
    ///
    /// # Panics
    ///
    /// Panics if `i + 1` is out of bounds.
    #[must_use]
    pub fn link_strength(&self, i: usize) -> LinkStrength {
        match self.nodes[i + 1].polarity() {
            Polarity::On => LinkStrength::Strong,
            Polarity::Off => LinkStrength::Weak,
        }
    }
}

/// Formats the main line as `r1c1<>3 = r1c5=3 - r2c4<>3`, followed by
/// branches in brackets.
impl Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, node) in self.nodes.iter().enumerate() {
            if i > 0 {
                let link = match self.link_strength(i - 1) {
                    LinkStrength::Strong => " = ",
                    LinkStrength::Weak => " - ",
                };
                f.write_str(link)?;
            }
            write!(f, "{node}")?;
        }
        for branch in &self.branches {
            write!(f, " [{branch}]")?;
        }
        Ok(())
    }
}

/// Checks that no node revisits a cell already passed by the chain.
///
/// A node may share cells with its immediate predecessor (a link inside a
/// cell). When `closes_loop` is set, the last node may also return to the
/// cells of the first one.
pub(crate) fn is_valid_chain(nodes: &[ChainNode], closes_loop: bool) -> bool {
    let mut closed = DigitPositions::EMPTY;
    for (i, node) in nodes.iter().enumerate() {
        let mut forbidden = closed;
        if closes_loop && i + 1 == nodes.len() {
            forbidden = forbidden.difference(nodes[0].cells());
        }
        if !node.cells().is_disjoint(forbidden) {
            return false;
        }
        if i > 0 {
            closed |= nodes[i - 1].cells();
        }
    }
    true
}

/// Returns `true` if the first two nodes lie in the same cell.
pub(crate) fn starts_inside_cell(nodes: &[ChainNode]) -> bool {
    match nodes {
        [first, second, ..] => !first.cells().is_disjoint(second.cells()),
        _ => false,
    }
}

/// Eliminations of a continuous loop whose last node links back to its
/// first.
///
/// Every weak link (on-state to off-state) holds as a strong link too, so
/// its digit goes from every cell seeing both ends, and an in-cell weak link
/// removes the other candidates of that cell. Links touching an ALS are
/// skipped.
pub(crate) fn continuous_loop_eliminations(
    grid: &CandidateGrid,
    nodes: &[ChainNode],
) -> Vec<Candidate> {
    let n = nodes.len();
    let closing = (n > 1).then(|| (n - 1, 0));
    let mut eliminations = Vec::new();
    for (i, j) in (1..n).map(|j| (j - 1, j)).chain(closing) {
        let (a, b) = (nodes[i], nodes[j]);
        if a == b
            || a.polarity() != Polarity::On
            || b.polarity() != Polarity::Off
            || a.kind() == NodeKind::Als
            || b.kind() == NodeKind::Als
        {
            continue;
        }
        if a.digit() == b.digit() {
            if !a.cells().is_disjoint(b.cells()) {
                continue;
            }
            let digit = a.digit();
            let on_loop = nodes
                .iter()
                .filter(|node| node.digit() == digit)
                .fold(DigitPositions::EMPTY, |acc, node| acc | node.cells());
            let targets = (a.cells() | b.cells()).common_peers() & grid.digit_positions(digit);
            eliminations.extend(
                targets
                    .difference(on_loop)
                    .iter()
                    .map(|pos| Candidate::new(pos, digit)),
            );
        } else if a.kind() == NodeKind::Normal
            && b.kind() == NodeKind::Normal
            && a.cells() == b.cells()
            && let Some(pos) = a.cells().first()
        {
            eliminations.extend(
                grid.candidates_at(pos)
                    .iter()
                    .filter(|d| *d != a.digit() && *d != b.digit())
                    .map(|d| Candidate::new(pos, d)),
            );
        }
    }
    eliminations
}

#[cfg(test)]
mod tests {
    use chainlace_core::{Digit::*, Position};

    use super::*;

    fn on(x: u8, y: u8, digit: chainlace_core::Digit) -> ChainNode {
        ChainNode::from_state(Candidate::new(Position::new(x, y), digit).on())
    }

    fn off(x: u8, y: u8, digit: chainlace_core::Digit) -> ChainNode {
        ChainNode::from_state(Candidate::new(Position::new(x, y), digit).off())
    }

    #[test]
    fn test_display_marks_link_strength() {
        let chain = Chain::new(vec![off(0, 0, D2), on(5, 0, D2), off(3, 1, D2), on(3, 6, D2)]);
        assert_eq!(chain.to_string(), "r1c1<>2 = r1c6=2 - r2c4<>2 = r7c4=2");
        assert_eq!(chain.link_strength(1), LinkStrength::Weak);
        assert_eq!(chain.total_len(), 4);
        assert_eq!(chain.cells().len(), 4);
    }

    #[test]
    fn test_revisit_rules() {
        // in-cell step is fine
        assert!(is_valid_chain(&[on(0, 0, D1), off(0, 0, D2), on(4, 0, D2)], false));
        // returning to an interior cell is not
        assert!(!is_valid_chain(
            &[on(0, 0, D1), off(4, 0, D1), on(4, 4, D1), off(4, 0, D3)],
            false
        ));
        // returning to the start only counts for loops
        let looped = [off(0, 0, D1), on(4, 0, D1), off(4, 4, D1), on(0, 4, D1), off(0, 0, D1)];
        assert!(is_valid_chain(&looped, true));
        assert!(!is_valid_chain(&looped, false));
        assert!(!starts_inside_cell(&looped));
        assert!(starts_inside_cell(&[on(0, 0, D1), off(0, 0, D2)]));
    }
}
