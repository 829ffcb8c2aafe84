//! Candidate-states and the nodes of the implication graph.

use std::fmt::{self, Display};

use chainlace_core::{Digit, DigitPositions, Position};

/// Truth value carried by a candidate-state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::IsVariant)]
pub enum Polarity {
    /// The digit is placed in the cell.
    On,
    /// The digit is removed from the cell.
    Off,
}

impl Polarity {
    /// Returns the opposite polarity.
    #[must_use]
    pub const fn negate(self) -> Self {
        match self {
            Polarity::On => Polarity::Off,
            Polarity::Off => Polarity::On,
        }
    }
}

/// A digit in a cell, without a truth value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Candidate {
    /// The cell.
    pub position: Position,
    /// The digit.
    pub digit: Digit,
}

impl Candidate {
    /// Number of distinct candidates on a board.
    pub(crate) const COUNT: usize = 81 * 9;

    /// Creates a candidate.
    #[must_use]
    pub const fn new(position: Position, digit: Digit) -> Self {
        Self { position, digit }
    }

    pub(crate) const fn index(self) -> usize {
        self.position.index() * 9 + self.digit.index()
    }

    pub(crate) const fn from_index(index: usize) -> Self {
        Self {
            position: Position::from_index(index / 9),
            digit: Digit::from_index(index % 9),
        }
    }

    /// Returns the state asserting this candidate.
    #[must_use]
    pub const fn on(self) -> CandidateState {
        CandidateState {
            candidate: self,
            polarity: Polarity::On,
        }
    }

    /// Returns the state removing this candidate.
    #[must_use]
    pub const fn off(self) -> CandidateState {
        CandidateState {
            candidate: self,
            polarity: Polarity::Off,
        }
    }
}

/// A candidate together with a truth value: "d is placed in c" or
/// "d is removed from c".
///
/// Displays as `r1c2=3` when on and `r1c2<>3` when off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CandidateState {
    /// The candidate.
    pub candidate: Candidate,
    /// Whether the candidate is placed or removed.
    pub polarity: Polarity,
}

impl Display for CandidateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self.polarity {
            Polarity::On => "=",
            Polarity::Off => "<>",
        };
        write!(f, "{}{op}{}", self.candidate.position, self.candidate.digit)
    }
}

/// Kind of a chain node, ordered from simplest to most complex.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    derive_more::Display,
    derive_more::IsVariant,
)]
pub enum NodeKind {
    /// A single cell and digit.
    #[display("normal")]
    Normal,
    /// Two or three cells of one box sharing a line, same digit.
    #[display("group")]
    Group,
    /// An almost locked set entered through one digit.
    #[display("ALS")]
    Als,
}

/// A vertex of the implication graph, without polarity.
///
/// Group and ALS nodes refer to their entry in the catalog built for the
/// current board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Node {
    Normal(Candidate),
    Group { index: u16, digit: Digit },
    Als { index: u16, digit: Digit },
}

impl Node {
    pub(crate) const fn kind(self) -> NodeKind {
        match self {
            Node::Normal(_) => NodeKind::Normal,
            Node::Group { .. } => NodeKind::Group,
            Node::Als { .. } => NodeKind::Als,
        }
    }

    pub(crate) const fn digit(self) -> Digit {
        match self {
            Node::Normal(candidate) => candidate.digit,
            Node::Group { digit, .. } | Node::Als { digit, .. } => digit,
        }
    }
}

/// A vertex of the implication graph with its truth value.
///
/// ALS nodes are always off: the state means "the entry digit is removed
/// from every cell of the set", which locks the remaining digits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeState {
    pub(crate) node: Node,
    pub(crate) polarity: Polarity,
}

impl NodeState {
    pub(crate) const fn new(node: Node, polarity: Polarity) -> Self {
        Self { node, polarity }
    }

    pub(crate) const fn normal(candidate: Candidate, polarity: Polarity) -> Self {
        Self::new(Node::Normal(candidate), polarity)
    }

    pub(crate) const fn als(index: u16, digit: Digit) -> Self {
        Self::new(Node::Als { index, digit }, Polarity::Off)
    }

    pub(crate) const fn negate(self) -> Self {
        Self::new(self.node, self.polarity.negate())
    }

    /// Returns the candidate-state of a normal node.
    pub(crate) const fn as_candidate_state(self) -> Option<CandidateState> {
        match self.node {
            Node::Normal(candidate) => Some(CandidateState {
                candidate,
                polarity: self.polarity,
            }),
            _ => None,
        }
    }
}

impl Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self.polarity {
            Polarity::On => "=",
            Polarity::Off => "<>",
        };
        match self.node {
            Node::Normal(candidate) => write!(f, "{}{op}{}", candidate.position, candidate.digit),
            Node::Group { index, digit } => write!(f, "group#{index}{op}{digit}"),
            Node::Als { index, digit } => write!(f, "als#{index}{op}{digit}"),
        }
    }
}

/// One node of a reconstructed chain.
///
/// Owned and independent of the engine that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainNode {
    kind: NodeKind,
    cells: DigitPositions,
    digit: Digit,
    polarity: Polarity,
}

impl ChainNode {
    pub(crate) const fn new(
        kind: NodeKind,
        cells: DigitPositions,
        digit: Digit,
        polarity: Polarity,
    ) -> Self {
        Self {
            kind,
            cells,
            digit,
            polarity,
        }
    }

    pub(crate) const fn from_state(state: CandidateState) -> Self {
        Self::new(
            NodeKind::Normal,
            DigitPositions::from_elem(state.candidate.position),
            state.candidate.digit,
            state.polarity,
        )
    }

    /// Returns the node kind.
    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Returns the cells covered by the node.
    ///
    /// One cell for normal nodes, every member for group and ALS nodes.
    #[must_use]
    pub const fn cells(&self) -> DigitPositions {
        self.cells
    }

    /// Returns the digit the node is about.
    #[must_use]
    pub const fn digit(&self) -> Digit {
        self.digit
    }

    /// Returns the truth value of the node.
    #[must_use]
    pub const fn polarity(&self) -> Polarity {
        self.polarity
    }

    /// Returns the candidate-state of a normal node.
    #[must_use]
    pub fn candidate_state(&self) -> Option<CandidateState> {
        if self.kind != NodeKind::Normal {
            return None;
        }
        let position = self.cells.first()?;
        Some(CandidateState {
            candidate: Candidate::new(position, self.digit),
            polarity: self.polarity,
        })
    }
}

impl Display for ChainNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self.polarity {
            Polarity::On => "=",
            Polarity::Off => "<>",
        };
        let cells = || {
            self.cells
                .iter()
                .map(|pos| pos.to_string())
                .collect::<Vec<_>>()
                .join(",")
        };
        match self.kind {
            NodeKind::Normal => write!(f, "{}{op}{}", cells(), self.digit),
            NodeKind::Group => write!(f, "({}){op}{}", cells(), self.digit),
            NodeKind::Als => write!(f, "ALS[{}]{op}{}", cells(), self.digit),
        }
    }
}

#[cfg(test)]
mod tests {
    use chainlace_core::Digit::*;

    use super::*;

    #[test]
    fn test_candidate_index_round_trip() {
        for index in 0..Candidate::COUNT {
            assert_eq!(Candidate::from_index(index).index(), index);
        }
        let candidate = Candidate::new(Position::new(8, 8), D9);
        assert_eq!(candidate.index(), Candidate::COUNT - 1);
    }

    #[test]
    fn test_display() {
        let candidate = Candidate::new(Position::new(1, 0), D3);
        assert_eq!(candidate.on().to_string(), "r1c2=3");
        assert_eq!(candidate.off().to_string(), "r1c2<>3");

        let group = ChainNode::new(
            NodeKind::Group,
            DigitPositions::from_iter([Position::new(0, 0), Position::new(1, 0)]),
            D4,
            Polarity::On,
        );
        assert_eq!(group.to_string(), "(r1c1,r1c2)=4");
        assert_eq!(group.candidate_state(), None);
    }

    #[test]
    fn test_kind_order_is_complexity() {
        assert!(NodeKind::Normal < NodeKind::Group);
        assert!(NodeKind::Group < NodeKind::Als);
    }
}
