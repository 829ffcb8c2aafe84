//! Extended chain nodes: group nodes and almost locked sets.

use chainlace_core::{CandidateGrid, DigitPositions};

pub(crate) use self::{
    als::{Als, find_almost_locked_sets},
    group_node::{GroupNode, find_group_nodes},
};
use crate::node::{ChainNode, Node, NodeKind, NodeState};

mod als;
mod group_node;

/// Group nodes and almost locked sets of one board.
///
/// Node indices stored in [`Node::Group`] and [`Node::Als`] refer to the
/// vectors of the catalog built for the same board.
#[derive(Debug, Clone, Default)]
pub(crate) struct Catalog {
    groups: Vec<GroupNode>,
    als: Vec<Als>,
}

impl Catalog {
    pub(crate) fn clear(&mut self) {
        self.groups.clear();
        self.als.clear();
    }

    pub(crate) fn rebuild(&mut self, grid: &CandidateGrid, max_als_size: usize) {
        self.groups = find_group_nodes(grid);
        self.als = find_almost_locked_sets(grid, max_als_size);
    }

    pub(crate) fn groups(&self) -> &[GroupNode] {
        &self.groups
    }

    pub(crate) fn als(&self) -> &[Als] {
        &self.als
    }

    pub(crate) fn group(&self, index: u16) -> Option<&GroupNode> {
        self.groups.get(usize::from(index))
    }

    pub(crate) fn als_at(&self, index: u16) -> Option<&Als> {
        self.als.get(usize::from(index))
    }

    /// Returns the cells a node covers, or `None` for a stale index.
    pub(crate) fn cells_of(&self, node: Node) -> Option<DigitPositions> {
        match node {
            Node::Normal(candidate) => Some(DigitPositions::from_elem(candidate.position)),
            Node::Group { index, .. } => self.group(index).map(|g| g.cells),
            Node::Als { index, .. } => self.als_at(index).map(|a| a.cells),
        }
    }

    /// Converts an engine state into an owned chain node.
    pub(crate) fn chain_node(&self, state: NodeState) -> Option<ChainNode> {
        let cells = self.cells_of(state.node)?;
        Some(ChainNode::new(
            state.node.kind(),
            cells,
            state.node.digit(),
            state.polarity,
        ))
    }

    /// Extra distance charged for entering the node of `state`.
    pub(crate) fn entry_penalty(&self, state: NodeState) -> u16 {
        match state.node {
            Node::Als { index, .. } => self.als_at(index).map_or(1, |als| {
                u16::try_from(als.size().saturating_sub(1).max(1)).unwrap_or(u16::MAX)
            }),
            _ => 0,
        }
    }

    pub(crate) fn len(&self, kind: NodeKind) -> usize {
        match kind {
            NodeKind::Normal => 0,
            NodeKind::Group => self.groups.len(),
            NodeKind::Als => self.als.len(),
        }
    }
}
