//! Strong and weak links between candidates.
//!
//! Two candidates are linked when they share a cell or share a digit within a
//! house, so that at most one of them can be true. The link is strong when
//! they are the only two options left (a bivalue cell, or a house with two
//! remaining positions for the digit), so that at least one must be true.

use chainlace_core::{CandidateGrid, Digit, DigitPositions};

use crate::node::Candidate;

/// Strength of a link between two candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::IsVariant)]
pub enum LinkStrength {
    /// Exactly one of the two candidates is true.
    Strong,
    /// At most one of the two candidates is true.
    Weak,
}

/// Links leaving one candidate.
#[derive(Debug, Clone, Default)]
pub(crate) struct CandidateLinks {
    pub(crate) strong: Vec<Candidate>,
    pub(crate) weak: Vec<Candidate>,
}

impl CandidateLinks {
    fn clear(&mut self) {
        self.strong.clear();
        self.weak.clear();
    }

    /// Every link usable where a weak link is required.
    pub(crate) fn weak_or_strong(&self) -> impl Iterator<Item = Candidate> + '_ {
        self.strong.iter().chain(&self.weak).copied()
    }
}

/// Links of every remaining candidate on a board.
///
/// A candidate appears in at most one of the two lists of another candidate;
/// if it is strongly linked through any cell or house, it is listed as strong.
#[derive(Debug, Clone)]
pub(crate) struct LinkGraph {
    links: Vec<CandidateLinks>,
}

impl Default for LinkGraph {
    fn default() -> Self {
        Self {
            links: vec![CandidateLinks::default(); Candidate::COUNT],
        }
    }
}

impl LinkGraph {
    #[cfg(test)]
    pub(crate) fn build(grid: &CandidateGrid) -> Self {
        let mut graph = Self::default();
        graph.rebuild(grid);
        graph
    }

    /// Recomputes every link list for `grid`, reusing the buffers.
    pub(crate) fn rebuild(&mut self, grid: &CandidateGrid) {
        for links in &mut self.links {
            links.clear();
        }
        for digit in Digit::ALL {
            for pos in grid.digit_positions(digit) {
                let candidate = Candidate::new(pos, digit);
                let links = &mut self.links[candidate.index()];
                collect_links(grid, candidate, links);
            }
        }
    }

    pub(crate) fn links(&self, candidate: Candidate) -> &CandidateLinks {
        &self.links[candidate.index()]
    }
}

fn collect_links(grid: &CandidateGrid, from: Candidate, links: &mut CandidateLinks) {
    let Candidate { position, digit } = from;

    let cell = grid.candidates_at(position);
    let cell_strong = cell.len() == 2;
    for other in cell {
        if other != digit {
            push_link(links, Candidate::new(position, other), cell_strong);
        }
    }

    let positions = grid.digit_positions(digit);
    for house in position.houses() {
        let others = (positions & house.positions()).difference(DigitPositions::from_elem(position));
        let house_strong = others.len() == 1;
        for pos in others {
            push_link(links, Candidate::new(pos, digit), house_strong);
        }
    }
}

fn push_link(links: &mut CandidateLinks, target: Candidate, strong: bool) {
    if links.strong.contains(&target) {
        return;
    }
    if strong {
        links.weak.retain(|c| *c != target);
        links.strong.push(target);
    } else if !links.weak.contains(&target) {
        links.weak.push(target);
    }
}

#[cfg(test)]
mod tests {
    use chainlace_core::{Digit::*, House, Position};
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_bivalue_cell_is_strong() {
        let mut grid = CandidateGrid::new();
        let pos = Position::new(4, 4);
        for digit in Digit::ALL {
            if digit != D2 && digit != D7 {
                grid.remove_candidate(pos, digit);
            }
        }
        let graph = LinkGraph::build(&grid);
        let links = graph.links(Candidate::new(pos, D2));
        assert_eq!(links.strong, vec![Candidate::new(pos, D7)]);
        // 8 in each house minus the overlap of row/column with the box
        assert_eq!(links.weak.len(), 20);
    }

    #[test]
    fn test_conjugate_pair_is_strong() {
        let mut grid = CandidateGrid::new();
        let a = Position::new(0, 0);
        let b = Position::new(5, 0);
        for pos in (House::Row { y: 0 }).positions() {
            if pos != a && pos != b {
                grid.remove_candidate(pos, D5);
            }
        }
        let graph = LinkGraph::build(&grid);
        let links = graph.links(Candidate::new(a, D5));
        assert_eq!(links.strong, vec![Candidate::new(b, D5)]);
        assert!(!links.weak.contains(&Candidate::new(b, D5)));
        assert!(links.weak.contains(&Candidate::new(a, D6)));
    }

    #[test]
    fn test_pair_in_row_and_box_is_strong_once() {
        let mut grid = CandidateGrid::new();
        let a = Position::new(0, 0);
        let b = Position::new(1, 0);
        // two positions in box 0, but many in row 0
        for pos in (House::Box { index: 0 }).positions() {
            if pos != a && pos != b {
                grid.remove_candidate(pos, D9);
            }
        }
        let graph = LinkGraph::build(&grid);
        let links = graph.links(Candidate::new(a, D9));
        assert_eq!(links.strong, vec![Candidate::new(b, D9)]);
        assert!(!links.weak.contains(&Candidate::new(b, D9)));
    }

    fn random_grid() -> impl Strategy<Value = CandidateGrid> {
        prop::collection::vec((0usize..81, 1u8..=9), 0..400).prop_map(|removals| {
            let mut grid = CandidateGrid::new();
            for (index, value) in removals {
                grid.remove_candidate(Position::from_index(index), Digit::from_value(value));
            }
            grid
        })
    }

    proptest! {
        #[test]
        fn prop_strong_links_are_symmetric(grid in random_grid()) {
            let graph = LinkGraph::build(&grid);
            for digit in Digit::ALL {
                for pos in grid.digit_positions(digit) {
                    let from = Candidate::new(pos, digit);
                    for to in &graph.links(from).strong {
                        prop_assert!(graph.links(*to).strong.contains(&from));
                    }
                    for to in &graph.links(from).weak {
                        prop_assert!(graph.links(*to).weak.contains(&from));
                    }
                }
            }
        }
    }
}
