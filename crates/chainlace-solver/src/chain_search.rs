//! Depth-first search for X-Chains, XY-Chains and Remote Pairs.
//!
//! The search walks the link graph alternating strong and weak links. Cells
//! on the current path are tracked in a visited set that is pushed on entry
//! and popped on exit, so a chain never passes a cell twice. A per-start
//! depth table prunes states already reached by a shorter path.

use chainlace_core::{CandidateGrid, Digit, DigitPositions, DigitSet};

use crate::{
    chain::{Chain, continuous_loop_eliminations},
    links::LinkGraph,
    node::{Candidate, ChainNode},
    step::{Deduction, DeductionKind, StepCollector},
};

/// Chain shapes found by [`SimpleChainSearch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SimpleMode {
    XChain,
    XyChain,
    RemotePair,
}

pub(crate) struct SimpleChainSearch<'a> {
    grid: &'a CandidateGrid,
    graph: &'a LinkGraph,
    max_len: usize,
    path: Vec<Candidate>,
    visited: DigitPositions,
    best_depth: Vec<usize>,
    collector: &'a mut StepCollector,
}

impl<'a> SimpleChainSearch<'a> {
    pub(crate) fn new(
        grid: &'a CandidateGrid,
        graph: &'a LinkGraph,
        max_len: usize,
        collector: &'a mut StepCollector,
    ) -> Self {
        Self {
            grid,
            graph,
            max_len,
            path: Vec::with_capacity(max_len),
            visited: DigitPositions::EMPTY,
            best_depth: vec![usize::MAX; Candidate::COUNT * 2],
            collector,
        }
    }

    pub(crate) fn run(&mut self, mode: SimpleMode) {
        match mode {
            SimpleMode::XChain => self.x_chains(),
            SimpleMode::XyChain => self.xy_chains(false),
            SimpleMode::RemotePair => self.xy_chains(true),
        }
    }

    fn reset(&mut self) {
        self.path.clear();
        self.visited = DigitPositions::EMPTY;
        self.best_depth.fill(usize::MAX);
    }

    fn enter(&mut self, candidate: Candidate) {
        self.path.push(candidate);
        self.visited.insert(candidate.position);
    }

    fn leave(&mut self) {
        if let Some(candidate) = self.path.pop()
            && !self.path.iter().any(|c| c.position == candidate.position)
        {
            self.visited.remove(candidate.position);
        }
    }

    /// Records that `state` is reached with `depth` nodes; `false` if a path
    /// at most as long already reached it.
    fn first_visit(&mut self, state: usize, depth: usize) -> bool {
        if depth >= self.best_depth[state] {
            return false;
        }
        self.best_depth[state] = depth;
        true
    }

    /// The current path as off/on alternating nodes, optionally closed by
    /// `closing`.
    fn alternating_chain(&self, closing: Option<Candidate>) -> Chain {
        let nodes = self
            .path
            .iter()
            .chain(closing.as_ref())
            .enumerate()
            .map(|(i, c)| ChainNode::from_state(if i % 2 == 0 { c.off() } else { c.on() }))
            .collect();
        Chain::new(nodes)
    }

    fn path_cells(&self) -> DigitPositions {
        self.path.iter().map(|c| c.position).collect()
    }

    fn endpoint_eliminations(&self, digit: Digit) -> Vec<Candidate> {
        let (Some(start), Some(end)) = (self.path.first(), self.path.last()) else {
            return Vec::new();
        };
        let targets = start.position.house_peers()
            & end.position.house_peers()
            & self.grid.digit_positions(digit);
        targets
            .difference(self.path_cells())
            .iter()
            .map(|pos| Candidate::new(pos, digit))
            .collect()
    }

    fn x_chains(&mut self) {
        let graph = self.graph;
        for digit in Digit::ALL {
            for pos in self.grid.digit_positions(digit) {
                let start = Candidate::new(pos, digit);
                self.reset();
                self.enter(start);
                for &next in &graph.links(start).strong {
                    if next.digit == digit {
                        self.x_step(next, true);
                    }
                }
                self.leave();
            }
        }
    }

    fn x_step(&mut self, node: Candidate, arrived_strong: bool) {
        let depth = self.path.len() + 1;
        if !self.first_visit(node.index() * 2 + usize::from(arrived_strong), depth) {
            return;
        }
        self.enter(node);
        if arrived_strong && self.path.len() >= 4 {
            let eliminations = self.endpoint_eliminations(node.digit);
            if !eliminations.is_empty() {
                let chain = self.alternating_chain(None);
                self.collector.insert(Deduction::eliminate(
                    DeductionKind::XChain,
                    eliminations,
                    vec![chain],
                ));
            }
        }
        if self.path.len() < self.max_len {
            let graph = self.graph;
            let start = self.path[0];
            if arrived_strong {
                for next in graph.links(node).weak_or_strong() {
                    if next.digit != node.digit {
                        continue;
                    }
                    if next == start {
                        if self.path.len() >= 4 {
                            self.record_loop(start);
                        }
                        continue;
                    }
                    if !self.visited.contains(next.position) {
                        self.x_step(next, false);
                    }
                }
            } else {
                for &next in &graph.links(node).strong {
                    if next.digit == node.digit && !self.visited.contains(next.position) {
                        self.x_step(next, true);
                    }
                }
            }
        }
        self.leave();
    }

    fn xy_chains(&mut self, remote: bool) {
        for pos in self.grid.bivalue_cells() {
            let Some((a, b)) = self.grid.candidates_at(pos).as_double() else {
                continue;
            };
            for (entry, exit) in [(a, b), (b, a)] {
                self.reset();
                self.enter(Candidate::new(pos, entry));
                self.xy_step(Candidate::new(pos, exit), remote);
                self.leave();
            }
        }
    }

    /// Extends the path with `exit`, the on-state of a bivalue cell whose
    /// other candidate was just entered.
    fn xy_step(&mut self, exit: Candidate, remote: bool) {
        let depth = self.path.len() + 1;
        if !self.first_visit(exit.index() * 2, depth) {
            return;
        }
        self.enter(exit);
        let start = self.path[0];
        let cells = self.path.len() / 2;
        if remote {
            if cells >= 4 {
                self.check_remote_pair(start);
            }
        } else if cells >= 3 && exit.digit == start.digit {
            let eliminations = self.endpoint_eliminations(start.digit);
            if !eliminations.is_empty() {
                let chain = self.alternating_chain(None);
                self.collector.insert(Deduction::eliminate(
                    DeductionKind::XyChain,
                    eliminations,
                    vec![chain],
                ));
            }
        }
        if self.path.len() + 2 <= self.max_len {
            let graph = self.graph;
            let pair = self.grid.candidates_at(start.position);
            for next in graph.links(exit).weak_or_strong() {
                if next.digit != exit.digit || next.position == exit.position {
                    continue;
                }
                if next.position == start.position {
                    if !remote && next == start && cells >= 3 {
                        self.record_loop(start);
                    }
                    continue;
                }
                if self.visited.contains(next.position) {
                    continue;
                }
                let candidates = self.grid.candidates_at(next.position);
                if candidates.len() != 2 || (remote && candidates != pair) {
                    continue;
                }
                let Some(other) = candidates
                    .difference(DigitSet::from_elem(next.digit))
                    .as_single()
                else {
                    continue;
                };
                self.enter(next);
                self.xy_step(Candidate::new(next.position, other), remote);
                self.leave();
            }
        }
        self.leave();
    }

    fn check_remote_pair(&mut self, start: Candidate) {
        let pair = self.grid.candidates_at(start.position);
        let mask = pair
            .iter()
            .fold(DigitPositions::EMPTY, |acc, d| acc | self.grid.digit_positions(d));
        let cells = self
            .path
            .iter()
            .step_by(2)
            .map(|c| c.position)
            .collect::<Vec<_>>();
        let chain_cells = self.path_cells();
        let mut eliminations = Vec::new();
        for j in 3..cells.len() {
            for i in (0..=j - 3).filter(|i| (j - i) % 2 == 1) {
                let targets = (cells[i].house_peers() & cells[j].house_peers() & mask)
                    .difference(chain_cells);
                for pos in targets {
                    eliminations.extend(
                        pair.iter()
                            .filter(|d| self.grid.has_candidate(pos, *d))
                            .map(|d| Candidate::new(pos, d)),
                    );
                }
            }
        }
        if !eliminations.is_empty() {
            let chain = self.alternating_chain(None);
            self.collector.insert(Deduction::eliminate(
                DeductionKind::RemotePair,
                eliminations,
                vec![chain],
            ));
        }
    }

    fn record_loop(&mut self, start: Candidate) {
        let chain = self.alternating_chain(Some(start));
        let eliminations = continuous_loop_eliminations(self.grid, chain.nodes());
        if !eliminations.is_empty() {
            self.collector.insert(Deduction::eliminate(
                DeductionKind::ContinuousNiceLoop,
                eliminations,
                vec![chain],
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use chainlace_core::{Digit::*, House, Position};

    use super::*;
    use crate::chain::is_valid_chain;

    fn run(grid: &CandidateGrid, mode: SimpleMode) -> Vec<Deduction> {
        let mut graph = LinkGraph::default();
        graph.rebuild(grid);
        let mut collector = StepCollector::default();
        SimpleChainSearch::new(grid, &graph, 20, &mut collector).run(mode);
        collector.take_ranked()
    }

    fn keep_only(grid: &mut CandidateGrid, house: House, digit: Digit, keep: &[Position]) {
        for pos in house.positions() {
            if !keep.contains(&pos) {
                grid.remove_candidate(pos, digit);
            }
        }
    }

    fn restrict(grid: &mut CandidateGrid, pos: Position, keep: &[Digit]) {
        for digit in Digit::ALL {
            if !keep.contains(&digit) {
                grid.remove_candidate(pos, digit);
            }
        }
    }

    #[test]
    fn test_x_chain_eliminates_from_common_peers() {
        let mut grid = CandidateGrid::new();
        let a = Position::new(0, 0);
        let b = Position::new(5, 0);
        let c = Position::new(3, 1);
        let d = Position::new(3, 6);
        keep_only(&mut grid, House::Row { y: 0 }, D2, &[a, b]);
        keep_only(&mut grid, House::Column { x: 3 }, D2, &[c, d]);

        let steps = run(&grid, SimpleMode::XChain);
        let step = steps
            .iter()
            .find(|s| s.kind() == DeductionKind::XChain)
            .unwrap();
        assert_eq!(step.eliminations(), &[Candidate::new(Position::new(0, 6), D2)]);
        assert_eq!(step.chains()[0].len(), 4);
        for step in &steps {
            for chain in step.chains() {
                let first = chain.first().unwrap().cells();
                let last = chain.last().unwrap().cells();
                for elim in step.eliminations() {
                    assert!(first.iter().all(|p| p.sees(elim.position)));
                    assert!(last.iter().all(|p| p.sees(elim.position)));
                }
            }
        }
    }

    #[test]
    fn test_no_chain_on_empty_grid() {
        let grid = CandidateGrid::new();
        assert!(run(&grid, SimpleMode::XChain).is_empty());
        assert!(run(&grid, SimpleMode::XyChain).is_empty());
        assert!(run(&grid, SimpleMode::RemotePair).is_empty());
    }

    #[test]
    fn test_xy_chain_through_three_cells() {
        // XY-Wing shape: pivot r1c1 {1,2}, pincers r1c5 {1,3} and r5c1 {2,3}
        let mut grid = CandidateGrid::new();
        let pivot = Position::new(0, 0);
        let p1 = Position::new(4, 0);
        let p2 = Position::new(0, 4);
        restrict(&mut grid, pivot, &[D1, D2]);
        restrict(&mut grid, p1, &[D1, D3]);
        restrict(&mut grid, p2, &[D2, D3]);

        let steps = run(&grid, SimpleMode::XyChain);
        let step = steps
            .iter()
            .find(|s| s.kind() == DeductionKind::XyChain)
            .unwrap();
        assert_eq!(step.eliminations(), &[Candidate::new(Position::new(4, 4), D3)]);
        assert_eq!(step.chains()[0].len(), 6);
        assert!(is_valid_chain(step.chains()[0].nodes(), false));
    }

    #[test]
    fn test_remote_pair_needs_four_cells() {
        // r1c1 - r1c5 - r5c5 - r5c9, all {4,7}
        let mut grid = CandidateGrid::new();
        let cells = [
            Position::new(0, 0),
            Position::new(4, 0),
            Position::new(4, 4),
            Position::new(8, 4),
        ];
        for pos in cells {
            restrict(&mut grid, pos, &[D4, D7]);
        }
        let steps = run(&grid, SimpleMode::RemotePair);
        let step = steps
            .iter()
            .find(|s| s.kind() == DeductionKind::RemotePair)
            .unwrap();
        // r1c1 and r5c9 see r1c9 and r5c1
        let expected = [
            Candidate::new(Position::new(8, 0), D4),
            Candidate::new(Position::new(8, 0), D7),
            Candidate::new(Position::new(0, 4), D4),
            Candidate::new(Position::new(0, 4), D7),
        ];
        for candidate in expected {
            assert!(step.eliminations().contains(&candidate));
        }

        let three = {
            let mut grid = CandidateGrid::new();
            for pos in &cells[..3] {
                restrict(&mut grid, *pos, &[D4, D7]);
            }
            grid
        };
        assert!(run(&three, SimpleMode::RemotePair).is_empty());
    }

    #[test]
    fn test_x_loop_is_continuous_nice_loop() {
        // digit 6 forms a rectangle of conjugate pairs in rows 1 and 5,
        // closed by weak links in columns 1 and 5
        let mut grid = CandidateGrid::new();
        let a = Position::new(0, 0);
        let b = Position::new(4, 0);
        let c = Position::new(4, 4);
        let d = Position::new(0, 4);
        keep_only(&mut grid, House::Row { y: 0 }, D6, &[a, b]);
        keep_only(&mut grid, House::Row { y: 4 }, D6, &[c, d]);

        let steps = run(&grid, SimpleMode::XChain);
        let step = steps
            .iter()
            .find(|s| s.kind() == DeductionKind::ContinuousNiceLoop)
            .unwrap();
        // the weak links lie in columns 1 and 5
        assert!(step.eliminations().contains(&Candidate::new(Position::new(0, 8), D6)));
        assert!(step.eliminations().contains(&Candidate::new(Position::new(4, 8), D6)));
        let chain = &step.chains()[0];
        assert_eq!(chain.first().unwrap().cells(), chain.last().unwrap().cells());
        assert!(is_valid_chain(chain.nodes(), true));
    }
}
