use chainlace_core::{CandidateGrid, Digit, DigitPositions, DigitSet};
use log::warn;

use super::{Backrefs, Entry, MAX_BACKREFS, ROOT, Table, TableStore};
use crate::{
    catalog::Catalog,
    config::ChainSearchConfig,
    error::TableError,
    node::{Candidate, Node, NodeKind, NodeState, Polarity},
    singles::{SingleKind, find_singles},
};

/// Builds the direct part of every implication table.
///
/// In chains mode a table holds the immediate consequences of its root. In
/// nets mode the root is applied to a scratch copy of the board and singles
/// are followed for a few rounds; every placement found is recorded with the
/// eliminations it depended on.
pub(crate) struct TableBuilder<'a> {
    grid: &'a CandidateGrid,
    catalog: &'a Catalog,
    config: &'a ChainSearchConfig,
    extended: bool,
    nets: bool,
    groups_by_digit: [Vec<u16>; 9],
    als_by_digit: [Vec<u16>; 9],
}

impl<'a> TableBuilder<'a> {
    pub(crate) fn new(
        grid: &'a CandidateGrid,
        catalog: &'a Catalog,
        config: &'a ChainSearchConfig,
        extended: bool,
        nets: bool,
    ) -> Self {
        let mut groups_by_digit: [Vec<u16>; 9] = Default::default();
        let mut als_by_digit: [Vec<u16>; 9] = Default::default();
        if extended {
            for (index, group) in (0..=u16::MAX).zip(catalog.groups()) {
                groups_by_digit[group.digit.index()].push(index);
            }
            for (index, als) in (0..=u16::MAX).zip(catalog.als()) {
                for digit in als.candidates {
                    als_by_digit[digit.index()].push(index);
                }
            }
        }
        Self {
            grid,
            catalog,
            config,
            extended,
            nets,
            groups_by_digit,
            als_by_digit,
        }
    }

    /// Builds every table into `store`.
    ///
    /// A table overflowing its capacity is logged and left empty.
    pub(crate) fn build_all(&self, store: &mut TableStore, scratch: &mut CandidateGrid) {
        let mut targets = Vec::new();
        for digit in Digit::ALL {
            for position in self.grid.digit_positions(digit) {
                let candidate = Candidate::new(position, digit);
                for polarity in [Polarity::On, Polarity::Off] {
                    let root = NodeState::normal(candidate, polarity);
                    let table = self.build_table(root, scratch, &mut targets);
                    store.insert(table);
                }
            }
        }
        if !self.extended {
            return;
        }
        for (index, group) in (0..=u16::MAX).zip(self.catalog.groups()) {
            let node = Node::Group {
                index,
                digit: group.digit,
            };
            for polarity in [Polarity::On, Polarity::Off] {
                let table = self.build_table(NodeState::new(node, polarity), scratch, &mut targets);
                store.insert(table);
            }
        }
        for (index, als) in (0..=u16::MAX).zip(self.catalog.als()) {
            for digit in als.candidates {
                let table = self.build_table(NodeState::als(index, digit), scratch, &mut targets);
                store.insert(table);
            }
        }
    }

    fn build_table(
        &self,
        root: NodeState,
        scratch: &mut CandidateGrid,
        targets: &mut Vec<NodeState>,
    ) -> Table {
        let mut table = Table::new(root, self.config.table_capacity);
        let result = self.fill_direct(&mut table, targets).and_then(|()| {
            if self.nets && matches!(root.node, Node::Normal(_)) {
                self.run_net(&mut table, scratch)
            } else {
                Ok(())
            }
        });
        if let Err(err) = result {
            warn!("{err}; table abandoned");
            table.abandon();
        }
        table.seal_direct();
        table
    }

    fn fill_direct(&self, table: &mut Table, targets: &mut Vec<NodeState>) -> Result<(), TableError> {
        let Some(root) = table.root() else {
            return Ok(());
        };
        targets.clear();
        self.consequences(root, targets);
        let rank = root.node.kind();
        for &target in targets.iter() {
            let distance = 1 + self.catalog.entry_penalty(target);
            let mut backrefs = Backrefs::new();
            backrefs.push(ROOT);
            table.add(Entry::direct(
                target,
                distance,
                rank.max(target.node.kind()),
                backrefs,
            ))?;
        }
        Ok(())
    }

    /// Appends the states implied by `state` in one step.
    fn consequences(&self, state: NodeState, out: &mut Vec<NodeState>) {
        match (state.node, state.polarity) {
            (Node::Normal(candidate), Polarity::On) => self.normal_on(candidate, out),
            (Node::Normal(candidate), Polarity::Off) => self.normal_off(candidate, out),
            (Node::Group { index, .. }, Polarity::On) => self.group_on(index, out),
            (Node::Group { index, .. }, Polarity::Off) => self.group_off(index, out),
            (Node::Als { index, digit }, _) => self.als_locked(index, digit, out),
        }
    }

    fn normal_on(&self, candidate: Candidate, out: &mut Vec<NodeState>) {
        let Candidate { position, digit } = candidate;
        for other in self.grid.candidates_at(position) {
            if other != digit {
                out.push(NodeState::normal(Candidate::new(position, other), Polarity::Off));
            }
        }
        self.push_normal(position.house_peers() & self.grid.digit_positions(digit), digit, Polarity::Off, out);
        if !self.extended {
            return;
        }
        let peers = position.house_peers();
        for &index in &self.groups_by_digit[digit.index()] {
            if let Some(group) = self.catalog.group(index)
                && group.cells.is_subset(peers)
            {
                out.push(NodeState::new(Node::Group { index, digit }, Polarity::Off));
            }
        }
        for &index in &self.als_by_digit[digit.index()] {
            if let Some(als) = self.catalog.als_at(index)
                && als.buddies(digit).contains(position)
            {
                out.push(NodeState::als(index, digit));
            }
        }
    }

    fn normal_off(&self, candidate: Candidate, out: &mut Vec<NodeState>) {
        let Candidate { position, digit } = candidate;
        let cell = self.grid.candidates_at(position);
        if cell.len() == 2
            && let Some(other) = cell.difference(DigitSet::from_elem(digit)).as_single()
        {
            out.push(NodeState::normal(Candidate::new(position, other), Polarity::On));
        }
        let positions = self.grid.digit_positions(digit);
        for house in position.houses() {
            let rest = (positions & house.positions()).difference(DigitPositions::from_elem(position));
            if let Some(single) = rest.as_single() {
                out.push(NodeState::normal(Candidate::new(single, digit), Polarity::On));
            } else if self.extended
                && let Some(index) = self.group_with_cells(digit, rest)
            {
                out.push(NodeState::new(Node::Group { index, digit }, Polarity::On));
            }
        }
    }

    fn group_on(&self, index: u16, out: &mut Vec<NodeState>) {
        let Some(group) = self.catalog.group(index) else {
            return;
        };
        let digit = group.digit;
        self.push_normal(group.buddies & self.grid.digit_positions(digit), digit, Polarity::Off, out);
        for &other in &self.groups_by_digit[digit.index()] {
            if other != index
                && let Some(g) = self.catalog.group(other)
                && g.cells.is_subset(group.buddies)
            {
                out.push(NodeState::new(Node::Group { index: other, digit }, Polarity::Off));
            }
        }
        for &als_index in &self.als_by_digit[digit.index()] {
            if let Some(als) = self.catalog.als_at(als_index)
                && als.cells.is_disjoint(group.cells)
                && als.digit_cells(digit).is_subset(group.buddies)
            {
                out.push(NodeState::als(als_index, digit));
            }
        }
    }

    fn group_off(&self, index: u16, out: &mut Vec<NodeState>) {
        let Some(group) = self.catalog.group(index) else {
            return;
        };
        let digit = group.digit;
        let positions = self.grid.digit_positions(digit);
        for house in group.houses() {
            let rest = (positions & house.positions()).difference(group.cells);
            if let Some(single) = rest.as_single() {
                out.push(NodeState::normal(Candidate::new(single, digit), Polarity::On));
            } else if let Some(other) = self.group_with_cells(digit, rest)
                && other != index
            {
                out.push(NodeState::new(Node::Group { index: other, digit }, Polarity::On));
            }
        }
    }

    /// Consequences of removing `entry` from an ALS: every other digit is
    /// locked into the set.
    fn als_locked(&self, index: u16, entry: Digit, out: &mut Vec<NodeState>) {
        let Some(als) = self.catalog.als_at(index) else {
            return;
        };
        let locked = als.candidates.difference(DigitSet::from_elem(entry));
        let mut removed = [DigitSet::EMPTY; 81];
        let mut touched = DigitPositions::EMPTY;
        for digit in locked {
            let targets = als.buddies(digit) & self.grid.digit_positions(digit);
            self.push_normal(targets, digit, Polarity::Off, out);
            for pos in targets {
                removed[pos.index()].insert(digit);
            }
            touched |= targets;
        }
        for pos in touched {
            let remaining = self.grid.candidates_at(pos).difference(removed[pos.index()]);
            if let Some(digit) = remaining.as_single() {
                out.push(NodeState::normal(Candidate::new(pos, digit), Polarity::On));
            }
        }
        for digit in locked {
            for &group_index in &self.groups_by_digit[digit.index()] {
                if let Some(group) = self.catalog.group(group_index)
                    && group.cells.is_subset(als.buddies(digit))
                {
                    out.push(NodeState::new(
                        Node::Group {
                            index: group_index,
                            digit,
                        },
                        Polarity::Off,
                    ));
                }
            }
            for &other in &self.als_by_digit[digit.index()] {
                if other != index
                    && let Some(b) = self.catalog.als_at(other)
                    && b.cells.is_disjoint(als.cells)
                    && b.digit_cells(digit).is_subset(als.buddies(digit))
                {
                    out.push(NodeState::als(other, digit));
                }
            }
        }
    }

    fn push_normal(
        &self,
        positions: DigitPositions,
        digit: Digit,
        polarity: Polarity,
        out: &mut Vec<NodeState>,
    ) {
        out.extend(
            positions
                .iter()
                .map(|pos| NodeState::normal(Candidate::new(pos, digit), polarity)),
        );
    }

    fn group_with_cells(&self, digit: Digit, cells: DigitPositions) -> Option<u16> {
        if cells.len() < 2 {
            return None;
        }
        self.groups_by_digit[digit.index()]
            .iter()
            .copied()
            .find(|&index| self.catalog.group(index).is_some_and(|g| g.cells == cells))
    }

    /// Follows the root on a scratch board through rounds of singles.
    fn run_net(&self, table: &mut Table, scratch: &mut CandidateGrid) -> Result<(), TableError> {
        let Some(NodeState {
            node: Node::Normal(root),
            polarity,
        }) = table.root()
        else {
            return Ok(());
        };
        scratch.clone_from(self.grid);
        match polarity {
            Polarity::On => {
                scratch.set_value(root.position, root.digit);
            }
            Polarity::Off => {
                scratch.remove_candidate(root.position, root.digit);
            }
        }
        let mut applied = 0;
        propagate(table, scratch, &mut applied)?;
        for _ in 0..self.config.net_lookahead {
            let mut progress = false;
            for single in find_singles(scratch) {
                let candidate = Candidate::new(single.position, single.digit);
                if !scratch.has_candidate(candidate.position, candidate.digit) {
                    continue;
                }
                let premises = self.premises(table, candidate, single.kind);
                let Some(&(_, longest)) = premises.first() else {
                    continue;
                };
                let rank = premises
                    .iter()
                    .map(|&(index, _)| table.rank_of(index))
                    .max()
                    .unwrap_or(NodeKind::Normal);
                let backrefs = premises.iter().take(MAX_BACKREFS).map(|&(index, _)| index).collect();
                let entry = Entry::direct(
                    NodeState::normal(candidate, Polarity::On),
                    longest.saturating_add(1),
                    rank,
                    backrefs,
                );
                progress |= table.add(entry)?.is_some();
            }
            propagate(table, scratch, &mut applied)?;
            if !progress {
                break;
            }
        }
        Ok(())
    }

    /// Entries eliminating the alternatives of a single, longest first.
    ///
    /// A single that needs no entry of the table is not a consequence of the
    /// root and yields no premise.
    fn premises(&self, table: &Table, candidate: Candidate, kind: SingleKind) -> Vec<(u16, u16)> {
        let alternatives = match kind {
            SingleKind::Naked => self
                .grid
                .candidates_at(candidate.position)
                .difference(DigitSet::from_elem(candidate.digit))
                .iter()
                .map(|digit| Candidate::new(candidate.position, digit))
                .collect::<Vec<_>>(),
            SingleKind::Hidden(house) => (self.grid.digit_positions(candidate.digit) & house.positions())
                .difference(DigitPositions::from_elem(candidate.position))
                .iter()
                .map(|pos| Candidate::new(pos, candidate.digit))
                .collect(),
        };
        let mut premises = alternatives
            .into_iter()
            .filter_map(|alt| table.find(NodeState::normal(alt, Polarity::Off)))
            .map(|index| (index, table.distance_of(index)))
            .collect::<Vec<_>>();
        premises.sort_by(|a, b| b.1.cmp(&a.1));
        premises
    }
}

/// Applies the normal entries from `*applied` on to the scratch board.
///
/// Each placement records the eliminations it causes as new entries, which
/// are applied in turn.
fn propagate(table: &mut Table, scratch: &mut CandidateGrid, applied: &mut usize) -> Result<(), TableError> {
    while *applied < table.len() {
        let index = *applied;
        *applied += 1;
        let entry = &table.entries()[index];
        let Some(state) = entry.state.as_candidate_state() else {
            continue;
        };
        let Candidate { position, digit } = state.candidate;
        if state.polarity.is_off() {
            scratch.remove_candidate(position, digit);
            continue;
        }
        if !scratch.has_candidate(position, digit) {
            continue;
        }
        let distance = entry.distance.saturating_add(1);
        let rank = entry.rank;
        let source = u16::try_from(index).unwrap_or(ROOT);
        let removed = scratch
            .candidates_at(position)
            .difference(DigitSet::from_elem(digit))
            .iter()
            .map(|d| Candidate::new(position, d))
            .chain(
                (position.house_peers() & scratch.digit_positions(digit))
                    .iter()
                    .map(|pos| Candidate::new(pos, digit)),
            )
            .collect::<Vec<_>>();
        for candidate in removed {
            let mut backrefs = Backrefs::new();
            backrefs.push(source);
            table.add(Entry::direct(
                NodeState::normal(candidate, Polarity::Off),
                distance,
                rank,
                backrefs,
            ))?;
        }
        scratch.set_value(position, digit);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chainlace_core::{Digit::*, Position};

    use super::*;

    fn restrict(grid: &mut CandidateGrid, pos: Position, keep: &[Digit]) {
        for digit in Digit::ALL {
            if !keep.contains(&digit) {
                grid.remove_candidate(pos, digit);
            }
        }
    }

    fn build(grid: &CandidateGrid, extended: bool, nets: bool) -> (Catalog, TableStore) {
        let config = ChainSearchConfig::default();
        let mut catalog = Catalog::default();
        if extended {
            catalog.rebuild(grid, config.max_als_size);
        }
        let mut store = TableStore::default();
        let mut scratch = grid.clone();
        TableBuilder::new(grid, &catalog, &config, extended, nets).build_all(&mut store, &mut scratch);
        (catalog, store)
    }

    #[test]
    fn test_on_table_turns_off_peers_and_cell() {
        let grid = CandidateGrid::new();
        let (_, store) = build(&grid, false, false);
        let candidate = Candidate::new(Position::new(0, 0), D1);
        let table = store.normal_table(candidate, Polarity::On).unwrap();
        // 8 other digits and 20 peers
        assert_eq!(table.len(), 28);
        assert!(table.entries().iter().all(|e| e.distance == 1 && e.state.polarity.is_off()));
        assert!(table.find(NodeState::normal(candidate, Polarity::Off)).is_none());
    }

    #[test]
    fn test_off_table_of_bivalue_cell() {
        let mut grid = CandidateGrid::new();
        let pos = Position::new(4, 4);
        restrict(&mut grid, pos, &[D3, D8]);
        let (_, store) = build(&grid, false, false);
        let table = store
            .normal_table(Candidate::new(pos, D3), Polarity::Off)
            .unwrap();
        assert_eq!(table.len(), 1);
        assert!(table.holds(Candidate::new(pos, D8), Polarity::On));
    }

    #[test]
    fn test_net_follows_singles() {
        // r1c1 {1,2}, r1c2 {2,3}, r1c3 {3,4}: removing 1 from r1c1 places 2,
        // then 3 and 4 follow as naked singles
        let mut grid = CandidateGrid::new();
        let a = Position::new(0, 0);
        let b = Position::new(1, 0);
        let c = Position::new(2, 0);
        restrict(&mut grid, a, &[D1, D2]);
        restrict(&mut grid, b, &[D2, D3]);
        restrict(&mut grid, c, &[D3, D4]);

        let (_, chains) = build(&grid, false, false);
        let (_, nets) = build(&grid, false, true);
        let root = Candidate::new(a, D1);
        let chain_table = chains.normal_table(root, Polarity::Off).unwrap();
        let net_table = nets.normal_table(root, Polarity::Off).unwrap();
        assert!(!chain_table.holds(Candidate::new(b, D3), Polarity::On));
        assert!(net_table.holds(Candidate::new(b, D3), Polarity::On));
        assert!(net_table.holds(Candidate::new(c, D4), Polarity::On));

        let index = net_table
            .find(NodeState::normal(Candidate::new(c, D4), Polarity::On))
            .unwrap();
        let entry = net_table.entry(index).unwrap();
        assert!(entry.distance >= 5);
        assert!(!entry.backrefs.is_empty());
    }

    #[test]
    fn test_grouped_tables_include_group_and_als_nodes() {
        let mut grid = CandidateGrid::new();
        let a = Position::new(1, 0);
        let b = Position::new(2, 0);
        restrict(&mut grid, a, &[D1, D2]);
        restrict(&mut grid, b, &[D1, D3]);
        let (catalog, store) = build(&grid, true, false);
        assert!(!catalog.als().is_empty());

        // r2c1 sees both ALS cells holding 1
        let seer = Candidate::new(Position::new(0, 1), D1);
        let table = store.normal_table(seer, Polarity::On).unwrap();
        let als_entry = table
            .entries()
            .iter()
            .find(|e| e.state.node.kind() == NodeKind::Als)
            .unwrap();
        assert_eq!(als_entry.rank, NodeKind::Als);
        assert!(als_entry.distance >= 2);
        assert!(
            table
                .entries()
                .iter()
                .any(|e| e.state.node.kind() == NodeKind::Group)
        );
    }

    #[test]
    fn test_tiny_capacity_abandons_tables() {
        let grid = CandidateGrid::new();
        let config = ChainSearchConfig::default().with_table_capacity(4);
        let catalog = Catalog::default();
        let mut store = TableStore::default();
        let mut scratch = grid.clone();
        TableBuilder::new(&grid, &catalog, &config, false, false).build_all(&mut store, &mut scratch);
        let table = store
            .normal_table(Candidate::new(Position::new(0, 0), D1), Polarity::On)
            .unwrap();
        assert!(table.is_empty());
    }
}
