//! Implication tables.
//!
//! A table lists every state reachable from one starting state, each with
//! the length of the shortest path found, the most complex node kind on that
//! path and references to the entries it was derived from. There are two
//! tables per candidate (on and off) plus, in grouped modes, one per group
//! node state and ALS entry digit.

use chainlace_core::{Digit, DigitPositions};
use rustc_hash::FxHashMap;
use tinyvec::ArrayVec;

pub(crate) use self::{builder::TableBuilder, expand::expand_tables};
use crate::{
    error::TableError,
    node::{Candidate, Node, NodeKind, NodeState, Polarity},
};

mod builder;
mod expand;

/// Back-reference to the starting state of the table.
pub(crate) const ROOT: u16 = u16::MAX;

/// Premises kept per entry.
pub(crate) const MAX_BACKREFS: usize = 5;

pub(crate) type Backrefs = ArrayVec<[u16; MAX_BACKREFS]>;

/// One reachable state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Entry {
    pub(crate) state: NodeState,
    /// Links from the root along the recorded path.
    pub(crate) distance: u16,
    /// Most complex node kind on the recorded path.
    pub(crate) rank: NodeKind,
    /// Premises: entry indices in the same table, or [`ROOT`].
    ///
    /// An expanded entry has exactly one, the entry whose own table
    /// supplied it.
    pub(crate) backrefs: Backrefs,
    pub(crate) expanded: bool,
}

impl Entry {
    pub(crate) fn direct(state: NodeState, distance: u16, rank: NodeKind, backrefs: Backrefs) -> Self {
        Self {
            state,
            distance,
            rank,
            backrefs,
            expanded: false,
        }
    }

    fn expanded(state: NodeState, distance: u16, rank: NodeKind, source: u16) -> Self {
        let mut backrefs = Backrefs::new();
        backrefs.push(source);
        Self {
            state,
            distance,
            rank,
            backrefs,
            expanded: true,
        }
    }
}

/// The states reachable from one root.
///
/// Entries are kept in insertion order; the first `direct_len` of them were
/// derived while building the table, the rest by expansion.
#[derive(Debug, Clone, Default)]
pub(crate) struct Table {
    root: Option<NodeState>,
    entries: Vec<Entry>,
    index: FxHashMap<NodeState, u16>,
    on_sets: [DigitPositions; 9],
    off_sets: [DigitPositions; 9],
    direct_len: usize,
    capacity: usize,
}

impl Table {
    pub(crate) fn new(root: NodeState, capacity: usize) -> Self {
        Self {
            root: Some(root),
            capacity: capacity.min(usize::from(ROOT)),
            ..Self::default()
        }
    }

    pub(crate) fn root(&self) -> Option<NodeState> {
        self.root
    }

    pub(crate) fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub(crate) fn entry(&self, index: u16) -> Option<&Entry> {
        self.entries.get(usize::from(index))
    }

    /// Entries derived while building the table.
    pub(crate) fn direct_entries(&self) -> &[Entry] {
        &self.entries[..self.direct_len.min(self.entries.len())]
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the index of `state`, [`ROOT`] for the root itself.
    pub(crate) fn find(&self, state: NodeState) -> Option<u16> {
        if self.root == Some(state) {
            return Some(ROOT);
        }
        self.index.get(&state).copied()
    }

    /// Distance of an entry index, zero for [`ROOT`].
    pub(crate) fn distance_of(&self, index: u16) -> u16 {
        if index == ROOT {
            return 0;
        }
        self.entry(index).map_or(0, |e| e.distance)
    }

    pub(crate) fn rank_of(&self, index: u16) -> NodeKind {
        if index == ROOT {
            return self.root.map_or(NodeKind::Normal, |r| r.node.kind());
        }
        self.entry(index).map_or(NodeKind::Normal, |e| e.rank)
    }

    /// Cells where `digit` is forced on, root included.
    pub(crate) fn on_positions(&self, digit: Digit) -> DigitPositions {
        self.on_sets[digit.index()] | self.root_positions(digit, Polarity::On)
    }

    /// Cells where `digit` is forced off, root included.
    pub(crate) fn off_positions(&self, digit: Digit) -> DigitPositions {
        self.off_sets[digit.index()] | self.root_positions(digit, Polarity::Off)
    }

    fn root_positions(&self, digit: Digit, polarity: Polarity) -> DigitPositions {
        match self.root {
            Some(NodeState {
                node: Node::Normal(candidate),
                polarity: p,
            }) if candidate.digit == digit && p == polarity => {
                DigitPositions::from_elem(candidate.position)
            }
            _ => DigitPositions::EMPTY,
        }
    }

    /// Returns `true` if the table (root included) holds the normal state.
    #[cfg(test)]
    pub(crate) fn holds(&self, candidate: Candidate, polarity: Polarity) -> bool {
        let positions = match polarity {
            Polarity::On => self.on_positions(candidate.digit),
            Polarity::Off => self.off_positions(candidate.digit),
        };
        positions.contains(candidate.position)
    }

    /// Appends `entry` unless its state is the root or already recorded.
    ///
    /// Returns the new index, or `None` if nothing was added.
    pub(crate) fn add(&mut self, entry: Entry) -> Result<Option<u16>, TableError> {
        if self.root == Some(entry.state) || self.index.contains_key(&entry.state) {
            return Ok(None);
        }
        let index = self.next_index()?;
        if let Some(state) = entry.state.as_candidate_state() {
            let candidate = state.candidate;
            let sets = match state.polarity {
                Polarity::On => &mut self.on_sets,
                Polarity::Off => &mut self.off_sets,
            };
            sets[candidate.digit.index()].insert(candidate.position);
        }
        self.index.insert(entry.state, index);
        self.entries.push(entry);
        Ok(Some(index))
    }

    fn next_index(&self) -> Result<u16, TableError> {
        let capacity_error = || TableError::CapacityExceeded {
            root: self.root.unwrap_or(NodeState::normal(
                Candidate::from_index(0),
                Polarity::On,
            )),
            capacity: self.capacity,
        };
        if self.entries.len() >= self.capacity {
            return Err(capacity_error());
        }
        u16::try_from(self.entries.len()).map_err(|_| capacity_error())
    }

    /// Records a path to `state` through entry `source` whose own table
    /// reaches `state` in `distance - distance(source)` links.
    ///
    /// An existing entry is replaced only by a strictly shorter path, or an
    /// equally long one through simpler nodes.
    pub(crate) fn relax(
        &mut self,
        state: NodeState,
        distance: u16,
        rank: NodeKind,
        source: u16,
    ) -> Result<(), TableError> {
        if self.root == Some(state) {
            return Ok(());
        }
        if let Some(&i) = self.index.get(&state) {
            let entry = &mut self.entries[usize::from(i)];
            if distance < entry.distance || (distance == entry.distance && rank < entry.rank) {
                *entry = Entry::expanded(state, distance, rank, source);
            }
            return Ok(());
        }
        self.add(Entry::expanded(state, distance, rank, source))?;
        Ok(())
    }

    /// Marks every current entry as direct.
    pub(crate) fn seal_direct(&mut self) {
        self.direct_len = self.entries.len();
    }

    /// Drops every entry, keeping the root.
    pub(crate) fn abandon(&mut self) {
        self.entries.clear();
        self.index.clear();
        self.on_sets = [DigitPositions::EMPTY; 9];
        self.off_sets = [DigitPositions::EMPTY; 9];
        self.direct_len = 0;
    }
}

/// Every table of one search, indexed by starting state.
#[derive(Debug, Clone)]
pub(crate) struct TableStore {
    normal: Vec<Table>,
    extended: Vec<Table>,
    extended_index: FxHashMap<NodeState, usize>,
}

impl Default for TableStore {
    fn default() -> Self {
        Self {
            normal: vec![Table::default(); Candidate::COUNT * 2],
            extended: Vec::new(),
            extended_index: FxHashMap::default(),
        }
    }
}

impl TableStore {
    fn slot(candidate: Candidate, polarity: Polarity) -> usize {
        candidate.index() * 2 + usize::from(polarity.is_off())
    }

    pub(crate) fn clear(&mut self) {
        for table in &mut self.normal {
            *table = Table::default();
        }
        self.extended.clear();
        self.extended_index.clear();
    }

    pub(crate) fn table(&self, state: NodeState) -> Option<&Table> {
        match state.node {
            Node::Normal(candidate) => self
                .normal
                .get(Self::slot(candidate, state.polarity))
                .filter(|t| t.root.is_some()),
            _ => self
                .extended_index
                .get(&state)
                .and_then(|&i| self.extended.get(i)),
        }
    }

    pub(crate) fn normal_table(&self, candidate: Candidate, polarity: Polarity) -> Option<&Table> {
        self.table(NodeState::normal(candidate, polarity))
    }

    /// Tables rooted at normal states, skipping unused slots.
    pub(crate) fn normal_tables(&self) -> impl Iterator<Item = &Table> {
        self.normal.iter().filter(|t| t.root.is_some())
    }

    pub(crate) fn insert(&mut self, table: Table) {
        let Some(root) = table.root else {
            return;
        };
        match root.node {
            Node::Normal(candidate) => {
                self.normal[Self::slot(candidate, root.polarity)] = table;
            }
            _ => {
                self.extended_index.insert(root, self.extended.len());
                self.extended.push(table);
            }
        }
    }

    pub(crate) fn normal_slots(&self) -> usize {
        self.normal.len()
    }

    pub(crate) fn take_normal(&mut self, slot: usize) -> Table {
        std::mem::take(&mut self.normal[slot])
    }

    pub(crate) fn put_normal(&mut self, slot: usize, table: Table) {
        self.normal[slot] = table;
    }

    /// Number of tables and of entries over all tables.
    pub(crate) fn size(&self) -> (usize, usize) {
        self.normal_tables()
            .chain(&self.extended)
            .fold((0, 0), |(tables, entries), t| (tables + 1, entries + t.len()))
    }
}

#[cfg(test)]
mod tests {
    use chainlace_core::{Digit::*, Position};

    use super::*;

    fn state(x: u8, y: u8, digit: Digit, polarity: Polarity) -> NodeState {
        NodeState::normal(Candidate::new(Position::new(x, y), digit), polarity)
    }

    fn direct(state: NodeState, distance: u16) -> Entry {
        let mut backrefs = Backrefs::new();
        backrefs.push(ROOT);
        Entry::direct(state, distance, NodeKind::Normal, backrefs)
    }

    #[test]
    fn test_root_is_never_added() {
        let root = state(0, 0, D1, Polarity::On);
        let mut table = Table::new(root, 8);
        assert_eq!(table.add(direct(root, 1)), Ok(None));
        assert_eq!(table.relax(root, 1, NodeKind::Normal, 0), Ok(()));
        assert!(table.is_empty());
        assert_eq!(table.find(root), Some(ROOT));
        assert!(table.holds(Candidate::new(Position::new(0, 0), D1), Polarity::On));
    }

    #[test]
    fn test_capacity_is_reported() {
        let root = state(0, 0, D1, Polarity::On);
        let mut table = Table::new(root, 2);
        assert_eq!(table.add(direct(state(1, 0, D1, Polarity::Off), 1)), Ok(Some(0)));
        assert_eq!(table.add(direct(state(2, 0, D1, Polarity::Off), 1)), Ok(Some(1)));
        let err = table
            .add(direct(state(3, 0, D1, Polarity::Off), 1))
            .unwrap_err();
        assert!(err.is_capacity_exceeded());
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_relax_prefers_shorter_then_simpler() {
        let root = state(0, 0, D1, Polarity::On);
        let target = state(5, 5, D2, Polarity::Off);
        let mut table = Table::new(root, 8);
        table.add(direct(state(1, 0, D1, Polarity::Off), 1)).unwrap();
        table.relax(target, 4, NodeKind::Group, 0).unwrap();
        table.relax(target, 5, NodeKind::Normal, 0).unwrap();
        assert_eq!(table.entries()[1].distance, 4);
        assert_eq!(table.entries()[1].rank, NodeKind::Group);
        table.relax(target, 4, NodeKind::Normal, 0).unwrap();
        assert_eq!(table.entries()[1].rank, NodeKind::Normal);
        assert!(table.entries()[1].expanded);
        table.relax(target, 3, NodeKind::Als, 0).unwrap();
        assert_eq!(table.entries()[1].distance, 3);
        assert!(table.off_positions(D2).contains(Position::new(5, 5)));
    }

    #[test]
    fn test_store_lookup() {
        let mut store = TableStore::default();
        let root = state(4, 4, D9, Polarity::Off);
        let mut table = Table::new(root, 8);
        table.add(direct(state(4, 4, D8, Polarity::On), 1)).unwrap();
        table.seal_direct();
        store.insert(table);
        assert_eq!(store.table(root).map(Table::len), Some(1));
        assert!(store.table(root.negate()).is_none());
        assert_eq!(store.size(), (1, 1));
        store.clear();
        assert!(store.table(root).is_none());
    }
}
