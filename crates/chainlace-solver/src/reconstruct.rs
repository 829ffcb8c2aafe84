//! Rebuilding explicit chains from table back-references.

use rustc_hash::FxHashSet;

use crate::{
    catalog::Catalog,
    chain::Chain,
    config::ChainSearchConfig,
    error::TableError,
    node::{ChainNode, NodeState},
    table::{ROOT, Table, TableStore},
};

/// A premise still to be drawn as a side branch.
#[derive(Debug, Clone, Copy)]
struct PendingBranch<'a> {
    table: &'a Table,
    premise: u16,
    joins: NodeState,
}

/// Walks back-references from a table entry to the table's root.
///
/// Expanded entries are resolved by descending into the table of the entry
/// they were merged from. Every premise past the first becomes a side
/// branch, cut where it rejoins the main line.
pub(crate) struct ChainBuilder<'a> {
    store: &'a TableStore,
    catalog: &'a Catalog,
    max_branches: usize,
    max_depth: usize,
}

impl<'a> ChainBuilder<'a> {
    pub(crate) fn new(store: &'a TableStore, catalog: &'a Catalog, config: &ChainSearchConfig) -> Self {
        Self {
            store,
            catalog,
            max_branches: config.max_branches,
            max_depth: config.max_reconstruction_depth,
        }
    }

    /// Builds the chain from the root of `table` to `target`.
    pub(crate) fn build(&self, table: &'a Table, target: NodeState) -> Result<Chain, TableError> {
        let root = table.root().ok_or(TableError::MissingEntry {
            root: target,
            state: target,
        })?;
        let index = table
            .find(target)
            .ok_or(TableError::MissingEntry { root, state: target })?;
        let mut pending = Vec::new();
        let main = self.line(table, index, 0, &mut pending)?;

        let on_main = main.iter().copied().collect::<FxHashSet<_>>();
        let mut branches = Vec::new();
        let mut next = 0;
        while next < pending.len() && branches.len() < self.max_branches {
            let PendingBranch {
                table,
                premise,
                joins,
            } = pending[next];
            next += 1;
            let mut line = self.line(table, premise, 0, &mut pending)?;
            let rejoin = line.iter().rposition(|s| on_main.contains(s)).unwrap_or(0);
            line.drain(..rejoin);
            line.push(joins);
            branches.push(Chain::new(self.nodes(&line)?));
        }
        Ok(Chain::with_branches(self.nodes(&main)?, branches))
    }

    fn line(
        &self,
        table: &'a Table,
        index: u16,
        depth: usize,
        pending: &mut Vec<PendingBranch<'a>>,
    ) -> Result<Vec<NodeState>, TableError> {
        if depth > self.max_depth {
            return Err(TableError::DepthExceeded {
                depth: self.max_depth,
            });
        }
        let root = table.root().ok_or(TableError::DepthExceeded { depth })?;
        if index == ROOT {
            return Ok(vec![root]);
        }
        let entry = table.entry(index).ok_or(TableError::MissingEntry { root, state: root })?;
        let first = entry.backrefs.first().copied().unwrap_or(ROOT);
        let mut line = self.line(table, first, depth + 1, pending)?;
        if entry.expanded {
            let source = line.last().copied().unwrap_or(root);
            let missing = TableError::MissingEntry {
                root: source,
                state: entry.state,
            };
            let src = self.store.table(source).ok_or(missing)?;
            let k = src.find(entry.state).ok_or(missing)?;
            let tail = self.line(src, k, depth + 1, pending)?;
            line.extend(tail.into_iter().skip(1));
        } else {
            pending.extend(entry.backrefs.iter().skip(1).map(|&premise| PendingBranch {
                table,
                premise,
                joins: entry.state,
            }));
            line.push(entry.state);
        }
        Ok(line)
    }

    fn nodes(&self, states: &[NodeState]) -> Result<Vec<ChainNode>, TableError> {
        states
            .iter()
            .map(|&state| {
                self.catalog.chain_node(state).ok_or(TableError::MissingEntry {
                    root: state,
                    state,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use chainlace_core::{CandidateGrid, Digit, Digit::*, House, Position};

    use super::*;
    use crate::{
        chain::is_valid_chain,
        node::{Candidate, Polarity},
        table::{TableBuilder, expand_tables},
    };

    fn restrict(grid: &mut CandidateGrid, pos: Position, keep: &[Digit]) {
        for digit in Digit::ALL {
            if !keep.contains(&digit) {
                grid.remove_candidate(pos, digit);
            }
        }
    }

    fn store_for(grid: &CandidateGrid, config: &ChainSearchConfig, nets: bool) -> (Catalog, TableStore) {
        let catalog = Catalog::default();
        let mut store = TableStore::default();
        let mut scratch = grid.clone();
        TableBuilder::new(grid, &catalog, config, false, nets).build_all(&mut store, &mut scratch);
        expand_tables(&mut store);
        (catalog, store)
    }

    #[test]
    fn test_x_chain_is_rebuilt_in_order() {
        let mut grid = CandidateGrid::new();
        let a = Position::new(0, 0);
        let b = Position::new(5, 0);
        let c = Position::new(3, 1);
        let d = Position::new(3, 6);
        for pos in (House::Row { y: 0 }).positions() {
            if pos != a && pos != b {
                grid.remove_candidate(pos, D2);
            }
        }
        for pos in (House::Column { x: 3 }).positions() {
            if pos != c && pos != d {
                grid.remove_candidate(pos, D2);
            }
        }
        let config = ChainSearchConfig::default();
        let (catalog, store) = store_for(&grid, &config, false);
        let table = store
            .normal_table(Candidate::new(a, D2), Polarity::Off)
            .unwrap();
        let chain = ChainBuilder::new(&store, &catalog, &config)
            .build(table, NodeState::normal(Candidate::new(d, D2), Polarity::On))
            .unwrap();
        assert_eq!(chain.to_string(), "r1c1<>2 = r1c6=2 - r2c4<>2 = r7c4=2");
        assert!(chain.branches().is_empty());
        assert!(is_valid_chain(chain.nodes(), false));
    }

    #[test]
    fn test_net_premises_become_branches() {
        // r1c1 loses 1 => r1c1=2 => r1c2=3; r2c2 then needs both to be a single
        let mut grid = CandidateGrid::new();
        restrict(&mut grid, Position::new(0, 0), &[D1, D2]);
        restrict(&mut grid, Position::new(1, 0), &[D2, D3]);
        restrict(&mut grid, Position::new(1, 1), &[D2, D3, D5]);
        let config = ChainSearchConfig::default();
        let (catalog, store) = store_for(&grid, &config, true);
        let root = Candidate::new(Position::new(0, 0), D1);
        let table = store.normal_table(root, Polarity::Off).unwrap();
        let builder = ChainBuilder::new(&store, &catalog, &config);
        for entry in table.entries() {
            let chain = builder.build(table, entry.state).unwrap();
            assert_eq!(chain.first().unwrap().candidate_state(), Some(root.off()));
            assert_eq!(chain.last().unwrap().candidate_state(), entry.state.as_candidate_state());
            assert!(chain.branches().iter().all(|branch| branch.len() >= 2));
        }

        let target = NodeState::normal(Candidate::new(Position::new(1, 1), D5), Polarity::On);
        let chain = builder.build(table, target).unwrap();
        assert_eq!(
            chain.to_string(),
            "r1c1<>1 = r1c1=2 - r1c2<>2 = r1c2=3 - r2c2<>3 = r2c2=5 [r1c1=2 - r2c2<>2 = r2c2=5]"
        );
    }

    #[test]
    fn test_depth_limit() {
        let grid: CandidateGrid = "8..........36......7..9.2...5...7.......457.....1...3...1....68..85...1..9....4.."
            .parse()
            .unwrap();
        let config = ChainSearchConfig::default().with_max_reconstruction_depth(1);
        let (catalog, store) = store_for(&grid, &config, false);
        let builder = ChainBuilder::new(&store, &catalog, &config);
        let deep = store
            .normal_tables()
            .flat_map(|t| t.entries().iter().map(move |e| (t, e)))
            .find(|(_, e)| e.distance >= 4);
        if let Some((table, entry)) = deep {
            assert!(builder.build(table, entry.state).unwrap_err().is_depth_exceeded());
        }
    }
}
