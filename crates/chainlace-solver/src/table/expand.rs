use log::warn;

use super::{ROOT, Table, TableStore};
use crate::error::TableError;

/// Extends every normal table with what its entries imply in turn.
///
/// Each table is walked breadth-first in insertion order. For every entry,
/// the direct entries of that entry's own table are merged with summed
/// distances; merged entries may be walked again later in the same pass.
/// This is a single relaxation pass, not a fixed point: an entry improved
/// after it was walked does not update what was derived from it.
pub(crate) fn expand_tables(store: &mut TableStore) {
    for slot in 0..store.normal_slots() {
        let mut table = store.take_normal(slot);
        if !table.is_empty()
            && let Err(err) = expand_table(&mut table, store)
        {
            warn!("{err}; expansion stopped");
        }
        store.put_normal(slot, table);
    }
}

fn expand_table(table: &mut Table, store: &TableStore) -> Result<(), TableError> {
    let mut j = 0;
    while j < table.len() {
        let entry = &table.entries()[j];
        let (state, distance, rank) = (entry.state, entry.distance, entry.rank);
        // capacity keeps indices below ROOT
        let source = u16::try_from(j).unwrap_or(ROOT);
        if let Some(src) = store.table(state) {
            for direct in src.direct_entries() {
                table.relax(
                    direct.state,
                    distance.saturating_add(direct.distance),
                    rank.max(direct.rank),
                    source,
                )?;
            }
        }
        j += 1;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chainlace_core::{CandidateGrid, Digit, Digit::*, House, Position};

    use super::*;
    use crate::{
        catalog::Catalog,
        config::ChainSearchConfig,
        node::{Candidate, NodeState, Polarity},
        table::TableBuilder,
    };

    fn keep_only(grid: &mut CandidateGrid, house: House, digit: Digit, keep: &[Position]) {
        for pos in house.positions() {
            if !keep.contains(&pos) {
                grid.remove_candidate(pos, digit);
            }
        }
    }

    fn expanded_store(grid: &CandidateGrid) -> TableStore {
        let config = ChainSearchConfig::default();
        let catalog = Catalog::default();
        let mut store = TableStore::default();
        let mut scratch = grid.clone();
        TableBuilder::new(grid, &catalog, &config, false, false).build_all(&mut store, &mut scratch);
        expand_tables(&mut store);
        store
    }

    #[test]
    fn test_expansion_follows_alternating_links() {
        let mut grid = CandidateGrid::new();
        let a = Position::new(0, 0);
        let b = Position::new(5, 0);
        let c = Position::new(3, 1);
        let d = Position::new(3, 6);
        keep_only(&mut grid, House::Row { y: 0 }, D2, &[a, b]);
        keep_only(&mut grid, House::Column { x: 3 }, D2, &[c, d]);
        let store = expanded_store(&grid);

        // a off => b on => c off => d on
        let table = store
            .normal_table(Candidate::new(a, D2), Polarity::Off)
            .unwrap();
        let index = table
            .find(NodeState::normal(Candidate::new(d, D2), Polarity::On))
            .unwrap();
        let entry = table.entry(index).unwrap();
        assert_eq!(entry.distance, 3);
        assert!(entry.expanded);
        assert_ne!(entry.backrefs[0], ROOT);
    }

    #[test]
    fn test_distances_never_shrink_below_links() {
        let grid: CandidateGrid = "8..........36......7..9.2...5...7.......457.....1...3...1....68..85...1..9....4.."
            .parse()
            .unwrap();
        let store = expanded_store(&grid);
        for table in store.normal_tables() {
            assert!(table.find(table.root().unwrap()) == Some(ROOT));
            for (i, entry) in table.entries().iter().enumerate() {
                assert!(entry.distance >= 1);
                for &backref in entry.backrefs.iter() {
                    if backref != ROOT {
                        assert!(usize::from(backref) != i);
                        assert!(table.distance_of(backref) < entry.distance);
                    }
                }
            }
        }
    }
}
