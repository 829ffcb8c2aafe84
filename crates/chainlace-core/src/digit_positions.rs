//! Sets of board cells packed into a 128-bit word.

use std::{
    fmt::{self, Debug},
    iter::FusedIterator,
    ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not},
};

use crate::Position;

/// A set of cells, one bit per [`Position`] index.
///
/// Used both for "where can digit d still go" and for arbitrary cell groups
/// such as houses, peers and chain footprints.
///
/// # Examples
///
/// ```
/// use chainlace_core::{DigitPositions, Position};
///
/// let row = DigitPositions::ROW_POSITIONS[0];
/// let box0 = DigitPositions::BOX_POSITIONS[0];
/// assert_eq!((row & box0).len(), 3);
/// assert!((row & box0).contains(Position::new(2, 0)));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DigitPositions {
    bits: u128,
}

const fn row_bits(y: usize) -> u128 {
    0x1ff << (y * 9)
}

const fn column_bits(x: usize) -> u128 {
    let mut bits = 0;
    let mut y = 0;
    while y < 9 {
        bits |= 1 << (y * 9 + x);
        y += 1;
    }
    bits
}

const fn box_bits(b: usize) -> u128 {
    let (bx, by) = ((b % 3) * 3, (b / 3) * 3);
    let mut bits = 0;
    let mut i = 0;
    while i < 9 {
        bits |= 1 << ((by + i / 3) * 9 + bx + i % 3);
        i += 1;
    }
    bits
}

#[derive(Clone, Copy)]
enum HouseKind {
    Row,
    Column,
    Box,
}

const fn house_table(kind: HouseKind) -> [DigitPositions; 9] {
    let mut table = [DigitPositions::EMPTY; 9];
    let mut i = 0;
    while i < 9 {
        let bits = match kind {
            HouseKind::Row => row_bits(i),
            HouseKind::Column => column_bits(i),
            HouseKind::Box => box_bits(i),
        };
        table[i] = DigitPositions { bits };
        i += 1;
    }
    table
}

impl DigitPositions {
    const MASK: u128 = (1 << 81) - 1;

    /// The empty set.
    pub const EMPTY: Self = Self { bits: 0 };
    /// All 81 cells.
    pub const FULL: Self = Self { bits: Self::MASK };

    /// Cells of each row, indexed by `y`.
    pub const ROW_POSITIONS: [Self; 9] = house_table(HouseKind::Row);
    /// Cells of each column, indexed by `x`.
    pub const COLUMN_POSITIONS: [Self; 9] = house_table(HouseKind::Column);
    /// Cells of each box, indexed by box number.
    pub const BOX_POSITIONS: [Self; 9] = house_table(HouseKind::Box);

    /// The 20 peers of each cell, indexed by cell index.
    pub const PEERS: [Self; 81] = {
        let mut peers = [Self::EMPTY; 81];
        let mut i = 0;
        while i < 81 {
            let (x, y) = (i % 9, i / 9);
            let bits = row_bits(y) | column_bits(x) | box_bits((y / 3) * 3 + x / 3);
            peers[i] = Self {
                bits: bits & !(1 << i),
            };
            i += 1;
        }
        peers
    };

    /// Creates an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self::EMPTY
    }

    /// Creates a set holding one cell.
    #[must_use]
    pub const fn from_elem(pos: Position) -> Self {
        Self {
            bits: 1 << pos.index(),
        }
    }

    /// Returns the raw bits.
    #[must_use]
    pub const fn bits(self) -> u128 {
        self.bits
    }

    /// Returns the number of cells in the set.
    #[must_use]
    pub const fn len(self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Returns `true` if the set holds no cell.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.bits == 0
    }

    /// Returns `true` if `pos` is in the set.
    #[must_use]
    pub const fn contains(self, pos: Position) -> bool {
        self.bits & (1 << pos.index()) != 0
    }

    /// Inserts `pos`, returning `true` if it was not present.
    pub fn insert(&mut self, pos: Position) -> bool {
        let absent = !self.contains(pos);
        self.bits |= 1 << pos.index();
        absent
    }

    /// Removes `pos`, returning `true` if it was present.
    pub fn remove(&mut self, pos: Position) -> bool {
        let present = self.contains(pos);
        self.bits &= !(1 << pos.index());
        present
    }

    /// Returns the union of two sets.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self {
            bits: self.bits | other.bits,
        }
    }

    /// Returns the intersection of two sets.
    #[must_use]
    pub const fn intersection(self, other: Self) -> Self {
        Self {
            bits: self.bits & other.bits,
        }
    }

    /// Returns the cells of `self` that are not in `other`.
    #[must_use]
    pub const fn difference(self, other: Self) -> Self {
        Self {
            bits: self.bits & !other.bits,
        }
    }

    /// Returns `true` if every cell of `self` is in `other`.
    #[must_use]
    pub const fn is_subset(self, other: Self) -> bool {
        self.bits & !other.bits == 0
    }

    /// Returns `true` if the sets have no cell in common.
    #[must_use]
    pub const fn is_disjoint(self, other: Self) -> bool {
        self.bits & other.bits == 0
    }

    /// Returns the cell with the lowest index.
    #[must_use]
    pub const fn first(self) -> Option<Position> {
        if self.bits == 0 {
            None
        } else {
            Some(Position::from_index(self.bits.trailing_zeros() as usize))
        }
    }

    /// Returns the only cell of a one-element set.
    #[must_use]
    pub const fn as_single(self) -> Option<Position> {
        if self.len() == 1 { self.first() } else { None }
    }

    /// Returns both cells of a two-element set, lowest index first.
    #[must_use]
    pub fn as_double(self) -> Option<(Position, Position)> {
        if self.len() != 2 {
            return None;
        }
        let mut iter = self.iter();
        Some((iter.next()?, iter.next()?))
    }

    /// Returns the cells seeing every cell of `self` (excluding `self`).
    ///
    /// The empty set has no common peers.
    #[must_use]
    pub fn common_peers(self) -> Self {
        if self.is_empty() {
            return Self::EMPTY;
        }
        self.iter()
            .fold(Self::FULL, |acc, pos| acc & pos.house_peers())
            .difference(self)
    }

    /// Iterates over the cells in index order.
    #[must_use]
    pub const fn iter(self) -> DigitPositionsIter {
        DigitPositionsIter { bits: self.bits }
    }
}

impl Debug for DigitPositions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl BitOr for DigitPositions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitOrAssign for DigitPositions {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

impl BitAnd for DigitPositions {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        self.intersection(rhs)
    }
}

impl BitAndAssign for DigitPositions {
    fn bitand_assign(&mut self, rhs: Self) {
        *self = self.intersection(rhs);
    }
}

impl Not for DigitPositions {
    type Output = Self;

    fn not(self) -> Self {
        Self::FULL.difference(self)
    }
}

impl FromIterator<Position> for DigitPositions {
    fn from_iter<T: IntoIterator<Item = Position>>(iter: T) -> Self {
        let mut set = Self::EMPTY;
        for pos in iter {
            set.insert(pos);
        }
        set
    }
}

impl IntoIterator for DigitPositions {
    type Item = Position;
    type IntoIter = DigitPositionsIter;

    fn into_iter(self) -> DigitPositionsIter {
        self.iter()
    }
}

/// Iterator over the cells of a [`DigitPositions`].
#[derive(Debug, Clone)]
pub struct DigitPositionsIter {
    bits: u128,
}

impl Iterator for DigitPositionsIter {
    type Item = Position;

    fn next(&mut self) -> Option<Position> {
        if self.bits == 0 {
            return None;
        }
        let index = self.bits.trailing_zeros() as usize;
        self.bits &= self.bits - 1;
        Some(Position::from_index(index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.bits.count_ones() as usize;
        (len, Some(len))
    }
}

impl ExactSizeIterator for DigitPositionsIter {}
impl FusedIterator for DigitPositionsIter {}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_house_tables() {
        for i in 0..9 {
            assert_eq!(DigitPositions::ROW_POSITIONS[i].len(), 9);
            assert_eq!(DigitPositions::COLUMN_POSITIONS[i].len(), 9);
            assert_eq!(DigitPositions::BOX_POSITIONS[i].len(), 9);
        }
        let union = DigitPositions::BOX_POSITIONS
            .iter()
            .fold(DigitPositions::EMPTY, |acc, b| acc | *b);
        assert_eq!(union, DigitPositions::FULL);
        assert!(DigitPositions::BOX_POSITIONS[4].contains(Position::new(5, 3)));
    }

    #[test]
    fn test_common_peers() {
        let pair = DigitPositions::from_iter([Position::new(0, 0), Position::new(5, 0)]);
        // rest of row 0 only
        assert_eq!(
            pair.common_peers(),
            DigitPositions::ROW_POSITIONS[0].difference(pair)
        );
        let diagonal = DigitPositions::from_iter([Position::new(0, 0), Position::new(4, 4)]);
        assert_eq!(
            diagonal.common_peers(),
            DigitPositions::from_iter([Position::new(4, 0), Position::new(0, 4)])
        );
    }

    #[test]
    fn test_single_and_double() {
        let a = Position::new(3, 3);
        let b = Position::new(8, 1);
        assert_eq!(DigitPositions::from_elem(a).as_single(), Some(a));
        assert_eq!(DigitPositions::from_iter([a, b]).as_double(), Some((b, a)));
        assert_eq!(DigitPositions::EMPTY.first(), None);
    }

    fn positions() -> impl Strategy<Value = DigitPositions> {
        prop::collection::vec(0usize..81, 0..30)
            .prop_map(|v| v.into_iter().map(Position::from_index).collect())
    }

    proptest! {
        #[test]
        fn prop_set_algebra(a in positions(), b in positions()) {
            prop_assert_eq!((a | b).len() + (a & b).len(), a.len() + b.len());
            prop_assert!(a.difference(b).is_disjoint(b));
            prop_assert_eq!(!(!a), a);
            prop_assert_eq!(a.iter().count(), a.len());
        }

        #[test]
        fn prop_common_peers_see_all(a in positions()) {
            for peer in a.common_peers() {
                prop_assert!(a.iter().all(|pos| pos.sees(peer)));
            }
        }
    }
}
