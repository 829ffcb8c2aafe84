use chainlace_core::{CandidateGrid, Digit, DigitPositions, DigitSet, House, Position};
use rustc_hash::FxHashSet;

/// An almost locked set: `k` cells of one house holding `k + 1` digits.
///
/// Removing any one digit from the set locks the remaining `k` digits into
/// its cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Als {
    pub(crate) cells: DigitPositions,
    pub(crate) candidates: DigitSet,
    /// Per digit, the member cells holding it.
    pub(crate) digit_cells: [DigitPositions; 9],
    /// Per digit, the cells outside the set seeing every member holding it.
    pub(crate) buddies: [DigitPositions; 9],
}

impl Als {
    fn new(grid: &CandidateGrid, cells: DigitPositions, candidates: DigitSet) -> Self {
        let mut digit_cells = [DigitPositions::EMPTY; 9];
        let mut buddies = [DigitPositions::EMPTY; 9];
        for digit in candidates {
            let holding = cells & grid.digit_positions(digit);
            digit_cells[digit.index()] = holding;
            buddies[digit.index()] = holding.common_peers().difference(cells);
        }
        Self {
            cells,
            candidates,
            digit_cells,
            buddies,
        }
    }

    pub(crate) fn size(&self) -> usize {
        self.cells.len()
    }

    pub(crate) fn digit_cells(&self, digit: Digit) -> DigitPositions {
        self.digit_cells[digit.index()]
    }

    pub(crate) fn buddies(&self, digit: Digit) -> DigitPositions {
        self.buddies[digit.index()]
    }
}

/// Collects every almost locked set of `2..=max_size` cells.
///
/// A set lying in two houses (a row or column segment inside a box) is
/// recorded once.
pub(crate) fn find_almost_locked_sets(grid: &CandidateGrid, max_size: usize) -> Vec<Als> {
    let mut found = Vec::new();
    let mut seen = FxHashSet::default();
    for house in House::ALL {
        let cells = (house.positions() & grid.unsolved_cells())
            .iter()
            .collect::<Vec<_>>();
        let mut chosen = Vec::with_capacity(max_size);
        collect_subsets(grid, &cells, 0, max_size, &mut chosen, &mut |set, candidates| {
            if seen.insert(set.bits()) {
                found.push(Als::new(grid, set, candidates));
            }
        });
    }
    found
}

fn collect_subsets<F>(
    grid: &CandidateGrid,
    cells: &[Position],
    start: usize,
    max_size: usize,
    chosen: &mut Vec<Position>,
    emit: &mut F,
) where
    F: FnMut(DigitPositions, DigitSet),
{
    for (i, &cell) in cells.iter().enumerate().skip(start) {
        chosen.push(cell);
        let candidates = chosen
            .iter()
            .fold(DigitSet::EMPTY, |acc, pos| acc | grid.candidates_at(*pos));
        let k = chosen.len();
        if k >= 2 && candidates.len() == k + 1 {
            emit(chosen.iter().copied().collect(), candidates);
        }
        // a union already past max_size + 1 digits cannot shrink again
        if k < max_size && candidates.len() <= max_size + 1 {
            collect_subsets(grid, cells, i + 1, max_size, chosen, emit);
        }
        chosen.pop();
    }
}
