use chainlace_core::{CandidateGrid, Digit, DigitPositions, House};

/// Two or three cells of one box on one line, holding the same digit.
///
/// Treated as a single node: the group is "on" when the digit lies in one of
/// its cells and "off" when it lies in none of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct GroupNode {
    pub(crate) digit: Digit,
    pub(crate) cells: DigitPositions,
    pub(crate) line: House,
    pub(crate) box_house: House,
    /// Cells outside the group seeing every member.
    pub(crate) buddies: DigitPositions,
}

impl GroupNode {
    /// Returns both houses containing the group.
    pub(crate) fn houses(&self) -> [House; 2] {
        [self.line, self.box_house]
    }
}

/// Collects the group nodes of `grid`.
///
/// Per digit and box, the positions on each crossing line form a node when
/// there are two or three of them and the line still has positions for the
/// digit outside the box.
pub(crate) fn find_group_nodes(grid: &CandidateGrid) -> Vec<GroupNode> {
    let mut groups = Vec::new();
    for digit in Digit::ALL {
        let positions = grid.digit_positions(digit);
        for box_index in 0..9 {
            let box_house = House::Box { index: box_index };
            let in_box = positions & box_house.positions();
            if in_box.len() < 2 {
                continue;
            }
            let (bx, by) = (box_index % 3 * 3, box_index / 3 * 3);
            let lines = (by..by + 3)
                .map(|y| House::Row { y })
                .chain((bx..bx + 3).map(|x| House::Column { x }));
            for line in lines {
                let cells = in_box & line.positions();
                if cells.len() < 2 {
                    continue;
                }
                let outside = (positions & line.positions()).difference(box_house.positions());
                if outside.is_empty() {
                    continue;
                }
                groups.push(GroupNode {
                    digit,
                    cells,
                    line,
                    box_house,
                    buddies: cells.common_peers(),
                });
            }
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use chainlace_core::{Digit::*, Position};

    use super::*;

    #[test]
    fn test_empty_grid_has_a_group_per_box_line() {
        let groups = find_group_nodes(&CandidateGrid::new());
        // 9 digits, 9 boxes, 6 crossing lines
        assert_eq!(groups.len(), 9 * 9 * 6);
        assert!(groups.iter().all(|g| g.cells.len() == 3));
    }

    #[test]
    fn test_line_confined_to_box_is_no_group() {
        let mut grid = CandidateGrid::new();
        for x in 3..9 {
            grid.remove_candidate(Position::new(x, 0), D1);
        }
        let groups = find_group_nodes(&grid);
        assert!(
            !groups
                .iter()
                .any(|g| g.digit == D1 && g.line == House::Row { y: 0 } && g.box_house == House::Box { index: 0 })
        );
        let group = groups
            .iter()
            .find(|g| g.digit == D1 && g.line == House::Column { x: 0 } && g.box_house == House::Box { index: 0 })
            .unwrap();
        assert!(group.buddies.contains(Position::new(0, 8)));
        assert!(group.buddies.contains(Position::new(2, 2)));
        assert!(!group.buddies.contains(Position::new(0, 0)));
        assert_eq!(group.houses()[1], House::Box { index: 0 });
    }

    #[test]
    fn test_two_cell_group() {
        let mut grid = CandidateGrid::new();
        grid.remove_candidate(Position::new(2, 0), D4);
        let group = find_group_nodes(&grid)
            .into_iter()
            .find(|g| g.digit == D4 && g.line == House::Row { y: 0 } && g.box_house == House::Box { index: 0 })
            .unwrap();
        assert_eq!(
            group.cells,
            DigitPositions::from_iter([Position::new(0, 0), Position::new(1, 0)])
        );
    }
}
