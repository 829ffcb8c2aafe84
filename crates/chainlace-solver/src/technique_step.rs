use std::fmt::Debug;

use chainlace_core::{CandidateGrid, DigitPositions, DigitSet};

use crate::{Deduction, TechniqueApplication};

/// Cells involved in a technique's applicability conditions.
pub type ConditionCells = DigitPositions;

/// Pairs of (cells, digits) involved in a technique's applicability conditions.
pub type ConditionDigitCells = Vec<(DigitPositions, DigitSet)>;

/// A hint step produced by a technique.
pub trait TechniqueStep: Debug + Send + Sync {
    /// Returns the name of the technique that produced this step.
    fn technique_name(&self) -> &'static str;

    /// Returns a boxed clone of the step.
    fn clone_box(&self) -> BoxedTechniqueStep;

    /// Returns the cells involved in the applicability conditions.
    ///
    /// These are the cells that justify applying the technique. Hint systems may
    /// use this to highlight relevant cells before naming the technique.
    fn condition_cells(&self) -> ConditionCells;

    /// Returns condition pairs of (cells, digits) involved in applicability.
    fn condition_digit_cells(&self) -> ConditionDigitCells;

    /// Returns the concrete changes produced by applying the technique.
    fn application(&self) -> Vec<TechniqueApplication>;

    /// Applies [`application`](Self::application) to `grid`.
    ///
    /// Returns `true` if the grid changed.
    fn apply_to(&self, grid: &mut CandidateGrid) -> bool {
        let mut changed = false;
        for app in self.application() {
            match app {
                TechniqueApplication::Placement { position, digit } => {
                    if grid.has_candidate(position, digit) {
                        changed |= grid.set_value(position, digit);
                    }
                }
                TechniqueApplication::CandidateElimination { positions, digits } => {
                    for digit in digits {
                        changed |= grid.remove_candidate_with_mask(positions, digit);
                    }
                }
            }
        }
        changed
    }
}

/// Shared data for technique steps without technique-specific payloads.
#[derive(Debug, Clone)]
pub struct TechniqueStepData {
    technique_name: &'static str,
    condition_cells: ConditionCells,
    condition_digit_cells: ConditionDigitCells,
    application: Vec<TechniqueApplication>,
}

impl TechniqueStepData {
    /// Creates a new `TechniqueStepData`.
    #[must_use]
    pub fn new(
        technique_name: &'static str,
        condition_cells: ConditionCells,
        condition_digit_cells: ConditionDigitCells,
        application: Vec<TechniqueApplication>,
    ) -> Self {
        Self {
            technique_name,
            condition_cells,
            condition_digit_cells,
            application,
        }
    }
}

impl TechniqueStep for TechniqueStepData {
    fn technique_name(&self) -> &'static str {
        self.technique_name
    }

    fn clone_box(&self) -> BoxedTechniqueStep {
        Box::new(self.clone())
    }

    fn condition_cells(&self) -> ConditionCells {
        self.condition_cells
    }

    fn condition_digit_cells(&self) -> ConditionDigitCells {
        self.condition_digit_cells.clone()
    }

    fn application(&self) -> Vec<TechniqueApplication> {
        self.application.clone()
    }
}

impl TechniqueStep for Deduction {
    fn technique_name(&self) -> &'static str {
        self.kind().name()
    }

    fn clone_box(&self) -> BoxedTechniqueStep {
        Box::new(self.clone())
    }

    fn condition_cells(&self) -> ConditionCells {
        Deduction::condition_cells(self)
    }

    fn condition_digit_cells(&self) -> ConditionDigitCells {
        Deduction::condition_digit_cells(self)
    }

    fn application(&self) -> Vec<TechniqueApplication> {
        Deduction::application(self)
    }

    fn apply_to(&self, grid: &mut CandidateGrid) -> bool {
        Deduction::apply_to(self, grid)
    }
}

/// A boxed technique step.
pub type BoxedTechniqueStep = Box<dyn TechniqueStep>;

impl Clone for BoxedTechniqueStep {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

#[cfg(test)]
mod tests {
    use chainlace_core::{Digit, Position};

    use super::*;

    #[test]
    fn test_step_data_applies_placement_and_eliminations() {
        let mut grid = CandidateGrid::new();
        let step = TechniqueStepData::new(
            "test",
            DigitPositions::from_elem(Position::new(0, 0)),
            Vec::new(),
            vec![
                TechniqueApplication::Placement {
                    position: Position::new(0, 0),
                    digit: Digit::D1,
                },
                TechniqueApplication::CandidateElimination {
                    positions: DigitPositions::from_elem(Position::new(8, 8)),
                    digits: DigitSet::from_elem(Digit::D2),
                },
            ],
        );
        assert!(step.apply_to(&mut grid));
        assert_eq!(grid.value(Position::new(0, 0)), Some(Digit::D1));
        assert!(!grid.has_candidate(Position::new(8, 8), Digit::D2));
        assert!(!step.apply_to(&mut grid));
    }
}
