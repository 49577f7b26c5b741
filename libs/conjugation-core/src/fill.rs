//! Fill-cells exercise: place shuffled answers into their table cells.
//!
//! The simpler drill over the same tables: every cell's correct value goes
//! into a shuffled pool, and the player places values onto cells until the
//! table is full. Placements copy into the cells' `current_value` /
//! `is_filled` / `is_correct` fields; the reference `correct_value` never
//! changes.

use crate::error::{ExerciseError, Result};
use crate::types::Table;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Outcome of placing a variant on a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    /// The value belongs to that cell and was filled in.
    Placed { exercise_completed: bool },
    /// Wrong cell for this value; nothing changed.
    Rejected,
}

impl Placement {
    pub fn is_placed(&self) -> bool {
        matches!(self, Self::Placed { .. })
    }
}

/// State of a fill-cells run over one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillCellsExercise {
    pub table: Table,
    /// Unplaced values, shuffled. One entry per unfilled cell.
    pub variants: Vec<String>,
    pub selected_variant: Option<String>,
    pub is_completed: bool,
    pub show_hints: bool,
    pub show_answers: bool,
}

impl FillCellsExercise {
    /// Build an exercise for a table.
    pub fn new(table: Table) -> Result<Self> {
        Self::new_with_rng(table, &mut rand::thread_rng())
    }

    /// Build an exercise with a caller-supplied random source.
    pub fn new_with_rng<R: Rng>(table: Table, rng: &mut R) -> Result<Self> {
        table.validate()?;
        let mut exercise = Self {
            table,
            variants: Vec::new(),
            selected_variant: None,
            is_completed: false,
            show_hints: false,
            show_answers: false,
        };
        exercise.rebuild(rng);
        Ok(exercise)
    }

    /// Toggle the selected variant; reselecting the same value deselects.
    pub fn select_variant(&mut self, variant: &str) {
        if self.selected_variant.as_deref() == Some(variant) {
            self.selected_variant = None;
        } else {
            self.selected_variant = Some(variant.to_string());
        }
    }

    /// Place the currently selected variant on a cell.
    pub fn place_selected(&mut self, row: usize, col: usize) -> Result<Placement> {
        let variant = self
            .selected_variant
            .clone()
            .ok_or(ExerciseError::NoVariantSelected)?;
        self.place(row, col, &variant)
    }

    /// Place a value on a cell.
    ///
    /// The correct value fills the cell, consumes one pool occurrence, and
    /// clears the selection; a wrong value is rejected without touching
    /// state. Placing onto a filled cell or outside the table is an error.
    pub fn place(&mut self, row: usize, col: usize, variant: &str) -> Result<Placement> {
        if self.is_completed {
            return Err(ExerciseError::ExerciseCompleted);
        }
        let cell = self
            .table
            .cells
            .get_mut(row)
            .and_then(|cells| cells.get_mut(col))
            .ok_or(ExerciseError::CellOutOfBounds { row, col })?;
        if cell.is_filled {
            return Err(ExerciseError::CellAlreadyFilled { row, col });
        }
        if cell.correct_value != variant {
            return Ok(Placement::Rejected);
        }

        cell.current_value = Some(variant.to_string());
        cell.is_filled = true;
        cell.is_correct = true;
        if let Some(pos) = self.variants.iter().position(|v| v == variant) {
            self.variants.remove(pos);
        }
        self.selected_variant = None;
        self.is_completed = self.table.cells.iter().flatten().all(|c| c.is_filled);
        Ok(Placement::Placed {
            exercise_completed: self.is_completed,
        })
    }

    /// Flip the hints flag. Cosmetic; no effect on correctness.
    pub fn toggle_hints(&mut self) {
        self.show_hints = !self.show_hints;
    }

    /// Flip the show-answers flag. Cosmetic; no effect on correctness.
    pub fn toggle_answers(&mut self) {
        self.show_answers = !self.show_answers;
    }

    /// Discard all progress: empty every cell and reshuffle the pool.
    pub fn reset(&mut self) {
        self.reset_with_rng(&mut rand::thread_rng());
    }

    /// Reset with a caller-supplied random source.
    pub fn reset_with_rng<R: Rng>(&mut self, rng: &mut R) {
        self.rebuild(rng);
    }

    fn rebuild<R: Rng>(&mut self, rng: &mut R) {
        for cell in self.table.cells.iter_mut().flatten() {
            cell.current_value = None;
            cell.is_filled = false;
            cell.is_correct = false;
        }
        self.variants = self
            .table
            .cells
            .iter()
            .flatten()
            .map(|cell| cell.correct_value.clone())
            .collect();
        self.variants.shuffle(rng);
        self.selected_variant = None;
        self.is_completed = self.variants.is_empty();
        self.show_hints = false;
        self.show_answers = false;
    }
}
