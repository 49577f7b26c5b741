//! Word-transformation sequences and the exercise state machine.
//!
//! A [`Sequence`] is one cell's transformation problem: the column's base
//! word, the cell's conjugated target, and the edit operations between
//! them. The player works through the operations one at a time; the
//! [`TransformationExercise`] tracks which sequence is active and when the
//! whole table is done.

use std::collections::BTreeSet;

use crate::diff::compute_operations;
use crate::error::{ExerciseError, Result};
use crate::types::{Operation, Table};
use crate::variants::{generate_variants, DEFAULT_VARIANT_COUNT};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Outcome of a player submission.
///
/// A wrong answer is the common case and is reported here, not as an
/// error: rejection leaves all state untouched and the player retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attempt {
    /// The submission matched the current operation and was applied.
    Accepted { sequence_completed: bool },
    /// Wrong letters or wrong variant; nothing changed.
    Rejected,
}

impl Attempt {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

/// One word-transformation problem, tied to a table cell.
///
/// `current_word` always equals the result of applying the first
/// `current_operation` operations to `base_word`; a completed sequence has
/// applied them all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequence {
    pub row_index: usize,
    pub col_index: usize,
    pub base_word: String,
    pub target_word: String,
    pub operations: Vec<Operation>,
    /// Count of operations applied so far; also the index of the next one.
    pub current_operation: usize,
    pub current_word: String,
    pub is_completed: bool,
    pub show_hint: bool,
}

impl Sequence {
    pub(crate) fn new(
        row_index: usize,
        col_index: usize,
        base_word: String,
        target_word: String,
        operations: Vec<Operation>,
    ) -> Self {
        let is_completed = operations.is_empty();
        Self {
            row_index,
            col_index,
            current_word: base_word.clone(),
            base_word,
            target_word,
            operations,
            current_operation: 0,
            is_completed,
            show_hint: false,
        }
    }

    /// The operation awaiting the player, if any.
    pub fn current(&self) -> Option<&Operation> {
        if self.is_completed {
            None
        } else {
            self.operations.get(self.current_operation)
        }
    }

    /// Submit the player's selected letter indices against the current
    /// deletion.
    ///
    /// Accepts only the exact contiguous range the operation covers; any
    /// other selection is rejected without touching state. Fails if the
    /// sequence is completed or the current operation is an insertion.
    pub fn submit_deletion(&mut self, selected: &BTreeSet<usize>) -> Result<Attempt> {
        let op = match self.current() {
            None => {
                return Err(ExerciseError::SequenceCompleted {
                    row: self.row_index,
                    col: self.col_index,
                })
            }
            Some(op) => op.clone(),
        };
        let (index, length) = match &op {
            Operation::Delete { index, length, .. } => (*index, *length),
            Operation::Insert { .. } => return Err(ExerciseError::ExpectedDeletion),
        };

        if selected.len() != length || !selected.iter().copied().eq(index..index + length) {
            return Ok(Attempt::Rejected);
        }

        self.current_word = op.apply_to(&self.current_word);
        Ok(Attempt::Accepted {
            sequence_completed: self.advance_operation(),
        })
    }

    /// Submit the player's chosen variant against the current insertion.
    ///
    /// Accepts only the operation's own text; decoys are rejected without
    /// touching state. Fails if the sequence is completed or the current
    /// operation is a deletion.
    pub fn submit_insertion_choice(&mut self, chosen: &str) -> Result<Attempt> {
        let op = match self.current() {
            None => {
                return Err(ExerciseError::SequenceCompleted {
                    row: self.row_index,
                    col: self.col_index,
                })
            }
            Some(op) => op.clone(),
        };
        let text = match &op {
            Operation::Insert { text, .. } => text,
            Operation::Delete { .. } => return Err(ExerciseError::ExpectedInsertion),
        };

        if chosen != text {
            return Ok(Attempt::Rejected);
        }

        self.current_word = op.apply_to(&self.current_word);
        Ok(Attempt::Accepted {
            sequence_completed: self.advance_operation(),
        })
    }

    /// Flip the hint flag. Cosmetic; no effect on correctness.
    pub fn toggle_hint(&mut self) {
        self.show_hint = !self.show_hint;
    }

    // Called exactly once per accepted submission.
    fn advance_operation(&mut self) -> bool {
        self.current_operation += 1;
        if self.current_operation == self.operations.len() {
            self.is_completed = true;
        }
        self.is_completed
    }
}

/// Build one sequence per table cell, in row-major order.
///
/// Two passes: the first collects every cell's operations so insertion
/// decoys can be drawn from sibling cells anywhere in the table, the
/// second builds the sequences with the insertion choices populated.
pub fn build_sequences<R: Rng>(table: &Table, rng: &mut R) -> Result<Vec<Sequence>> {
    table.validate()?;

    let mut pool = Vec::new();
    for row in &table.cells {
        for cell in row {
            pool.extend(compute_operations(
                &table.columns[cell.col],
                &cell.correct_value,
            ));
        }
    }

    let mut sequences = Vec::with_capacity(table.cell_count());
    for (row_index, row) in table.cells.iter().enumerate() {
        for (col_index, cell) in row.iter().enumerate() {
            let base = &table.columns[col_index];
            let mut operations = compute_operations(base, &cell.correct_value);
            for op in &mut operations {
                if let Operation::Insert { text, variants, .. } = op {
                    *variants = generate_variants(text, &pool, DEFAULT_VARIANT_COUNT, rng);
                }
            }
            sequences.push(Sequence::new(
                row_index,
                col_index,
                base.clone(),
                cell.correct_value.clone(),
                operations,
            ));
        }
    }
    Ok(sequences)
}

/// State of a word-transformation run over one table.
///
/// Owns its sequences exclusively; the presentation layer reads snapshots
/// and feeds player actions back through the submit methods. The table is
/// reference data and is never mutated here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformationExercise {
    pub table: Table,
    pub sequences: Vec<Sequence>,
    pub current_sequence_index: usize,
    pub is_completed: bool,
    pub show_answers: bool,
}

impl TransformationExercise {
    /// Build an exercise for a table.
    pub fn new(table: Table) -> Result<Self> {
        Self::new_with_rng(table, &mut rand::thread_rng())
    }

    /// Build an exercise with a caller-supplied random source.
    pub fn new_with_rng<R: Rng>(table: Table, rng: &mut R) -> Result<Self> {
        let sequences = build_sequences(&table, rng)?;
        let is_completed = sequences.is_empty();
        Ok(Self {
            table,
            sequences,
            current_sequence_index: 0,
            is_completed,
            show_answers: false,
        })
    }

    /// The sequence the player is working on.
    ///
    /// After completion this is the final sequence, which stays
    /// addressable for display.
    pub fn current_sequence(&self) -> Option<&Sequence> {
        self.sequences.get(self.current_sequence_index)
    }

    fn current_sequence_mut(&mut self) -> Result<&mut Sequence> {
        if self.is_completed {
            return Err(ExerciseError::ExerciseCompleted);
        }
        self.sequences
            .get_mut(self.current_sequence_index)
            .ok_or(ExerciseError::ExerciseCompleted)
    }

    /// Submit selected letter indices against the current sequence.
    pub fn submit_deletion(&mut self, selected: &BTreeSet<usize>) -> Result<Attempt> {
        self.current_sequence_mut()?.submit_deletion(selected)
    }

    /// Submit a chosen variant against the current sequence.
    pub fn submit_insertion_choice(&mut self, chosen: &str) -> Result<Attempt> {
        self.current_sequence_mut()?.submit_insertion_choice(chosen)
    }

    /// Move to the next sequence. Returns true when the exercise is now
    /// completed, in which case the index stays clamped on the final
    /// sequence.
    pub fn advance_to_next_sequence(&mut self) -> bool {
        let next = self.current_sequence_index + 1;
        if next >= self.sequences.len() {
            self.is_completed = true;
            self.current_sequence_index = self.sequences.len().saturating_sub(1);
            true
        } else {
            self.current_sequence_index = next;
            false
        }
    }

    /// Flip the hint flag on the current sequence.
    pub fn toggle_hint(&mut self) {
        if let Some(sequence) = self.sequences.get_mut(self.current_sequence_index) {
            sequence.toggle_hint();
        }
    }

    /// Flip the show-answers flag. Cosmetic; no effect on correctness.
    pub fn toggle_answers(&mut self) {
        self.show_answers = !self.show_answers;
    }

    /// Discard all progress and rebuild every sequence from the table.
    pub fn reset(&mut self) -> Result<()> {
        self.reset_with_rng(&mut rand::thread_rng())
    }

    /// Reset with a caller-supplied random source.
    pub fn reset_with_rng<R: Rng>(&mut self, rng: &mut R) -> Result<()> {
        self.sequences = build_sequences(&self.table, rng)?;
        self.current_sequence_index = 0;
        self.is_completed = self.sequences.is_empty();
        self.show_answers = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(99)
    }

    fn sample_table() -> Table {
        Table::new(
            "spanish-present",
            "Spanish Present Tense",
            vec!["Yo".into(), "Tú".into(), "Nosotros".into()],
            vec!["hablar".into(), "comer".into()],
            vec![
                vec!["hablo".into(), "como".into()],
                vec!["hablas".into(), "comes".into()],
                vec!["hablamos".into(), "comemos".into()],
            ],
        )
        .unwrap()
    }

    fn one_cell_table() -> Table {
        Table::new(
            "spanish-present-hablar",
            "Spanish Present Tense - hablar",
            vec!["Yo".into()],
            vec!["hablar".into()],
            vec![vec!["hablo".into()]],
        )
        .unwrap()
    }

    fn selection(range: std::ops::Range<usize>) -> BTreeSet<usize> {
        range.collect()
    }

    /// Feed the correct answer for every remaining operation.
    fn drive_to_completion(sequence: &mut Sequence) {
        while let Some(op) = sequence.current().cloned() {
            let attempt = match &op {
                Operation::Delete { index, length, .. } => sequence
                    .submit_deletion(&selection(*index..index + length))
                    .unwrap(),
                Operation::Insert { text, .. } => {
                    sequence.submit_insertion_choice(text).unwrap()
                }
            };
            assert!(attempt.is_accepted());
        }
    }

    #[test]
    fn sequences_are_row_major_and_initialized() {
        let sequences = build_sequences(&sample_table(), &mut rng()).unwrap();
        assert_eq!(sequences.len(), 6);

        let coords: Vec<(usize, usize)> =
            sequences.iter().map(|s| (s.row_index, s.col_index)).collect();
        assert_eq!(coords, vec![(0, 0), (0, 1), (1, 0), (1, 1), (2, 0), (2, 1)]);

        for sequence in &sequences {
            assert_eq!(sequence.current_word, sequence.base_word);
            assert_eq!(sequence.current_operation, 0);
            assert!(!sequence.is_completed);
            assert!(!sequence.show_hint);
        }
    }

    #[test]
    fn build_rejects_malformed_table() {
        let mut table = sample_table();
        table.cells[1].pop();
        assert!(matches!(
            build_sequences(&table, &mut rng()),
            Err(ExerciseError::RowWidthMismatch { row: 1, .. })
        ));
    }

    #[test]
    fn every_insertion_carries_a_full_choice_set() {
        let sequences = build_sequences(&sample_table(), &mut rng()).unwrap();
        for sequence in &sequences {
            for op in &sequence.operations {
                if let Operation::Insert { text, variants, .. } = op {
                    assert_eq!(variants.len(), DEFAULT_VARIANT_COUNT);
                    assert_eq!(variants.iter().filter(|v| v == &text).count(), 1);
                    for v in variants {
                        assert_eq!(v.chars().count(), text.chars().count());
                    }
                }
            }
        }
    }

    #[test]
    fn identical_base_and_target_is_immediately_complete() {
        let table = Table::new(
            "t",
            "Test",
            vec!["Yo".into()],
            vec!["ser".into()],
            vec![vec!["ser".into()]],
        )
        .unwrap();
        let sequences = build_sequences(&table, &mut rng()).unwrap();
        assert!(sequences[0].is_completed);
        assert!(sequences[0].operations.is_empty());
        assert_eq!(sequences[0].current_operation, 0);
    }

    #[test]
    fn correct_submissions_reach_the_target() {
        let sequences = build_sequences(&sample_table(), &mut rng()).unwrap();
        for mut sequence in sequences {
            drive_to_completion(&mut sequence);
            assert!(sequence.is_completed);
            assert_eq!(sequence.current_word, sequence.target_word);
            assert_eq!(sequence.current_operation, sequence.operations.len());
        }
    }

    #[test]
    fn rejection_is_side_effect_free() {
        let mut exercise =
            TransformationExercise::new_with_rng(one_cell_table(), &mut rng()).unwrap();

        // hablar -> hablo starts with Delete { index: 4, length: 2 }.
        let before = exercise.sequences[0].clone();
        let attempt = exercise.submit_deletion(&selection(0..2)).unwrap();
        assert_eq!(attempt, Attempt::Rejected);
        assert_eq!(exercise.sequences[0], before);

        // Subset, superset, disjoint.
        for wrong in [selection(4..5), selection(3..6), selection(0..1)] {
            assert_eq!(exercise.submit_deletion(&wrong).unwrap(), Attempt::Rejected);
        }
        assert_eq!(exercise.sequences[0], before);
    }

    #[test]
    fn decoy_choice_is_rejected() {
        let mut exercise =
            TransformationExercise::new_with_rng(one_cell_table(), &mut rng()).unwrap();
        exercise.submit_deletion(&selection(4..6)).unwrap();

        let decoy = match exercise.current_sequence().unwrap().current().unwrap() {
            Operation::Insert { text, variants, .. } => variants
                .iter()
                .find(|v| *v != text)
                .cloned()
                .unwrap(),
            op => panic!("expected insertion, got {op:?}"),
        };
        let before = exercise.sequences[0].clone();
        assert_eq!(
            exercise.submit_insertion_choice(&decoy).unwrap(),
            Attempt::Rejected
        );
        assert_eq!(exercise.sequences[0], before);
    }

    #[test]
    fn mismatched_submission_kind_is_an_error() {
        let mut exercise =
            TransformationExercise::new_with_rng(one_cell_table(), &mut rng()).unwrap();

        assert!(matches!(
            exercise.submit_insertion_choice("o"),
            Err(ExerciseError::ExpectedInsertion)
        ));

        exercise.submit_deletion(&selection(4..6)).unwrap();
        assert!(matches!(
            exercise.submit_deletion(&selection(4..6)),
            Err(ExerciseError::ExpectedDeletion)
        ));
    }

    #[test]
    fn submitting_to_a_completed_sequence_is_an_error() {
        let mut sequence = build_sequences(&one_cell_table(), &mut rng())
            .unwrap()
            .remove(0);
        drive_to_completion(&mut sequence);

        assert!(matches!(
            sequence.submit_deletion(&selection(0..1)),
            Err(ExerciseError::SequenceCompleted { row: 0, col: 0 })
        ));
        assert!(matches!(
            sequence.submit_insertion_choice("o"),
            Err(ExerciseError::SequenceCompleted { row: 0, col: 0 })
        ));
    }

    #[test]
    fn end_to_end_single_cell() {
        let mut exercise =
            TransformationExercise::new_with_rng(one_cell_table(), &mut rng()).unwrap();
        let sequence = exercise.current_sequence().unwrap();
        assert_eq!(
            sequence.operations[0],
            Operation::Delete {
                index: 4,
                length: 2,
                text: "ar".into(),
            }
        );
        assert!(matches!(
            &sequence.operations[1],
            Operation::Insert { index: 4, text, .. } if text == "o"
        ));

        let attempt = exercise.submit_deletion(&selection(4..6)).unwrap();
        assert_eq!(
            attempt,
            Attempt::Accepted {
                sequence_completed: false
            }
        );
        assert_eq!(exercise.current_sequence().unwrap().current_word, "habl");

        let attempt = exercise.submit_insertion_choice("o").unwrap();
        assert_eq!(
            attempt,
            Attempt::Accepted {
                sequence_completed: true
            }
        );
        assert_eq!(exercise.current_sequence().unwrap().current_word, "hablo");

        assert!(exercise.advance_to_next_sequence());
        assert!(exercise.is_completed);
        assert_eq!(exercise.current_sequence_index, 0);
        assert!(matches!(
            exercise.submit_deletion(&selection(0..1)),
            Err(ExerciseError::ExerciseCompleted)
        ));
    }

    #[test]
    fn exercise_completion_clamps_to_last_sequence() {
        let mut exercise =
            TransformationExercise::new_with_rng(sample_table(), &mut rng()).unwrap();
        let count = exercise.sequences.len();

        for step in 0..count {
            let index = exercise.current_sequence_index;
            let sequence = exercise.sequences.get_mut(index).unwrap();
            drive_to_completion(sequence);

            let done = exercise.advance_to_next_sequence();
            assert_eq!(done, step == count - 1);
        }

        assert!(exercise.is_completed);
        assert_eq!(exercise.current_sequence_index, count - 1);
        assert!(exercise.current_sequence().is_some());
    }

    #[test]
    fn empty_table_is_a_degenerate_completed_exercise() {
        let table = Table::new("empty", "Empty", vec![], vec![], vec![]).unwrap();
        let exercise = TransformationExercise::new_with_rng(table, &mut rng()).unwrap();
        assert!(exercise.is_completed);
        assert!(exercise.sequences.is_empty());
        assert!(exercise.current_sequence().is_none());
    }

    #[test]
    fn reset_discards_progress() {
        let mut exercise =
            TransformationExercise::new_with_rng(sample_table(), &mut rng()).unwrap();
        exercise.toggle_hint();
        exercise.toggle_answers();
        {
            let sequence = exercise.sequences.get_mut(0).unwrap();
            drive_to_completion(sequence);
        }
        exercise.advance_to_next_sequence();

        exercise.reset_with_rng(&mut rng()).unwrap();
        assert_eq!(exercise.current_sequence_index, 0);
        assert!(!exercise.is_completed);
        assert!(!exercise.show_answers);
        for sequence in &exercise.sequences {
            assert_eq!(sequence.current_word, sequence.base_word);
            assert_eq!(sequence.current_operation, 0);
            assert!(!sequence.is_completed);
            assert!(!sequence.show_hint);
        }
    }

    #[test]
    fn state_round_trips_through_serde() {
        let mut exercise =
            TransformationExercise::new_with_rng(sample_table(), &mut rng()).unwrap();
        exercise.submit_deletion(&selection(4..6)).unwrap();

        let json = serde_json::to_string(&exercise).unwrap();
        let restored: TransformationExercise = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, exercise);
    }
}
