//! Error types for conjugation-core.

use thiserror::Error;

/// Result type alias using ExerciseError.
pub type Result<T> = std::result::Result<T, ExerciseError>;

/// Errors that can occur while building or driving an exercise.
///
/// A wrong answer from the player is not an error; submissions report it
/// through their return value. These variants cover malformed reference
/// data and calls that are invalid in the current state.
#[derive(Debug, Error)]
pub enum ExerciseError {
    #[error("table has {rows} rows but no columns")]
    NoColumns { rows: usize },

    #[error("table has {found} cell rows, expected {expected}")]
    RowCountMismatch { expected: usize, found: usize },

    #[error("cell row {row} has {found} cells, expected {expected}")]
    RowWidthMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("cell at ({row}, {col}) is labelled ({cell_row}, {cell_col})")]
    CellPositionMismatch {
        row: usize,
        col: usize,
        cell_row: usize,
        cell_col: usize,
    },

    #[error("{found} column rules for {expected} columns")]
    RuleCountMismatch { expected: usize, found: usize },

    #[error("column {col} maps to rule {rule}, but only {available} rules exist")]
    RuleIndexOutOfRange {
        col: usize,
        rule: usize,
        available: usize,
    },

    #[error("exercise is already completed")]
    ExerciseCompleted,

    #[error("sequence for cell ({row}, {col}) is already completed")]
    SequenceCompleted { row: usize, col: usize },

    #[error("current operation is an insertion, not a deletion")]
    ExpectedDeletion,

    #[error("current operation is a deletion, not an insertion")]
    ExpectedInsertion,

    #[error("cell ({row}, {col}) is outside the table")]
    CellOutOfBounds { row: usize, col: usize },

    #[error("cell ({row}, {col}) is already filled")]
    CellAlreadyFilled { row: usize, col: usize },

    #[error("no variant is selected")]
    NoVariantSelected,
}
