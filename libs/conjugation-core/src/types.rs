//! Core types for conjugation-table exercises.

use crate::error::{ExerciseError, Result};
use serde::{Deserialize, Serialize};

/// One cell of a conjugation table.
///
/// `correct_value` is reference data and never changes. The `current_value`
/// / `is_filled` / `is_correct` fields belong to the fill-cells exercise,
/// which copies answers into them; the word-transformation exercise leaves
/// them untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
    pub correct_value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_value: Option<String>,
    pub is_filled: bool,
    pub is_correct: bool,
}

impl Cell {
    /// Create an unfilled cell.
    pub fn new(row: usize, col: usize, correct_value: impl Into<String>) -> Self {
        Self {
            row,
            col,
            correct_value: correct_value.into(),
            current_value: None,
            is_filled: false,
            is_correct: false,
        }
    }
}

/// A conjugation table: person labels down the side, one base word per
/// column, and the fully conjugated form in every cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub id: String,
    pub name: String,
    /// Person/subject labels, one per row.
    pub rows: Vec<String>,
    /// Base (infinitive) word, one per column.
    pub columns: Vec<String>,
    pub cells: Vec<Vec<Cell>>,
}

impl Table {
    /// Build a table from a row-major grid of correct values.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        rows: Vec<String>,
        columns: Vec<String>,
        cell_values: Vec<Vec<String>>,
    ) -> Result<Self> {
        let cells = cell_values
            .into_iter()
            .enumerate()
            .map(|(row, values)| {
                values
                    .into_iter()
                    .enumerate()
                    .map(|(col, value)| Cell::new(row, col, value))
                    .collect()
            })
            .collect();

        let table = Self {
            id: id.into(),
            name: name.into(),
            rows,
            columns,
            cells,
        };
        table.validate()?;
        Ok(table)
    }

    /// Check that the cell grid matches the row and column labels.
    ///
    /// An empty table (no rows, no columns) is valid.
    pub fn validate(&self) -> Result<()> {
        if self.columns.is_empty() && !self.rows.is_empty() {
            return Err(ExerciseError::NoColumns {
                rows: self.rows.len(),
            });
        }
        if self.cells.len() != self.rows.len() {
            return Err(ExerciseError::RowCountMismatch {
                expected: self.rows.len(),
                found: self.cells.len(),
            });
        }
        for (row, cells) in self.cells.iter().enumerate() {
            if cells.len() != self.columns.len() {
                return Err(ExerciseError::RowWidthMismatch {
                    row,
                    expected: self.columns.len(),
                    found: cells.len(),
                });
            }
            for (col, cell) in cells.iter().enumerate() {
                if cell.row != row || cell.col != col {
                    return Err(ExerciseError::CellPositionMismatch {
                        row,
                        col,
                        cell_row: cell.row,
                        cell_col: cell.col,
                    });
                }
            }
        }
        Ok(())
    }

    /// Look up a cell by position.
    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.cells.get(row)?.get(col)
    }

    /// Number of cells in the table.
    pub fn cell_count(&self) -> usize {
        self.rows.len() * self.columns.len()
    }
}

/// One edit step of a word transformation.
///
/// Indices are char positions in the word as it exists when the operation
/// is applied, not positions in the original base word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Operation {
    /// Remove `length` chars starting at `index`. `text` is the removed span.
    Delete {
        index: usize,
        length: usize,
        text: String,
    },
    /// Insert `text` at `index`. `variants` holds the choices offered to the
    /// player: the correct text plus decoys, pre-shuffled.
    Insert {
        index: usize,
        text: String,
        variants: Vec<String>,
    },
}

impl Operation {
    /// Apply this operation to a word, splicing by char index.
    pub fn apply_to(&self, word: &str) -> String {
        match self {
            Self::Delete { index, length, .. } => word
                .chars()
                .take(*index)
                .chain(word.chars().skip(index + length))
                .collect(),
            Self::Insert { index, text, .. } => {
                let mut out: String = word.chars().take(*index).collect();
                out.push_str(text);
                out.extend(word.chars().skip(*index));
                out
            }
        }
    }
}

/// Grammar-rule explanations for a table, one rule per column.
///
/// Passed alongside the table instead of living in module-level data, so
/// different tables can carry different rule sets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrammarRules {
    pub explanations: Vec<String>,
    /// Index into `explanations`, one entry per table column.
    pub column_rules: Vec<usize>,
}

impl GrammarRules {
    /// Build a rule set for a table, checking every column maps to a rule.
    pub fn new(table: &Table, explanations: Vec<String>, column_rules: Vec<usize>) -> Result<Self> {
        if column_rules.len() != table.columns.len() {
            return Err(ExerciseError::RuleCountMismatch {
                expected: table.columns.len(),
                found: column_rules.len(),
            });
        }
        for (col, &rule) in column_rules.iter().enumerate() {
            if rule >= explanations.len() {
                return Err(ExerciseError::RuleIndexOutOfRange {
                    col,
                    rule,
                    available: explanations.len(),
                });
            }
        }
        Ok(Self {
            explanations,
            column_rules,
        })
    }

    /// Explanation for a column, if one is mapped.
    pub fn for_column(&self, col: usize) -> Option<&str> {
        let rule = *self.column_rules.get(col)?;
        self.explanations.get(rule).map(String::as_str)
    }
}
