// src/error.rs

use std::fmt;
use thiserror::Error;

/// A source table is missing a column the pipeline cannot run without.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("table `{table}` is missing required column `{column}`")]
pub struct MissingColumnError {
    pub table: String,
    pub column: String,
}

impl MissingColumnError {
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
        }
    }
}

/// A source (file or collection) yielded no rows.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("source `{0}` is empty")]
pub struct EmptySourceError(pub String);

/// A left join emitted a different number of rows than its left side had.
///
/// Not fatal, but duplicated right-side keys inflate every downstream sum,
/// so these are logged and returned with the run output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinCardinalityWarning {
    pub join: &'static str,
    pub left_rows: usize,
    pub output_rows: usize,
}

impl fmt::Display for JoinCardinalityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "join `{}` produced {} rows from {} left rows",
            self.join, self.output_rows, self.left_rows
        )
    }
}
