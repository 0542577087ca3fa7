//! Error types specific to the ingestion pipeline stages.

use std::fmt;

use thiserror::Error;

/// Structural mismatch between the input file and the column contract.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("unknown column(s): {}", .0.join(", "))]
    UnknownColumns(Vec<String>),

    #[error("duplicate column '{0}' in header")]
    DuplicateColumn(String),

    #[error("input is not valid UTF-8: {0}")]
    Encoding(String),

    #[error("malformed CSV: {0}")]
    Malformed(String),

    #[error("line {line}: expected {expected} fields, found {found}")]
    RaggedRow {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("input file is empty")]
    EmptyInput,

    #[error("input contains a header but no data rows")]
    EmptyBatch,
}

/// An unparseable or unrecognized value in a single row.
#[derive(Error, Debug)]
pub enum NormalizationError {
    #[error("row {row}, column '{column}': cannot parse '{value}' as a number")]
    InvalidNumber {
        row: usize,
        column: String,
        value: String,
    },

    #[error("row {row}, column '{column}': invalid date '{value}', expected DD-MMM-YYYY")]
    InvalidDate {
        row: usize,
        column: String,
        value: String,
    },

    #[error("row {row}, column '{column}': null is not permitted")]
    UnexpectedNull { row: usize, column: String },

    #[error("row {row}: unknown exchange '{value}', allowed: NSE, BSE")]
    UnknownExchange { row: usize, value: String },

    #[error("row {row}: unrecognized instrument '{value}'")]
    UnknownInstrument { row: usize, value: String },

    #[error("row {row}: BSE index instrument must be OPTIDX or FUTIDX, found '{value}'")]
    InvalidBseIndexInstrument { row: usize, value: String },
}

/// A single business-rule violation within a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleViolation {
    /// 1-based data row in the source file.
    pub row: usize,
    /// Offending column, by its CSV header name, when the violation is
    /// column-scoped.
    pub column: Option<String>,
    pub message: String,
}

impl fmt::Display for RuleViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.column {
            Some(column) => write!(f, "row {}, column '{}': {}", self.row, column, self.message),
            None => write!(f, "row {}: {}", self.row, self.message),
        }
    }
}

/// Aggregated business-rule violations for one batch.
///
/// Carries every offending row/column pair, not just the first, so
/// operators see the full defect list per run.
#[derive(Debug)]
pub struct ValidationError {
    pub violations: Vec<RuleViolation>,
}

impl ValidationError {
    pub fn new(violations: Vec<RuleViolation>) -> Self {
        Self { violations }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} rule violation(s): ", self.violations.len())?;
        for (i, violation) in self.violations.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", violation)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// A key collision inside one batch. Never deduplicated silently: the
/// whole batch is rejected.
#[derive(Error, Debug)]
pub enum DuplicateKeyError {
    #[error("rows {first_row} and {second_row} share position key {key}")]
    PositionKey {
        key: String,
        first_row: usize,
        second_row: usize,
    },

    #[error("rows {first_row} and {second_row} share execution id '{execution_id}'")]
    ExecutionId {
        execution_id: String,
        first_row: usize,
        second_row: usize,
    },
}
