//! Dataset error types.

use thiserror::Error;

/// Errors produced while building or loading a dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// I/O error while reading or writing a dataset file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file has no header or data rows.
    #[error("dataset is empty")]
    Empty,

    /// The target column named by the schema is missing from the header.
    #[error("missing target column '{0}'")]
    MissingTarget(String),

    /// A feature column named by the schema is missing from the header.
    #[error("missing feature column '{0}'")]
    MissingFeature(String),

    /// A cell could not be parsed as a number.
    #[error("malformed value '{value}' in column '{column}' at line {line}")]
    MalformedCell {
        column: String,
        value: String,
        line: usize,
    },

    /// A row has a different number of cells than the header.
    #[error("row at line {line} has {got} cells, expected {expected}")]
    RaggedRow {
        line: usize,
        expected: usize,
        got: usize,
    },

    /// A value is outside the domain its field kind allows.
    #[error("value {value} is not valid for field '{field}': {reason}")]
    FieldDomain {
        field: String,
        value: f32,
        reason: &'static str,
    },

    /// Column and target lengths disagree.
    #[error("column lengths disagree: {0}")]
    ShapeMismatch(String),
}
