use crate::types::ColumnType;

pub type Result<T> = std::result::Result<T, ColumnError>;

#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum ColumnError {
    #[error("category index {index} is out of range for a dictionary with maximal index {maximal_index}")]
    IndexOutOfRange { index: u32, maximal_index: usize },

    #[error("duplicate dictionary value: {0}")]
    DuplicateValue(String),

    #[error("invalid boolean dictionary: {0}")]
    InvalidBoolean(String),

    #[error("column length mismatch for {label}: expected {expected} rows, got {actual}")]
    LengthMismatch {
        label: String,
        expected: usize,
        actual: usize,
    },

    #[error("duplicate column label: {0}")]
    DuplicateLabel(String),

    #[error("unknown column: {0}")]
    UnknownLabel(String),

    #[error("cannot build a {column_type} column from {what}")]
    UnsupportedType {
        column_type: ColumnType,
        what: &'static str,
    },
}
