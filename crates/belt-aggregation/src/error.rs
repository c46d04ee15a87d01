use belt_columnar::{ColumnError, ColumnType};

pub type AggregationResult<T> = std::result::Result<T, AggregationError>;

#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum AggregationError {
    #[error("{function} cannot be applied to a {column_type} column")]
    IncompatibleColumnType {
        function: &'static str,
        column_type: ColumnType,
    },

    #[error(transparent)]
    Column(#[from] ColumnError),
}
