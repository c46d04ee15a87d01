use crate::context::ExecutionContext;
use crate::error::{AggregationError, AggregationResult};
use belt_columnar::{Column, ColumnType, NumericRowReader};

/// Per-group (and per-partition) accumulator created by an [`AggregationManager`].
///
/// A function is single-writer: it is fed rows of one partition with [`accept`] and afterwards
/// either read out by a collector or merged into the function of a neighbouring partition.
/// Merges are explicit and sequential; `left.merge(right)` must behave as if `left` had also
/// consumed the rows of `right` after its own.
///
/// [`accept`]: AggregationFunction::accept
pub trait AggregationFunction: Send {
    fn accept(&mut self, row: &NumericRowReader<'_>);

    fn merge(&mut self, other: &Self)
    where
        Self: Sized;
}

/// Turns one finished function per output row into an output column.
pub trait AggregationCollector<F> {
    fn set(&mut self, index: usize, function: &F);

    /// Finalizes the collected results. `context` may be `None` for sequential finalization.
    fn result(self, context: Option<&ExecutionContext>) -> AggregationResult<Column>;
}

/// Validates that an aggregation applies to a column and creates functions and collectors for
/// it.
///
/// Managers start uninitialized; [`initialize`](AggregationManager::initialize) binds them to a
/// column once. Functions and collectors must only be requested afterwards.
pub trait AggregationManager: Send + Sync {
    type Function: AggregationFunction;
    type Collector: AggregationCollector<Self::Function>;

    /// Short name used in error messages and default output labels.
    fn name(&self) -> &'static str;

    /// The output type for an input of `column_type`, or `None` if the aggregation does not
    /// apply to it.
    fn check_column_type(&self, column_type: ColumnType) -> Option<ColumnType>;

    /// Binds the manager to `column`, read at position `index` of the row readers its functions
    /// will be fed.
    fn initialize(&mut self, column: &Column, index: usize) -> AggregationResult<()>;

    fn new_function(&self) -> Self::Function;

    fn collector(&self, size: usize) -> Self::Collector;
}

/// Shared `initialize` check: the output type for `column`, or an error naming the manager.
pub(crate) fn checked_output_type<M: AggregationManager + ?Sized>(
    manager: &M,
    column: &Column,
) -> AggregationResult<ColumnType> {
    manager
        .check_column_type(column.column_type())
        .ok_or(AggregationError::IncompatibleColumnType {
            function: manager.name(),
            column_type: column.column_type(),
        })
}
