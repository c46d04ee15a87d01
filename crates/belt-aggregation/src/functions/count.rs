use crate::collector::{NumericCollector, NumericResult};
use crate::error::AggregationResult;
use crate::manager::{checked_output_type, AggregationFunction, AggregationManager};
use belt_columnar::{Category, Column, ColumnType, NumericRowReader};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CountMode {
    /// Rows with a non-missing value.
    NonMissing,
    /// All rows.
    IncludingMissing,
}

#[derive(Clone, Debug)]
pub struct CountFunction {
    mode: CountMode,
    column: usize,
    categorical: bool,
    count: u64,
}

impl CountFunction {
    pub fn count(&self) -> u64 {
        self.count
    }
}

impl AggregationFunction for CountFunction {
    fn accept(&mut self, row: &NumericRowReader<'_>) {
        let counted = match self.mode {
            CountMode::IncludingMissing => true,
            CountMode::NonMissing => {
                let value = row.get(self.column);
                if self.categorical {
                    value > 0.0
                } else {
                    !value.is_nan()
                }
            }
        };
        if counted {
            self.count += 1;
        }
    }

    fn merge(&mut self, other: &Self) {
        self.count += other.count;
    }
}

impl NumericResult for CountFunction {
    fn numeric_result(&self) -> f64 {
        self.count as f64
    }
}

/// Counts rows per group. Applies to every column type and always produces integers.
#[derive(Clone, Debug)]
pub struct CountAggregationManager {
    mode: CountMode,
    column: usize,
    categorical: bool,
}

impl CountAggregationManager {
    pub fn new(mode: CountMode) -> Self {
        Self {
            mode,
            column: 0,
            categorical: false,
        }
    }
}

impl AggregationManager for CountAggregationManager {
    type Function = CountFunction;
    type Collector = NumericCollector;

    fn name(&self) -> &'static str {
        match self.mode {
            CountMode::NonMissing => "count",
            CountMode::IncludingMissing => "count_with_missings",
        }
    }

    fn check_column_type(&self, _column_type: ColumnType) -> Option<ColumnType> {
        Some(ColumnType::Integer)
    }

    fn initialize(&mut self, column: &Column, index: usize) -> AggregationResult<()> {
        checked_output_type(self, column)?;
        self.column = index;
        self.categorical = column.column_type().category() == Category::Categorical;
        Ok(())
    }

    fn new_function(&self) -> CountFunction {
        CountFunction {
            mode: self.mode,
            column: self.column,
            categorical: self.categorical,
            count: 0,
        }
    }

    fn collector(&self, size: usize) -> NumericCollector {
        NumericCollector::new(ColumnType::Integer, size)
    }
}
