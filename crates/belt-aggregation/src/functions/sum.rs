use crate::collector::{NumericCollector, NumericResult};
use crate::error::AggregationResult;
use crate::manager::{checked_output_type, AggregationFunction, AggregationManager};
use belt_columnar::{Column, ColumnType, NumericRowReader};

#[derive(Clone, Debug)]
pub struct SumFunction {
    column: usize,
    sum: f64,
    has_value: bool,
}

impl SumFunction {
    /// The sum of all non-missing values, `None` if there were none.
    pub fn sum(&self) -> Option<f64> {
        self.has_value.then_some(self.sum)
    }
}

impl AggregationFunction for SumFunction {
    fn accept(&mut self, row: &NumericRowReader<'_>) {
        let value = row.get(self.column);
        if !value.is_nan() {
            self.sum += value;
            self.has_value = true;
        }
    }

    fn merge(&mut self, other: &Self) {
        self.sum += other.sum;
        self.has_value |= other.has_value;
    }
}

impl NumericResult for SumFunction {
    fn numeric_result(&self) -> f64 {
        self.sum().unwrap_or(f64::NAN)
    }
}

/// Sums real and integer columns; the output keeps the input type.
#[derive(Clone, Debug)]
pub struct SumAggregationManager {
    column: usize,
    output_type: ColumnType,
}

impl SumAggregationManager {
    pub fn new() -> Self {
        Self {
            column: 0,
            output_type: ColumnType::Real,
        }
    }
}

impl Default for SumAggregationManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AggregationManager for SumAggregationManager {
    type Function = SumFunction;
    type Collector = NumericCollector;

    fn name(&self) -> &'static str {
        "sum"
    }

    fn check_column_type(&self, column_type: ColumnType) -> Option<ColumnType> {
        column_type.is_numeric().then_some(column_type)
    }

    fn initialize(&mut self, column: &Column, index: usize) -> AggregationResult<()> {
        self.output_type = checked_output_type(self, column)?;
        self.column = index;
        Ok(())
    }

    fn new_function(&self) -> SumFunction {
        SumFunction {
            column: self.column,
            sum: 0.0,
            has_value: false,
        }
    }

    fn collector(&self, size: usize) -> NumericCollector {
        NumericCollector::new(self.output_type, size)
    }
}
