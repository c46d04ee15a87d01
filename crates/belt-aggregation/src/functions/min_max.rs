use crate::collector::{NumericCollector, NumericResult};
use crate::error::AggregationResult;
use crate::manager::{checked_output_type, AggregationFunction, AggregationManager};
use belt_columnar::{Category, Column, ColumnType, NumericRowReader};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Extremum {
    Min,
    Max,
}

impl Extremum {
    fn prefers(self, candidate: f64, incumbent: f64) -> bool {
        match self {
            Extremum::Min => candidate < incumbent,
            Extremum::Max => candidate > incumbent,
        }
    }
}

#[derive(Clone, Debug)]
pub struct MinMaxFunction {
    extremum: Extremum,
    column: usize,
    value: Option<f64>,
}

impl MinMaxFunction {
    pub fn value(&self) -> Option<f64> {
        self.value
    }

    fn offer(&mut self, candidate: f64) {
        match self.value {
            Some(current) if !self.extremum.prefers(candidate, current) => {}
            _ => self.value = Some(candidate),
        }
    }
}

impl AggregationFunction for MinMaxFunction {
    fn accept(&mut self, row: &NumericRowReader<'_>) {
        let value = row.get(self.column);
        if !value.is_nan() {
            self.offer(value);
        }
    }

    fn merge(&mut self, other: &Self) {
        if let Some(value) = other.value {
            self.offer(value);
        }
    }
}

impl NumericResult for MinMaxFunction {
    fn numeric_result(&self) -> f64 {
        self.value.unwrap_or(f64::NAN)
    }
}

/// Minimum or maximum of numeric, date-time and time columns.
#[derive(Clone, Debug)]
pub struct MinMaxAggregationManager {
    extremum: Extremum,
    column: usize,
    output_type: ColumnType,
}

impl MinMaxAggregationManager {
    pub fn new(extremum: Extremum) -> Self {
        Self {
            extremum,
            column: 0,
            output_type: ColumnType::Real,
        }
    }
}

impl AggregationManager for MinMaxAggregationManager {
    type Function = MinMaxFunction;
    type Collector = NumericCollector;

    fn name(&self) -> &'static str {
        match self.extremum {
            Extremum::Min => "min",
            Extremum::Max => "max",
        }
    }

    fn check_column_type(&self, column_type: ColumnType) -> Option<ColumnType> {
        match column_type.category() {
            Category::Numeric | Category::Object => Some(column_type),
            Category::Categorical => None,
        }
    }

    fn initialize(&mut self, column: &Column, index: usize) -> AggregationResult<()> {
        self.output_type = checked_output_type(self, column)?;
        self.column = index;
        Ok(())
    }

    fn new_function(&self) -> MinMaxFunction {
        MinMaxFunction {
            extremum: self.extremum,
            column: self.column,
            value: None,
        }
    }

    fn collector(&self, size: usize) -> NumericCollector {
        NumericCollector::new(self.output_type, size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_keeps_extremum_and_ignores_empty_sides() {
        let column = Column::integer(vec![4.0, f64::NAN, -2.0, 9.0]);
        let mut manager = MinMaxAggregationManager::new(Extremum::Min);
        manager.initialize(&column, 0).unwrap();
        let mut reader = NumericRowReader::new(vec![&column]);
        let mut all = manager.new_function();
        while reader.has_remaining() {
            reader.advance();
            all.accept(&reader);
        }
        assert_eq!(all.value(), Some(-2.0));

        let mut empty = manager.new_function();
        empty.merge(&all);
        assert_eq!(empty.value(), Some(-2.0));
        all.merge(&manager.new_function());
        assert_eq!(all.value(), Some(-2.0));
        assert!(manager.new_function().numeric_result().is_nan());
    }
}
