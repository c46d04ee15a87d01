use crate::collector::{TextCollector, TextResult};
use crate::error::AggregationResult;
use crate::manager::{checked_output_type, AggregationFunction, AggregationManager};
use belt_columnar::{Column, ColumnType, Dictionary, NumericRowReader};
use std::sync::Arc;

/// Joins the non-missing values of a nominal column in row order.
#[derive(Clone, Debug)]
pub struct ConcatFunction {
    column: usize,
    dictionary: Arc<Dictionary>,
    separator: Arc<str>,
    text: Option<String>,
}

impl ConcatFunction {
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }
}

fn append(text: &mut Option<String>, separator: &str, value: &str) {
    match text {
        Some(existing) => {
            existing.push_str(separator);
            existing.push_str(value);
        }
        None => *text = Some(value.to_owned()),
    }
}

impl AggregationFunction for ConcatFunction {
    fn accept(&mut self, row: &NumericRowReader<'_>) {
        let value = row.get(self.column);
        if !(value.is_finite() && value > 0.0) {
            return;
        }
        if let Some(s) = self.dictionary.get(value as u32) {
            append(&mut self.text, &self.separator, s);
        }
    }

    fn merge(&mut self, other: &Self) {
        if let Some(text) = &other.text {
            append(&mut self.text, &self.separator, text);
        }
    }
}

impl TextResult for ConcatFunction {
    fn text_result(&self) -> Option<&str> {
        self.text()
    }
}

/// Concatenation of nominal values with a separator.
#[derive(Clone, Debug)]
pub struct ConcatAggregationManager {
    separator: Arc<str>,
    column: usize,
    dictionary: Arc<Dictionary>,
}

impl ConcatAggregationManager {
    pub fn new(separator: impl Into<Arc<str>>) -> Self {
        Self {
            separator: separator.into(),
            column: 0,
            dictionary: Arc::new(Dictionary::empty()),
        }
    }
}

impl AggregationManager for ConcatAggregationManager {
    type Function = ConcatFunction;
    type Collector = TextCollector;

    fn name(&self) -> &'static str {
        "concat"
    }

    fn check_column_type(&self, column_type: ColumnType) -> Option<ColumnType> {
        (column_type == ColumnType::Nominal).then_some(ColumnType::Nominal)
    }

    fn initialize(&mut self, column: &Column, index: usize) -> AggregationResult<()> {
        checked_output_type(self, column)?;
        if let Some(dictionary) = column.dictionary() {
            self.dictionary = dictionary.clone();
        }
        self.column = index;
        Ok(())
    }

    fn new_function(&self) -> ConcatFunction {
        ConcatFunction {
            column: self.column,
            dictionary: self.dictionary.clone(),
            separator: self.separator.clone(),
            text: None,
        }
    }

    fn collector(&self, size: usize) -> TextCollector {
        TextCollector::new(size)
    }
}
