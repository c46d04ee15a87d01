use crate::context::ExecutionContext;
use crate::error::AggregationResult;
use crate::manager::AggregationCollector;
use belt_columnar::{Column, ColumnType, Dictionary, MISSING_INDEX};
use std::sync::Arc;

/// Rows remapped per task when a nominal result is finalized on a pool.
const REMAP_CHUNK_ROWS: usize = 1 << 16;

/// Functions whose result is a category index of the source dictionary.
pub trait NominalResult {
    /// The winning category index, `None` if there is no result.
    fn mapping_index(&self) -> Option<u32>;
}

/// Functions whose result is a single `f64` (`NaN` if there is no result).
pub trait NumericResult {
    fn numeric_result(&self) -> f64;
}

/// Functions whose result is a freshly built string.
pub trait TextResult {
    fn text_result(&self) -> Option<&str>;
}

/// Collects category indices of a source dictionary into a nominal column.
///
/// The output dictionary only keeps the categories that occur in the result; a boolean source
/// dictionary yields a boolean output dictionary.
#[derive(Debug)]
pub struct NominalCollector {
    dictionary: Arc<Dictionary>,
    indices: Vec<u32>,
}

impl NominalCollector {
    pub fn new(dictionary: Arc<Dictionary>, size: usize) -> Self {
        Self {
            dictionary,
            indices: vec![MISSING_INDEX; size],
        }
    }
}

impl<F: NominalResult> AggregationCollector<F> for NominalCollector {
    fn set(&mut self, index: usize, function: &F) {
        self.indices[index] = function.mapping_index().unwrap_or(MISSING_INDEX);
    }

    fn result(self, context: Option<&ExecutionContext>) -> AggregationResult<Column> {
        let mut used = vec![false; self.dictionary.maximal_index() + 1];
        for &idx in &self.indices {
            if let Some(slot) = used.get_mut(idx as usize) {
                *slot = true;
            }
        }
        used[MISSING_INDEX as usize] = false;
        let (dictionary, remap) = self.dictionary.subset(&used);

        let remap_chunk = |chunk: Vec<u32>| -> Vec<u32> {
            chunk
                .into_iter()
                .map(|idx| remap.get(idx as usize).copied().unwrap_or(MISSING_INDEX))
                .collect()
        };
        let indices = match context {
            Some(ctx) if self.indices.len() > REMAP_CHUNK_ROWS => ctx
                .map(
                    self.indices
                        .chunks(REMAP_CHUNK_ROWS)
                        .map(<[u32]>::to_vec)
                        .collect(),
                    remap_chunk,
                )
                .concat(),
            _ => remap_chunk(self.indices),
        };
        Ok(Column::categorical(indices, Arc::new(dictionary))?)
    }
}

/// Collects `f64` results into a numeric or time column of a fixed type.
#[derive(Debug)]
pub struct NumericCollector {
    column_type: ColumnType,
    values: Vec<f64>,
}

impl NumericCollector {
    pub fn new(column_type: ColumnType, size: usize) -> Self {
        Self {
            column_type,
            values: vec![f64::NAN; size],
        }
    }
}

impl<F: NumericResult> AggregationCollector<F> for NumericCollector {
    fn set(&mut self, index: usize, function: &F) {
        self.values[index] = function.numeric_result();
    }

    fn result(self, _context: Option<&ExecutionContext>) -> AggregationResult<Column> {
        Ok(Column::from_f64(self.column_type, self.values)?)
    }
}

/// Collects strings into a nominal column with a new dictionary.
#[derive(Debug)]
pub struct TextCollector {
    values: Vec<Option<String>>,
}

impl TextCollector {
    pub fn new(size: usize) -> Self {
        Self {
            values: vec![None; size],
        }
    }
}

impl<F: TextResult> AggregationCollector<F> for TextCollector {
    fn set(&mut self, index: usize, function: &F) {
        self.values[index] = function.text_result().map(str::to_owned);
    }

    fn result(self, _context: Option<&ExecutionContext>) -> AggregationResult<Column> {
        Ok(Column::nominal(self.values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use belt_columnar::Value;
    use pretty_assertions::assert_eq;

    struct Fixed(Option<u32>);

    impl NominalResult for Fixed {
        fn mapping_index(&self) -> Option<u32> {
            self.0
        }
    }

    #[test]
    fn nominal_collector_keeps_used_subset() {
        let dict = Arc::new(Dictionary::new(["a", "b", "c"]).unwrap());
        let mut collector = NominalCollector::new(dict, 3);
        collector.set(0, &Fixed(Some(3)));
        collector.set(2, &Fixed(Some(1)));
        AggregationCollector::<Fixed>::set(&mut collector, 1, &Fixed(None));

        let column = AggregationCollector::<Fixed>::result(collector, None).unwrap();
        assert_eq!(column.dictionary().unwrap().size(), 2);
        assert_eq!(
            column.to_values(),
            vec![Value::from("c"), Value::Missing, Value::from("a")]
        );
    }

    #[test]
    fn nominal_collector_recomputes_boolean_dictionary() {
        let dict = Arc::new(
            Dictionary::new(["true", "false"])
                .unwrap()
                .to_boolean(Some("true"))
                .unwrap(),
        );
        let mut collector = NominalCollector::new(dict, 2);
        collector.set(0, &Fixed(Some(2)));
        collector.set(1, &Fixed(Some(2)));

        let column = AggregationCollector::<Fixed>::result(collector, None).unwrap();
        let dict = column.dictionary().unwrap();
        assert!(dict.is_boolean());
        assert_eq!(dict.positive_index(), None);
        assert_eq!(dict.negative_index(), Some(1));
    }
}
