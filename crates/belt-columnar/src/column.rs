#![forbid(unsafe_code)]

use crate::builder::NominalColumnBuilder;
use crate::dictionary::{Dictionary, MISSING_INDEX};
use crate::error::{ColumnError, Result};
use crate::types::{Category, ColumnType, Value};
use std::sync::Arc;

/// An immutable, fixed-size column of a single [`ColumnType`].
#[derive(Clone, Debug)]
pub struct Column {
    column_type: ColumnType,
    data: ColumnData,
}

#[derive(Clone, Debug)]
enum ColumnData {
    Categorical {
        indices: Vec<u32>,
        dictionary: Arc<Dictionary>,
    },
    Numeric(Vec<f64>),
    Object(Vec<Option<i64>>),
}

impl Column {
    /// Builds a nominal column, interning values in order of first appearance.
    pub fn nominal<I, S>(values: I) -> Column
    where
        I: IntoIterator<Item = Option<S>>,
        S: AsRef<str>,
    {
        let values = values.into_iter();
        let mut builder = NominalColumnBuilder::with_capacity(values.size_hint().0);
        for value in values {
            builder.push(value.as_ref().map(|s| s.as_ref()));
        }
        builder.finish()
    }

    /// Builds a nominal column from raw category indices into a shared dictionary.
    pub fn categorical(indices: Vec<u32>, dictionary: Arc<Dictionary>) -> Result<Column> {
        let maximal_index = dictionary.maximal_index();
        if let Some(&index) = indices.iter().find(|&&i| i as usize > maximal_index) {
            return Err(ColumnError::IndexOutOfRange {
                index,
                maximal_index,
            });
        }
        Ok(Column::categorical_unchecked(indices, dictionary))
    }

    pub(crate) fn categorical_unchecked(indices: Vec<u32>, dictionary: Arc<Dictionary>) -> Column {
        Column {
            column_type: ColumnType::Nominal,
            data: ColumnData::Categorical {
                indices,
                dictionary,
            },
        }
    }

    pub fn real(values: Vec<f64>) -> Column {
        Column {
            column_type: ColumnType::Real,
            data: ColumnData::Numeric(values),
        }
    }

    /// Builds an integer column; non-integral values are rounded.
    pub fn integer(mut values: Vec<f64>) -> Column {
        for v in values.iter_mut().filter(|v| v.is_finite()) {
            *v = v.round();
        }
        Column {
            column_type: ColumnType::Integer,
            data: ColumnData::Numeric(values),
        }
    }

    pub fn date_time(seconds: Vec<Option<i64>>) -> Column {
        Column {
            column_type: ColumnType::DateTime,
            data: ColumnData::Object(seconds),
        }
    }

    pub fn time(nanos: Vec<Option<i64>>) -> Column {
        Column {
            column_type: ColumnType::Time,
            data: ColumnData::Object(nanos),
        }
    }

    /// Builds a numeric or time column from `f64` payloads, with `NaN` marking missing values.
    pub fn from_f64(column_type: ColumnType, values: Vec<f64>) -> Result<Column> {
        match column_type.category() {
            Category::Numeric if column_type == ColumnType::Integer => Ok(Column::integer(values)),
            Category::Numeric => Ok(Column::real(values)),
            Category::Object => Ok(Column {
                column_type,
                data: ColumnData::Object(
                    values
                        .into_iter()
                        .map(|v| (!v.is_nan()).then_some(v as i64))
                        .collect(),
                ),
            }),
            Category::Categorical => Err(ColumnError::UnsupportedType {
                column_type,
                what: "f64 values",
            }),
        }
    }

    pub fn column_type(&self) -> ColumnType {
        self.column_type
    }

    pub fn len(&self) -> usize {
        match &self.data {
            ColumnData::Categorical { indices, .. } => indices.len(),
            ColumnData::Numeric(values) => values.len(),
            ColumnData::Object(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The dictionary of a nominal column.
    pub fn dictionary(&self) -> Option<&Arc<Dictionary>> {
        match &self.data {
            ColumnData::Categorical { dictionary, .. } => Some(dictionary),
            _ => None,
        }
    }

    /// The category index at `row`, for nominal columns.
    pub fn category_index(&self, row: usize) -> Option<u32> {
        match &self.data {
            ColumnData::Categorical { indices, .. } => indices.get(row).copied(),
            _ => None,
        }
    }

    /// Numeric view of the value at `row`.
    ///
    /// Nominal columns yield the category index (`0.0` for missing), numeric columns their value
    /// and time columns the raw payload; missing non-nominal values are `NaN`.
    pub fn get_f64(&self, row: usize) -> f64 {
        match &self.data {
            ColumnData::Categorical { indices, .. } => {
                indices.get(row).map_or(MISSING_INDEX, |&i| i) as f64
            }
            ColumnData::Numeric(values) => values.get(row).copied().unwrap_or(f64::NAN),
            ColumnData::Object(values) => values
                .get(row)
                .copied()
                .flatten()
                .map_or(f64::NAN, |v| v as f64),
        }
    }

    pub fn get(&self, row: usize) -> Value {
        match &self.data {
            ColumnData::Categorical {
                indices,
                dictionary,
            } => indices
                .get(row)
                .and_then(|&i| dictionary.get_arc(i))
                .map(|s| Value::Nominal(s.clone()))
                .unwrap_or(Value::Missing),
            ColumnData::Numeric(values) => values
                .get(row)
                .copied()
                .map_or(Value::Missing, Value::from),
            ColumnData::Object(values) => match values.get(row).copied().flatten() {
                Some(v) if self.column_type == ColumnType::DateTime => Value::DateTime(v),
                Some(v) => Value::Time(v),
                None => Value::Missing,
            },
        }
    }

    pub fn to_values(&self) -> Vec<Value> {
        (0..self.len()).map(|row| self.get(row)).collect()
    }

    /// Builds a new column from the given rows of this one; nominal columns share the dictionary.
    pub fn gather(&self, rows: &[usize]) -> Column {
        let data = match &self.data {
            ColumnData::Categorical {
                indices,
                dictionary,
            } => ColumnData::Categorical {
                indices: rows
                    .iter()
                    .map(|&r| indices.get(r).copied().unwrap_or(MISSING_INDEX))
                    .collect(),
                dictionary: dictionary.clone(),
            },
            ColumnData::Numeric(values) => ColumnData::Numeric(
                rows.iter()
                    .map(|&r| values.get(r).copied().unwrap_or(f64::NAN))
                    .collect(),
            ),
            ColumnData::Object(values) => ColumnData::Object(
                rows.iter()
                    .map(|&r| values.get(r).copied().flatten())
                    .collect(),
            ),
        };
        Column {
            column_type: self.column_type,
            data,
        }
    }

    /// Returns a copy of this nominal column backed by a boolean dictionary.
    pub fn to_boolean(&self, positive: Option<&str>) -> Result<Column> {
        match &self.data {
            ColumnData::Categorical {
                indices,
                dictionary,
            } => Ok(Column {
                column_type: ColumnType::Nominal,
                data: ColumnData::Categorical {
                    indices: indices.clone(),
                    dictionary: Arc::new(dictionary.to_boolean(positive)?),
                },
            }),
            _ => Err(ColumnError::UnsupportedType {
                column_type: self.column_type,
                what: "a boolean dictionary",
            }),
        }
    }
}
