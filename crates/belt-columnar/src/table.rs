#![forbid(unsafe_code)]

use crate::column::Column;
use crate::error::{ColumnError, Result};
use crate::reader::NumericRowReader;
use std::collections::HashMap;
use std::sync::Arc;

/// An immutable collection of equally sized, labeled columns.
#[derive(Clone, Debug)]
pub struct Table {
    labels: Vec<String>,
    label_index: HashMap<String, usize>,
    columns: Vec<Arc<Column>>,
    height: usize,
}

impl Table {
    pub fn builder(height: usize) -> TableBuilder {
        TableBuilder {
            height,
            labels: Vec::new(),
            columns: Vec::new(),
        }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, label: &str) -> Result<&Arc<Column>> {
        self.label_index
            .get(label)
            .map(|&idx| &self.columns[idx])
            .ok_or_else(|| ColumnError::UnknownLabel(label.to_owned()))
    }

    pub fn column_at(&self, idx: usize) -> Option<&Arc<Column>> {
        self.columns.get(idx)
    }

    pub fn columns(&self) -> &[Arc<Column>] {
        &self.columns
    }

    /// A reader over the given columns, in the given order.
    pub fn reader(&self, labels: &[&str]) -> Result<NumericRowReader<'_>> {
        let columns = labels
            .iter()
            .map(|label| self.column(label).map(|c| c.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(NumericRowReader::new(columns))
    }
}

pub struct TableBuilder {
    height: usize,
    labels: Vec<String>,
    columns: Vec<Arc<Column>>,
}

impl TableBuilder {
    pub fn add(mut self, label: impl Into<String>, column: impl Into<Arc<Column>>) -> Self {
        self.labels.push(label.into());
        self.columns.push(column.into());
        self
    }

    pub fn build(self) -> Result<Table> {
        let mut label_index = HashMap::with_capacity(self.labels.len());
        for (idx, (label, column)) in self.labels.iter().zip(&self.columns).enumerate() {
            if column.len() != self.height {
                return Err(ColumnError::LengthMismatch {
                    label: label.clone(),
                    expected: self.height,
                    actual: column.len(),
                });
            }
            if label_index.insert(label.clone(), idx).is_some() {
                return Err(ColumnError::DuplicateLabel(label.clone()));
            }
        }
        Ok(Table {
            labels: self.labels,
            label_index,
            columns: self.columns,
            height: self.height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Value;
    use pretty_assertions::assert_eq;

    #[test]
    fn builder_validates_heights_and_labels() {
        let err = Table::builder(2)
            .add("a", Column::real(vec![1.0]))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ColumnError::LengthMismatch {
                label: "a".into(),
                expected: 2,
                actual: 1
            }
        );

        let err = Table::builder(1)
            .add("a", Column::real(vec![1.0]))
            .add("a", Column::real(vec![2.0]))
            .build()
            .unwrap_err();
        assert_eq!(err, ColumnError::DuplicateLabel("a".into()));
    }

    #[test]
    fn lookup_and_reader() {
        let table = Table::builder(2)
            .add("k", Column::nominal([Some("x"), Some("y")]))
            .add("v", Column::real(vec![1.0, 2.0]))
            .build()
            .unwrap();
        assert_eq!(table.width(), 2);
        assert_eq!(table.labels(), &["k".to_owned(), "v".to_owned()]);
        assert!(table.column("nope").is_err());

        let mut reader = table.reader(&["v", "k"]).unwrap();
        reader.advance();
        assert_eq!(reader.get(0), 1.0);
        assert_eq!(reader.get_value(1), Value::from("x"));
    }
}
