#![forbid(unsafe_code)]

use crate::column::Column;
use crate::dictionary::{Dictionary, MISSING_INDEX};
use std::sync::Arc;

/// Incrementally builds a nominal column, interning strings into a fresh dictionary.
///
/// Category indices are assigned in order of first appearance, so the dictionary order of a
/// built column matches the order in which its values first occur.
#[derive(Debug, Default)]
pub struct NominalColumnBuilder {
    dictionary: Dictionary,
    indices: Vec<u32>,
}

impl NominalColumnBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(rows: usize) -> Self {
        Self {
            dictionary: Dictionary::empty(),
            indices: Vec::with_capacity(rows),
        }
    }

    fn intern(&mut self, s: &str) -> u32 {
        if let Some(idx) = self.dictionary.index_of(s) {
            return idx;
        }
        self.dictionary.push_unchecked(Arc::from(s))
    }

    pub fn push(&mut self, value: Option<&str>) {
        let idx = match value {
            Some(s) => self.intern(s),
            None => MISSING_INDEX,
        };
        self.indices.push(idx);
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn finish(self) -> Column {
        // Every index was produced by `intern`, so it is in range.
        Column::categorical_unchecked(self.indices, Arc::new(self.dictionary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Value;

    #[test]
    fn repeated_values_share_an_index() {
        let mut builder = NominalColumnBuilder::new();
        builder.push(Some("x"));
        builder.push(None);
        builder.push(Some("x"));
        assert_eq!(builder.len(), 3);

        let column = builder.finish();
        assert_eq!(column.dictionary().unwrap().size(), 1);
        assert_eq!(column.category_index(2), Some(1));
        assert_eq!(column.get(1), Value::Missing);
    }
}
