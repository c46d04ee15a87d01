#![forbid(unsafe_code)]

use crate::error::{ColumnError, Result};
use std::collections::HashMap;
use std::sync::Arc;

/// Category index reserved for missing values.
pub const MISSING_INDEX: u32 = 0;

/// Mapping between category indices and string values of a nominal column.
///
/// Index `0` is reserved for missing values and never maps to a string. The
/// values `1..=maximal_index` are unique. A dictionary may additionally be
/// marked as *boolean*: it then holds at most two values, one of which may be
/// designated as the positive value.
#[derive(Clone, Debug)]
pub struct Dictionary {
    values: Vec<Arc<str>>,
    lookup: HashMap<Arc<str>, u32>,
    boolean: Option<BooleanInfo>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct BooleanInfo {
    positive: Option<u32>,
}

impl Dictionary {
    pub fn empty() -> Self {
        Self {
            values: Vec::new(),
            lookup: HashMap::new(),
            boolean: None,
        }
    }

    /// Builds a dictionary whose values get the indices `1, 2, ...` in iteration order.
    pub fn new<I, S>(values: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<Arc<str>>,
    {
        let mut dictionary = Self::empty();
        for value in values {
            let value: Arc<str> = value.into();
            if dictionary.lookup.contains_key(&value) {
                return Err(ColumnError::DuplicateValue(value.to_string()));
            }
            dictionary.push_unchecked(value);
        }
        Ok(dictionary)
    }

    /// Appends a value that is known not to be present yet and returns its index.
    pub(crate) fn push_unchecked(&mut self, value: Arc<str>) -> u32 {
        self.values.push(value.clone());
        let idx = self.values.len() as u32;
        self.lookup.insert(value, idx);
        idx
    }

    /// The largest category index in use; `0` for an empty dictionary.
    pub fn maximal_index(&self) -> usize {
        self.values.len()
    }

    /// Number of (non-missing) values.
    pub fn size(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: u32) -> Option<&str> {
        self.get_arc(index).map(|s| s.as_ref())
    }

    pub fn get_arc(&self, index: u32) -> Option<&Arc<str>> {
        if index == MISSING_INDEX {
            return None;
        }
        self.values.get(index as usize - 1)
    }

    pub fn index_of(&self, value: &str) -> Option<u32> {
        self.lookup.get(value).copied()
    }

    /// Iterates `(index, value)` pairs in index order, skipping the missing slot.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> + '_ {
        self.values
            .iter()
            .enumerate()
            .map(|(i, v)| (i as u32 + 1, v.as_ref()))
    }

    pub fn is_boolean(&self) -> bool {
        self.boolean.is_some()
    }

    pub fn positive_index(&self) -> Option<u32> {
        self.boolean.and_then(|b| b.positive)
    }

    /// The index of the non-positive value of a boolean dictionary, if there is one.
    pub fn negative_index(&self) -> Option<u32> {
        let info = self.boolean?;
        (1..=self.values.len() as u32).find(|&idx| Some(idx) != info.positive)
    }

    /// Returns a boolean copy of this dictionary with the given positive value.
    ///
    /// A dictionary with two values must name a positive value; a dictionary with more than two
    /// values cannot be boolean.
    pub fn to_boolean(&self, positive: Option<&str>) -> Result<Dictionary> {
        if self.size() > 2 {
            return Err(ColumnError::InvalidBoolean(format!(
                "{} values, at most 2 allowed",
                self.size()
            )));
        }
        let positive = match positive {
            Some(value) => Some(self.index_of(value).ok_or_else(|| {
                ColumnError::InvalidBoolean(format!("positive value {value:?} not in dictionary"))
            })?),
            None if self.size() == 2 => {
                return Err(ColumnError::InvalidBoolean(
                    "two values require a positive value".into(),
                ))
            }
            None => None,
        };
        let mut out = self.clone();
        out.boolean = Some(BooleanInfo { positive });
        Ok(out)
    }

    /// Builds a dictionary containing only the indices flagged in `used`.
    ///
    /// Returns the new dictionary together with a remapping table from old to new indices (unused
    /// and missing indices map to `0`). Values keep their relative order. A boolean dictionary
    /// stays boolean; its positive value survives only if it was used.
    pub fn subset(&self, used: &[bool]) -> (Dictionary, Vec<u32>) {
        let mut remap = vec![MISSING_INDEX; self.maximal_index() + 1];
        let mut out = Dictionary::empty();
        for (idx, value) in self.iter() {
            if used.get(idx as usize).copied().unwrap_or(false) {
                remap[idx as usize] = out.push_unchecked(Arc::from(value));
            }
        }
        if let Some(info) = self.boolean {
            let positive = info
                .positive
                .map(|p| remap[p as usize])
                .filter(|&p| p != MISSING_INDEX);
            out.boolean = Some(BooleanInfo { positive });
        }
        (out, remap)
    }
}

impl Default for Dictionary {
    fn default() -> Self {
        Self::empty()
    }
}

impl PartialEq for Dictionary {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values && self.boolean == other.boolean
    }
}
