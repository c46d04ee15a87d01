#![forbid(unsafe_code)]

use crate::column::Column;
use crate::types::Value;

/// Position of a reader that has not been advanced yet.
pub const BEFORE_FIRST_ROW: isize = -1;

/// Forward-only, restartable cursor over the rows of one or more columns.
///
/// Values are read per column position as `f64` via [`NumericRowReader::get`] (see
/// [`Column::get_f64`]) or as typed [`Value`]s via [`NumericRowReader::get_value`]. A reader can
/// be restricted to a row range so that disjoint partitions of the same columns can be read
/// independently.
#[derive(Clone, Debug)]
pub struct NumericRowReader<'a> {
    columns: Vec<&'a Column>,
    start: usize,
    end: usize,
    // Current row, absolute. `None` before the first `advance`.
    row: Option<usize>,
}

impl<'a> NumericRowReader<'a> {
    /// Reader over all rows of `columns`. Columns are expected to have equal length; the reader
    /// stops at the shortest.
    pub fn new(columns: Vec<&'a Column>) -> Self {
        let height = columns.iter().map(|c| c.len()).min().unwrap_or(0);
        Self::with_range(columns, 0, height)
    }

    /// Reader over rows `[start, end)` of `columns`, clamped to the shortest column.
    pub fn with_range(columns: Vec<&'a Column>, start: usize, end: usize) -> Self {
        let height = columns.iter().map(|c| c.len()).min().unwrap_or(0);
        let end = end.min(height);
        Self {
            columns,
            start: start.min(end),
            end,
            row: None,
        }
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Moves to the next row. Must only be called while [`Self::has_remaining`] is true.
    pub fn advance(&mut self) {
        self.row = Some(match self.row {
            Some(row) => row + 1,
            None => self.start,
        });
    }

    pub fn has_remaining(&self) -> bool {
        match self.row {
            Some(row) => row + 1 < self.end,
            None => self.start < self.end,
        }
    }

    pub fn remaining(&self) -> usize {
        match self.row {
            Some(row) => self.end.saturating_sub(row + 1),
            None => self.end - self.start,
        }
    }

    /// The absolute row the reader points at, or [`BEFORE_FIRST_ROW`].
    pub fn position(&self) -> isize {
        self.row.map_or(BEFORE_FIRST_ROW, |row| row as isize)
    }

    /// Moves the reader so that the next [`Self::advance`] reads `position + 1`.
    ///
    /// Positions before the reader's range (including [`BEFORE_FIRST_ROW`]) rewind it.
    pub fn set_position(&mut self, position: isize) {
        if position < self.start as isize {
            self.row = None;
        } else {
            let last = self.end.max(self.start + 1) - 1;
            self.row = Some((position as usize).min(last));
        }
    }

    /// Numeric view of the column at `index` in the current row.
    pub fn get(&self, index: usize) -> f64 {
        match (self.row, self.columns.get(index)) {
            (Some(row), Some(column)) => column.get_f64(row),
            _ => f64::NAN,
        }
    }

    /// Typed view of the column at `index` in the current row.
    pub fn get_value(&self, index: usize) -> Value {
        match (self.row, self.columns.get(index)) {
            (Some(row), Some(column)) => column.get(row),
            _ => Value::Missing,
        }
    }
}
