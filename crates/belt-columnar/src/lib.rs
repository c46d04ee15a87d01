//! Columnar table abstraction for Belt aggregations.
//!
//! This crate focuses on:
//! - Typed, immutable columns (nominal columns are dictionary-encoded, index `0` is missing).
//! - Dictionaries with boolean status and subset remapping.
//! - Restartable, range-restricted row readers for partitioned scans.
//! - Labeled tables of equally sized columns.

#![forbid(unsafe_code)]

mod builder;
mod column;
mod dictionary;
mod error;
mod reader;
mod table;
mod types;

pub use crate::builder::NominalColumnBuilder;
pub use crate::column::Column;
pub use crate::dictionary::{Dictionary, MISSING_INDEX};
pub use crate::error::{ColumnError, Result};
pub use crate::reader::{NumericRowReader, BEFORE_FIRST_ROW};
pub use crate::table::{Table, TableBuilder};
pub use crate::types::{Category, ColumnType, Value};
