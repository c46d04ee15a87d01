#![forbid(unsafe_code)]

use std::fmt;
use std::sync::Arc;

/// Coarse grouping of column types by how their values are stored and read.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    /// Category indices into a dictionary.
    Categorical,
    /// `f64` values, `NaN` is missing.
    Numeric,
    /// 64-bit integral payloads, `None` is missing.
    Object,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Nominal,
    Real,
    /// Integral values stored as `f64` (exact up to 2^53).
    Integer,
    /// Seconds since the Unix epoch.
    DateTime,
    /// Nanoseconds since midnight.
    Time,
}

impl ColumnType {
    pub fn category(self) -> Category {
        match self {
            ColumnType::Nominal => Category::Categorical,
            ColumnType::Real | ColumnType::Integer => Category::Numeric,
            ColumnType::DateTime | ColumnType::Time => Category::Object,
        }
    }

    pub fn is_numeric(self) -> bool {
        self.category() == Category::Numeric
    }

    pub fn is_temporal(self) -> bool {
        self.category() == Category::Object
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::Nominal => "nominal",
            ColumnType::Real => "real",
            ColumnType::Integer => "integer",
            ColumnType::DateTime => "date-time",
            ColumnType::Time => "time",
        };
        f.write_str(name)
    }
}

/// A single typed cell value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Missing,
    Nominal(Arc<str>),
    Number(f64),
    DateTime(i64),
    Time(i64),
}

impl Value {
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Nominal(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Nominal(Arc::from(s))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        if v.is_nan() {
            Value::Missing
        } else {
            Value::Number(v)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_follow_storage() {
        assert_eq!(ColumnType::Nominal.category(), Category::Categorical);
        assert!(ColumnType::Integer.is_numeric());
        assert!(ColumnType::Time.is_temporal());
        assert!(!ColumnType::Real.is_temporal());
    }

    #[test]
    fn nan_converts_to_missing() {
        assert_eq!(Value::from(f64::NAN), Value::Missing);
        assert_eq!(Value::from(1.5), Value::Number(1.5));
    }
}
