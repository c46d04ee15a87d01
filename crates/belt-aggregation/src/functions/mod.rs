//! Aggregation functions and their managers.

pub mod appearance;
mod buckets;
pub mod concat;
pub mod count;
pub mod min_max;
pub mod numeric_appearance;
pub mod sum;
