//! Partitioned aggregation over `belt-columnar` tables.
//!
//! Aggregations are described by an [`AggregationManager`]: it checks the input column type,
//! creates one [`AggregationFunction`] per partition and group, and a collector that turns the
//! merged functions into an output column. Partitions run on an [`ExecutionContext`] (a rayon
//! pool when the `parallel` feature is enabled) and are merged left to right, so results do not
//! depend on the number of threads.
//!
//! The centerpiece is the nominal [`AppearanceCounter`], which counts category indices in a
//! sparse map or a dense array and tracks the most (or least) frequent category.

#![forbid(unsafe_code)]

mod collector;
mod context;
mod error;
mod execute;
pub mod functions;
mod group_by;
mod manager;
mod options;

pub use crate::collector::{
    NominalCollector, NominalResult, NumericCollector, NumericResult, TextCollector, TextResult,
};
pub use crate::context::ExecutionContext;
pub use crate::error::{AggregationError, AggregationResult};
pub use crate::execute::{aggregate, aggregate_grouped, GroupIndex};
pub use crate::functions::appearance::{
    AppearanceCounter, AppearanceMode, NominalAppearanceAggregationManager,
    NominalAppearanceFunction,
};
pub use crate::functions::concat::ConcatAggregationManager;
pub use crate::functions::count::{CountAggregationManager, CountMode};
pub use crate::functions::min_max::{Extremum, MinMaxAggregationManager};
pub use crate::functions::numeric_appearance::NumericAppearanceAggregationManager;
pub use crate::functions::sum::SumAggregationManager;
pub use crate::group_by::{group_by, AggregationKind, AggregationSpec};
pub use crate::manager::{AggregationCollector, AggregationFunction, AggregationManager};
pub use crate::options::{AggregationOptions, AppearanceOptions, FILL_RATIO, MAX_MAPPING_SIZE};
