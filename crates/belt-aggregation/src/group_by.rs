use crate::context::ExecutionContext;
use crate::error::AggregationResult;
use crate::execute::{aggregate_grouped, GroupIndex};
use crate::functions::appearance::{AppearanceMode, NominalAppearanceAggregationManager};
use crate::functions::concat::ConcatAggregationManager;
use crate::functions::count::{CountAggregationManager, CountMode};
use crate::functions::min_max::{Extremum, MinMaxAggregationManager};
use crate::functions::numeric_appearance::NumericAppearanceAggregationManager;
use crate::functions::sum::SumAggregationManager;
use crate::manager::AggregationManager;
use crate::options::AggregationOptions;
use belt_columnar::{Column, ColumnType, Table};

/// The aggregation applied by an [`AggregationSpec`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum AggregationKind {
    Count,
    CountWithMissings,
    Sum,
    Min,
    Max,
    Mode,
    Least,
    Concat { separator: String },
}

impl AggregationKind {
    pub fn name(&self) -> &'static str {
        match self {
            AggregationKind::Count => "count",
            AggregationKind::CountWithMissings => "count_with_missings",
            AggregationKind::Sum => "sum",
            AggregationKind::Min => "min",
            AggregationKind::Max => "max",
            AggregationKind::Mode => "mode",
            AggregationKind::Least => "least",
            AggregationKind::Concat { .. } => "concat",
        }
    }
}

/// One output column of [`group_by`]: an aggregation of a source column.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AggregationSpec {
    column: String,
    kind: AggregationKind,
    name: Option<String>,
}

impl AggregationSpec {
    pub fn new(column: impl Into<String>, kind: AggregationKind) -> Self {
        Self {
            column: column.into(),
            kind,
            name: None,
        }
    }

    pub fn count(column: impl Into<String>) -> Self {
        Self::new(column, AggregationKind::Count)
    }

    pub fn count_with_missings(column: impl Into<String>) -> Self {
        Self::new(column, AggregationKind::CountWithMissings)
    }

    pub fn sum(column: impl Into<String>) -> Self {
        Self::new(column, AggregationKind::Sum)
    }

    pub fn min(column: impl Into<String>) -> Self {
        Self::new(column, AggregationKind::Min)
    }

    pub fn max(column: impl Into<String>) -> Self {
        Self::new(column, AggregationKind::Max)
    }

    pub fn mode(column: impl Into<String>) -> Self {
        Self::new(column, AggregationKind::Mode)
    }

    pub fn least(column: impl Into<String>) -> Self {
        Self::new(column, AggregationKind::Least)
    }

    pub fn concat(column: impl Into<String>, separator: impl Into<String>) -> Self {
        Self::new(
            column,
            AggregationKind::Concat {
                separator: separator.into(),
            },
        )
    }

    /// Overrides the output label.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn kind(&self) -> &AggregationKind {
        &self.kind
    }

    /// The output label, `"<function>(<column>)"` unless overridden.
    pub fn output_label(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("{}({})", self.kind.name(), self.column),
        }
    }

    fn run(
        &self,
        column: &Column,
        groups: &GroupIndex,
        options: &AggregationOptions,
        context: &ExecutionContext,
    ) -> AggregationResult<Column> {
        match &self.kind {
            AggregationKind::Count => run(
                CountAggregationManager::new(CountMode::NonMissing),
                column,
                groups,
                options,
                context,
            ),
            AggregationKind::CountWithMissings => run(
                CountAggregationManager::new(CountMode::IncludingMissing),
                column,
                groups,
                options,
                context,
            ),
            AggregationKind::Sum => run(SumAggregationManager::new(), column, groups, options, context),
            AggregationKind::Min => run(
                MinMaxAggregationManager::new(Extremum::Min),
                column,
                groups,
                options,
                context,
            ),
            AggregationKind::Max => run(
                MinMaxAggregationManager::new(Extremum::Max),
                column,
                groups,
                options,
                context,
            ),
            AggregationKind::Mode => appearance(AppearanceMode::Most, column, groups, options, context),
            AggregationKind::Least => {
                appearance(AppearanceMode::Least, column, groups, options, context)
            }
            AggregationKind::Concat { separator } => run(
                ConcatAggregationManager::new(separator.as_str()),
                column,
                groups,
                options,
                context,
            ),
        }
    }
}

fn appearance(
    mode: AppearanceMode,
    column: &Column,
    groups: &GroupIndex,
    options: &AggregationOptions,
    context: &ExecutionContext,
) -> AggregationResult<Column> {
    if column.column_type() == ColumnType::Nominal {
        let manager = NominalAppearanceAggregationManager::with_options(mode, options.appearance);
        run(manager, column, groups, options, context)
    } else {
        let manager = NumericAppearanceAggregationManager::new(mode);
        run(manager, column, groups, options, context)
    }
}

fn run<M: AggregationManager>(
    mut manager: M,
    column: &Column,
    groups: &GroupIndex,
    options: &AggregationOptions,
    context: &ExecutionContext,
) -> AggregationResult<Column> {
    manager.initialize(column, 0)?;
    aggregate_grouped(&manager, &[column], groups, options, context)
}

/// Groups `table` by the values of `key` and evaluates `specs` per group.
///
/// The result holds the key column first, one row per distinct key in order of first appearance
/// (missing keys form one group), followed by one column per spec.
pub fn group_by(
    table: &Table,
    key: &str,
    specs: &[AggregationSpec],
    options: &AggregationOptions,
    context: &ExecutionContext,
) -> AggregationResult<Table> {
    let key_column = table.column(key)?;
    let groups = GroupIndex::from_column(key_column);
    log::debug!(
        "group by {key}: {} rows into {} groups, {} aggregations",
        table.height(),
        groups.group_count(),
        specs.len()
    );

    let mut builder = Table::builder(groups.group_count())
        .add(key, key_column.gather(groups.representatives()));
    for spec in specs {
        let column = table.column(&spec.column)?;
        let result = spec.run(column, &groups, options, context)?;
        builder = builder.add(spec.output_label(), result);
    }
    Ok(builder.build()?)
}
