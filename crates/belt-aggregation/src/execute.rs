use crate::context::ExecutionContext;
use crate::error::AggregationResult;
use crate::manager::{AggregationCollector, AggregationFunction, AggregationManager};
use crate::options::AggregationOptions;
use ahash::AHashMap;
use belt_columnar::{Category, Column, ColumnError, NumericRowReader, MISSING_INDEX};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum GroupKey {
    Missing,
    Category(u32),
    Bits(u64),
}

impl GroupKey {
    fn of(column: &Column, row: usize) -> GroupKey {
        if column.column_type().category() == Category::Categorical {
            return match column.category_index(row) {
                Some(MISSING_INDEX) | None => GroupKey::Missing,
                Some(idx) => GroupKey::Category(idx),
            };
        }
        let value = column.get_f64(row);
        if value.is_nan() {
            GroupKey::Missing
        } else if value == 0.0 {
            // -0.0 and 0.0 share a group.
            GroupKey::Bits(0.0f64.to_bits())
        } else {
            GroupKey::Bits(value.to_bits())
        }
    }
}

/// Assignment of rows to output groups.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupIndex {
    group_of_row: Vec<u32>,
    representatives: Vec<usize>,
}

impl GroupIndex {
    /// Every row of a table of `height` rows in one group. The group exists even without rows.
    pub fn single(height: usize) -> Self {
        Self {
            group_of_row: vec![0; height],
            representatives: vec![0],
        }
    }

    /// Groups rows by the value of `column`. Group ids follow first appearance; missing values
    /// form a group of their own.
    pub fn from_column(column: &Column) -> Self {
        let mut ids: AHashMap<GroupKey, u32> = AHashMap::new();
        let mut group_of_row = Vec::with_capacity(column.len());
        let mut representatives = Vec::new();
        for row in 0..column.len() {
            let key = GroupKey::of(column, row);
            let id = *ids.entry(key).or_insert_with(|| {
                representatives.push(row);
                (representatives.len() - 1) as u32
            });
            group_of_row.push(id);
        }
        Self {
            group_of_row,
            representatives,
        }
    }

    /// Number of rows covered.
    pub fn height(&self) -> usize {
        self.group_of_row.len()
    }

    pub fn group_count(&self) -> usize {
        self.representatives.len()
    }

    pub fn group_of(&self, row: usize) -> Option<u32> {
        self.group_of_row.get(row).copied()
    }

    /// The first row of each group, in group id order.
    pub fn representatives(&self) -> &[usize] {
        &self.representatives
    }
}

/// Runs `manager` over `columns`, one output row per group.
///
/// The manager must already be initialized against the position of its column in `columns`.
/// Rows are cut into partitions of `options.partition_rows`; each partition feeds its own
/// functions, which are then merged group-wise in partition order.
pub fn aggregate_grouped<M: AggregationManager>(
    manager: &M,
    columns: &[&Column],
    groups: &GroupIndex,
    options: &AggregationOptions,
    context: &ExecutionContext,
) -> AggregationResult<Column> {
    let height = groups.height();
    if let Some(column) = columns.iter().find(|c| c.len() != height) {
        return Err(ColumnError::LengthMismatch {
            label: manager.name().to_owned(),
            expected: height,
            actual: column.len(),
        }
        .into());
    }

    let partitions = options.partitions(height);
    log::debug!(
        "{}: {} rows, {} partitions, {} groups, {} threads",
        manager.name(),
        height,
        partitions.len(),
        groups.group_count(),
        context.parallelism()
    );

    let partials = context.map(partitions, |(start, end)| {
        accumulate(manager, columns, groups, start, end)
    });

    let mut partials = partials.into_iter();
    let mut merged = partials
        .next()
        .unwrap_or_else(|| empty_slots(groups.group_count()));
    for partial in partials {
        for (left, right) in merged.iter_mut().zip(partial) {
            let Some(right) = right else {
                continue;
            };
            match left {
                Some(left) => left.merge(&right),
                None => *left = Some(right),
            }
        }
    }

    let mut collector = manager.collector(groups.group_count());
    for (index, function) in merged.iter().enumerate() {
        match function {
            Some(function) => collector.set(index, function),
            None => collector.set(index, &manager.new_function()),
        }
    }
    collector.result(Some(context))
}

/// Runs `manager` over all rows of `column` and returns a one-row column.
///
/// Initializes the manager against `column`, so incompatible columns are rejected here.
pub fn aggregate<M: AggregationManager>(
    manager: &mut M,
    column: &Column,
    options: &AggregationOptions,
    context: &ExecutionContext,
) -> AggregationResult<Column> {
    manager.initialize(column, 0)?;
    aggregate_grouped(
        manager,
        &[column],
        &GroupIndex::single(column.len()),
        options,
        context,
    )
}

fn empty_slots<F>(groups: usize) -> Vec<Option<F>> {
    std::iter::repeat_with(|| None).take(groups).collect()
}

fn accumulate<M: AggregationManager>(
    manager: &M,
    columns: &[&Column],
    groups: &GroupIndex,
    start: usize,
    end: usize,
) -> Vec<Option<M::Function>> {
    let mut slots = empty_slots(groups.group_count());
    let mut reader = NumericRowReader::with_range(columns.to_vec(), start, end);
    while reader.has_remaining() {
        reader.advance();
        let Some(group) = groups.group_of(reader.position() as usize) else {
            continue;
        };
        slots[group as usize]
            .get_or_insert_with(|| manager.new_function())
            .accept(&reader);
    }
    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::count::{CountAggregationManager, CountMode};
    use belt_columnar::Value;
    use pretty_assertions::assert_eq;

    #[test]
    fn groups_follow_first_appearance() {
        let key = Column::nominal([Some("b"), None, Some("a"), Some("b"), None]);
        let groups = GroupIndex::from_column(&key);
        assert_eq!(groups.group_count(), 3);
        assert_eq!(groups.representatives(), &[0, 1, 2]);
        assert_eq!(
            (0..5).map(|r| groups.group_of(r).unwrap()).collect::<Vec<_>>(),
            vec![0, 1, 2, 0, 1]
        );

        let key = Column::real(vec![0.0, -0.0, f64::NAN, 2.5]);
        let groups = GroupIndex::from_column(&key);
        assert_eq!(groups.representatives(), &[0, 2, 3]);
    }

    #[test]
    fn counts_across_partitions() {
        let key = Column::nominal([Some("x"), Some("y"), Some("x"), Some("x"), Some("y")]);
        let values = Column::real(vec![1.0, f64::NAN, 3.0, f64::NAN, 5.0]);
        let groups = GroupIndex::from_column(&key);
        let mut manager = CountAggregationManager::new(CountMode::NonMissing);
        manager.initialize(&values, 0).unwrap();

        let options = AggregationOptions {
            partition_rows: 2,
            ..AggregationOptions::default()
        };
        let out = aggregate_grouped(
            &manager,
            &[&values],
            &groups,
            &options,
            &ExecutionContext::sequential(),
        )
        .unwrap();
        assert_eq!(out.to_values(), vec![Value::Number(2.0), Value::Number(1.0)]);
    }

    #[test]
    fn ungrouped_empty_column_yields_one_row() {
        let mut manager = CountAggregationManager::new(CountMode::IncludingMissing);
        let out = aggregate(
            &mut manager,
            &Column::real(Vec::new()),
            &AggregationOptions::default(),
            &ExecutionContext::sequential(),
        )
        .unwrap();
        assert_eq!(out.to_values(), vec![Value::Number(0.0)]);
    }

    #[test]
    fn rejects_mismatched_heights() {
        let values = Column::real(vec![1.0, 2.0]);
        let mut manager = CountAggregationManager::new(CountMode::NonMissing);
        manager.initialize(&values, 0).unwrap();
        let err = aggregate_grouped(
            &manager,
            &[&values],
            &GroupIndex::single(3),
            &AggregationOptions::default(),
            &ExecutionContext::sequential(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            crate::AggregationError::Column(ColumnError::LengthMismatch { expected: 3, actual: 2, .. })
        ));
    }
}
