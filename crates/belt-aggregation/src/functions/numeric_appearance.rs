use crate::collector::{NumericCollector, NumericResult};
use crate::error::AggregationResult;
use crate::functions::appearance::AppearanceMode;
use crate::functions::buckets::CountBuckets;
use crate::manager::{checked_output_type, AggregationFunction, AggregationManager};
use ahash::AHashMap;
use belt_columnar::{Column, ColumnType, NumericRowReader};
use ordered_float::OrderedFloat;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Appearance {
    count: u64,
    // Earliest row the value was seen in; breaks `Most` ties in merge scans.
    first_row: isize,
}

impl Appearance {
    fn beats(&self, other: &Appearance, mode: AppearanceMode) -> bool {
        mode.beats(self.count, other.count)
            || (self.count == other.count && self.first_row < other.first_row)
    }
}

/// Mode / least-appearance function over the values of a numeric column.
///
/// Same contract as the nominal appearance counter, but keyed by value. Missing values (`NaN`)
/// are never counted.
#[derive(Clone, Debug)]
pub struct NumericAppearanceFunction {
    mode: AppearanceMode,
    column: usize,
    counts: AHashMap<OrderedFloat<f64>, Appearance>,
    least: Option<CountBuckets<OrderedFloat<f64>>>,
    best: Option<OrderedFloat<f64>>,
    best_count: u64,
}

impl NumericAppearanceFunction {
    fn new(mode: AppearanceMode, column: usize) -> Self {
        Self {
            mode,
            column,
            counts: AHashMap::new(),
            least: (mode == AppearanceMode::Least).then(CountBuckets::new),
            best: None,
            best_count: 0,
        }
    }

    pub fn result(&self) -> Option<f64> {
        self.best.map(|v| v.0)
    }

    pub fn best_count(&self) -> u64 {
        self.best_count
    }

    fn add(&mut self, value: OrderedFloat<f64>, row: isize) {
        let entry = self.counts.entry(value).or_insert(Appearance {
            count: 0,
            first_row: row,
        });
        entry.count += 1;
        entry.first_row = entry.first_row.min(row);
        let count = entry.count;

        if let Some(least) = &mut self.least {
            least.bump(value, 1);
            if let Some((best, best_count)) = least.least() {
                self.set_best(best, best_count);
            }
            return;
        }
        match self.best {
            Some(best) if best == value => self.best_count = count,
            Some(_) if !self.mode.beats(count, self.best_count) => {}
            _ => self.set_best(value, count),
        }
    }

    fn set_best(&mut self, value: OrderedFloat<f64>, count: u64) {
        self.best = Some(value);
        self.best_count = count;
    }

    fn scan_best(&self) -> Option<(OrderedFloat<f64>, u64)> {
        if let Some(least) = &self.least {
            return least.least();
        }
        let mut best: Option<(OrderedFloat<f64>, Appearance)> = None;
        for (&value, appearance) in &self.counts {
            if best.map_or(true, |(_, b)| appearance.beats(&b, self.mode)) {
                best = Some((value, *appearance));
            }
        }
        best.map(|(value, appearance)| (value, appearance.count))
    }
}

impl AggregationFunction for NumericAppearanceFunction {
    fn accept(&mut self, row: &NumericRowReader<'_>) {
        let value = row.get(self.column);
        if !value.is_nan() {
            self.add(OrderedFloat(value), row.position());
        }
    }

    fn merge(&mut self, other: &Self) {
        let Some(right) = other.best else {
            return;
        };
        let left = self.best;
        for (&value, appearance) in &other.counts {
            let entry = self.counts.entry(value).or_insert(Appearance {
                count: 0,
                first_row: appearance.first_row,
            });
            entry.count += appearance.count;
            entry.first_row = entry.first_row.min(appearance.first_row);
        }
        if let (Some(least), Some(other_least)) = (&mut self.least, &other.least) {
            least.merge(other_least);
        }

        let Some(left) = left else {
            self.set_best(right, other.best_count);
            return;
        };
        let count_of = |v: &OrderedFloat<f64>| self.counts.get(v).map_or(0, |a| a.count);
        let (left_count, right_count) = (count_of(&left), count_of(&right));
        let (mut best, mut best_count) = if self.mode.beats(right_count, left_count) {
            (right, right_count)
        } else {
            (left, left_count)
        };

        // The two local bests are not necessarily the global best after summing.
        if let Some((value, count)) = self.scan_best() {
            if self.mode.beats(count, best_count) {
                best = value;
                best_count = count;
            }
        }
        self.set_best(best, best_count);
    }
}

impl NumericResult for NumericAppearanceFunction {
    fn numeric_result(&self) -> f64 {
        self.result().unwrap_or(f64::NAN)
    }
}

/// Mode / least-appearance aggregation for real and integer columns. Date and time columns are
/// not supported.
#[derive(Clone, Debug)]
pub struct NumericAppearanceAggregationManager {
    mode: AppearanceMode,
    output_type: ColumnType,
    column: usize,
}

impl NumericAppearanceAggregationManager {
    pub fn new(mode: AppearanceMode) -> Self {
        Self {
            mode,
            output_type: ColumnType::Real,
            column: 0,
        }
    }
}

impl AggregationManager for NumericAppearanceAggregationManager {
    type Function = NumericAppearanceFunction;
    type Collector = NumericCollector;

    fn name(&self) -> &'static str {
        self.mode.function_name()
    }

    fn check_column_type(&self, column_type: ColumnType) -> Option<ColumnType> {
        column_type.is_numeric().then_some(column_type)
    }

    fn initialize(&mut self, column: &Column, index: usize) -> AggregationResult<()> {
        self.output_type = checked_output_type(self, column)?;
        self.column = index;
        Ok(())
    }

    fn new_function(&self) -> NumericAppearanceFunction {
        NumericAppearanceFunction::new(self.mode, self.column)
    }

    fn collector(&self, size: usize) -> NumericCollector {
        NumericCollector::new(self.output_type, size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn run(mode: AppearanceMode, values: &[f64]) -> NumericAppearanceFunction {
        let column = Column::real(values.to_vec());
        let mut manager = NumericAppearanceAggregationManager::new(mode);
        manager.initialize(&column, 0).unwrap();
        let mut function = manager.new_function();
        let mut reader = NumericRowReader::new(vec![&column]);
        while reader.has_remaining() {
            reader.advance();
            function.accept(&reader);
        }
        function
    }

    #[test]
    fn rejects_time_columns() {
        let manager = NumericAppearanceAggregationManager::new(AppearanceMode::Most);
        assert_eq!(manager.check_column_type(ColumnType::Integer), Some(ColumnType::Integer));
        assert_eq!(manager.check_column_type(ColumnType::DateTime), None);
        assert_eq!(manager.check_column_type(ColumnType::Nominal), None);
    }

    #[test]
    fn counts_values_and_skips_missing() {
        let f = run(AppearanceMode::Most, &[1.5, f64::NAN, 2.0, 1.5, f64::NAN, f64::NAN]);
        assert_eq!(f.result(), Some(1.5));
        assert_eq!(f.best_count(), 2);

        let f = run(AppearanceMode::Least, &[1.5, 2.0, 1.5]);
        assert_eq!(f.result(), Some(2.0));

        let f = run(AppearanceMode::Most, &[f64::NAN]);
        assert_eq!(f.result(), None);
        assert!(f.numeric_result().is_nan());
    }

    #[test]
    fn merge_prefers_earliest_first_row_in_scans() {
        let column = Column::real(vec![1.0, 1.0, 2.0, 3.0, 3.0, 2.0]);
        let manager = {
            let mut m = NumericAppearanceAggregationManager::new(AppearanceMode::Most);
            m.initialize(&column, 0).unwrap();
            m
        };
        let feed = |start, end| {
            let mut f = manager.new_function();
            let mut reader = NumericRowReader::with_range(vec![&column], start, end);
            while reader.has_remaining() {
                reader.advance();
                f.accept(&reader);
            }
            f
        };
        let mut left = feed(0, 3);
        left.merge(&feed(3, 6));
        // 1.0, 2.0 and 3.0 all occur twice; neither local best (1.0 and 3.0) loses to 2.0.
        assert_eq!(left.result(), Some(1.0));
        assert_eq!(left.best_count(), 2);
    }

    #[test]
    fn least_over_many_distinct_values() {
        let distinct = 100_000;
        let mut values: Vec<f64> = (0..3).flat_map(|_| (0..distinct).map(f64::from)).collect();
        values.extend((0..distinct / 2).map(f64::from));
        let f = run(AppearanceMode::Least, &values);
        assert_eq!(f.result(), Some(f64::from(distinct / 2)));
        assert_eq!(f.best_count(), 3);

        // Split in the middle of the second pass.
        let column = Column::real(values);
        let mut manager = NumericAppearanceAggregationManager::new(AppearanceMode::Least);
        manager.initialize(&column, 0).unwrap();
        let cut = distinct as usize * 3 / 2;
        let mut halves = [(0, cut), (cut, column.len())].map(|(start, end)| {
            let mut f = manager.new_function();
            let mut reader = NumericRowReader::with_range(vec![&column], start, end);
            while reader.has_remaining() {
                reader.advance();
                f.accept(&reader);
            }
            f
        });
        let [left, right] = &mut halves;
        left.merge(right);
        assert_eq!(left.result(), Some(f64::from(distinct / 2)));
        assert_eq!(left.best_count(), 3);
    }
}
