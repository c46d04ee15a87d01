//! Mode and least-appearance aggregation over nominal columns.
//!
//! Counting happens on category indices. Depending on the size of the column's dictionary the
//! counts live in a dense array indexed by category, or in a sparse map that is promoted to a
//! dense array once enough distinct categories have been seen.

use crate::collector::{NominalCollector, NominalResult};
use crate::error::AggregationResult;
use crate::manager::{checked_output_type, AggregationFunction, AggregationManager};
use crate::functions::buckets::CountBuckets;
use crate::options::AppearanceOptions;
use ahash::AHashMap;
use belt_columnar::{Column, ColumnType, Dictionary, NumericRowReader, MISSING_INDEX};
use std::sync::Arc;

/// Which end of the frequency distribution an appearance aggregation reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AppearanceMode {
    /// The most frequent value; the earliest to reach the maximal count wins ties.
    Most,
    /// The least frequent value among those that occur at all.
    Least,
}

impl AppearanceMode {
    /// Whether a value seen `candidate` times strictly beats one seen `incumbent` times.
    pub(crate) fn beats(self, candidate: u64, incumbent: u64) -> bool {
        match self {
            AppearanceMode::Most => candidate > incumbent,
            AppearanceMode::Least => candidate < incumbent,
        }
    }

    pub(crate) fn function_name(self) -> &'static str {
        match self {
            AppearanceMode::Most => "mode",
            AppearanceMode::Least => "least",
        }
    }
}

#[derive(Clone, Debug, Default)]
struct SparseCounts {
    counts: AHashMap<u32, u64>,
}

#[derive(Clone, Debug)]
struct DenseCounts {
    counts: Vec<u64>,
    distinct: usize,
}

impl DenseCounts {
    fn new(maximal_index: usize) -> Self {
        Self {
            counts: vec![0; maximal_index + 1],
            distinct: 0,
        }
    }

    fn add(&mut self, index: u32, amount: u64) -> u64 {
        let Some(slot) = self.counts.get_mut(index as usize) else {
            return 0;
        };
        if *slot == 0 && amount > 0 {
            self.distinct += 1;
        }
        *slot += amount;
        *slot
    }
}

/// Occurrence counts per category index.
#[derive(Clone, Debug)]
enum Counts {
    Sparse(SparseCounts),
    Dense(DenseCounts),
}

impl Counts {
    fn new(maximal_index: usize, options: &AppearanceOptions) -> Self {
        if options.starts_dense(maximal_index) {
            Counts::Dense(DenseCounts::new(maximal_index))
        } else {
            Counts::Sparse(SparseCounts::default())
        }
    }

    /// Adds `amount` occurrences of `index` and returns the new count.
    fn add(&mut self, index: u32, amount: u64) -> u64 {
        match self {
            Counts::Sparse(sparse) => {
                let count = sparse.counts.entry(index).or_insert(0);
                *count += amount;
                *count
            }
            Counts::Dense(dense) => dense.add(index, amount),
        }
    }

    fn count_of(&self, index: u32) -> u64 {
        match self {
            Counts::Sparse(sparse) => sparse.counts.get(&index).copied().unwrap_or(0),
            Counts::Dense(dense) => dense.counts.get(index as usize).copied().unwrap_or(0),
        }
    }

    fn distinct(&self) -> usize {
        match self {
            Counts::Sparse(sparse) => sparse.counts.len(),
            Counts::Dense(dense) => dense.distinct,
        }
    }

    fn promote_if_needed(&mut self, maximal_index: usize, options: &AppearanceOptions) {
        let Counts::Sparse(sparse) = self else {
            return;
        };
        let distinct = sparse.counts.len();
        if options.should_promote(distinct, maximal_index) {
            log::trace!(
                "promoting appearance counts to a dense array ({distinct} distinct of {maximal_index} categories)"
            );
            self.promote(maximal_index);
        }
    }

    fn promote(&mut self, maximal_index: usize) {
        if let Counts::Sparse(sparse) = self {
            let mut dense = DenseCounts::new(maximal_index);
            for (&index, &count) in &sparse.counts {
                dense.add(index, count);
            }
            *self = Counts::Dense(dense);
        }
    }

    /// Adds all counts of `other`. A dense `other` forces this side dense as well.
    fn add_all(&mut self, other: &Counts, maximal_index: usize, options: &AppearanceOptions) {
        match other {
            Counts::Dense(other) => {
                self.promote(maximal_index);
                for (index, &count) in other.counts.iter().enumerate().skip(1) {
                    if count > 0 {
                        self.add(index as u32, count);
                    }
                }
            }
            Counts::Sparse(other) => {
                for (&index, &count) in &other.counts {
                    self.add(index, count);
                }
                self.promote_if_needed(maximal_index, options);
            }
        }
    }

    fn for_each_present(&self, mut f: impl FnMut(u32, u64)) {
        match self {
            Counts::Sparse(sparse) => {
                for (&index, &count) in &sparse.counts {
                    f(index, count);
                }
            }
            Counts::Dense(dense) => {
                for (index, &count) in dense.counts.iter().enumerate().skip(1) {
                    if count > 0 {
                        f(index as u32, count);
                    }
                }
            }
        }
    }

    /// The best present index under `mode`; the lowest index wins ties.
    fn best(&self, mode: AppearanceMode) -> Option<(u32, u64)> {
        let mut best: Option<(u32, u64)> = None;
        self.for_each_present(|index, count| {
            let replace = match best {
                None => true,
                Some((best_index, best_count)) => {
                    mode.beats(count, best_count) || (count == best_count && index < best_index)
                }
            };
            if replace {
                best = Some((index, count));
            }
        });
        best
    }
}

/// Counts how often each category index of one nominal column occurs and tracks the most (or
/// least) frequent one.
///
/// Counters are single-writer: each partition owns its counter, and partition results are
/// combined with [`AppearanceCounter::merge`] afterwards.
///
/// Ties go to the index that reached the winning count first, in row order. Dictionary order
/// plays no part, except when a merge scan finds an index that overtakes both local bests under
/// `Most`: among several of those the lowest index wins.
///
/// Counts only ever grow. The merge relies on that: after summing, only the two partition-local
/// bests are compared directly, and a check of the merged counts catches the (rare) case where a
/// third index overtakes both.
#[derive(Clone, Debug)]
pub struct AppearanceCounter {
    mode: AppearanceMode,
    options: AppearanceOptions,
    maximal_index: usize,
    counts: Counts,
    // Only kept under `Least`, where the winner moves whenever it is seen again.
    least: Option<CountBuckets<u32>>,
    best: Option<u32>,
    best_count: u64,
}

impl AppearanceCounter {
    pub fn new(mode: AppearanceMode, maximal_index: usize, options: AppearanceOptions) -> Self {
        Self {
            mode,
            options,
            maximal_index,
            counts: Counts::new(maximal_index, &options),
            least: (mode == AppearanceMode::Least).then(CountBuckets::new),
            best: None,
            best_count: 0,
        }
    }

    pub fn mode(&self) -> AppearanceMode {
        self.mode
    }

    /// Records one occurrence of `index`. Missing and out-of-range indices are ignored.
    pub fn add(&mut self, index: u32) {
        if index == MISSING_INDEX || index as usize > self.maximal_index {
            return;
        }
        let count = self.counts.add(index, 1);
        self.counts
            .promote_if_needed(self.maximal_index, &self.options);

        if let Some(least) = &mut self.least {
            least.bump(index, 1);
            if let Some((best, best_count)) = least.least() {
                self.set_best(best, best_count);
            }
            return;
        }
        match self.best {
            Some(best) if best == index => self.best_count = count,
            Some(_) if !self.mode.beats(count, self.best_count) => {}
            _ => self.set_best(index, count),
        }
    }

    /// Adds the counts of `other` (accumulated over later rows of the same column).
    ///
    /// The result is the best over the combined counts. If both local bests end up tied, the
    /// best of `self` is kept.
    pub fn merge(&mut self, other: &AppearanceCounter) {
        debug_assert_eq!(self.mode, other.mode);
        let Some(right) = other.best else {
            return;
        };
        let left = self.best;
        self.counts
            .add_all(&other.counts, self.maximal_index, &self.options);
        if let (Some(least), Some(other_least)) = (&mut self.least, &other.least) {
            least.merge(other_least);
        }

        let Some(left) = left else {
            self.set_best(right, other.best_count);
            return;
        };
        let left_count = self.counts.count_of(left);
        let right_count = self.counts.count_of(right);
        let (mut best, mut best_count) = if self.mode.beats(right_count, left_count) {
            (right, right_count)
        } else {
            (left, left_count)
        };

        let overall = match &self.least {
            Some(least) => least.least(),
            None => self.counts.best(self.mode),
        };
        if let Some((index, count)) = overall {
            if self.mode.beats(count, best_count) {
                best = index;
                best_count = count;
            }
        }
        self.set_best(best, best_count);
    }

    fn set_best(&mut self, index: u32, count: u64) {
        self.best = Some(index);
        self.best_count = count;
    }

    /// The winning category index, `None` if no non-missing value was seen.
    pub fn mapping_index(&self) -> Option<u32> {
        self.best
    }

    /// How often the winning index occurred; `0` if there is none.
    pub fn best_count(&self) -> u64 {
        self.best_count
    }

    pub fn count_of(&self, index: u32) -> u64 {
        self.counts.count_of(index)
    }

    /// Number of distinct indices seen.
    pub fn distinct(&self) -> usize {
        self.counts.distinct()
    }

    /// Whether counts are kept in a dense array (as opposed to a sparse map).
    pub fn is_dense(&self) -> bool {
        matches!(self.counts, Counts::Dense(_))
    }
}

/// Appearance counter bound to a column position and dictionary.
#[derive(Clone, Debug)]
pub struct NominalAppearanceFunction {
    counter: AppearanceCounter,
    column: usize,
    dictionary: Arc<Dictionary>,
}

impl NominalAppearanceFunction {
    pub fn counter(&self) -> &AppearanceCounter {
        &self.counter
    }

    /// The winning value, `None` if no non-missing value was seen.
    pub fn result(&self) -> Option<&str> {
        self.counter
            .mapping_index()
            .and_then(|idx| self.dictionary.get(idx))
    }
}

impl AggregationFunction for NominalAppearanceFunction {
    fn accept(&mut self, row: &NumericRowReader<'_>) {
        let value = row.get(self.column);
        if value.is_finite() && value > 0.0 {
            self.counter.add(value as u32);
        }
    }

    fn merge(&mut self, other: &Self) {
        self.counter.merge(&other.counter);
    }
}

impl NominalResult for NominalAppearanceFunction {
    fn mapping_index(&self) -> Option<u32> {
        self.counter.mapping_index()
    }
}

/// Mode / least-appearance aggregation for nominal columns.
#[derive(Clone, Debug)]
pub struct NominalAppearanceAggregationManager {
    mode: AppearanceMode,
    options: AppearanceOptions,
    dictionary: Arc<Dictionary>,
    column: usize,
    initialized: bool,
}

impl NominalAppearanceAggregationManager {
    pub fn new(mode: AppearanceMode) -> Self {
        Self::with_options(mode, AppearanceOptions::default())
    }

    pub fn with_options(mode: AppearanceMode, options: AppearanceOptions) -> Self {
        Self {
            mode,
            options,
            dictionary: Arc::new(Dictionary::empty()),
            column: 0,
            initialized: false,
        }
    }

    pub fn mode(&self) -> AppearanceMode {
        self.mode
    }
}

impl AggregationManager for NominalAppearanceAggregationManager {
    type Function = NominalAppearanceFunction;
    type Collector = NominalCollector;

    fn name(&self) -> &'static str {
        self.mode.function_name()
    }

    fn check_column_type(&self, column_type: ColumnType) -> Option<ColumnType> {
        (column_type == ColumnType::Nominal).then_some(ColumnType::Nominal)
    }

    fn initialize(&mut self, column: &Column, index: usize) -> AggregationResult<()> {
        checked_output_type(self, column)?;
        if let Some(dictionary) = column.dictionary() {
            self.dictionary = dictionary.clone();
        }
        self.column = index;
        self.initialized = true;
        Ok(())
    }

    fn new_function(&self) -> NominalAppearanceFunction {
        debug_assert!(self.initialized, "manager used before initialize");
        NominalAppearanceFunction {
            counter: AppearanceCounter::new(
                self.mode,
                self.dictionary.maximal_index(),
                self.options,
            ),
            column: self.column,
            dictionary: self.dictionary.clone(),
        }
    }

    fn collector(&self, size: usize) -> NominalCollector {
        debug_assert!(self.initialized, "manager used before initialize");
        NominalCollector::new(self.dictionary.clone(), size)
    }
}
