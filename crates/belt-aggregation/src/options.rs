/// Dictionaries with at most this maximal index are counted in a dense array from the start.
pub const MAX_MAPPING_SIZE: usize = 1024;

/// A sparse counter switches to a dense array once
/// `distinct_indices * FILL_RATIO > maximal_index`.
pub const FILL_RATIO: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppearanceOptions {
    pub dense_threshold: usize,
    pub fill_ratio: usize,
}

impl Default for AppearanceOptions {
    fn default() -> Self {
        Self {
            dense_threshold: MAX_MAPPING_SIZE,
            fill_ratio: FILL_RATIO,
        }
    }
}

impl AppearanceOptions {
    /// Whether a counter over a dictionary with the given maximal index starts out dense.
    pub(crate) fn starts_dense(&self, maximal_index: usize) -> bool {
        maximal_index <= self.dense_threshold
    }

    /// Whether a sparse counter holding `distinct` indices should switch to a dense array.
    pub(crate) fn should_promote(&self, distinct: usize, maximal_index: usize) -> bool {
        distinct.saturating_mul(self.fill_ratio.max(1)) > maximal_index
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregationOptions {
    /// Rows per partition; `0` processes all rows in a single partition.
    pub partition_rows: usize,
    pub appearance: AppearanceOptions,
}

impl Default for AggregationOptions {
    fn default() -> Self {
        Self {
            partition_rows: 65_536,
            appearance: AppearanceOptions::default(),
        }
    }
}

impl AggregationOptions {
    pub(crate) fn partitions(&self, height: usize) -> Vec<(usize, usize)> {
        if self.partition_rows == 0 || height <= self.partition_rows {
            return vec![(0, height)];
        }
        (0..height)
            .step_by(self.partition_rows)
            .map(|start| (start, (start + self.partition_rows).min(height)))
            .collect()
    }
}
