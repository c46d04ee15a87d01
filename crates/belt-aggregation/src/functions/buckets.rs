use ahash::AHashMap;
use std::collections::{BTreeMap, BTreeSet};
use std::hash::Hash;

/// Keys grouped by their current count.
///
/// Within one count, keys are ordered by the moment they reached it, so the first key of the
/// lowest bucket is the least frequent key that got there earliest. Moving a key between buckets
/// and reading the least key are both `O(log n)`.
#[derive(Clone, Debug)]
pub(crate) struct CountBuckets<K> {
    // Current count and arrival stamp per key.
    entries: AHashMap<K, (u64, u64)>,
    buckets: BTreeMap<u64, BTreeSet<(u64, K)>>,
    clock: u64,
}

impl<K: Copy + Ord + Hash> CountBuckets<K> {
    pub(crate) fn new() -> Self {
        Self {
            entries: AHashMap::new(),
            buckets: BTreeMap::new(),
            clock: 0,
        }
    }

    /// Adds `amount` occurrences of `key`, stamped as the latest arrival.
    pub(crate) fn bump(&mut self, key: K, amount: u64) {
        let stamp = self.clock;
        self.clock += 1;
        self.move_to(key, amount, stamp);
    }

    fn move_to(&mut self, key: K, amount: u64, stamp: u64) {
        let entry = self.entries.entry(key).or_insert((0, stamp));
        let (old_count, old_stamp) = *entry;
        let new_count = old_count + amount;
        *entry = (new_count, stamp);

        if old_count > 0 {
            if let Some(bucket) = self.buckets.get_mut(&old_count) {
                bucket.remove(&(old_stamp, key));
                if bucket.is_empty() {
                    self.buckets.remove(&old_count);
                }
            }
        }
        self.buckets
            .entry(new_count)
            .or_default()
            .insert((stamp, key));
    }

    /// The least frequent key and its count; ties go to the key that reached the count first.
    pub(crate) fn least(&self) -> Option<(K, u64)> {
        let (&count, bucket) = self.buckets.first_key_value()?;
        bucket.first().map(|&(_, key)| (key, count))
    }

    /// Adds the counts of `other`, whose occurrences all come after the ones seen here.
    pub(crate) fn merge(&mut self, other: &CountBuckets<K>) {
        let offset = self.clock;
        // Replay in arrival order so stamps stay unique and ordered.
        let mut arrivals: Vec<(u64, K, u64)> = other
            .entries
            .iter()
            .map(|(&key, &(count, stamp))| (stamp, key, count))
            .collect();
        arrivals.sort_unstable_by_key(|&(stamp, _, _)| stamp);
        for (stamp, key, count) in arrivals {
            self.move_to(key, count, offset + stamp);
        }
        self.clock = offset + other.clock;
    }
}
