//! # CountTable
//!
//! A multiset of observed integer allele-size observations, keyed by size
//! and mapping to a positive count. Used to represent the evidence gathered
//! for one read category (spanning, flanking, or in-repeat) at a locus.
use std::collections::BTreeMap;

use anyhow::{bail, Result};

/// `CountTable` maps an observed allele size (in repeat units) to the number
/// of reads observed at that size. Backed by a `BTreeMap` so that iteration
/// is always in ascending order of size — callers never need to sort.
///
/// Invariants upheld by construction: no entry has a count of zero, and all
/// sizes and counts are non-negative.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CountTable {
    counts: BTreeMap<i32, u32>,
}

impl CountTable {
    /// Build a `CountTable` from a `{size -> count}` map. Entries with a
    /// count of zero are dropped silently (they carry no evidence); a
    /// negative size is a programmer error.
    pub fn from_map(raw: BTreeMap<i32, u32>) -> Result<Self> {
        for size in raw.keys() {
            if *size < 0 {
                bail!("CountTable entries must have non-negative size, got {size}");
            }
        }
        let counts = raw.into_iter().filter(|(_, count)| *count > 0).collect();
        Ok(Self { counts })
    }

    /// An empty table, with no observed reads of any size.
    pub fn empty() -> Self {
        Self {
            counts: BTreeMap::new(),
        }
    }

    /// Accumulate one more observation at `size` into the table.
    pub fn add(&mut self, size: i32, count: u32) {
        if count == 0 {
            return;
        }
        *self.counts.entry(size).or_insert(0) += count;
    }

    /// The count recorded for `size`, or zero if `size` was never observed.
    pub fn count_at(&self, size: i32) -> u32 {
        self.counts.get(&size).copied().unwrap_or(0)
    }

    /// Total number of reads across all observed sizes.
    pub fn total(&self) -> u32 {
        self.counts.values().sum()
    }

    /// `true` if no reads were observed at any size.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of counts for all sizes `>= size` (inclusive).
    pub fn cumulative_at_least(&self, size: i32) -> u32 {
        self.counts.range(size..).map(|(_, c)| *c).sum()
    }

    /// Iterate over `(size, count)` pairs in ascending order of size.
    pub fn iter(&self) -> impl Iterator<Item = (i32, u32)> + '_ {
        self.counts.iter().map(|(size, count)| (*size, *count))
    }

    /// The largest size with a non-zero count, if any.
    pub fn max_size(&self) -> Option<i32> {
        self.counts.keys().next_back().copied()
    }

    /// Build a new table retaining only entries whose size satisfies `pred`.
    pub fn filter_sizes(&self, pred: impl Fn(i32) -> bool) -> Self {
        Self {
            counts: self
                .counts
                .iter()
                .filter(|(size, _)| pred(**size))
                .map(|(size, count)| (*size, *count))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascending_iteration_order() {
        let mut raw = BTreeMap::new();
        raw.insert(10, 1);
        raw.insert(2, 3);
        raw.insert(5, 2);
        let table = CountTable::from_map(raw).unwrap();

        let sizes: Vec<i32> = table.iter().map(|(size, _)| size).collect();
        assert_eq!(sizes, vec![2, 5, 10]);
    }

    #[test]
    fn zero_count_entries_are_dropped() {
        let mut raw = BTreeMap::new();
        raw.insert(3, 0);
        raw.insert(4, 2);
        let table = CountTable::from_map(raw).unwrap();

        assert_eq!(table.count_at(3), 0);
        assert!(!table.iter().any(|(size, _)| size == 3));
        assert_eq!(table.total(), 2);
    }

    #[test]
    fn negative_size_is_rejected() {
        let mut raw = BTreeMap::new();
        raw.insert(-1, 1);
        assert!(CountTable::from_map(raw).is_err());
    }

    #[test]
    fn cumulative_at_least_sums_tail() {
        let mut raw = BTreeMap::new();
        raw.insert(1, 2);
        raw.insert(2, 3);
        raw.insert(10, 1);
        let table = CountTable::from_map(raw).unwrap();

        assert_eq!(table.cumulative_at_least(2), 4);
        assert_eq!(table.cumulative_at_least(3), 1);
        assert_eq!(table.cumulative_at_least(11), 0);
    }

    #[test]
    fn add_accumulates() {
        let mut table = CountTable::empty();
        table.add(5, 2);
        table.add(5, 1);
        assert_eq!(table.count_at(5), 3);
    }

    proptest::proptest! {
        #[test]
        fn total_matches_sum_of_added_counts(
            entries in proptest::collection::vec((0i32..50, 1u32..20), 0..20),
        ) {
            let mut table = CountTable::empty();
            let mut expected: u64 = 0;
            for (size, count) in &entries {
                table.add(*size, *count);
                expected += u64::from(*count);
            }
            proptest::prop_assert_eq!(u64::from(table.total()), expected);
        }

        #[test]
        fn cumulative_at_least_is_monotonically_non_increasing(
            entries in proptest::collection::vec((0i32..50, 1u32..20), 0..20),
            probe in 0i32..60,
        ) {
            let mut table = CountTable::empty();
            for (size, count) in &entries {
                table.add(*size, *count);
            }
            proptest::prop_assert!(table.cumulative_at_least(probe) >= table.cumulative_at_least(probe + 1));
        }
    }
}
