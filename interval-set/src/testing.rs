// SPDX-License-Identifier: MPL-2.0

use crate::IntervalSet;

use proptest::prelude::*;

/// A strategy for using interval sets in proptests.
///
/// Builds a set from a random list of (gap, width) deltas so the generated
/// boundary points are always strictly increasing.
pub fn proptest_strategy() -> impl Strategy<Value = IntervalSet<u32>> {
    prop::collection::vec((1u32..100, 1u32..100), 0..5).prop_map(|deltas| {
        let mut set = IntervalSet::empty();
        let mut cursor = 0u32;
        for (gap, width) in deltas {
            let low = cursor.saturating_add(gap);
            let high = low.saturating_add(width);
            if low < high {
                set = set.union(&IntervalSet::between(low, high));
            }
            cursor = high;
        }
        set
    })
}

/// Like [`proptest_strategy`], but never generates the empty set.
pub fn non_empty_strategy() -> impl Strategy<Value = IntervalSet<u32>> {
    proptest_strategy().prop_filter("interval set must be non-empty", |set| !set.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn union_is_commutative(a in proptest_strategy(), b in proptest_strategy()) {
            prop_assert_eq!(a.union(&b), b.union(&a));
        }

        #[test]
        fn intersection_subset_of_operands(a in proptest_strategy(), b in proptest_strategy()) {
            let isect = a.intersection(&b);
            prop_assert!(isect.subset_of(&a));
            prop_assert!(isect.subset_of(&b));
        }

        #[test]
        fn difference_partitions(a in proptest_strategy(), b in proptest_strategy()) {
            let inside = a.intersection(&b);
            let outside = a.difference(&b);
            prop_assert!(inside.is_disjoint(&outside));
            prop_assert_eq!(inside.union(&outside), a);
        }
    }
}
