// SPDX-License-Identifier: MPL-2.0

//! A ready-made requirement domain over [`IntervalSet`].

use std::fmt::{self, Debug, Display};

use interval_set::IntervalSet;

use crate::{Key, Requirement};

/// A key constrained to a non-empty set of half-open version intervals.
///
/// [`IntervalSet`] keeps a canonical representation, so the derived `Eq` is
/// extensional the way [`Requirement`] demands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeRequirement<K, V> {
    key: K,
    versions: IntervalSet<V>,
}

impl<K, V: Ord + Clone> RangeRequirement<K, V> {
    /// Pair a key with a set of versions. The set must be non-empty: an
    /// empty requirement is expressed as the absence of one.
    pub fn new(key: K, versions: IntervalSet<V>) -> Self {
        debug_assert!(!versions.is_empty(), "a requirement must admit at least one version");
        RangeRequirement { key, versions }
    }

    /// Requirement admitting any version `v` with `low <= v < high`.
    pub fn between(key: K, low: V, high: V) -> Self {
        RangeRequirement::new(key, IntervalSet::between(low, high))
    }

    /// The admitted versions.
    pub fn versions(&self) -> &IntervalSet<V> {
        &self.versions
    }

    fn with_versions(&self, versions: IntervalSet<V>) -> Option<Self>
    where
        K: Clone,
    {
        if versions.is_empty() {
            None
        } else {
            Some(RangeRequirement {
                key: self.key.clone(),
                versions,
            })
        }
    }
}

impl<K, V> Requirement for RangeRequirement<K, V>
where
    K: Key + Display,
    V: Ord + Clone + Debug + Display,
{
    type Key = K;

    fn key(&self) -> &K {
        &self.key
    }

    fn implied_by(&self, other: &Self) -> bool {
        self.versions.contains(&other.versions)
    }

    fn excludes(&self, other: &Self) -> bool {
        self.versions.is_disjoint(&other.versions)
    }

    fn intersection(&self, other: &Self) -> Option<Self> {
        self.with_versions(self.versions.intersection(&other.versions))
    }

    fn union(&self, other: &Self) -> Option<Self> {
        self.with_versions(self.versions.union(&other.versions))
    }

    fn difference(&self, other: &Self) -> Option<Self> {
        self.with_versions(self.versions.difference(&other.versions))
    }
}

impl<K: Display, V: Display> Display for RangeRequirement<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.key, self.versions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(key: &'static str, low: u32, high: u32) -> RangeRequirement<&'static str, u32> {
        RangeRequirement::between(key, low, high)
    }

    #[test]
    fn set_queries_delegate_to_the_versions() {
        assert!(req("foo", 1, 10).implied_by(&req("foo", 2, 5)));
        assert!(!req("foo", 2, 5).implied_by(&req("foo", 1, 10)));
        assert!(req("foo", 1, 2).excludes(&req("foo", 2, 3)));
    }

    #[test]
    fn empty_results_become_none() {
        assert_eq!(req("foo", 1, 2).intersection(&req("foo", 3, 4)), None);
        assert_eq!(req("foo", 1, 2).difference(&req("foo", 1, 2)), None);
        assert_eq!(
            req("foo", 1, 3).intersection(&req("foo", 2, 5)),
            Some(req("foo", 2, 3))
        );
    }

    #[test]
    fn display_shows_key_and_intervals() {
        assert_eq!(req("foo", 1, 2).to_string(), "foo [1, 2)");
    }
}
