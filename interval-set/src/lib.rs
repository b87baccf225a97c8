// SPDX-License-Identifier: MPL-2.0

//! Sets of half-open intervals over a totally ordered element type.
//!
//! An [`IntervalSet`] is a canonical union of disjoint, non-adjacent
//! half-open intervals `[low, high)`. It supports the usual set algebra
//! (union, intersection, difference) together with containment and
//! disjointness queries, which is everything a version-constraint domain
//! needs from its underlying version sets.
//!
//! The representation is a sorted, strictly increasing list of boundary
//! points with even length; consecutive pairs delimit one interval. Whether
//! an element lies inside the set is the parity of the number of boundary
//! points at or before it.

#[cfg(feature = "proptest")]
pub mod testing;

use std::fmt::{self, Display};

/// A set of versions (or any ordered elements) stored as half-open intervals.
///
/// Two sets are equal under `Eq` iff they contain the same elements: the
/// boundary-point representation is canonical, so structural equality is
/// extensional equality.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct IntervalSet<T> {
    /// Strictly increasing, even number of entries.
    points: Vec<T>,
}

impl<T: Ord + Clone> IntervalSet<T> {
    /// The set containing no elements.
    pub fn empty() -> Self {
        IntervalSet { points: Vec::new() }
    }

    /// The set of all elements `v` with `low <= v < high`.
    ///
    /// Panics if `low >= high`; a degenerate interval has no boundary
    /// representation.
    pub fn between(low: T, high: T) -> Self {
        assert!(low < high, "invalid interval: low must be less than high");
        IntervalSet {
            points: vec![low, high],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of disjoint intervals in the set.
    pub fn interval_count(&self) -> usize {
        self.points.len() / 2
    }

    /// The `[low, high)` pairs of the set, in ascending order.
    pub fn iter_intervals(&self) -> impl Iterator<Item = (&T, &T)> {
        self.points.chunks_exact(2).map(|pair| (&pair[0], &pair[1]))
    }

    /// Number of boundary points at or before `point`.
    fn points_through(&self, point: &T) -> usize {
        self.points.partition_point(|p| p <= point)
    }

    /// Number of boundary points strictly before `point`.
    fn points_before(&self, point: &T) -> usize {
        self.points.partition_point(|p| p < point)
    }

    /// Whether `[low, high)` lies entirely inside (parity 1) or entirely
    /// outside (parity 0) the set: its start must be on the right side and
    /// no boundary may interrupt the interval.
    fn check_interval(&self, low: &T, high: &T, parity: usize) -> bool {
        let through = self.points_through(low);
        through % 2 == parity && through == self.points_before(high)
    }

    /// Whether the element lies in the set.
    pub fn contains_point(&self, point: &T) -> bool {
        self.points_through(point) % 2 == 1
    }

    /// Whether every element of `other` lies in `self`.
    pub fn contains(&self, other: &Self) -> bool {
        other
            .iter_intervals()
            .all(|(low, high)| self.check_interval(low, high, 1))
    }

    /// Whether every element of `self` lies in `other`.
    pub fn subset_of(&self, other: &Self) -> bool {
        other.contains(self)
    }

    /// Whether the sets share no element.
    pub fn is_disjoint(&self, other: &Self) -> bool {
        other
            .iter_intervals()
            .all(|(low, high)| self.check_interval(low, high, 0))
    }

    /// Sweep the merged boundary points of both sets, keeping the regions
    /// selected by `keep` and emitting a boundary wherever membership flips.
    /// `keep` must map (false, false) to false so the sweep starts outside.
    fn merge(&self, other: &Self, keep: impl Fn(bool, bool) -> bool) -> Self {
        let (a, b) = (&self.points, &other.points);
        let mut points = Vec::new();
        let (mut i, mut j) = (0usize, 0usize);
        let mut inside = false;
        while i < a.len() || j < b.len() {
            let take_a = j >= b.len() || (i < a.len() && a[i] <= b[j]);
            let take_b = i >= a.len() || (j < b.len() && b[j] <= a[i]);
            let point = if take_a { a[i].clone() } else { b[j].clone() };
            if take_a {
                i += 1;
            }
            if take_b {
                j += 1;
            }
            let now = keep(i % 2 == 1, j % 2 == 1);
            if now != inside {
                points.push(point);
                inside = now;
            }
        }
        IntervalSet { points }
    }

    /// Elements in either set.
    pub fn union(&self, other: &Self) -> Self {
        self.merge(other, |a, b| a || b)
    }

    /// Elements in both sets.
    pub fn intersection(&self, other: &Self) -> Self {
        self.merge(other, |a, b| a && b)
    }

    /// Elements of `self` not in `other`.
    pub fn difference(&self, other: &Self) -> Self {
        self.merge(other, |a, b| a && !b)
    }
}

impl<T: Display> Display for IntervalSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.points.is_empty() {
            return write!(f, "∅");
        }
        let mut pairs = self.points.chunks_exact(2).peekable();
        while let Some(pair) = pairs.next() {
            write!(f, "[{}, {})", pair[0], pair[1])?;
            if pairs.peek().is_some() {
                write!(f, " or ")?;
            }
        }
        Ok(())
    }
}
