// SPDX-License-Identifier: MPL-2.0

//! The requirement domain the solver is parametric over.

use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Trait for identifying keys of requirements (e.g. package names).
///
/// Automatically implemented for any type that is `Clone + Ord + Hash + Debug`.
/// The total order is what makes solver iteration deterministic.
pub trait Key: Clone + Ord + Hash + Debug {}
impl<T: Clone + Ord + Hash + Debug> Key for T {}

/// A requirement pairs a [`Key`] with a monotone constraint over versions
/// (e.g. a package name and a version set).
///
/// The solver never looks inside the constraint; it only asks the domain to
/// compare and combine requirements that share a key. Implementations must
/// uphold the mathematical set semantics assuming all versions are possible:
/// the solver relies on them to relate requirements to each other.
///
/// # Equality
///
/// `Eq` must be extensional: two requirements describing the same key and
/// the same set of versions must compare equal. This typically means the
/// underlying set representation has to be canonical, such as
/// [`IntervalSet`](interval_set::IntervalSet).
///
/// All binary operations are only ever invoked on operands sharing a key.
/// The `Option` results mean "the result is empty or not representable as a
/// single requirement"; for a set type closed under the operation (like
/// `IntervalSet`) only emptiness occurs.
pub trait Requirement: Clone + Eq + Debug + Display {
    /// How the requirement identifies what it constrains.
    type Key: Key;

    /// The key this requirement constrains.
    fn key(&self) -> &Self::Key;

    /// Whether every version admitted by `other` is admitted by `self`
    /// (i.e. `self ⊇ other`).
    fn implied_by(&self, other: &Self) -> bool;

    /// Whether `self` and `other` admit no common version.
    fn excludes(&self, other: &Self) -> bool;

    /// Versions admitted by both, if any.
    fn intersection(&self, other: &Self) -> Option<Self>;

    /// Versions admitted by either, when representable.
    fn union(&self, other: &Self) -> Option<Self>;

    /// Versions admitted by `self` but not `other`, if any.
    fn difference(&self, other: &Self) -> Option<Self>;
}
