// SPDX-License-Identifier: MPL-2.0

//! A term is a requirement together with a polarity.
//!
//! A positive term stands for "the selected version lies in the
//! requirement"; a negative term for "the selected version does not lie in
//! the requirement". Keeping polarity as an axis on top of the monotone
//! requirement algebra is what lets conflict resolution stay purely
//! algebraic, independent of how version sets are represented.

use std::fmt::{self, Display};

use crate::Requirement;

/// How the set of versions denoted by one term relates to another's.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SetRelation {
    /// Every version of the first term lies in the second.
    Subset,
    /// The terms share no version.
    Disjoint,
    /// Some versions are shared, some are not.
    Overlap,
}

/// A requirement with a polarity.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Term<R> {
    /// The selected version must lie in the requirement.
    Positive(R),
    /// The selected version must not lie in the requirement.
    Negative(R),
}

impl<R: Requirement> Term<R> {
    /// The underlying requirement, polarity stripped.
    pub fn requirement(&self) -> &R {
        match self {
            Term::Positive(req) | Term::Negative(req) => req,
        }
    }

    /// Whether the term selects inside (rather than outside) its requirement.
    pub fn is_positive(&self) -> bool {
        matches!(self, Term::Positive(_))
    }

    /// The key of the underlying requirement.
    pub fn key(&self) -> &R::Key {
        self.requirement().key()
    }

    /// The same requirement with the opposite polarity.
    pub fn inverse(&self) -> Self {
        match self {
            Term::Positive(req) => Term::Negative(req.clone()),
            Term::Negative(req) => Term::Positive(req.clone()),
        }
    }

    /// Versions admitted by both terms, or `None` when that set is empty.
    ///
    /// Only defined for terms of a single key. The negative/negative case
    /// needs the union of the two excluded windows; a union that is not
    /// representable as one requirement cannot arise from the solver's own
    /// derivations, so hitting it is treated as a broken invariant and
    /// panics.
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        debug_assert_eq!(
            self.key(),
            other.key(),
            "set operations on terms require a single key"
        );
        match (self, other) {
            (Term::Positive(a), Term::Positive(b)) => a.intersection(b).map(Term::Positive),
            (Term::Negative(a), Term::Negative(b)) => {
                // Complement of the union of the excluded windows.
                let union = a.union(b).unwrap_or_else(|| {
                    panic!(
                        "the union of the excluded windows {a} and {b} is not \
                         representable as a single requirement; \
                         this is a bug in the solver"
                    )
                });
                Some(Term::Negative(union))
            }
            (Term::Positive(a), Term::Negative(b)) => {
                // All of the admitted window that avoids the excluded one.
                a.difference(b).map(Term::Positive)
            }
            (Term::Negative(_), Term::Positive(_)) => other.intersection(self),
        }
    }

    /// Versions admitted by either term, when the result is representable.
    pub fn union(&self, other: &Self) -> Option<Self> {
        debug_assert_eq!(
            self.key(),
            other.key(),
            "set operations on terms require a single key"
        );
        match (self, other) {
            (Term::Positive(a), Term::Positive(b)) => a.union(b).map(Term::Positive),
            (Term::Negative(a), Term::Negative(b)) => a.intersection(b).map(Term::Negative),
            (Term::Positive(a), Term::Negative(b)) => {
                // Everything is admitted except the part of the excluded
                // window not covered by the admitted one.
                b.difference(a).map(Term::Negative)
            }
            (Term::Negative(_), Term::Positive(_)) => other.union(self),
        }
    }

    /// Versions admitted by `self` but not by `other`.
    pub fn difference(&self, other: &Self) -> Option<Self> {
        self.intersection(&other.inverse())
    }

    /// Whether every version of `other` is admitted by `self`
    /// (`other ⊆ self`). Terms of different keys never imply each other.
    pub fn implied_by(&self, other: &Self) -> bool {
        if self.key() != other.key() {
            return false;
        }
        match (self, other) {
            (Term::Positive(a), Term::Positive(b)) => a.implied_by(b),
            // A window can never cover the complement of another.
            (Term::Positive(_), Term::Negative(_)) => false,
            (Term::Negative(a), Term::Positive(b)) => a.excludes(b),
            (Term::Negative(a), Term::Negative(b)) => b.implied_by(a),
        }
    }

    /// Whether every version of `self` is admitted by `other`.
    pub fn implies(&self, other: &Self) -> bool {
        other.implied_by(self)
    }

    /// Whether the two terms admit no common version and so can never hold
    /// simultaneously. Terms of different keys never exclude each other.
    pub fn excludes(&self, other: &Self) -> bool {
        if self.key() != other.key() {
            return false;
        }
        match (self, other) {
            (Term::Positive(a), Term::Positive(b)) => a.excludes(b),
            // Exclusion is symmetric; handle the negative on the left.
            (Term::Positive(_), Term::Negative(_)) => other.excludes(self),
            (Term::Negative(a), Term::Positive(b)) => a.implied_by(b),
            // Two complements always share the versions outside both windows.
            (Term::Negative(_), Term::Negative(_)) => false,
        }
    }

    /// `Subset` iff `self` implies `other`, else `Disjoint` iff they
    /// exclude each other, else `Overlap`.
    pub fn relation_to(&self, other: &Self) -> SetRelation {
        if self.implies(other) {
            SetRelation::Subset
        } else if self.excludes(other) {
            SetRelation::Disjoint
        } else {
            SetRelation::Overlap
        }
    }
}

impl<R: Display> Display for Term<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Positive(req) => write!(f, "{req}"),
            Term::Negative(req) => write!(f, "not {req}"),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::RangeRequirement;
    use interval_set::testing::non_empty_strategy;
    use interval_set::IntervalSet;
    use proptest::prelude::*;

    pub(crate) type TestTerm = Term<RangeRequirement<&'static str, u32>>;

    pub(crate) fn strategy() -> impl Strategy<Value = TestTerm> {
        (non_empty_strategy(), any::<bool>()).prop_map(|(set, positive)| {
            let req = RangeRequirement::new("pkg", set);
            if positive {
                Term::Positive(req)
            } else {
                Term::Negative(req)
            }
        })
    }

    fn pos(low: u32, high: u32) -> TestTerm {
        Term::Positive(RangeRequirement::new("foo", IntervalSet::between(low, high)))
    }

    fn neg(low: u32, high: u32) -> TestTerm {
        pos(low, high).inverse()
    }

    #[test]
    fn positive_implication_and_exclusion() {
        // (a, b, a implies b, b implies a, mutual exclusion)
        let cases = [
            (pos(1, 2), pos(3, 4), false, false, true),
            (pos(1, 2), pos(2, 3), false, false, true),
            (pos(1, 2), pos(1, 3), true, false, false),
            (pos(1, 2), pos(1, 2), true, true, false),
            (pos(1, 3), pos(1, 2), false, true, false),
        ];
        for (a, b, forward, backward, excluded) in cases {
            assert_eq!(a.implies(&b), forward, "{a} implies {b}");
            assert_eq!(b.implies(&a), backward, "{b} implies {a}");
            assert_eq!(a.excludes(&b), excluded, "{a} excludes {b}");
            assert_eq!(b.excludes(&a), excluded, "{b} excludes {a}");
        }
    }

    #[test]
    fn equal_negatives_imply_each_other() {
        let a = neg(30, 40);
        let b = neg(30, 40);
        assert!(a.implies(&b));
        assert!(b.implies(&a));
    }

    #[test]
    fn mixed_intersection_carves_the_window() {
        let a = neg(1, 2);
        let b = pos(2, 3);
        let isect = a.intersection(&b).unwrap();
        assert!(isect.is_positive());
        assert_eq!(isect, pos(2, 3));
    }

    #[test]
    fn different_keys_neither_imply_nor_exclude() {
        let a = pos(1, 2);
        let b = Term::Positive(RangeRequirement::new("bar", IntervalSet::between(1u32, 2)));
        assert!(!a.implies(&b));
        assert!(!a.excludes(&b));
        assert_eq!(a.relation_to(&b), SetRelation::Overlap);
    }

    proptest! {
        #[test]
        fn inverse_is_involutive(a in strategy()) {
            prop_assert_eq!(a.inverse().inverse(), a);
        }

        #[test]
        fn every_term_is_a_subset_of_itself(a in strategy()) {
            prop_assert_eq!(a.relation_to(&a), SetRelation::Subset);
        }

        #[test]
        fn implication_shows_up_as_subset(a in strategy(), b in strategy()) {
            if a.implies(&b) {
                prop_assert_eq!(a.relation_to(&b), SetRelation::Subset);
            }
        }

        #[test]
        fn exclusion_is_symmetric(a in strategy(), b in strategy()) {
            prop_assert_eq!(a.excludes(&b), b.excludes(&a));
        }

        #[test]
        fn intersection_is_a_lower_bound(a in strategy(), b in strategy()) {
            if let Some(isect) = a.intersection(&b) {
                prop_assert!(isect.implies(&a));
                prop_assert!(isect.implies(&b));
            }
        }

        #[test]
        fn union_is_an_upper_bound(a in strategy(), b in strategy()) {
            if let Some(un) = a.union(&b) {
                prop_assert!(a.implies(&un));
                prop_assert!(b.implies(&un));
            }
        }

        #[test]
        fn difference_complements_intersection(a in strategy(), b in strategy()) {
            if let (Some(isect), Some(diff)) = (a.intersection(&b), a.difference(&b)) {
                prop_assert_eq!(isect.union(&diff), Some(a));
            }
        }
    }
}
