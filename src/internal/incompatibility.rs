// SPDX-License-Identifier: MPL-2.0

//! An incompatibility is a set of terms for different keys that must never
//! all be satisfied at the same time.
//!
//! An incompatibility usually originates from a dependency. For example, if
//! `foo [1,2)` depends on `bar [3,4)`, then the terms `foo [1,2)` and
//! `not bar [3,4)` can never hold together in a partial solution: that
//! would mean selecting a matching `foo` while ruling out every `bar` it
//! needs. So `{ foo [1,2), not bar [3,4) }` is an incompatibility.
//!
//! Incompatibilities can also be learned from two prior incompatibilities
//! during conflict resolution; those carry stable ids of their parents so a
//! failed solve can replay the whole derivation.

use std::fmt::{self, Display};

use crate::internal::arena::Id;
use crate::term::{SetRelation, Term};
use crate::Requirement;

/// Type alias of unique identifiers for incompatibilities.
pub(crate) type IncompId<R> = Id<Incompatibility<R>>;

/// A conjunction of terms that must never be satisfied all together.
///
/// The terms are coalesced at construction: no two share a key, and they
/// are kept in ascending key order so iteration is deterministic.
/// Deliberately not `Clone`: an incompatibility's identity is its id in the
/// store, which conflict causes refer to.
#[derive(Debug)]
pub(crate) struct Incompatibility<R: Requirement> {
    terms: Vec<Term<R>>,
    cause: Cause<R>,
}

/// Why an incompatibility exists.
#[derive(Debug)]
pub(crate) enum Cause<R: Requirement> {
    /// Seeded from a root requirement.
    Root,
    /// No candidate satisfies the requirement.
    Unavailable,
    /// One key's candidate requires another key.
    Dependency,
    /// Learned from two prior incompatibilities during conflict resolution.
    Conflict {
        left: IncompId<R>,
        right: IncompId<R>,
    },
}

/// How a set of per-key summaries (typically the partial solution) relates
/// to an incompatibility.
#[derive(Debug, Eq, PartialEq)]
pub(crate) enum Relation {
    /// Every term is satisfied: the incompatibility is violated.
    Satisfied,
    /// At least one term can no longer be satisfied.
    Contradicted,
    /// All but the term at this index are satisfied; the remaining one is
    /// undetermined.
    AlmostSatisfied(usize),
    /// Two or more terms are undetermined; nothing can be concluded.
    Inconclusive,
}

impl<R: Requirement> Incompatibility<R> {
    /// Build an incompatibility, sorting terms by key and replacing any
    /// terms sharing a key with their intersection.
    pub(crate) fn new(terms: impl IntoIterator<Item = Term<R>>, cause: Cause<R>) -> Self {
        let mut terms: Vec<Term<R>> = terms.into_iter().collect();
        terms.sort_by(|a, b| a.key().cmp(b.key()));
        let mut coalesced: Vec<Term<R>> = Vec::with_capacity(terms.len());
        for term in terms {
            match coalesced.last_mut() {
                Some(last) if last.key() == term.key() => {
                    *last = last.intersection(&term).unwrap_or_else(|| {
                        panic!(
                            "coalescing the terms of an incompatibility produced an \
                             empty term for key {:?}; this is a bug in the solver",
                            term.key()
                        )
                    });
                }
                _ => coalesced.push(term),
            }
        }
        Incompatibility {
            terms: coalesced,
            cause,
        }
    }

    /// The coalesced terms, in ascending key order.
    pub(crate) fn terms(&self) -> &[Term<R>] {
        &self.terms
    }

    pub(crate) fn cause(&self) -> &Cause<R> {
        &self.cause
    }

    /// Classify this incompatibility against per-term relations supplied by
    /// the caller (usually the partial solution's summaries).
    pub(crate) fn relation(
        &self,
        mut relation_of: impl FnMut(&Term<R>) -> SetRelation,
    ) -> Relation {
        let mut undetermined = None;
        for (index, term) in self.terms.iter().enumerate() {
            match relation_of(term) {
                SetRelation::Disjoint => return Relation::Contradicted,
                SetRelation::Overlap => {
                    if undetermined.is_some() {
                        return Relation::Inconclusive;
                    }
                    undetermined = Some(index);
                }
                SetRelation::Subset => {}
            }
        }
        match undetermined {
            None => Relation::Satisfied,
            Some(index) => Relation::AlmostSatisfied(index),
        }
    }
}

impl<R: Requirement> Display for Incompatibility<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        let mut terms = self.terms.iter().peekable();
        while let Some(term) = terms.next() {
            write!(f, "{term}")?;
            if terms.peek().is_some() {
                write!(f, ", ")?;
            }
        }
        write!(f, "}}")
    }
}
