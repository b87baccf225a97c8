// SPDX-License-Identifier: MPL-2.0

//! The partial solution: an ordered journal of decisions and derivations,
//! with per-key summaries cached on the side.
//!
//! The journal is the source of truth. The positive/negative summaries are
//! caches over it; after backtracking they are rebuilt from the surviving
//! prefix instead of being un-done incrementally.

use std::collections::BTreeMap;

use log::debug;

use crate::internal::incompatibility::IncompId;
use crate::term::{SetRelation, Term};
use crate::type_aliases::Set;
use crate::Requirement;

/// The number of decisions taken up to a point in the journal.
/// Level 0 holds the derivations forced by root requirements alone.
#[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq)]
pub(crate) struct DecisionLevel(pub(crate) u32);

/// One journal entry.
#[derive(Debug)]
struct Assignment<R: Requirement> {
    term: Term<R>,
    decision_level: DecisionLevel,
    /// `None` marks a decision; otherwise the incompatibility that forced
    /// this derivation.
    cause: Option<IncompId<R>>,
}

impl<R: Requirement> Assignment<R> {
    fn is_decision(&self) -> bool {
        self.cause.is_none()
    }
}

/// All assignments made so far, historically ordered.
#[derive(Debug)]
pub(crate) struct PartialSolution<R: Requirement> {
    assignments: Vec<Assignment<R>>,
    /// Intersection of all positive terms recorded for a key.
    /// Always non-empty: the solver guarantees overlap before recording.
    positives: BTreeMap<R::Key, Term<R>>,
    /// Intersection of all negative terms recorded for a key, dropped as
    /// soon as a positive term for the key appears.
    negatives: BTreeMap<R::Key, Term<R>>,
    decided_keys: Set<R::Key>,
}

/// What conflict resolution needs to know about the satisfiers of a learned
/// incompatibility's terms.
pub(crate) struct BacktrackInfo<R: Requirement> {
    /// The incompatibility term whose satisfier is most recent.
    pub(crate) term: Term<R>,
    /// The journal term of that satisfier.
    pub(crate) satisfier_term: Term<R>,
    pub(crate) satisfier_level: DecisionLevel,
    /// `None` when the satisfier is a decision.
    pub(crate) satisfier_cause: Option<IncompId<R>>,
    /// Highest decision level among the satisfiers of the other terms.
    pub(crate) previous_level: DecisionLevel,
    /// `satisfier_term − term`, when non-empty.
    pub(crate) difference: Option<Term<R>>,
}

impl<R: Requirement> PartialSolution<R> {
    pub(crate) fn new() -> Self {
        PartialSolution {
            assignments: Vec::new(),
            positives: BTreeMap::new(),
            negatives: BTreeMap::new(),
            decided_keys: Set::default(),
        }
    }

    fn current_level(&self) -> DecisionLevel {
        DecisionLevel(self.decided_keys.len() as u32)
    }

    /// Narrow the per-key summaries with a newly recorded term.
    fn register(&mut self, term: &Term<R>) {
        if let Some(summary) = self.positives.get_mut(term.key()) {
            *summary = summary.intersection(term).unwrap_or_else(|| {
                panic!(
                    "recording {term} empties the positive summary; the solver \
                     must guarantee overlap before recording"
                )
            });
            return;
        }
        let narrowed = match self.negatives.get(term.key()) {
            Some(negative) => term.intersection(negative).unwrap_or_else(|| {
                panic!(
                    "recording {term} empties the negative summary; the solver \
                     must guarantee overlap before recording"
                )
            }),
            None => term.clone(),
        };
        if narrowed.is_positive() {
            self.negatives.remove(term.key());
            self.positives.insert(term.key().clone(), narrowed);
        } else {
            self.negatives.insert(term.key().clone(), narrowed);
        }
    }

    /// Append a speculative decision. The term must be positive and its key
    /// must not have been decided before.
    pub(crate) fn record_decision(&mut self, term: Term<R>) {
        debug_assert!(term.is_positive(), "a decision must be a positive term");
        let inserted = self.decided_keys.insert(term.key().clone());
        debug_assert!(
            inserted,
            "more than one decision recorded for key {:?}",
            term.key()
        );
        let decision_level = self.current_level();
        self.register(&term);
        self.assignments.push(Assignment {
            term,
            decision_level,
            cause: None,
        });
    }

    /// Append a derivation forced by `cause` at the current decision level.
    pub(crate) fn record_derivation(&mut self, term: Term<R>, cause: IncompId<R>) {
        let decision_level = self.current_level();
        self.register(&term);
        self.assignments.push(Assignment {
            term,
            decision_level,
            cause: Some(cause),
        });
    }

    /// Relate a term to the recorded knowledge about its key: the positive
    /// summary when present, else the negative one, else [`Overlap`].
    ///
    /// [`Overlap`]: SetRelation::Overlap
    pub(crate) fn relation_to(&self, term: &Term<R>) -> SetRelation {
        if let Some(summary) = self.positives.get(term.key()) {
            summary.relation_to(term)
        } else if let Some(summary) = self.negatives.get(term.key()) {
            summary.relation_to(term)
        } else {
            SetRelation::Overlap
        }
    }

    pub(crate) fn satisfies(&self, term: &Term<R>) -> bool {
        self.relation_to(term) == SetRelation::Subset
    }

    /// The requirement of the first positive summary (in ascending key
    /// order) whose key has no decision yet. This is what the solver
    /// speculates on next.
    pub(crate) fn next_unsatisfied_positive(&self) -> Option<&R> {
        self.positives
            .iter()
            .find(|(key, _)| !self.decided_keys.contains(*key))
            .map(|(_, term)| term.requirement())
    }

    /// Journal index of the earliest assignment at which the running
    /// intersection of same-key assignments first implies `term`.
    ///
    /// Callers must only ask about terms the whole solution satisfies.
    pub(crate) fn satisfier_index(&self, term: &Term<R>) -> usize {
        let mut running: Option<Term<R>> = None;
        for (index, assignment) in self.assignments.iter().enumerate() {
            if assignment.term.key() != term.key() {
                continue;
            }
            let accumulated = match &running {
                None => assignment.term.clone(),
                Some(prior) => prior.intersection(&assignment.term).unwrap_or_else(|| {
                    panic!(
                        "journal assignments for key {:?} intersect to the empty \
                         term; this is a bug in the solver",
                        term.key()
                    )
                }),
            };
            if accumulated.implies(term) {
                return index;
            }
            running = Some(accumulated);
        }
        panic!(
            "looked up the satisfier of {term}, but no journal prefix satisfies \
             it; this is a bug in the solver"
        )
    }

    /// For a learned incompatibility's terms, locate the most recent
    /// satisfier (by journal index), the highest decision level among the
    /// other satisfiers, and the difference term, per the backjumping rule.
    ///
    /// Returns `None` iff `terms` is empty.
    pub(crate) fn build_backtrack_info(&self, terms: &[Term<R>]) -> Option<BacktrackInfo<R>> {
        let mut most_recent: Option<(&Term<R>, usize)> = None;
        let mut difference: Option<Term<R>> = None;
        let mut previous_level = DecisionLevel(0);

        for term in terms {
            let satisfier = self.satisfier_index(term);
            let became_most_recent = match most_recent {
                None => true,
                Some((_, recent)) if recent < satisfier => {
                    previous_level =
                        previous_level.max(self.assignments[recent].decision_level);
                    true
                }
                Some(_) => {
                    previous_level =
                        previous_level.max(self.assignments[satisfier].decision_level);
                    false
                }
            };
            if became_most_recent {
                most_recent = Some((term, satisfier));
                difference = self.assignments[satisfier].term.difference(term);
                if let Some(difference) = &difference {
                    let difference_satisfier = self.satisfier_index(&difference.inverse());
                    previous_level = previous_level
                        .max(self.assignments[difference_satisfier].decision_level);
                }
            }
        }

        most_recent.map(|(term, satisfier)| {
            let assignment = &self.assignments[satisfier];
            BacktrackInfo {
                term: term.clone(),
                satisfier_term: assignment.term.clone(),
                satisfier_level: assignment.decision_level,
                satisfier_cause: assignment.cause,
                previous_level,
                difference,
            }
        })
    }

    /// Drop every assignment above `level` and rebuild the summaries and
    /// decided keys from the surviving prefix.
    pub(crate) fn backtrack_to(&mut self, level: DecisionLevel) {
        debug!("backtracking the partial solution to decision level {}", level.0);
        while self
            .assignments
            .last()
            .is_some_and(|assignment| assignment.decision_level > level)
        {
            self.assignments.pop();
        }
        self.positives.clear();
        self.negatives.clear();
        self.decided_keys.clear();
        let assignments = std::mem::take(&mut self.assignments);
        for assignment in &assignments {
            self.register(&assignment.term);
            if assignment.is_decision() {
                self.decided_keys.insert(assignment.term.key().clone());
            }
        }
        self.assignments = assignments;
    }

    /// The decided requirements, in decision order.
    pub(crate) fn completed_solution(&self) -> Vec<R> {
        self.assignments
            .iter()
            .filter(|assignment| assignment.is_decision())
            .map(|assignment| assignment.term.requirement().clone())
            .collect()
    }
}
