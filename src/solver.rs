// SPDX-License-Identifier: MPL-2.0

//! The PubGrub version solving algorithm.
//!
//! It consists in efficiently finding a set of concrete selections that
//! satisfy all the constraints of a given set of root requirements. In
//! addition, when that is not possible, the solver produces a structured
//! derivation of incompatibilities explaining as clearly as possible why it
//! failed.
//!
//! The algorithm is generic and works for any dependency system as long as
//! requirements implement the [`Requirement`](crate::Requirement) trait and
//! candidate lookup is supplied through a [`Provider`].
//!
//! A solve alternates two phases until it settles:
//!
//! * *unit propagation*: every incompatibility mentioning a recently
//!   changed key is checked against the partial solution; an
//!   incompatibility with exactly one undetermined term forces the inverse
//!   of that term, and a fully satisfied one triggers conflict resolution,
//!   which learns a new incompatibility and backjumps;
//! * *decision making*: once propagation is quiescent, the provider is
//!   asked for the best candidate of some not-yet-decided requirement and
//!   that candidate is speculatively selected.
//!
//! The solve is a single in-order computation: the provider is called
//! synchronously, nothing is retried internally, and with a deterministic
//! provider the whole run (decisions, learned clauses, failure reports) is
//! deterministic.

use std::error::Error;
use std::hash::BuildHasherDefault;

use log::{debug, info};
use rustc_hash::FxHasher;

use crate::internal::{Cause, IncompId, IncompatibilityStore, PartialSolution, Relation};
use crate::term::Term;
use crate::{Requirement, SolveError};

type FnvIndexSet<T> = indexmap::IndexSet<T, BuildHasherDefault<FxHasher>>;

/// Trait through which the solver enumerates candidates and their
/// requirements. An implementor needs to be supplied to the [`solve`]
/// function.
///
/// The solver holds the provider for the duration of a solve and calls it
/// synchronously; providers must not call back into the solver.
pub trait Provider<R: Requirement> {
    /// The kind of error returned from the provider's methods.
    ///
    /// Returning it aborts the solve and hands the error back unchanged.
    type Err: Error + 'static;

    /// A pinned requirement (e.g. a single version of a package) that is a
    /// subset of `requirement`, or `None` when nothing satisfies it.
    ///
    /// The solver records `None` as an unavailability, which either fails
    /// the solve or makes it backtrack to a different candidate elsewhere.
    /// A host that wants cancellation or timeouts can therefore implement
    /// them by declining here.
    fn best_candidate(&self, requirement: &R) -> Result<Option<R>, Self::Err>;

    /// The requirements a candidate imposes. Only called with values
    /// previously returned by [`best_candidate`](Provider::best_candidate).
    fn requirements_of(&self, candidate: &R) -> Result<Vec<R>, Self::Err>;
}

/// Main function of the library. Finds a set of pinned requirements
/// satisfying `roots` and everything they transitively require, in decision
/// order, or fails with a derivation of why no such set exists.
#[cold]
pub fn solve<R: Requirement, P: Provider<R>>(
    roots: impl IntoIterator<Item = R>,
    provider: &P,
) -> Result<Vec<R>, SolveError<R, P::Err>> {
    let mut solver = Solver::new(provider);
    for root in roots {
        solver.preload_root(root);
    }
    solver.run()
}

struct Solver<'a, R: Requirement, P: Provider<R>> {
    provider: &'a P,
    store: IncompatibilityStore<R>,
    solution: PartialSolution<R>,
    /// Keys with fresh assignments that unit propagation still has to visit.
    changed: FnvIndexSet<R::Key>,
}

impl<'a, R: Requirement, P: Provider<R>> Solver<'a, R, P> {
    fn new(provider: &'a P) -> Self {
        Solver {
            provider,
            store: IncompatibilityStore::new(),
            solution: PartialSolution::new(),
            changed: FnvIndexSet::default(),
        }
    }

    fn preload_root(&mut self, root: R) {
        info!("loading root requirement {root}");
        let key = root.key().clone();
        self.store.emplace([Term::Negative(root)], Cause::Root);
        self.changed.insert(key);
    }

    fn run(&mut self) -> Result<Vec<R>, SolveError<R, P::Err>> {
        loop {
            self.unit_propagation()?;
            let Some(next) = self.solution.next_unsatisfied_positive().cloned() else {
                break;
            };
            self.decide_one(next)?;
        }
        info!("solution complete");
        Ok(self.solution.completed_solution())
    }

    /// Propagate incompatibilities of changed keys until quiescence.
    fn unit_propagation(&mut self) -> Result<(), SolveError<R, P::Err>> {
        while let Some(key) = self.changed.pop() {
            debug!("unit propagation for {key:?}");
            let mut index = 0;
            loop {
                let Some(&ic_id) = self.store.for_key(&key).get(index) else {
                    break;
                };
                index += 1;
                match self.store[ic_id].relation(|term| self.solution.relation_to(term)) {
                    Relation::Satisfied => {
                        debug!(
                            "conflict: {} is satisfied by the partial solution",
                            self.store[ic_id]
                        );
                        let root_cause = self.resolve_conflict(ic_id)?;
                        let learned =
                            self.store[root_cause].relation(|term| self.solution.relation_to(term));
                        let Relation::AlmostSatisfied(unsatisfied) = learned else {
                            panic!(
                                "after backtracking, the learned incompatibility {} must \
                                 have exactly one undetermined term; this is a bug in \
                                 the solver",
                                self.store[root_cause]
                            );
                        };
                        let term = self.store[root_cause].terms()[unsatisfied].clone();
                        debug!(
                            "deriving {} from the learned incompatibility {}",
                            term.inverse(),
                            self.store[root_cause]
                        );
                        self.solution.record_derivation(term.inverse(), root_cause);
                        // Restart propagation from the freshly derived key.
                        self.changed.clear();
                        self.changed.insert(term.key().clone());
                        break;
                    }
                    Relation::AlmostSatisfied(unsatisfied) => {
                        let term = self.store[ic_id].terms()[unsatisfied].clone();
                        debug!("deriving {} from {}", term.inverse(), self.store[ic_id]);
                        self.solution.record_derivation(term.inverse(), ic_id);
                        self.changed.insert(term.key().clone());
                    }
                    Relation::Contradicted | Relation::Inconclusive => {}
                }
            }
        }
        Ok(())
    }

    /// Ask the provider for the best candidate of the given unsatisfied
    /// requirement, synthesize its dependency incompatibilities and record
    /// the speculation as a decision unless one of them is already
    /// satisfied.
    fn decide_one(&mut self, requirement: R) -> Result<(), SolveError<R, P::Err>> {
        debug!("speculating on the unsatisfied requirement {requirement}");
        let candidate = self
            .provider
            .best_candidate(&requirement)
            .map_err(SolveError::Provider)?;
        let Some(candidate) = candidate else {
            info!("no candidate satisfies {requirement}");
            let key = requirement.key().clone();
            self.store
                .emplace([Term::Positive(requirement)], Cause::Unavailable);
            self.changed.insert(key);
            return Ok(());
        };
        info!("best candidate for {requirement} is {candidate}");

        let requirements = self
            .provider
            .requirements_of(&candidate)
            .map_err(SolveError::Provider)?;
        let mut found_conflict = false;
        for dependency in requirements {
            if dependency.key() == candidate.key() {
                return Err(SolveError::SelfDependency {
                    candidate,
                    requirement: dependency,
                });
            }
            let ic_id = self.store.emplace(
                [
                    Term::Positive(candidate.clone()),
                    Term::Negative(dependency),
                ],
                Cause::Dependency,
            );
            let satisfied = self.store[ic_id].terms().iter().all(|term| {
                term.key() == candidate.key() || self.solution.satisfies(term)
            });
            if satisfied {
                debug!(
                    "dependency incompatibility {} is already satisfied by the \
                     partial solution",
                    self.store[ic_id]
                );
            }
            found_conflict = found_conflict || satisfied;
        }

        if !found_conflict {
            info!("decision: {candidate}");
            self.solution.record_decision(Term::Positive(candidate.clone()));
        }
        self.changed.insert(candidate.key().clone());
        Ok(())
    }

    /// Conflict resolution: repeatedly substitute the cause of the most
    /// recent satisfier into the conflicting incompatibility, learning each
    /// intermediate clause, until one yields a backjump target. Fails when
    /// the terms run out, which means the roots themselves are unsolvable.
    fn resolve_conflict(
        &mut self,
        conflicting: IncompId<R>,
    ) -> Result<IncompId<R>, SolveError<R, P::Err>> {
        let mut current = conflicting;
        loop {
            let info = self
                .solution
                .build_backtrack_info(self.store[current].terms());
            let Some(info) = info else {
                debug!("no backtrack target left; resolution fails");
                return Err(SolveError::Unsolvable(self.store.build_failure(current)));
            };
            if info.satisfier_cause.is_none() || info.previous_level < info.satisfier_level {
                debug!("backjumping to decision level {}", info.previous_level.0);
                self.solution.backtrack_to(info.previous_level);
                return Ok(current);
            }
            let satisfier_cause = info.satisfier_cause.unwrap();
            let mut new_terms: Vec<Term<R>> = self.store[current]
                .terms()
                .iter()
                .filter(|term| term.key() != info.term.key())
                .cloned()
                .collect();
            new_terms.extend(
                self.store[satisfier_cause]
                    .terms()
                    .iter()
                    .filter(|term| term.key() != info.satisfier_term.key())
                    .cloned(),
            );
            if let Some(difference) = &info.difference {
                new_terms.push(difference.inverse());
            }
            current = self.store.emplace(
                new_terms,
                Cause::Conflict {
                    left: current,
                    right: satisfier_cause,
                },
            );
            debug!("learned intermediate incompatibility {}", self.store[current]);
            debug_assert_eq!(
                self.store[current].relation(|term| self.solution.relation_to(term)),
                Relation::Satisfied,
                "a learned incompatibility must still be in conflict with the partial solution",
            );
        }
    }
}
