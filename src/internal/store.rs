// SPDX-License-Identifier: MPL-2.0

//! The append-only log of incompatibilities, indexed by term key.

use std::ops::Index;

use crate::internal::arena::Arena;
use crate::internal::incompatibility::{Cause, IncompId, Incompatibility};
use crate::report::{Failure, Step, StepCause};
use crate::term::Term;
use crate::type_aliases::Map;
use crate::Requirement;

/// Owns every incompatibility of a solve and keeps a per-key secondary
/// index over them. Entries are never removed, so the ids handed out by
/// [`emplace`](IncompatibilityStore::emplace) stay valid and are used to
/// thread conflict causes.
pub(crate) struct IncompatibilityStore<R: Requirement> {
    arena: Arena<Incompatibility<R>>,
    /// Every incompatibility mentioning a key, in insertion order.
    by_key: Map<R::Key, Vec<IncompId<R>>>,
}

impl<R: Requirement> IncompatibilityStore<R> {
    pub(crate) fn new() -> Self {
        IncompatibilityStore {
            arena: Arena::new(),
            by_key: Map::default(),
        }
    }

    /// Construct an incompatibility in place, append it and index it under
    /// every key its terms mention.
    pub(crate) fn emplace(
        &mut self,
        terms: impl IntoIterator<Item = Term<R>>,
        cause: Cause<R>,
    ) -> IncompId<R> {
        let id = self.arena.alloc(Incompatibility::new(terms, cause));
        for term in self.arena[id].terms() {
            self.by_key.entry(term.key().clone()).or_default().push(id);
        }
        id
    }

    /// The incompatibilities mentioning `key`, oldest first.
    pub(crate) fn for_key(&self, key: &R::Key) -> &[IncompId<R>] {
        self.by_key.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Linearize the cause DAG rooted at `root` into a self-contained
    /// [`Failure`]: parents follow their children, the root comes last, and
    /// conflict causes become indices into the linearized list.
    pub(crate) fn build_failure(&self, root: IncompId<R>) -> Failure<R> {
        let mut steps = Vec::new();
        self.linearize(&mut steps, root);
        Failure::new(steps)
    }

    fn linearize(&self, steps: &mut Vec<Step<R>>, id: IncompId<R>) -> usize {
        let cause = match self.arena[id].cause() {
            Cause::Root => StepCause::Root,
            Cause::Unavailable => StepCause::Unavailable,
            Cause::Dependency => StepCause::Dependency,
            Cause::Conflict { left, right } => {
                let left = self.linearize(steps, *left);
                let right = self.linearize(steps, *right);
                StepCause::Conflict { left, right }
            }
        };
        steps.push(Step {
            terms: self.arena[id].terms().to_vec(),
            cause,
        });
        steps.len() - 1
    }
}

impl<R: Requirement> Index<IncompId<R>> for IncompatibilityStore<R> {
    type Output = Incompatibility<R>;

    fn index(&self, id: IncompId<R>) -> &Incompatibility<R> {
        &self.arena[id]
    }
}
