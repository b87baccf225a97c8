// SPDX-License-Identifier: MPL-2.0

//! Turning a failed solve into an explanation a human can follow.
//!
//! A [`Failure`] is the linearized derivation of the terminal
//! incompatibility: every incompatibility reachable through conflict causes,
//! children before parents, the terminal one last. [`Failure::explain`]
//! replays that derivation depth-first as a stream of [`Event`]s, and
//! [`DefaultStringExplainer`] renders the stream as prose.

use std::fmt::{self, Display, Write};

use crate::term::Term;
use crate::Requirement;

/// Why a solve failed: a self-contained copy of the incompatibility
/// derivation rooted at the terminal incompatibility.
#[derive(Debug)]
pub struct Failure<R: Requirement> {
    /// Children precede their parents; the terminal incompatibility is last.
    steps: Vec<Step<R>>,
}

#[derive(Debug)]
pub(crate) struct Step<R: Requirement> {
    pub(crate) terms: Vec<Term<R>>,
    pub(crate) cause: StepCause,
}

#[derive(Debug)]
pub(crate) enum StepCause {
    Root,
    Unavailable,
    Dependency,
    /// Indices of the parent steps in the linearized list.
    Conflict { left: usize, right: usize },
}

/// What one incompatibility of the derivation says, classified by the shape
/// of its terms.
#[derive(Debug)]
pub enum Statement<'a, R> {
    /// The empty incompatibility: nothing can be selected at all.
    NoSolution,
    /// Selecting `dependent` forces a selection inside `dependency`.
    Dependency {
        /// The requirement whose candidate imposes the other.
        dependent: &'a R,
        /// The imposed requirement.
        dependency: &'a R,
    },
    /// The two requirements can never be selected together.
    Conflict {
        /// One side of the conflict.
        left: &'a R,
        /// The other side.
        right: &'a R,
    },
    /// The requirement can never be part of a solution.
    Disallowed {
        /// The ruled-out requirement.
        requirement: &'a R,
    },
    /// No candidate exists for the requirement.
    Unavailable {
        /// The requirement nothing satisfies.
        requirement: &'a R,
    },
    /// Every solution must select inside the requirement.
    Needed {
        /// The mandatory requirement.
        requirement: &'a R,
    },
    /// Selecting both named requirements forces a selection inside the third.
    Compromise {
        /// First selected requirement.
        left: &'a R,
        /// Second selected requirement.
        right: &'a R,
        /// What their combination forces.
        result: &'a R,
    },
}

/// One element of the linearized explanation.
#[derive(Debug)]
pub enum Event<'a, R> {
    /// An external incompatibility used as an assumption.
    Premise(Statement<'a, R>),
    /// A derived incompatibility concluded from what came before.
    Conclusion(Statement<'a, R>),
    /// Boundary between two independently derived lines of reasoning.
    Separator,
}

impl<R: Requirement> Failure<R> {
    pub(crate) fn new(steps: Vec<Step<R>>) -> Self {
        debug_assert!(
            !steps.is_empty(),
            "a failure carries at least its terminal incompatibility"
        );
        Failure { steps }
    }

    #[cfg(test)]
    pub(crate) fn steps(&self) -> &[Step<R>] {
        &self.steps
    }

    /// Replay the derivation as a stream of [`Event`]s through `handler`.
    pub fn explain<'s>(&'s self, handler: impl FnMut(Event<'s, R>)) {
        Writer {
            failure: self,
            handler,
        }
        .generate();
    }
}

impl<R: Requirement> Display for Failure<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&DefaultStringExplainer::explain(self))
    }
}

fn statement_of<R: Requirement>(step: &Step<R>) -> Statement<'_, R> {
    let positives: Vec<&R> = step
        .terms
        .iter()
        .filter(|term| term.is_positive())
        .map(Term::requirement)
        .collect();
    let negatives: Vec<&R> = step
        .terms
        .iter()
        .filter(|term| !term.is_positive())
        .map(Term::requirement)
        .collect();
    match (positives.len(), negatives.len()) {
        (0, 0) => Statement::NoSolution,
        (1, 0) => match step.cause {
            StepCause::Unavailable => Statement::Unavailable {
                requirement: positives[0],
            },
            _ => Statement::Disallowed {
                requirement: positives[0],
            },
        },
        (0, 1) => Statement::Needed {
            requirement: negatives[0],
        },
        (1, 1) => Statement::Dependency {
            dependent: positives[0],
            dependency: negatives[0],
        },
        (2, 0) => Statement::Conflict {
            left: positives[0],
            right: positives[1],
        },
        (2, 1) => Statement::Compromise {
            left: positives[0],
            right: positives[1],
            result: negatives[0],
        },
        _ => panic!(
            "cannot explain an incompatibility of this shape; \
             please report this as a bug"
        ),
    }
}

/// Depth-first traversal of the derivation. Premises are emitted for
/// external causes, conclusions for derived ones; when both parents of a
/// conflict are themselves derived, their subtrees are interleaved with
/// separators.
struct Writer<'a, R: Requirement, F: FnMut(Event<'a, R>)> {
    failure: &'a Failure<R>,
    handler: F,
}

impl<'a, R: Requirement, F: FnMut(Event<'a, R>)> Writer<'a, R, F> {
    fn is_derived(&self, step: usize) -> bool {
        matches!(
            self.failure.steps[step].cause,
            StepCause::Conflict { .. }
        )
    }

    fn causes(&self, step: usize) -> (usize, usize) {
        match self.failure.steps[step].cause {
            StepCause::Conflict { left, right } => (left, right),
            _ => panic!("only derived incompatibilities have parent causes"),
        }
    }

    fn statement(&self, step: usize) -> Statement<'a, R> {
        statement_of(&self.failure.steps[step])
    }

    fn premise(&mut self, step: usize) {
        let statement = self.statement(step);
        (self.handler)(Event::Premise(statement));
    }

    fn conclusion(&mut self, step: usize) {
        let statement = self.statement(step);
        (self.handler)(Event::Conclusion(statement));
    }

    fn separator(&mut self) {
        (self.handler)(Event::Separator);
    }

    fn generate(&mut self) {
        let root = self.failure.steps.len() - 1;
        self.generate_for(root);
    }

    fn generate_for(&mut self, step: usize) {
        if self.is_derived(step) {
            self.generate_derived(step);
        }
    }

    fn generate_derived(&mut self, step: usize) {
        let (left, right) = self.causes(step);
        match (self.is_derived(left), self.is_derived(right)) {
            (true, true) => self.generate_complex(step, left, right),
            (true, false) => self.generate_partial(step, left, right),
            (false, true) => self.generate_partial(step, right, left),
            (false, false) => {
                self.premise(left);
                self.premise(right);
                self.conclusion(step);
            }
        }
    }

    /// One parent is derived, the other external. When the derived parent
    /// itself mixes a derived and an external cause, its derived line is
    /// expanded first and the two external premises are folded into a
    /// single conclusion.
    fn generate_partial(&mut self, child: usize, derived: usize, external: usize) {
        let (left, right) = self.causes(derived);
        match (self.is_derived(left), self.is_derived(right)) {
            (true, false) => {
                self.generate_for(left);
                self.premise(right);
                self.premise(external);
                self.conclusion(child);
            }
            (false, true) => {
                self.generate_for(right);
                self.premise(left);
                self.premise(external);
                self.conclusion(child);
            }
            _ => {
                self.generate_for(derived);
                self.premise(external);
                self.conclusion(child);
            }
        }
    }

    /// Both parents are derived. A parent resting only on external causes
    /// is emitted inline; otherwise the two sub-derivations are separated
    /// and the left parent restated as a premise.
    fn generate_complex(&mut self, child: usize, left: usize, right: usize) {
        let (left_left, left_right) = self.causes(left);
        let (right_left, right_right) = self.causes(right);
        if !self.is_derived(left_left) && !self.is_derived(left_right) {
            self.generate_for(right);
            self.generate_for(left);
            self.conclusion(child);
        } else if !self.is_derived(right_left) && !self.is_derived(right_right) {
            self.generate_for(left);
            self.generate_for(right);
            self.conclusion(child);
        } else {
            self.generate_for(left);
            self.separator();
            self.generate_for(right);
            self.separator();
            self.premise(left);
            self.conclusion(child);
        }
    }
}

impl<R: Display> Display for Statement<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::NoSolution => write!(f, "There is no solution"),
            Statement::Dependency {
                dependent,
                dependency,
            } => write!(f, "{dependent} requires {dependency}"),
            Statement::Conflict { left, right } => {
                write!(f, "{left} is incompatible with {right}")
            }
            Statement::Disallowed { requirement } => {
                write!(f, "{requirement} cannot be selected")
            }
            Statement::Unavailable { requirement } => {
                write!(f, "no candidate is available for {requirement}")
            }
            Statement::Needed { requirement } => write!(f, "{requirement} is required"),
            Statement::Compromise {
                left,
                right,
                result,
            } => write!(f, "{left} and {right} together require {result}"),
        }
    }
}

/// Renders an explanation as plain prose, one statement per line: premises
/// as `Given that …,` and conclusions as `Thus: …`.
#[derive(Debug, Default)]
pub struct DefaultStringExplainer {
    output: String,
}

impl DefaultStringExplainer {
    /// Explain `failure` into a freshly allocated string.
    pub fn explain<R: Requirement>(failure: &Failure<R>) -> String {
        let mut explainer = DefaultStringExplainer::default();
        failure.explain(|event| explainer.event(event));
        explainer.output
    }

    fn event<R: Requirement>(&mut self, event: Event<'_, R>) {
        let _ = match event {
            Event::Premise(statement) => writeln!(self.output, "Given that {statement},"),
            Event::Conclusion(statement) => writeln!(self.output, "Thus: {statement}"),
            Event::Separator => writeln!(self.output),
        };
    }
}
