// SPDX-License-Identifier: MPL-2.0

//! Errors of the [`solve`](crate::solve) entry point.

use thiserror::Error;

use crate::report::Failure;
use crate::Requirement;

/// The reasons a solve can fail.
///
/// Broken internal invariants (which would indicate a bug in the solver,
/// not in the caller's domain or provider) are panics instead.
#[derive(Debug, Error)]
pub enum SolveError<R: Requirement, E: std::error::Error + 'static> {
    /// No selection of candidates can satisfy every requirement. The
    /// payload carries the derivation explaining why.
    #[error("no selection of candidates can satisfy the given requirements")]
    Unsolvable(Failure<R>),

    /// The provider returned a requirement carrying the pinned candidate's
    /// own key.
    #[error("candidate {candidate} cannot require its own key (got {requirement})")]
    SelfDependency {
        /// The candidate whose requirements were being enumerated.
        candidate: R,
        /// The offending requirement.
        requirement: R,
    },

    /// An error raised by the provider, propagated unchanged.
    #[error(transparent)]
    Provider(E),
}
