// SPDX-License-Identifier: MPL-2.0

//! Generic version solving with the PubGrub algorithm.
//!
//! Given a set of root requirements and a [`Provider`] that enumerates
//! candidate versions and their transitive requirements, [`solve`] either
//! finds concrete selections satisfying every requirement or fails with a
//! structured derivation of why no solution exists.
//!
//! The solver is parametric over the [`Requirement`] domain: anything with
//! a totally ordered key and a monotone set algebra works. A ready-made
//! domain over half-open version intervals is provided by
//! [`RangeRequirement`], and [`OfflineProvider`] serves candidates straight
//! from memory:
//!
//! ```
//! use solvent::{solve, OfflineProvider, RangeRequirement};
//!
//! type Req = RangeRequirement<&'static str, u32>;
//!
//! let mut provider = OfflineProvider::new();
//! provider.add_candidate(Req::between("bar", 3, 4), []);
//! provider.add_candidate(Req::between("foo", 1, 2), [Req::between("bar", 3, 6)]);
//!
//! let solution = solve([Req::between("foo", 1, 2)], &provider).unwrap();
//! assert_eq!(
//!     solution,
//!     [Req::between("foo", 1, 2), Req::between("bar", 3, 4)],
//! );
//! ```
//!
//! When the requirements cannot be satisfied, the returned
//! [`SolveError::Unsolvable`] carries a [`Failure`] whose [`Failure::explain`]
//! replays the derivation for a reporter such as [`DefaultStringExplainer`]:
//!
//! ```txt
//! Given that no candidate is available for bar [6, 7),
//! Given that foo [1, 2) requires bar [6, 7),
//! Thus: foo [1, 2) cannot be selected
//! ```

#![warn(missing_docs)]

mod error;
mod internal;
mod provider;
mod range_requirement;
mod report;
mod requirement;
mod solver;
mod term;
mod type_aliases;

pub use interval_set::IntervalSet;

pub use crate::error::SolveError;
pub use crate::provider::OfflineProvider;
pub use crate::range_requirement::RangeRequirement;
pub use crate::report::{DefaultStringExplainer, Event, Failure, Statement};
pub use crate::requirement::{Key, Requirement};
pub use crate::solver::{solve, Provider};
pub use crate::term::{SetRelation, Term};
pub use crate::type_aliases::{Map, Set};
