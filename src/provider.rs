// SPDX-License-Identifier: MPL-2.0

use std::convert::Infallible;

use crate::{Provider, Requirement};

/// A basic implementation of [`Provider`] holding every candidate in memory.
///
/// Candidates are registered as pinned requirements (e.g. a single version
/// of a package) together with the requirements selecting them would
/// impose. [`best_candidate`](Provider::best_candidate) scans registration
/// order from newest to oldest, so registering the versions of a package in
/// ascending order makes the provider pick the highest matching one.
#[derive(Debug, Clone, Default)]
pub struct OfflineProvider<R> {
    candidates: Vec<(R, Vec<R>)>,
}

impl<R: Requirement> OfflineProvider<R> {
    /// Creates an empty provider with no candidates.
    pub fn new() -> Self {
        OfflineProvider {
            candidates: Vec::new(),
        }
    }

    /// Register a pinned candidate and the requirements it imposes.
    ///
    /// The candidate must be pinned tightly enough that any requirement the
    /// solver queries it against either contains it completely or not at
    /// all; single-version requirements trivially qualify.
    pub fn add_candidate(&mut self, candidate: R, requirements: impl IntoIterator<Item = R>) {
        self.candidates
            .push((candidate, requirements.into_iter().collect()));
    }

    /// The registered candidates, in registration order.
    pub fn candidates(&self) -> impl Iterator<Item = &R> {
        self.candidates.iter().map(|(candidate, _)| candidate)
    }
}

impl<R: Requirement> Provider<R> for OfflineProvider<R> {
    type Err = Infallible;

    fn best_candidate(&self, requirement: &R) -> Result<Option<R>, Infallible> {
        Ok(self
            .candidates
            .iter()
            .rev()
            .find(|(candidate, _)| {
                candidate.key() == requirement.key() && requirement.implied_by(candidate)
            })
            .map(|(candidate, _)| candidate.clone()))
    }

    fn requirements_of(&self, candidate: &R) -> Result<Vec<R>, Infallible> {
        Ok(self
            .candidates
            .iter()
            .find(|(registered, _)| registered == candidate)
            .map(|(_, requirements)| requirements.clone())
            .unwrap_or_default())
    }
}
