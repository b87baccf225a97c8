// SPDX-License-Identifier: MPL-2.0

use solvent::{solve, DefaultStringExplainer, OfflineProvider, RangeRequirement, SolveError};

type Req = RangeRequirement<&'static str, u32>;

fn req(name: &'static str, low: u32, high: u32) -> Req {
    RangeRequirement::between(name, low, high)
}

/// Register a single version of a package as a pinned `[version, version+1)`
/// candidate, the way a registry would expose it.
fn pkg(
    provider: &mut OfflineProvider<Req>,
    name: &'static str,
    version: u32,
    requirements: impl IntoIterator<Item = Req>,
) {
    provider.add_candidate(req(name, version, version + 1), requirements);
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn empty_roots_solve_to_nothing() {
    let provider = OfflineProvider::<Req>::new();
    let solution = solve([], &provider).unwrap();
    assert!(solution.is_empty());
}

#[test]
fn single_package_single_candidate() {
    let mut provider = OfflineProvider::new();
    pkg(&mut provider, "foo", 1, []);

    let solution = solve([req("foo", 1, 2)], &provider).unwrap();
    assert_eq!(solution, [req("foo", 1, 2)]);
}

#[test]
fn single_candidate_inside_a_wider_requirement() {
    let mut provider = OfflineProvider::new();
    pkg(&mut provider, "foo", 2, []);

    let solution = solve([req("foo", 1, 3)], &provider).unwrap();
    assert_eq!(solution, [req("foo", 2, 3)]);
}

#[test]
fn highest_matching_candidate_wins() {
    let mut provider = OfflineProvider::new();
    pkg(&mut provider, "foo", 1, []);
    pkg(&mut provider, "foo", 2, []);
    pkg(&mut provider, "foo", 3, []);
    pkg(&mut provider, "foo", 4, []);

    let solution = solve([req("foo", 1, 6)], &provider).unwrap();
    assert_eq!(solution, [req("foo", 4, 5)]);
}

#[test]
fn transitive_requirements_are_selected() {
    let mut provider = OfflineProvider::new();
    pkg(&mut provider, "foo", 1, [req("bar", 3, 4)]);
    pkg(&mut provider, "bar", 3, []);

    let solution = solve([req("foo", 1, 2)], &provider).unwrap();
    assert_eq!(solution, [req("foo", 1, 2), req("bar", 3, 4)]);
}

#[test]
fn multiple_transitive_requirements() {
    let mut provider = OfflineProvider::new();
    pkg(&mut provider, "foo", 1, [req("bar", 3, 6), req("baz", 5, 23)]);
    pkg(&mut provider, "bar", 5, []);
    pkg(&mut provider, "baz", 7, []);

    let solution = solve([req("foo", 1, 2)], &provider).unwrap();
    assert_eq!(
        solution,
        [req("foo", 1, 2), req("bar", 5, 6), req("baz", 7, 8)]
    );
}

#[test]
fn conflicting_transitive_requirement_backtracks() {
    init_logging();
    // foo wants bar [1,6) and baz [3,8); baz 6 narrows bar down to [4,5).
    let mut provider = OfflineProvider::new();
    pkg(&mut provider, "foo", 1, [req("bar", 1, 6), req("baz", 3, 8)]);
    pkg(&mut provider, "bar", 3, []);
    pkg(&mut provider, "bar", 4, []);
    pkg(&mut provider, "baz", 6, [req("bar", 4, 5)]);

    let solution = solve([req("foo", 1, 2)], &provider).unwrap();
    assert_eq!(
        solution,
        [req("foo", 1, 2), req("bar", 4, 5), req("baz", 6, 7)]
    );
}

#[test]
fn independent_subtrees_solve_in_key_order() {
    let mut provider = OfflineProvider::new();
    pkg(&mut provider, "a", 1, [req("aa", 1, 2), req("ab", 1, 2)]);
    pkg(&mut provider, "b", 1, [req("ba", 1, 2), req("bb", 1, 2)]);
    pkg(&mut provider, "aa", 1, []);
    pkg(&mut provider, "ab", 1, []);
    pkg(&mut provider, "ba", 1, []);
    pkg(&mut provider, "bb", 1, []);

    let solution = solve([req("a", 1, 2), req("b", 1, 2)], &provider).unwrap();
    assert_eq!(
        solution,
        [
            req("a", 1, 2),
            req("aa", 1, 2),
            req("ab", 1, 2),
            req("b", 1, 2),
            req("ba", 1, 2),
            req("bb", 1, 2),
        ]
    );
}

#[test]
fn shared_requirement_settles_on_the_overlap() {
    let mut provider = OfflineProvider::new();
    pkg(&mut provider, "a", 1, [req("shared", 200, 400)]);
    pkg(&mut provider, "b", 1, [req("shared", 300, 500)]);
    pkg(&mut provider, "shared", 200, []);
    pkg(&mut provider, "shared", 299, []);
    pkg(&mut provider, "shared", 369, []);
    pkg(&mut provider, "shared", 400, []);
    pkg(&mut provider, "shared", 500, []);

    let solution = solve([req("a", 1, 2), req("b", 1, 2)], &provider).unwrap();
    assert_eq!(
        solution,
        [req("a", 1, 2), req("b", 1, 2), req("shared", 369, 370)]
    );
}

#[test]
fn diamond_with_conflict_learning() {
    init_logging();
    // The highest a and b both overconstrain c; the solver has to learn its
    // way down to a 100 / b 200 / c 300.
    let mut provider = OfflineProvider::new();
    pkg(&mut provider, "a", 100, []);
    pkg(&mut provider, "a", 200, [req("c", 100, 200)]);
    pkg(&mut provider, "b", 100, [req("c", 200, 300)]);
    pkg(&mut provider, "b", 200, [req("c", 300, 400)]);
    pkg(&mut provider, "c", 100, []);
    pkg(&mut provider, "c", 200, []);
    pkg(&mut provider, "c", 300, []);

    let solution = solve([req("a", 1, 1000), req("b", 1, 1000)], &provider).unwrap();
    assert_eq!(
        solution,
        [req("a", 100, 101), req("b", 200, 201), req("c", 300, 301)]
    );
}

#[test]
fn interdependent_versions_backtrack_across_packages() {
    let mut provider = OfflineProvider::new();
    pkg(&mut provider, "foo", 100, []);
    pkg(&mut provider, "foo", 101, [req("bang", 100, 101)]);
    pkg(&mut provider, "foo", 102, [req("whoop", 100, 101)]);
    pkg(&mut provider, "foo", 103, [req("zoop", 100, 101)]);
    pkg(&mut provider, "bar", 100, [req("foo", 0, 102)]);
    pkg(&mut provider, "bang", 100, []);
    pkg(&mut provider, "whoop", 100, []);
    pkg(&mut provider, "zoop", 100, []);

    let solution = solve([req("foo", 0, 103), req("bar", 100, 101)], &provider).unwrap();
    assert_eq!(
        solution,
        [req("bar", 100, 101), req("foo", 101, 102), req("bang", 100, 101)]
    );
}

#[test]
fn missing_candidate_fails_with_an_explanation() {
    let provider = OfflineProvider::<Req>::new();

    let failure = match solve([req("foo", 1, 2)], &provider).unwrap_err() {
        SolveError::Unsolvable(failure) => failure,
        other => panic!("expected an unsolvable failure, got {other}"),
    };
    let report = DefaultStringExplainer::explain(&failure);
    assert!(report.contains("no candidate is available for foo [1, 2)"));
    assert!(report.trim_end().ends_with("Thus: There is no solution"));
}

#[test]
fn mutually_exclusive_pins_are_unsolvable() {
    init_logging();
    // a and b each pin the other to the version not selected, whichever way
    // the solver starts.
    let mut provider = OfflineProvider::new();
    pkg(&mut provider, "a", 100, [req("b", 100, 101)]);
    pkg(&mut provider, "a", 200, [req("b", 200, 201)]);
    pkg(&mut provider, "b", 100, [req("a", 200, 201)]);
    pkg(&mut provider, "b", 200, [req("a", 100, 101)]);

    let failure = match solve([req("a", 0, 999), req("b", 0, 999)], &provider).unwrap_err() {
        SolveError::Unsolvable(failure) => failure,
        other => panic!("expected an unsolvable failure, got {other}"),
    };
    let report = DefaultStringExplainer::explain(&failure);
    assert!(report.trim_end().ends_with("Thus: There is no solution"));
    // Display on the failure itself goes through the same explainer.
    assert_eq!(failure.to_string(), report);
}

#[test]
fn self_dependency_is_rejected() {
    let mut provider = OfflineProvider::new();
    pkg(&mut provider, "foo", 1, [req("foo", 1, 2)]);

    let error = solve([req("foo", 1, 2)], &provider).unwrap_err();
    assert!(matches!(error, SolveError::SelfDependency { .. }));
}

#[test]
fn repeated_runs_give_the_same_result() {
    let mut provider = OfflineProvider::new();
    pkg(&mut provider, "c", 0, []);
    pkg(&mut provider, "c", 2, []);
    pkg(&mut provider, "b", 0, []);
    pkg(&mut provider, "b", 1, [req("c", 0, 1)]);
    pkg(&mut provider, "a", 0, [req("b", 0, 100), req("c", 0, 100)]);

    let first = solve([req("a", 0, 1)], &provider).unwrap();
    for _ in 0..10 {
        assert_eq!(solve([req("a", 0, 1)], &provider).unwrap(), first);
    }
}
