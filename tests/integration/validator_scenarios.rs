//! Exercises the sequence validator directly against the literal scenario
//! ground truths, using a cache populated through `ProbeCache::ensure`
//! rather than a full session.

#[path = "common.rs"]
mod common;

use common::{range_for, GroundTruthRunner};
use multisect::cache::ProbeCache;
use multisect::types::Target;
use multisect::validator::{run_count, validate};

fn probe_all(ground_truth: &str) -> (multisect::types::CommitRange, ProbeCache) {
    let range = range_for(ground_truth);
    let runner = GroundTruthRunner::new(ground_truth);
    let targets = vec![Target::new("t")];
    let mut cache = ProbeCache::new(&range);
    for i in 0..range.len() {
        cache.ensure(i, &range, &targets, &runner).unwrap();
    }
    (range, cache)
}

#[test]
fn no_change_validates_as_a_single_run() {
    let (range, cache) = probe_all("AAAAAAAAAA");
    let view = cache.view(&range, "t");
    assert!(validate(&view));
    assert_eq!(run_count(&view), 1);
}

#[test]
fn single_midpoint_transition_validates_as_two_runs() {
    let (range, cache) = probe_all("AAAAABBBBB");
    let view = cache.view(&range, "t");
    assert!(validate(&view));
    assert_eq!(run_count(&view), 2);
}

#[test]
fn two_transitions_validate_as_three_runs() {
    let (range, cache) = probe_all("AAABBBBCCC");
    let view = cache.view(&range, "t");
    assert!(validate(&view));
    assert_eq!(run_count(&view), 3);
}

#[test]
fn adjacent_transitions_validate_without_recurrence() {
    let (range, cache) = probe_all("AAAABCCCCC");
    let view = cache.view(&range, "t");
    assert!(validate(&view));
    assert_eq!(run_count(&view), 3);
}

#[test]
fn a_sparse_view_with_an_unprobed_interior_still_validates() {
    let range = range_for("AAAAABBBBB");
    let runner = GroundTruthRunner::new("AAAAABBBBB");
    let targets = vec![Target::new("t")];
    let mut cache = ProbeCache::new(&range);
    for i in [0usize, 9, 4, 5] {
        cache.ensure(i, &range, &targets, &runner).unwrap();
    }
    let view = cache.view(&range, "t");
    assert!(validate(&view));
    assert_eq!(run_count(&view), 2);
}

#[test]
fn value_recurrence_across_runs_is_rejected() {
    let (range, cache) = probe_all("AABBAABBAA");
    let view = cache.view(&range, "t");
    assert!(!validate(&view));
}

#[test]
fn undefined_endpoints_are_rejected() {
    let range = range_for("AAAABBBBBB");
    let runner = GroundTruthRunner::new("AAAABBBBBB");
    let targets = vec![Target::new("t")];
    let mut cache = ProbeCache::new(&range);
    cache.ensure(3, &range, &targets, &runner).unwrap();
    cache.ensure(5, &range, &targets, &runner).unwrap();
    let view = cache.view(&range, "t");
    assert!(!validate(&view));
}

mod grammar_properties {
    use super::*;
    use proptest::prelude::*;

    /// Build a view over `digests` where the positions listed in `defined`
    /// are probed and everything else stays sparse.
    fn probe_subset(digests: &[char], defined: &[usize]) -> (multisect::types::CommitRange, ProbeCache) {
        let ground_truth: String = digests.iter().collect();
        let range = range_for(&ground_truth);
        let runner = GroundTruthRunner::new(&ground_truth);
        let targets = vec![Target::new("t")];
        let mut cache = ProbeCache::new(&range);
        for &i in defined {
            cache.ensure(i, &range, &targets, &runner).unwrap();
        }
        (range, cache)
    }

    proptest! {
        /// Any sequence built from runs of equal values with distinct
        /// adjacent values (i.e. no two consecutive runs share a value,
        /// and—since proptest can still hand back an accidental global
        /// repeat—only sequences with no repeated run value at all) must
        /// validate once every position is probed.
        #[test]
        fn run_sequences_without_value_recurrence_always_validate(
            run_lengths in proptest::collection::vec(1usize..4, 2..6)
        ) {
            let alphabet = ['A', 'B', 'C', 'D', 'E', 'F', 'G', 'H'];
            prop_assume!(run_lengths.len() <= alphabet.len());
            let digests: Vec<char> = run_lengths
                .iter()
                .enumerate()
                .flat_map(|(run_idx, &len)| std::iter::repeat(alphabet[run_idx]).take(len))
                .collect();
            let (range, cache) = probe_subset(&digests, &(0..digests.len()).collect::<Vec<_>>());
            let view = cache.view(&range, "t");
            prop_assert!(validate(&view));
            prop_assert_eq!(run_count(&view), run_lengths.len());
        }

        /// Probing only a subset of positions inside a single run (plus
        /// both endpoints) never changes whether the view validates,
        /// because the grammar only cares about defined entries.
        #[test]
        fn sparse_probing_within_a_single_run_still_validates(
            n in 4usize..20,
            extra in proptest::collection::vec(any::<bool>(), 0..20)
        ) {
            let digests = vec!['A'; n];
            let mut defined: Vec<usize> = vec![0, n - 1];
            for (i, probe) in extra.iter().enumerate().take(n.saturating_sub(2)) {
                if *probe {
                    defined.push(i + 1);
                }
            }
            let (range, cache) = probe_subset(&digests, &defined);
            let view = cache.view(&range, "t");
            prop_assert!(validate(&view));
        }

        /// A value that recurs after a distinct run always fails the
        /// grammar, regardless of how many repeats surround it.
        #[test]
        fn a_value_recurring_after_a_distinct_run_never_validates(
            lead in 1usize..4,
            middle in 1usize..4,
            tail in 1usize..4
        ) {
            let mut digests = vec!['A'; lead];
            digests.extend(std::iter::repeat('B').take(middle));
            digests.extend(std::iter::repeat('A').take(tail));
            let (range, cache) = probe_subset(&digests, &(0..digests.len()).collect::<Vec<_>>());
            let view = cache.view(&range, "t");
            prop_assert!(!validate(&view));
        }
    }
}
