//! End-to-end driver scenarios, one per literal case in the design's
//! testable-properties section: a ten-commit range, alphabet `{A, B, C, D}`.

#[path = "common.rs"]
mod common;

use common::{run_session, GroundTruthRunner};

fn transition_pairs(report: &multisect::report::TargetReport) -> Vec<(usize, usize)> {
    report
        .transitions
        .iter()
        .map(|t| (t.older.idx, t.newer.idx))
        .collect()
}

#[test]
fn scenario_1_no_change_probes_only_the_endpoints() {
    let report = run_session("AAAAAAAAAA", &["t"], GroundTruthRunner::new("AAAAAAAAAA"));
    assert_eq!(report.probes_issued, 2);
    let target = &report.targets[0];
    assert_eq!(target.oldest.digest.as_str(), "A");
    assert_eq!(target.newest.digest.as_str(), "A");
    assert!(target.transitions.is_empty());
}

#[test]
fn scenario_2_single_transition_at_the_midpoint() {
    let report = run_session("AAAAABBBBB", &["t"], GroundTruthRunner::new("AAAAABBBBB"));
    assert_eq!(report.probes_issued, 4);
    assert_eq!(transition_pairs(&report.targets[0]), vec![(4, 5)]);
}

#[test]
fn scenario_3_transition_off_center() {
    let report = run_session("AABBBBBBBB", &["t"], GroundTruthRunner::new("AABBBBBBBB"));
    assert_eq!(report.probes_issued, 5);
    assert_eq!(transition_pairs(&report.targets[0]), vec![(1, 2)]);
}

#[test]
fn scenario_4_two_transitions() {
    let report = run_session("AAABBBBCCC", &["t"], GroundTruthRunner::new("AAABBBBCCC"));
    assert_eq!(transition_pairs(&report.targets[0]), vec![(2, 3), (6, 7)]);
    assert!(report.probes_issued <= report.commit_count);
}

#[test]
fn scenario_5_adjacent_transitions_record_both() {
    let report = run_session("AAAABCCCCC", &["t"], GroundTruthRunner::new("AAAABCCCCC"));
    assert_eq!(transition_pairs(&report.targets[0]), vec![(3, 4), (4, 5)]);
    assert!(report.probes_issued <= report.commit_count);
}

#[test]
fn transitions_are_strictly_increasing_in_index() {
    let report = run_session("AAABBBBCCC", &["t"], GroundTruthRunner::new("AAABBBBCCC"));
    let pairs = transition_pairs(&report.targets[0]);
    for window in pairs.windows(2) {
        assert!(window[0].1 < window[1].0);
    }
}

#[test]
fn a_second_multisect_call_on_a_complete_session_probes_nothing_more() {
    let range = common::range_for("AAAAABBBBB");
    let enumerator = common::FixedRangeEnumerator { range: range.clone() };
    let runner = GroundTruthRunner::new("AAAAABBBBB");
    let params = multisect::session::SessionParams {
        start: multisect::vcs::RangeStart::First("0".into()),
        last: format!("{}", range.last_index()),
        short_len: 8,
        target_paths: vec!["t".to_string()],
    };
    let mut session = multisect::session::Session::build(&params, &enumerator, runner).unwrap();
    session.prepare().unwrap();
    session.multisect_all_targets().unwrap();
    let first_count = session.report().unwrap().probes_issued;

    session.multisect_all_targets().unwrap();
    let second_count = session.report().unwrap().probes_issued;

    assert_eq!(first_count, second_count);
}
