//! Scenario 6: two targets sharing identical ground truths complete from one
//! shared set of probes — the second target must not cost a single extra
//! runner call once the first has completed.

#[path = "common.rs"]
mod common;

use common::{run_session, GroundTruthRunner};

#[test]
fn identical_targets_share_every_probe() {
    let ground_truth = "AAABBBBBCC";
    let runner = GroundTruthRunner::new(ground_truth);
    let report = run_session(ground_truth, &["t1", "t2"], runner);

    assert_eq!(report.targets.len(), 2);
    let t1 = &report.targets[0];
    let t2 = &report.targets[1];
    assert_eq!(t1.transitions.len(), t2.transitions.len());
    for (a, b) in t1.transitions.iter().zip(t2.transitions.iter()) {
        assert_eq!(a.older.idx, b.older.idx);
        assert_eq!(a.newer.idx, b.newer.idx);
    }

    // Driving t1 to completion alone would already require probing every
    // position the round-robin scheduler visits; because t2's ground truth
    // is identical, the shared cache must answer every t2 lookup without a
    // single additional runner invocation. A solo single-target run over
    // the same ground truth establishes the baseline probe count.
    let solo = run_session(ground_truth, &["solo"], GroundTruthRunner::new(ground_truth));
    assert_eq!(report.probes_issued, solo.probes_issued);
}

#[test]
fn differing_targets_each_contribute_their_own_transition_probes() {
    let t1_truth = "AAAAABBBBB";
    let t2_truth = "AAAAAAAABB";
    let range = common::range_for(t1_truth);
    let enumerator = common::FixedRangeEnumerator { range: range.clone() };

    // Build directly against a runner keyed per target stub, since the
    // shared `GroundTruthRunner` fixture assumes one sequence for every
    // target and this test needs each target to diverge.
    struct PerTargetRunner {
        truths: std::collections::HashMap<String, Vec<char>>,
    }
    impl multisect::runner::Runner for PerTargetRunner {
        fn probe(
            &self,
            commit: &multisect::types::CommitId,
            targets: &[multisect::types::Target],
        ) -> Result<Vec<multisect::runner::ProbeResult>, multisect::runner::RunnerError> {
            let idx: usize = commit.as_str().parse().unwrap();
            Ok(targets
                .iter()
                .map(|t| multisect::runner::ProbeResult {
                    commit_id: commit.clone(),
                    short_id: commit.to_string(),
                    output_path: std::path::PathBuf::from("/dev/null"),
                    digest: multisect::types::Digest(self.truths[&t.stub][idx].to_string()),
                    target_stub: t.stub.clone(),
                })
                .collect())
        }
    }

    let mut truths = std::collections::HashMap::new();
    truths.insert("t1".to_string(), t1_truth.chars().collect());
    truths.insert("t2".to_string(), t2_truth.chars().collect());
    let per_target_runner = PerTargetRunner { truths };

    let params = multisect::session::SessionParams {
        start: multisect::vcs::RangeStart::First("0".into()),
        last: format!("{}", range.last_index()),
        short_len: 8,
        target_paths: vec!["t1".to_string(), "t2".to_string()],
    };
    let mut session =
        multisect::session::Session::build(&params, &enumerator, per_target_runner).unwrap();
    session.prepare().unwrap();
    session.multisect_all_targets().unwrap();
    let report = session.report().unwrap();

    let t1 = &report.targets[0];
    let t2 = &report.targets[1];
    assert_eq!(t1.transitions.len(), 1);
    assert_eq!(t2.transitions.len(), 1);
    assert_ne!(
        (t1.transitions[0].older.idx, t1.transitions[0].newer.idx),
        (t2.transitions[0].older.idx, t2.transitions[0].newer.idx)
    );
}
