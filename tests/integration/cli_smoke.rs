//! End-to-end smoke test: builds a throwaway git repository with a short,
//! scripted commit history, then drives the real `multisect` binary against
//! it with a trivial target command.

use std::fs;
use std::process::Command;

use assert_cmd::Command as AssertCommand;
use tempfile::TempDir;

fn git(repo: &std::path::Path, args: &[&str]) {
    let status = Command::new("git")
        .arg("-C")
        .arg(repo)
        .args(args)
        .status()
        .expect("git must be on PATH for this test");
    assert!(status.success(), "git {args:?} failed");
}

/// Writes `marker.txt` containing `value` and commits it, returning the new
/// commit's full id.
fn commit_marker(repo: &std::path::Path, value: &str, message: &str) -> String {
    fs::write(repo.join("marker.txt"), value).unwrap();
    git(repo, &["add", "marker.txt"]);
    git(repo, &["commit", "--quiet", "-m", message]);
    let output = Command::new("git")
        .arg("-C")
        .arg(repo)
        .args(["rev-parse", "HEAD"])
        .output()
        .unwrap();
    String::from_utf8(output.stdout).unwrap().trim().to_string()
}

#[test]
fn multisect_locates_a_single_transition_over_a_real_repository() {
    let dir = TempDir::new().unwrap();
    let repo = dir.path().join("repo");
    fs::create_dir(&repo).unwrap();
    git(&repo, &["init", "--quiet"]);
    git(&repo, &["config", "user.email", "test@example.com"]);
    git(&repo, &["config", "user.name", "Test"]);

    let first = commit_marker(&repo, "before\n", "before");
    for i in 0..3 {
        commit_marker(&repo, "before\n", &format!("still before {i}"));
    }
    let _midpoint_before = commit_marker(&repo, "before\n", "last before");
    let _midpoint_after = commit_marker(&repo, "after\n", "first after");
    for i in 0..3 {
        commit_marker(&repo, "after\n", &format!("still after {i}"));
    }
    let last = commit_marker(&repo, "after\n", "last");

    let outputdir = dir.path().join("out");

    let mut cmd = AssertCommand::cargo_bin("multisect").unwrap();
    cmd.arg("--repository")
        .arg(&repo)
        .arg("--workdir")
        .arg(&repo)
        .arg("--outputdir")
        .arg(&outputdir)
        .arg("--first")
        .arg(&first)
        .arg("--last")
        .arg(&last)
        .arg("--target")
        .arg("cat marker.txt")
        .arg("--format")
        .arg("json")
        .arg("--quiet");

    let assert = cmd.assert().success();
    let output = assert.get_output();
    let stdout = String::from_utf8_lossy(&output.stdout);
    let report: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON report");

    assert_eq!(report["targets"].as_array().unwrap().len(), 1);
    let transitions = report["targets"][0]["transitions"].as_array().unwrap();
    assert_eq!(transitions.len(), 1);
    assert!((report["probes_issued"].as_u64().unwrap() as usize) < report["commit_count"].as_u64().unwrap() as usize);
}
