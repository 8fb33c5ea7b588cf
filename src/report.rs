//! Reporting: turns a completed [`PerTargetView`] into the structured
//! `{oldest, newest, transitions[]}` record described in spec §4.4.

use crate::cache::PerTargetView;
use crate::types::{CommitId, Digest};

/// One defined position in a target's view, as surfaced in a report.
#[derive(Clone, Debug, serde::Serialize)]
pub struct Position {
    /// Index in the commit range.
    pub idx: usize,
    /// The commit at that position.
    pub commit_id: CommitId,
    /// Short id recorded by the runner.
    pub short_id: String,
    /// The normalized content digest observed there.
    pub digest: Digest,
    /// Path to the runner's output artifact for this (commit, target) pair.
    pub artifact: std::path::PathBuf,
}

/// A single detected transition boundary: two adjacent defined positions
/// whose digests differ.
#[derive(Clone, Debug, serde::Serialize)]
pub struct Transition {
    /// The last position before the change.
    pub older: Position,
    /// The first position after the change.
    pub newer: Position,
}

/// The full multisection answer for one target.
#[derive(Clone, Debug, serde::Serialize)]
pub struct TargetReport {
    /// The target's stub.
    pub target: String,
    /// Position 0.
    pub oldest: Position,
    /// Position `N - 1`.
    pub newest: Position,
    /// Transitions in ascending index order.
    pub transitions: Vec<Transition>,
}

/// A completed report across all targets in a session, plus the global
/// probing cost actually paid.
#[derive(Clone, Debug, serde::Serialize)]
pub struct SessionReport {
    /// Number of commits in the range (`N`).
    pub commit_count: usize,
    /// Total runner invocations made across every target (shared cache).
    pub probes_issued: usize,
    /// Per-target multisection results.
    pub targets: Vec<TargetReport>,
}

/// Build a [`TargetReport`] from a view that has already passed
/// [`crate::validator::validate`]. Callers (the driver) are responsible for
/// that check; this function assumes positions 0 and `N-1` are defined.
pub fn build_target_report(target: &str, view: &PerTargetView<'_>) -> TargetReport {
    let to_position = |idx: usize| {
        let entry = view.get(idx).expect("report built from a validated view");
        Position {
            idx,
            commit_id: entry.commit_id.clone(),
            short_id: entry.short_id.to_string(),
            digest: entry.digest.clone(),
            artifact: entry.output_path.to_path_buf(),
        }
    };

    let oldest = to_position(0);
    let newest = to_position(view.len() - 1);

    let mut transitions = Vec::new();
    let mut prev: Option<(usize, &Digest)> = None;
    for (idx, entry) in view.defined() {
        if let Some((prev_idx, prev_digest)) = prev {
            if prev_digest != entry.digest {
                transitions.push(Transition {
                    older: to_position(prev_idx),
                    newer: to_position(idx),
                });
            }
        }
        prev = Some((idx, entry.digest));
    }

    TargetReport {
        target: target.to_string(),
        oldest,
        newest,
        transitions,
    }
}
