//! The runner port: the external collaborator that turns a commit position
//! into observed output. The core only depends on the [`Runner`] trait; see
//! [`shell`] for a concrete, subprocess-backed implementation.

pub mod shell;

use crate::types::{CommitId, Digest, Target};

/// One target's observed result for one probed commit.
#[derive(Clone, Debug, serde::Serialize)]
pub struct ProbeResult {
    /// The commit that was probed.
    pub commit_id: CommitId,
    /// A shortened rendering of `commit_id`, used for artifact filenames
    /// and human-facing reports.
    pub short_id: String,
    /// Where the runner deposited the (pre-normalization) captured output.
    pub output_path: std::path::PathBuf,
    /// The normalized content digest.
    pub digest: Digest,
    /// Which target this result belongs to.
    pub target_stub: String,
}

/// A failure while probing a single commit for a single target.
#[derive(Debug, thiserror::Error)]
#[error("{reason}")]
pub struct RunnerError {
    /// Human-readable explanation of the failure.
    pub reason: String,
}

impl RunnerError {
    /// Build a runner error from any displayable cause.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// The external collaborator the core drives to fill a `ProbeRow`.
///
/// A conforming implementation is deterministic per commit (repeat calls
/// at the same position return the same digest), returns exactly one
/// `ProbeResult` per configured target, and leaves the working tree in a
/// consistent branch state whether it succeeds or fails.
pub trait Runner {
    /// Probe a single commit, returning one result per target in `targets`.
    fn probe(&self, commit: &CommitId, targets: &[Target]) -> Result<Vec<ProbeResult>, RunnerError>;
}
