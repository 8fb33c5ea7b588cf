//! Core data model: commit identifiers, digests, and targets.
//!
//! These types are intentionally thin. The engine never interprets a
//! `CommitId` or a `Digest` beyond equality; all VCS and hashing semantics
//! live in the runner and commit-range enumerator implementations.

use crate::error::ConfigurationError;

/// An opaque commit identifier, as returned by the commit-range enumerator.
/// Immutable for the lifetime of a session.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, serde::Serialize)]
pub struct CommitId(pub String);

impl CommitId {
    /// Borrow the underlying id string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CommitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for CommitId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A fixed-width hex content hash of a normalized output artifact. Two
/// digests are equal exactly when the runner judged their normalized
/// outputs equal.
#[derive(Clone, Debug, Eq, PartialEq, Hash, serde::Serialize)]
pub struct Digest(pub String);

impl Digest {
    /// Borrow the underlying hex string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Digest {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// An ordered, ancestry-respecting sequence of commits, oldest first.
/// `len() >= 2` is an invariant enforced by the enumerator that produces
/// one; the driver and cache both assume it.
#[derive(Clone, Debug)]
pub struct CommitRange {
    commits: Vec<CommitId>,
}

impl CommitRange {
    /// Build a range from an already-ordered (oldest-first) list of commit
    /// ids. Returns `ConfigurationError::InvalidRange` if fewer than two
    /// commits are supplied.
    pub fn new(commits: Vec<CommitId>) -> Result<Self, ConfigurationError> {
        if commits.len() < 2 {
            return Err(ConfigurationError::InvalidRange(format!(
                "commit range must contain at least 2 commits, got {}",
                commits.len()
            )));
        }
        Ok(Self { commits })
    }

    /// Number of commits in the range (`N` in the design).
    pub fn len(&self) -> usize {
        self.commits.len()
    }

    /// A range never has fewer than two commits once constructed.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Index of the last commit, `N - 1`.
    pub fn last_index(&self) -> usize {
        self.commits.len() - 1
    }

    /// The commit id at position `i`.
    pub fn commit_at(&self, i: usize) -> &CommitId {
        &self.commits[i]
    }

    /// Iterate commits in oldest-to-newest order.
    pub fn iter(&self) -> impl Iterator<Item = &CommitId> {
        self.commits.iter()
    }
}

/// A named command whose output is observed at each probed commit.
///
/// `stub` is a filesystem-safe rewrite of `path`: every `/` and `.` is
/// replaced with `_`. Stubs are computed once, at target-set construction,
/// and must be unique within a session.
#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize)]
pub struct Target {
    /// The target's command or file path, as configured by the user.
    pub path: String,
    /// The filesystem-safe rewrite of `path`.
    pub stub: String,
}

impl Target {
    /// Construct a target, deriving its stub from `path`.
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        let stub = stub_for(&path);
        Self { path, stub }
    }
}

/// Replace every `/` and `.` in `path` with `_`, per the canonical stub
/// rule in the design's external interfaces section.
pub fn stub_for(path: &str) -> String {
    path.chars()
        .map(|c| if c == '/' || c == '.' { '_' } else { c })
        .collect()
}

/// Validate a list of target paths into a list of `Target`s, rejecting an
/// empty list or any stub collision.
pub fn build_targets(paths: &[String]) -> Result<Vec<Target>, ConfigurationError> {
    if paths.is_empty() {
        return Err(ConfigurationError::NoTargets);
    }
    let mut targets = Vec::with_capacity(paths.len());
    for path in paths {
        let candidate = Target::new(path.clone());
        if let Some(existing) = targets
            .iter()
            .find(|t: &&Target| t.stub == candidate.stub)
        {
            let existing: &Target = existing;
            return Err(ConfigurationError::DuplicateStub {
                stub: candidate.stub,
                a: existing.path.clone(),
                b: candidate.path,
            });
        }
        targets.push(candidate);
    }
    Ok(targets)
}
