//! A [`CommitRangeEnumerator`] backed by `git rev-list`.

use std::path::PathBuf;
use std::process::Command;

use crate::error::ConfigurationError;
use crate::types::{CommitId, CommitRange};

use super::{CommitRangeEnumerator, RangeStart};

/// Enumerates commit ranges against a local git checkout by shelling out to
/// `git rev-list`. Ancestry is whatever `git` itself decides; this
/// implementation only parses and validates the result.
pub struct GitCommitRangeEnumerator {
    repo_path: PathBuf,
    branch: Option<String>,
}

impl GitCommitRangeEnumerator {
    /// Build an enumerator rooted at `repo_path`. If `branch` is set, `last`
    /// must resolve to a commit reachable from the branch tip, or
    /// `ConfigurationError::InvalidRange` is raised.
    pub fn new(repo_path: impl Into<PathBuf>, branch: Option<String>) -> Self {
        Self {
            repo_path: repo_path.into(),
            branch,
        }
    }

    fn check_branch_reachability(&self, last_id: &str) -> Result<(), ConfigurationError> {
        let Some(branch) = &self.branch else {
            return Ok(());
        };
        if !self.is_ancestor(last_id, branch)? {
            return Err(ConfigurationError::InvalidRange(format!(
                "commit '{last_id}' is not reachable from branch '{branch}'"
            )));
        }
        Ok(())
    }

    /// Require that `ancestor_id` is an ancestor of (or equal to)
    /// `descendant_id`, so the range the enumerator builds is actually
    /// oldest-to-newest ancestry-ordered rather than whatever
    /// `git rev-list a..b` returns for two unrelated commits.
    fn check_is_ancestor(&self, ancestor_id: &str, descendant_id: &str) -> Result<(), ConfigurationError> {
        if !self.is_ancestor(ancestor_id, descendant_id)? {
            return Err(ConfigurationError::InvalidRange(format!(
                "commit '{ancestor_id}' is not an ancestor of '{descendant_id}'"
            )));
        }
        Ok(())
    }

    fn is_ancestor(&self, ancestor_id: &str, descendant_id: &str) -> Result<bool, ConfigurationError> {
        let status = Command::new("git")
            .arg("-C")
            .arg(&self.repo_path)
            .args(["merge-base", "--is-ancestor", ancestor_id, descendant_id])
            .status()
            .map_err(|e| {
                ConfigurationError::InvalidRange(format!("failed to run git merge-base: {e}"))
            })?;
        Ok(status.success())
    }

    fn rev_list(&self, range_expr: &str) -> Result<Vec<String>, ConfigurationError> {
        let output = Command::new("git")
            .arg("-C")
            .arg(&self.repo_path)
            .args(["rev-list", "--reverse", range_expr])
            .output()
            .map_err(|e| {
                ConfigurationError::InvalidRange(format!("failed to run git rev-list: {e}"))
            })?;
        if !output.status.success() {
            return Err(ConfigurationError::InvalidRange(format!(
                "git rev-list {range_expr} failed: {}",
                String::from_utf8_lossy(&output.stderr)
            )));
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout
            .lines()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect())
    }

    fn resolve(&self, rev: &str) -> Result<String, ConfigurationError> {
        let output = Command::new("git")
            .arg("-C")
            .arg(&self.repo_path)
            .args(["rev-parse", "--verify", rev])
            .output()
            .map_err(|e| {
                ConfigurationError::InvalidRange(format!("failed to run git rev-parse: {e}"))
            })?;
        if !output.status.success() {
            return Err(ConfigurationError::InvalidRange(format!(
                "commit '{rev}' does not resolve to a commit"
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl CommitRangeEnumerator for GitCommitRangeEnumerator {
    fn enumerate(&self, start: &RangeStart, last: &str) -> Result<CommitRange, ConfigurationError> {
        let last_id = self.resolve(last)?;
        self.check_branch_reachability(&last_id)?;

        let (first_id, range_expr) = match start {
            RangeStart::First(first) => {
                let first_id = self.resolve(first)?;
                self.check_is_ancestor(&first_id, &last_id)?;
                (first_id.clone(), format!("{first_id}..{last_id}"))
            }
            RangeStart::LastBefore(before) => {
                let before_id = self.resolve(before)?;
                self.check_is_ancestor(&before_id, &last_id)?;
                (before_id.clone(), format!("{before_id}..{last_id}"))
            }
        };

        // `git rev-list A..B` excludes A; re-include the start endpoint so
        // the range covers [first, last] inclusive, as the design requires.
        let mut ids = self.rev_list(&range_expr)?;
        ids.insert(0, first_id);

        let commits: Vec<CommitId> = ids.into_iter().map(CommitId).collect();
        CommitRange::new(commits)
    }
}
