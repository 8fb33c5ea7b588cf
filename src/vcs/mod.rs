//! The commit-range enumerator port: the external collaborator that turns
//! two endpoint identifiers into the ordered `CommitId` sequence the core
//! multisects over. See [`git`] for a concrete, `git`-backed implementation.

pub mod git;

use crate::error::ConfigurationError;
use crate::types::CommitRange;

/// Either side of the endpoint configuration: an explicit `first` commit,
/// or `last_before` which the enumerator resolves relative to `last`.
#[derive(Clone, Debug)]
pub enum RangeStart {
    /// The range starts at this commit (inclusive).
    First(String),
    /// The range starts at the first commit that is not an ancestor of
    /// this one relative to `last` — i.e. everything strictly after it.
    LastBefore(String),
}

/// The external collaborator that decides ancestry semantics for a commit
/// range. The core never calls this directly; the session layer does, once,
/// before constructing a driver.
pub trait CommitRangeEnumerator {
    /// Resolve `start`/`last` into an ordered, oldest-first `CommitRange`.
    fn enumerate(&self, start: &RangeStart, last: &str) -> Result<CommitRange, ConfigurationError>;
}
