//! Session: wires a concrete [`Runner`] and [`CommitRangeEnumerator`] into a
//! [`MultisectionDriver`], resolving configuration and translating any core
//! error into a single, already-classified [`Error`].

use tracing::info;

use crate::driver::MultisectionDriver;
use crate::error::{ConfigurationError, Error};
use crate::report::{SessionReport, TargetReport};
use crate::runner::Runner;
use crate::types::{build_targets, CommitRange};
use crate::vcs::{CommitRangeEnumerator, RangeStart};

/// The fully resolved inputs a session needs before it can run, independent
/// of where they came from (CLI flags, a profile file, or defaults — see
/// [`crate::config`]).
#[derive(Clone, Debug)]
pub struct SessionParams {
    /// Where the range starts.
    pub start: RangeStart,
    /// Where the range ends (inclusive).
    pub last: String,
    /// Short commit id prefix length.
    pub short_len: usize,
    /// Target command paths, in configuration order.
    pub target_paths: Vec<String>,
}

/// One end-to-end multisection run.
pub struct Session<R: Runner> {
    driver: MultisectionDriver<R>,
}

impl<R: Runner> Session<R> {
    /// Resolve the commit range and target set, then construct a driver.
    /// This is the only place `ConfigurationError` is raised.
    pub fn build(
        params: &SessionParams,
        enumerator: &dyn CommitRangeEnumerator,
        runner: R,
    ) -> Result<Self, Error> {
        let range = enumerator.enumerate(&params.start, &params.last)?;
        let targets = build_targets(&params.target_paths)?;
        info!(
            commits = range.len(),
            targets = targets.len(),
            "session configured"
        );
        Ok(Self {
            driver: MultisectionDriver::new(range, targets, runner),
        })
    }

    /// Probe the range endpoints.
    pub fn prepare(&mut self) -> Result<(), Error> {
        self.driver.prepare()
    }

    /// Drive every target to completion.
    pub fn multisect_all_targets(&mut self) -> Result<(), Error> {
        self.driver.multisect_all_targets()
    }

    /// Build the final report across all targets. Fails with `UsageError`
    /// if called before every target has completed.
    pub fn report(&self) -> Result<SessionReport, Error> {
        let targets: Vec<TargetReport> = self.driver.inspect_transitions()?;
        Ok(SessionReport {
            commit_count: self.commit_count(),
            probes_issued: self.driver.probes_issued(),
            targets,
        })
    }

    /// Number of commits in the resolved range.
    pub fn commit_count(&self) -> usize {
        self.range_len()
    }

    fn range_len(&self) -> usize {
        // multisected_outputs() always has at least one target once the
        // session is constructed with a non-empty target list; fall back
        // to a direct probe-count-independent query otherwise.
        self.driver
            .multisected_outputs()
            .values()
            .next()
            .map(|v| v.len())
            .unwrap_or(0)
    }
}

/// Validate that a resolved `CommitRange` (already produced by an
/// enumerator) is non-trivial. Exposed separately from `Session::build` so
/// alternative enumerators can reuse the same check.
pub fn validate_range(range: &CommitRange) -> Result<(), ConfigurationError> {
    if range.len() < 2 {
        return Err(ConfigurationError::InvalidRange(format!(
            "range has only {} commit(s)",
            range.len()
        )));
    }
    Ok(())
}
