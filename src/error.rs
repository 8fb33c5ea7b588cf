//! Top-level error taxonomy shared by every fallible entry point in the crate.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// The four-member taxonomy from the design: configuration problems, probe
/// failures, internal invariant violations, and caller misuse. Every public,
/// fallible entry point returns this type; nothing in the core panics or
/// calls `process::exit` on its own. Only the CLI front end (see
/// `bin/multisect.rs`) translates an `Error` into a diagnostic and an exit
/// code.
#[derive(Debug, Error)]
pub enum Error {
    /// Raised during session setup: missing directories, absent target
    /// commands, an ambiguous or empty commit range.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// The runner failed for a probed commit. Fatal; aborts the session,
    /// because any missing row may be exactly the one needed to resolve a
    /// boundary.
    #[error("probe failed for commit {short_id} ({target}): {reason}")]
    Probe {
        /// Short id of the commit being probed.
        short_id: String,
        /// Stub of the target being probed.
        target: String,
        /// What went wrong.
        reason: String,
    },

    /// The driver's internal bookkeeping is inconsistent with its own
    /// invariants (for example the per-target probe counter exceeded `N`).
    /// This signals a bug in the driver, not bad user input.
    #[error("internal invariant violated: {0}")]
    InvariantViolation(String),

    /// A core entry point was called out of order, e.g. `multisect_*`
    /// before `prepare()`, or `inspect_transitions()` before completion.
    #[error("usage error: {0}")]
    Usage(String),
}

/// Configuration-time failures.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// A directory the session needs (workdir or output dir) does not exist
    /// and could not be created.
    #[error("cannot use directory {path}: {source}")]
    Directory {
        /// The offending path.
        path: PathBuf,
        /// The underlying I/O failure.
        source: std::io::Error,
    },

    /// No targets were configured.
    #[error("no targets configured")]
    NoTargets,

    /// Two targets resolved to the same filesystem-safe stub.
    #[error("duplicate target stub '{stub}' (from '{a}' and '{b}')")]
    DuplicateStub {
        /// The colliding stub.
        stub: String,
        /// First target path that produced it.
        a: String,
        /// Second target path that produced it.
        b: String,
    },

    /// The commit range resolved to fewer than two commits, or the
    /// endpoints could not be resolved at all.
    #[error("invalid commit range: {0}")]
    InvalidRange(String),

    /// The profile file could not be read or parsed.
    #[error("failed to load config file {path}: {source}")]
    ProfileRead {
        /// Path to the profile file.
        path: PathBuf,
        /// The underlying failure.
        source: String,
    },
}
