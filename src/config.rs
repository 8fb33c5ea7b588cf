//! Layered configuration: built-in defaults, overridden by a TOML profile
//! file, overridden by CLI flags (§10.3). Only this module and the CLI
//! front end know about the profile file's on-disk shape; the rest of the
//! crate only sees the fully resolved [`ResolvedConfig`].

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigurationError;
use crate::runner::shell::RunnerCommands;
use crate::session::SessionParams;
use crate::vcs::RangeStart;

/// Default prefix length for short commit ids, matching common VCS
/// convention.
pub const DEFAULT_SHORT_LEN: usize = 8;

/// The on-disk shape of a profile file: every field optional, since any of
/// them may instead come from a CLI flag or a built-in default.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileFile {
    first: Option<String>,
    last: Option<String>,
    last_before: Option<String>,
    short: Option<usize>,
    targets: Option<Vec<String>>,
    workdir: Option<PathBuf>,
    outputdir: Option<PathBuf>,
    configure_command: Option<String>,
    make_command: Option<String>,
    test_command: Option<String>,
    branch: Option<String>,
    repository: Option<PathBuf>,
}

impl ProfileFile {
    /// Load a profile file from an explicit path, or the platform default
    /// config location if `explicit` is `None`. Returns the empty default
    /// if no file exists at the resolved location.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigurationError> {
        let path = explicit.map(Path::to_path_buf).or_else(default_config_path);
        let Some(path) = path else {
            return Ok(Self::default());
        };
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(&path).map_err(|e| ConfigurationError::ProfileRead {
            path: path.clone(),
            source: e.to_string(),
        })?;
        toml::from_str(&contents).map_err(|e| ConfigurationError::ProfileRead {
            path,
            source: e.to_string(),
        })
    }
}

/// The platform config directory's default location for the profile file:
/// `<config_dir>/multisect/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|base| base.join("multisect").join("config.toml"))
}

/// CLI-supplied overrides. Every field mirrors a `ProfileFile` field, plus
/// `repository` acting as the repo path rather than a session input, and
/// `verbose`/`format`, which the CLI consumes directly and never forwards
/// into `ResolvedConfig`.
#[derive(Debug, Default)]
pub struct CliOverrides {
    /// Start of the range.
    pub first: Option<String>,
    /// Alternative start: "last before" form.
    pub last_before: Option<String>,
    /// End of the range (required).
    pub last: Option<String>,
    /// Short id prefix length.
    pub short: Option<usize>,
    /// Target command paths.
    pub targets: Option<Vec<String>>,
    /// Directory the runner checks out and builds in.
    pub workdir: Option<PathBuf>,
    /// Directory the runner deposits artifacts under.
    pub outputdir: Option<PathBuf>,
    /// Command run once per probe before building.
    pub configure_command: Option<String>,
    /// Command run once per probe to build.
    pub make_command: Option<String>,
    /// Command run once per probe to test.
    pub test_command: Option<String>,
    /// Branch tip `last` must be reachable from (forwarded to the enumerator).
    pub branch: Option<String>,
    /// Repository path (forwarded opaquely to the runner/enumerator).
    pub repository: Option<PathBuf>,
}

/// Fully resolved configuration, ready to build a [`crate::session::Session`].
#[derive(Debug)]
pub struct ResolvedConfig {
    /// Session parameters consumed by the core (range endpoints, short id
    /// length, targets).
    pub session: SessionParams,
    /// Where the runner checks out and builds source.
    pub workdir: PathBuf,
    /// Where the runner deposits artifacts.
    pub outputdir: PathBuf,
    /// Commands forwarded opaquely to the reference shell runner.
    pub runner_commands: RunnerCommands,
    /// Repository path forwarded to the enumerator and runner.
    pub repository: PathBuf,
    /// Branch tip forwarded to the enumerator, if configured.
    pub branch: Option<String>,
}

/// Merge `cli` over `profile` over built-in defaults, then validate the
/// result (directories creatable, a range start and end are present, at
/// least one target is configured).
pub fn resolve(cli: CliOverrides, profile: ProfileFile) -> Result<ResolvedConfig, ConfigurationError> {
    let last = cli
        .last
        .or(profile.last)
        .ok_or_else(|| ConfigurationError::InvalidRange("no 'last' endpoint configured".into()))?;

    let start = match (cli.first, cli.last_before, profile.first, profile.last_before) {
        (Some(first), _, _, _) => RangeStart::First(first),
        (None, Some(before), _, _) => RangeStart::LastBefore(before),
        (None, None, Some(first), _) => RangeStart::First(first),
        (None, None, None, Some(before)) => RangeStart::LastBefore(before),
        (None, None, None, None) => {
            return Err(ConfigurationError::InvalidRange(
                "neither 'first' nor 'last_before' configured".into(),
            ))
        }
    };

    let short_len = cli.short.or(profile.short).unwrap_or(DEFAULT_SHORT_LEN);

    let target_paths = cli
        .targets
        .or(profile.targets)
        .ok_or(ConfigurationError::NoTargets)?;

    let workdir = cli
        .workdir
        .or(profile.workdir)
        .unwrap_or_else(|| PathBuf::from("."));
    let outputdir = cli
        .outputdir
        .or(profile.outputdir)
        .unwrap_or_else(|| PathBuf::from("multisect-out"));
    let repository = cli
        .repository
        .or(profile.repository)
        .unwrap_or_else(|| PathBuf::from("."));

    ensure_dir(&workdir)?;
    ensure_dir(&outputdir)?;

    Ok(ResolvedConfig {
        session: SessionParams {
            start,
            last,
            short_len,
            target_paths,
        },
        workdir,
        outputdir,
        runner_commands: RunnerCommands {
            configure_command: cli.configure_command.or(profile.configure_command),
            make_command: cli.make_command.or(profile.make_command),
            test_command: cli.test_command.or(profile.test_command),
        },
        repository,
        branch: cli.branch.or(profile.branch),
    })
}

fn ensure_dir(path: &Path) -> Result<(), ConfigurationError> {
    fs::create_dir_all(path).map_err(|source| ConfigurationError::Directory {
        path: path.to_path_buf(),
        source,
    })
}
