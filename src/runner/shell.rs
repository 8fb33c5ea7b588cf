//! A reference [`Runner`](super::Runner) that checks out a commit with
//! `git`, runs a configure/build pipeline and the configured target
//! commands through the shell, and hashes a normalized capture of their
//! combined stdout+stderr.
//!
//! The normalization rules here are this runner's own business per the
//! design's open question in §9: strip wall-clock timing noise before
//! hashing so that repeat probes of the same commit are digest-stable.

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use sha2::{Digest as _, Sha256};
use tracing::debug;

use crate::types::{CommitId, Digest, Target};

use super::{ProbeResult, Runner, RunnerError};

/// Commands the shell runner executes around each probed target.
#[derive(Clone, Debug, Default)]
pub struct RunnerCommands {
    /// Run once per probe, before any target command, if present.
    pub configure_command: Option<String>,
    /// Run once per probe, after `configure_command`, if present.
    pub make_command: Option<String>,
    /// Run once per probe, after `make_command` and before target capture,
    /// if present.
    pub test_command: Option<String>,
}

/// A [`Runner`] backed by real subprocesses against a checked-out git
/// working tree.
pub struct ShellRunner {
    repo_path: PathBuf,
    outputdir: PathBuf,
    commands: RunnerCommands,
    short_len: usize,
}

impl ShellRunner {
    /// Build a runner rooted at `repo_path`, depositing per-probe artifacts
    /// under `outputdir`. `short_len` controls the prefix length used for
    /// short commit ids in filenames and reports.
    pub fn new(
        repo_path: impl Into<PathBuf>,
        outputdir: impl Into<PathBuf>,
        commands: RunnerCommands,
        short_len: usize,
    ) -> Self {
        Self {
            repo_path: repo_path.into(),
            outputdir: outputdir.into(),
            commands,
            short_len,
        }
    }

    fn checkout(&self, commit: &CommitId) -> Result<(), RunnerError> {
        let status = Command::new("git")
            .arg("-C")
            .arg(&self.repo_path)
            .args(["checkout", "--quiet", "--force", commit.as_str()])
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .status_or_capture()?;
        if !status.success() {
            return Err(RunnerError::new(format!(
                "git checkout {} failed with {}",
                commit, status
            )));
        }
        Ok(())
    }

    fn run_pipeline_command(&self, command: &str) -> Result<(), RunnerError> {
        let output = Command::new("sh")
            .arg("-c")
            .arg(command)
            .current_dir(&self.repo_path)
            .output()
            .map_err(|e| RunnerError::new(format!("spawning '{command}' failed: {e}")))?;
        if !output.status.success() {
            return Err(RunnerError::new(format!(
                "'{command}' exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr)
            )));
        }
        Ok(())
    }

    fn capture_target(&self, target: &Target) -> Result<Vec<u8>, RunnerError> {
        let output = Command::new("sh")
            .arg("-c")
            .arg(&target.path)
            .current_dir(&self.repo_path)
            .output()
            .map_err(|e| RunnerError::new(format!("spawning target '{}' failed: {e}", target.path)))?;
        let mut capture = output.stdout;
        capture.extend_from_slice(&output.stderr);
        Ok(capture)
    }

    fn write_artifact(&self, short_id: &str, stub: &str, raw: &[u8]) -> Result<PathBuf, RunnerError> {
        fs::create_dir_all(&self.outputdir)
            .map_err(|e| RunnerError::new(format!("creating {}: {e}", self.outputdir.display())))?;
        let path = self.outputdir.join(format!("{short_id}.{stub}.log"));
        fs::write(&path, raw).map_err(|e| RunnerError::new(format!("writing {}: {e}", path.display())))?;
        Ok(path)
    }
}

impl Runner for ShellRunner {
    fn probe(&self, commit: &CommitId, targets: &[Target]) -> Result<Vec<ProbeResult>, RunnerError> {
        self.checkout(commit)?;

        if let Some(configure) = &self.commands.configure_command {
            self.run_pipeline_command(configure)?;
        }
        if let Some(make) = &self.commands.make_command {
            self.run_pipeline_command(make)?;
        }
        if let Some(test) = &self.commands.test_command {
            self.run_pipeline_command(test)?;
        }

        let short_id: String = commit
            .as_str()
            .chars()
            .take(self.short_len)
            .collect();

        let mut results = Vec::with_capacity(targets.len());
        for target in targets {
            let raw = self.capture_target(target)?;
            let normalized = normalize_output(&raw);
            let digest = hex::encode(Sha256::digest(&normalized));
            let output_path = self.write_artifact(&short_id, &target.stub, &raw)?;
            debug!(
                commit = %commit,
                target = %target.stub,
                digest = %digest,
                "probed commit"
            );
            results.push(ProbeResult {
                commit_id: commit.clone(),
                short_id: short_id.clone(),
                output_path,
                digest: Digest(digest),
                target_stub: target.stub.clone(),
            });
        }
        Ok(results)
    }
}

/// Strip non-content noise (wall-clock timing lines, bash `time` builtin
/// output) from a raw capture before hashing, so that the resulting digest
/// is stable across repeat invocations of an otherwise-unchanged command.
fn normalize_output(raw: &[u8]) -> Vec<u8> {
    let text = String::from_utf8_lossy(raw);
    let mut kept = String::with_capacity(text.len());
    for line in text.lines() {
        let trimmed = line.trim_end();
        if is_noise_line(trimmed) {
            continue;
        }
        kept.push_str(trimmed);
        kept.push('\n');
    }
    kept.into_bytes()
}

fn is_noise_line(line: &str) -> bool {
    let trimmed = line.trim_start();
    const TIME_PREFIXES: [&str; 3] = ["real\t", "user\t", "sys\t"];
    if TIME_PREFIXES.iter().any(|p| trimmed.starts_with(p)) {
        return true;
    }
    if trimmed.starts_with("real ") || trimmed.starts_with("user ") || trimmed.starts_with("sys ") {
        return looks_like_duration(trimmed);
    }
    false
}

fn looks_like_duration(line: &str) -> bool {
    line.split_whitespace()
        .nth(1)
        .map(|token| token.chars().all(|c| c.is_ascii_digit() || matches!(c, '.' | 'm' | 's')))
        .unwrap_or(false)
}

trait CommandExt {
    fn status_or_capture(&mut self) -> Result<std::process::ExitStatus, RunnerError>;
}

impl CommandExt for Command {
    fn status_or_capture(&mut self) -> Result<std::process::ExitStatus, RunnerError> {
        let output = self
            .output()
            .map_err(|e| RunnerError::new(format!("spawning command failed: {e}")))?;
        if !output.status.success() {
            return Err(RunnerError::new(format!(
                "command failed with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr)
            )));
        }
        Ok(output.status)
    }
}
