//! The probe cache: an indexed memoization layer keyed by commit position.
//!
//! Grounded on the at-most-once-fill discipline of a page cache — a row,
//! once filled, is never replaced — but specialized to the shape the
//! design calls for: an `Option<ProbeRow>` per position rather than an
//! eviction-capable LRU, since every probed commit must stay resident for
//! the lifetime of a session.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::error::Error;
use crate::runner::{ProbeResult, Runner};
use crate::types::{CommitId, CommitRange, Digest, Target};

/// One commit position's full set of per-target results, or unvisited.
pub type ProbeRow = HashMap<String, ProbeResult>;

/// A single defined entry in a [`PerTargetView`].
#[derive(Clone, Debug)]
pub struct ViewEntry<'a> {
    /// Position in the commit range.
    pub index: usize,
    /// The commit at that position.
    pub commit_id: &'a CommitId,
    /// The short id recorded by the runner.
    pub short_id: &'a str,
    /// The normalized content digest.
    pub digest: &'a Digest,
    /// Path to the runner's output artifact.
    pub output_path: &'a std::path::Path,
}

/// A sparse, read-only projection of the cache onto one target's digests.
/// Position `i` is defined iff `Cache[i]` has been filled.
pub struct PerTargetView<'a> {
    entries: Vec<Option<ViewEntry<'a>>>,
}

impl<'a> PerTargetView<'a> {
    /// Total length of the view, equal to the commit range length `N`.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// A view is never built over an empty range.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entry at `i`, if that position has been probed.
    pub fn get(&self, i: usize) -> Option<&ViewEntry<'a>> {
        self.entries[i].as_ref()
    }

    /// Iterate `(index, entry)` pairs over defined positions only, in
    /// ascending index order.
    pub fn defined(&self) -> impl Iterator<Item = (usize, &ViewEntry<'a>)> {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(i, e)| e.as_ref().map(|e| (i, e)))
    }
}

/// Memoizes [`Runner::probe`] calls by commit position. Guarantees at most
/// one call to the runner per position for the lifetime of the cache.
pub struct ProbeCache {
    rows: Vec<Option<ProbeRow>>,
    probes_issued: usize,
}

impl ProbeCache {
    /// Build an empty cache sized to the commit range.
    pub fn new(range: &CommitRange) -> Self {
        Self {
            rows: vec![None; range.len()],
            probes_issued: 0,
        }
    }

    /// Total number of runner invocations made through this cache so far.
    pub fn probes_issued(&self) -> usize {
        self.probes_issued
    }

    /// `true` if position `i` has already been filled (by this call or an
    /// earlier one, possibly for a different target).
    pub fn is_filled(&self, i: usize) -> bool {
        self.rows[i].is_some()
    }

    /// Ensure position `i` is filled, invoking the runner at most once. On
    /// a cache hit, no runner call is made regardless of which target
    /// originally triggered the fill — every configured target is always
    /// probed together in a single call (§4.2).
    pub fn ensure(
        &mut self,
        i: usize,
        range: &CommitRange,
        targets: &[Target],
        runner: &dyn Runner,
    ) -> Result<&ProbeRow, Error> {
        if self.rows[i].is_none() {
            let commit = range.commit_at(i);
            debug!(index = i, commit = %commit, "cache miss, invoking runner");
            let results = runner.probe(commit, targets).map_err(|e| Error::Probe {
                short_id: commit.to_string(),
                target: targets
                    .iter()
                    .map(|t| t.stub.as_str())
                    .collect::<Vec<_>>()
                    .join(","),
                reason: e.reason,
            })?;
            let mut row = ProbeRow::with_capacity(results.len());
            for result in results {
                row.insert(result.target_stub.clone(), result);
            }
            self.rows[i] = Some(row);
            self.probes_issued += 1;
            info!(index = i, total_probes = self.probes_issued, "probe complete");
        } else {
            debug!(index = i, "cache hit");
        }
        Ok(self.rows[i].as_ref().expect("just filled"))
    }

    /// The digest at position `i` for `stub`, if that position is filled.
    /// Cheap, allocation-free lookup used by the driver's bisection step,
    /// which only ever reads positions it has already `ensure`d.
    pub fn digest_at(&self, i: usize, stub: &str) -> Option<&Digest> {
        self.rows[i].as_ref()?.get(stub).map(|r| &r.digest)
    }

    /// Project the cache onto one target's sparse digest sequence.
    pub fn view<'a>(&'a self, range: &'a CommitRange, stub: &str) -> PerTargetView<'a> {
        let entries = self
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                row.as_ref().and_then(|row| row.get(stub)).map(|result| ViewEntry {
                    index: i,
                    commit_id: range.commit_at(i),
                    short_id: &result.short_id,
                    digest: &result.digest,
                    output_path: &result.output_path,
                })
            })
            .collect();
        PerTargetView { entries }
    }
}
