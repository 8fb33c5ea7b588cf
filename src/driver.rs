//! The multisection driver: the bisection state machine described in
//! spec §4.1. Drives the [`ProbeCache`] until the [`validator`] accepts
//! each target's sequence, scheduling targets round-robin so that a probe
//! performed for one target is immediately usable by the next.

use std::collections::HashMap;

use tracing::{info, warn};

use crate::cache::ProbeCache;
use crate::error::Error;
use crate::report::{self, TargetReport};
use crate::runner::Runner;
use crate::types::{CommitRange, Target};
use crate::validator;

/// The active search window for one target: `[lo, hi]` is known to contain
/// everything left to resolve; both endpoints are always already-probed
/// positions.
#[derive(Clone, Copy, Debug)]
struct Window {
    lo: usize,
    hi: usize,
}

struct TargetState {
    window: Window,
    completed: bool,
    probes_attributed: usize,
}

/// Drives one or more targets' multisection to completion against a shared
/// [`ProbeCache`].
pub struct MultisectionDriver<R: Runner> {
    range: CommitRange,
    targets: Vec<Target>,
    cache: ProbeCache,
    runner: R,
    states: HashMap<String, TargetState>,
    prepared: bool,
}

impl<R: Runner> MultisectionDriver<R> {
    /// Construct a driver over `range` and `targets`, sharing a fresh cache
    /// and driven by `runner`. Call [`prepare`](Self::prepare) before
    /// anything else.
    pub fn new(range: CommitRange, targets: Vec<Target>, runner: R) -> Self {
        let cache = ProbeCache::new(&range);
        let last = range.last_index();
        let states = targets
            .iter()
            .map(|t| {
                (
                    t.stub.clone(),
                    TargetState {
                        window: Window { lo: 0, hi: last },
                        completed: false,
                        probes_attributed: 0,
                    },
                )
            })
            .collect();
        Self {
            range,
            targets,
            cache,
            runner,
            states,
            prepared: false,
        }
    }

    /// Probe positions `0` and `N-1`, filling the cache's endpoint rows.
    /// Must be called exactly once, before any `multisect_*` call.
    pub fn prepare(&mut self) -> Result<(), Error> {
        let last = self.range.last_index();
        self.cache.ensure(0, &self.range, &self.targets, &self.runner)?;
        self.cache.ensure(last, &self.range, &self.targets, &self.runner)?;
        self.prepared = true;
        for target in &self.targets {
            self.reevaluate(&target.stub)?;
        }
        Ok(())
    }

    /// Drive every target to completion. Targets are iterated round-robin;
    /// a target that has already validated is skipped, but the shared
    /// cache still serves every other target's probes. Safe to call on an
    /// already-complete session: it then performs zero probes.
    pub fn multisect_all_targets(&mut self) -> Result<(), Error> {
        if !self.prepared {
            return Err(Error::Usage(
                "multisect_all_targets called before prepare".into(),
            ));
        }
        loop {
            let mut made_progress = false;
            let stubs: Vec<String> = self.targets.iter().map(|t| t.stub.clone()).collect();
            for stub in stubs {
                if self.states[&stub].completed {
                    continue;
                }
                self.advance(&stub)?;
                made_progress = true;
            }
            if !made_progress {
                break;
            }
        }
        Ok(())
    }

    /// `true` once every target's sequence has validated.
    pub fn all_complete(&self) -> bool {
        self.states.values().all(|s| s.completed)
    }

    /// Return each target's sparse per-commit digest view.
    pub fn multisected_outputs(&self) -> HashMap<String, crate::cache::PerTargetView<'_>> {
        self.targets
            .iter()
            .map(|t| (t.stub.clone(), self.cache.view(&self.range, &t.stub)))
            .collect()
    }

    /// Build the final transition report for every target. Errors with
    /// `UsageError` if any target has not yet completed.
    pub fn inspect_transitions(&self) -> Result<Vec<TargetReport>, Error> {
        if !self.all_complete() {
            return Err(Error::Usage(
                "inspect_transitions called before every target completed".into(),
            ));
        }
        Ok(self
            .targets
            .iter()
            .map(|t| {
                let view = self.cache.view(&self.range, &t.stub);
                report::build_target_report(&t.stub, &view)
            })
            .collect())
    }

    /// Total runner invocations made across all targets so far.
    pub fn probes_issued(&self) -> usize {
        self.cache.probes_issued()
    }

    /// Advance one target's window by exactly one step of the algorithm in
    /// §4.1, then re-evaluate the validator.
    fn advance(&mut self, stub: &str) -> Result<(), Error> {
        let Window { lo, hi } = self.states[stub].window;

        if hi - lo <= 1 {
            self.resolve_adjacent_pair(stub, lo, hi)?;
            self.reevaluate(stub)?;
            return Ok(());
        }

        let m = (lo + hi) / 2;
        self.probe_for(stub, m)?;

        let d_lo = self
            .cache
            .digest_at(lo, stub)
            .expect("lo already probed")
            .clone();
        let d_m = self
            .cache
            .digest_at(m, stub)
            .expect("m just probed")
            .clone();

        if d_m == d_lo {
            self.states.get_mut(stub).unwrap().window = Window { lo: m, hi };
        } else {
            debug_assert!(m > 0, "main branch only runs when hi - lo >= 2, so m > lo >= 0");
            self.probe_for(stub, m - 1)?;
            let d_m_minus_1 = self
                .cache
                .digest_at(m - 1, stub)
                .expect("m-1 just probed")
                .clone();

            if d_m_minus_1 == d_lo {
                let last = self.range.last_index();
                let d_last = self
                    .cache
                    .digest_at(last, stub)
                    .expect("last is always probed by prepare")
                    .clone();
                // Either way the next region to search (if any) starts at
                // `m`. If `d_m == d_last` the validator will already accept
                // on re-evaluation below and this window is never advanced
                // again; otherwise it resumes the hunt from here.
                let state = self.states.get_mut(stub).unwrap();
                state.window = Window { lo: m, hi: last };
            } else {
                let state = self.states.get_mut(stub).unwrap();
                state.window = Window { lo, hi: m };
            }
        }

        self.reevaluate(stub)
    }

    /// `hi - lo <= 1`: both endpoints are already probed, so this pair
    /// either is a single run (no transition) or a confirmed transition
    /// boundary, per the "Tie-breaking and edges" rule. If a transition is
    /// found and `hi` is not yet the end of the range, resume hunting from
    /// `(hi, N-1)`.
    fn resolve_adjacent_pair(&mut self, stub: &str, lo: usize, hi: usize) -> Result<(), Error> {
        let last = self.range.last_index();
        let d_lo = self.cache.digest_at(lo, stub).cloned();
        let d_hi = self.cache.digest_at(hi, stub).cloned();
        let (d_lo, d_hi) = match (d_lo, d_hi) {
            (Some(a), Some(b)) => (a, b),
            _ => {
                return Err(Error::InvariantViolation(format!(
                    "window endpoints ({lo}, {hi}) for target '{stub}' are not both probed"
                )))
            }
        };

        if d_lo == d_hi && hi < last {
            // By construction, a window narrows to `hi < last` only after
            // observing `digest[hi'] != digest[lo]` for the `hi'` that
            // became this `hi`; reaching an equal adjacent pair here means
            // that invariant broke somewhere upstream.
            return Err(Error::InvariantViolation(format!(
                "target '{stub}' window ({lo}, {hi}) has equal adjacent digests \
                 but hi is not the end of the range"
            )));
        }

        let state = self.states.get_mut(stub).unwrap();
        if d_lo != d_hi && hi < last {
            state.window = Window { lo: hi, hi: last };
        }
        Ok(())
    }

    fn probe_for(&mut self, stub: &str, index: usize) -> Result<(), Error> {
        let before = self.cache.probes_issued();
        self.cache.ensure(index, &self.range, &self.targets, &self.runner)?;
        if self.cache.probes_issued() > before {
            let state = self.states.get_mut(stub).unwrap();
            state.probes_attributed += 1;
            if state.probes_attributed > self.range.len() {
                return Err(Error::InvariantViolation(format!(
                    "target '{stub}' exceeded its probe safety bound of {}",
                    self.range.len()
                )));
            }
        }
        Ok(())
    }

    fn reevaluate(&mut self, stub: &str) -> Result<(), Error> {
        let view = self.cache.view(&self.range, stub);
        let valid = validator::validate(&view);
        let state = self.states.get_mut(stub).expect("known target");
        if valid && !state.completed {
            state.completed = true;
            info!(target = stub, probes_issued = self.cache.probes_issued(), "target multisected");
        } else if !valid && state.completed {
            warn!(target = stub, "validator rejected a previously-completed sequence");
            return Err(Error::InvariantViolation(format!(
                "validator rejected target '{stub}' after it had previously completed"
            )));
        }
        Ok(())
    }
}
