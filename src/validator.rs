//! The sequence validator: a pure predicate over a sparse digest sequence
//! that decides whether the defined entries are consistent with a
//! completed multisection for one target.
//!
//! See spec §4.3 for the grammar. The validator never mutates anything and
//! never calls the runner; the driver re-evaluates it after every cache
//! update (§9 — "implicit completion flag via re-validation").

use crate::cache::PerTargetView;

/// Returns `true` iff `view` parses under the run grammar: positions 0 and
/// `N-1` are defined, consecutive defined entries with equal digests belong
/// to the same run, no digest value recurs once a later run has begun, and
/// every run boundary is witnessed by a literally-adjacent probed pair
/// (`index == previous_index + 1`) — a value change across a wider,
/// partly-unprobed gap could be hiding any number of intermediate
/// transitions and must not be accepted as a single confirmed one.
pub fn validate(view: &PerTargetView<'_>) -> bool {
    run_boundaries(view).is_some()
}

/// The number of equivalence runs a valid sequence parses into. Panics if
/// `view` does not validate; callers should check [`validate`] first (the
/// driver always does, via re-evaluation after each probe).
pub fn run_count(view: &PerTargetView<'_>) -> usize {
    run_boundaries(view)
        .expect("run_count called on a non-validating view")
        .len()
}

/// Parse `view` into its run boundaries (the index of each run's first
/// defined position), or `None` if the grammar rejects it. Internal: both
/// [`validate`] and [`run_count`] are thin wrappers over this.
fn run_boundaries(view: &PerTargetView<'_>) -> Option<Vec<usize>> {
    if view.is_empty() {
        return None;
    }
    if view.get(0).is_none() || view.get(view.len() - 1).is_none() {
        return None;
    }

    let mut boundaries = Vec::new();
    let mut seen_values: Vec<String> = Vec::new();
    let mut current: Option<(usize, &str)> = None;

    for (index, entry) in view.defined() {
        let digest = entry.digest.as_str();
        match current {
            Some((_, v)) if v == digest => {
                current = Some((index, digest));
            }
            Some((prev_index, _)) => {
                // A value change is only a confirmed transition when the
                // two differing positions are literally adjacent; anything
                // wider could be concealing an arbitrary number of hidden
                // transitions in the unprobed interior.
                if index != prev_index + 1 {
                    return None;
                }
                if seen_values.iter().any(|seen| seen == digest) {
                    return None;
                }
                seen_values.push(digest.to_string());
                boundaries.push(index);
                current = Some((index, digest));
            }
            None => {
                seen_values.push(digest.to_string());
                boundaries.push(index);
                current = Some((index, digest));
            }
        }
    }

    if boundaries.is_empty() {
        None
    } else {
        Some(boundaries)
    }
}
