//! Effective assignee resolution.
//!
//! A pinned assignee wins unless they are on vacation. Otherwise the chore
//! rotates round-robin over the persons not on vacation, indexed by the
//! chore's rotation counter.

use crate::config::ChoreConfig;
use crate::store::ChoreRuntimeState;

/// Resolve who is responsible for `chore` right now.
///
/// `persons` must be in a stable order (the coordinator sorts it) for the
/// rotation to be reproducible. Returns `None` when every person is on
/// vacation or the roster is empty.
#[must_use]
pub fn get_effective_assignee(
    chore: &ChoreConfig,
    runtime: &ChoreRuntimeState,
    persons: &[String],
    vacation: &[String],
) -> Option<String> {
    let active: Vec<&String> = persons.iter().filter(|p| !vacation.contains(p)).collect();
    if active.is_empty() {
        return None;
    }

    if let Some(pinned) = chore.pinned_assignee() {
        if !vacation.iter().any(|v| v == pinned) {
            return Some(pinned.to_owned());
        }
    }

    let slot = (runtime.rotation_index % active.len() as u64) as usize;
    active.get(slot).map(|p| (*p).clone())
}
