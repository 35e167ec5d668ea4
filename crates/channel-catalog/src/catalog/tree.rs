//! Subchannel graph traversal.

use crate::error::{Error, Result};
use crate::storage::StoreRead;
use std::collections::{BTreeSet, HashSet};

/// Whether `target` is reachable from `start` through subchannel edges.
///
/// A channel reaches itself. Dangling references are ignored.
pub(crate) fn reaches<R: StoreRead>(store: &R, start: u64, target: u64) -> Result<bool> {
    let mut stack = vec![start];
    let mut seen = HashSet::new();

    while let Some(id) = stack.pop() {
        if id == target {
            return Ok(true);
        }
        if !seen.insert(id) {
            continue;
        }
        if let Some(channel) = store.get_channel(id)? {
            stack.extend(channel.subchannels.iter().copied());
        }
    }

    Ok(false)
}

/// Reject any `parent -> child` edge that would close a cycle.
pub(crate) fn check_new_edges<R: StoreRead>(
    store: &R,
    parent: u64,
    children: &BTreeSet<u64>,
) -> Result<()> {
    for &child in children {
        if reaches(store, child, parent)? {
            return Err(Error::CycleDetected { parent, child });
        }
    }
    Ok(())
}
