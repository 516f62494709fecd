//! Per-page engine snapshots enabling drawing to resume after a replay.

use std::collections::HashMap;

/// Opaque engine-resumable state captured when a page stops being the live
/// drawing target. The core never interprets the bytes; only the engine that
/// produced a snapshot can restore it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSnapshot(pub Vec<u8>);

/// Holds at most one snapshot per page index.
///
/// Snapshots are created or overwritten on page switch, and discarded when
/// their page is removed or the device is cleared.
#[derive(Debug, Default)]
pub struct History {
    snapshots: HashMap<usize, EngineSnapshot>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores (or overwrites) the snapshot for `index`.
    pub fn record(&mut self, index: usize, snapshot: EngineSnapshot) {
        self.snapshots.insert(index, snapshot);
    }

    /// Snapshot for `index`, if one was recorded.
    pub fn snapshot(&self, index: usize) -> Option<&EngineSnapshot> {
        self.snapshots.get(&index)
    }

    /// Drops the snapshot for a removed page.
    pub fn discard(&mut self, index: usize) {
        self.snapshots.remove(&index);
    }

    /// Drops every snapshot.
    pub fn discard_all(&mut self) {
        self.snapshots.clear();
    }

    /// Number of held snapshots.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// True when no snapshot is held.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}
