use crate::surface::{RasterSurface, Snapshot};

/// Per-panel undo/redo stack of full-buffer snapshots.
///
/// `cursor` always indexes the snapshot currently shown on the surface.
/// Snapshots after the cursor are the redo branch; recording a new action
/// drops them.
#[derive(Debug, Clone)]
pub struct SnapshotHistory {
    snapshots: Vec<Snapshot>,
    cursor: usize,
}

impl SnapshotHistory {
    /// Creates a history seeded with the surface's current (initial) state
    pub fn new(surface: &RasterSurface) -> Self {
        Self {
            snapshots: vec![surface.snapshot()],
            cursor: 0,
        }
    }

    /// Records the surface's current state as a new action
    pub fn record(&mut self, surface: &RasterSurface) {
        if self.cursor + 1 < self.snapshots.len() {
            let dropped = self.snapshots.len() - self.cursor - 1;
            log::debug!("Discarding {} redo snapshot(s)", dropped);
            self.snapshots.truncate(self.cursor + 1);
        }
        self.snapshots.push(surface.snapshot());
        self.cursor = self.snapshots.len() - 1;
    }

    /// Steps back one snapshot and restores it. Returns false at the oldest snapshot.
    pub fn undo(&mut self, surface: &mut RasterSurface) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        surface.restore(&self.snapshots[self.cursor])
    }

    /// Steps forward one snapshot and restores it. Returns false at the newest snapshot.
    pub fn redo(&mut self, surface: &mut RasterSurface) -> bool {
        if self.cursor + 1 >= self.snapshots.len() {
            return false;
        }
        self.cursor += 1;
        surface.restore(&self.snapshots[self.cursor])
    }

    /// Returns true if there are snapshots before the cursor
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    /// Returns true if there are snapshots after the cursor
    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Never true: the initial snapshot is always present
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// The snapshot the surface is expected to show
    pub fn current(&self) -> &Snapshot {
        &self.snapshots[self.cursor]
    }
}
