//! Linear undo/redo history for the drawing surface.
//!
//! The model is a flat list of full-surface snapshots plus a cursor.
//! Cursor `-1` denotes the pristine background before the first edit; every
//! push truncates the redo tail, so the history never branches. Snapshots
//! are full pixel buffers, so total bytes are capped and the oldest entries
//! are pruned once the cap is exceeded.

use image::RgbaImage;

/// Snapshot memory budget. At 800×600 RGBA this holds ~50 undo steps.
const MAX_HISTORY_BYTES: usize = 100 * 1024 * 1024;

/// What produced a snapshot. Consecutive `Background` entries coalesce so a
/// drag inside the color picker stays a single undo step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SnapshotKind {
    /// A pen/eraser stroke or a clear.
    Draw,
    /// An imported image composited onto the surface.
    Image,
    /// A background recolor.
    Background,
}

/// Immutable capture of the full pixel buffer at one point in time.
#[derive(Clone)]
pub struct RasterSnapshot {
    pub pixels: RgbaImage,
    pub kind: SnapshotKind,
}

impl RasterSnapshot {
    pub fn new(pixels: RgbaImage, kind: SnapshotKind) -> Self {
        Self { pixels, kind }
    }

    fn byte_size(&self) -> usize {
        self.pixels.as_raw().len()
    }
}

/// Ordered snapshots plus a cursor, always within `[-1, len-1]`.
pub struct HistoryStack {
    snapshots: Vec<RasterSnapshot>,
    cursor: isize,
    max_bytes: usize,
}

impl Default for HistoryStack {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryStack {
    pub fn new() -> Self {
        Self::with_max_bytes(MAX_HISTORY_BYTES)
    }

    pub fn with_max_bytes(max_bytes: usize) -> Self {
        Self {
            snapshots: Vec::new(),
            cursor: -1,
            max_bytes,
        }
    }

    /// Append a snapshot, discarding any redo-able entries past the cursor,
    /// then prune the oldest entries past the memory budget.
    pub fn push(&mut self, snapshot: RasterSnapshot) {
        self.snapshots.truncate((self.cursor + 1) as usize);
        self.snapshots.push(snapshot);
        self.cursor = self.snapshots.len() as isize - 1;
        self.prune();
    }

    /// Swap the entry at the cursor for `snapshot`, dropping any redo tail.
    /// With the cursor at `-1` this degenerates to a plain push.
    pub fn replace_current(&mut self, snapshot: RasterSnapshot) {
        if self.cursor < 0 {
            self.push(snapshot);
            return;
        }
        self.snapshots.truncate((self.cursor + 1) as usize);
        self.snapshots[self.cursor as usize] = snapshot;
    }

    /// Drop the oldest snapshots until the total fits the budget. The entry
    /// at the cursor is never dropped, so undo loses depth before it loses
    /// the present.
    fn prune(&mut self) {
        let mut total: usize = self.snapshots.iter().map(RasterSnapshot::byte_size).sum();
        while total > self.max_bytes && self.cursor > 0 {
            total -= self.snapshots[0].byte_size();
            self.snapshots.remove(0);
            self.cursor -= 1;
        }
    }

    pub fn can_undo(&self) -> bool {
        self.cursor >= 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.snapshots.len() as isize - 1
    }

    /// Move the cursor back one step. Returns `false` at the lower boundary
    /// (a silent no-op, not an error).
    pub fn undo(&mut self) -> bool {
        if !self.can_undo() {
            return false;
        }
        self.cursor -= 1;
        true
    }

    /// Move the cursor forward one step. Returns `false` at the upper boundary.
    pub fn redo(&mut self) -> bool {
        if !self.can_redo() {
            return false;
        }
        self.cursor += 1;
        true
    }

    /// The snapshot at the cursor, or `None` when the cursor sits before the
    /// first entry (the surface should show the pristine background).
    pub fn current(&self) -> Option<&RasterSnapshot> {
        if self.cursor < 0 {
            None
        } else {
            self.snapshots.get(self.cursor as usize)
        }
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn cursor(&self) -> isize {
        self.cursor
    }
}
