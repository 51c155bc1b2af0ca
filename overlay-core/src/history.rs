//! Snapshot-based linear undo/redo history.
//!
//! Every checkpoint is an owned structural clone of the document. Restores
//! hand back another clone, so the live document never shares storage with
//! a history slot.

use crate::GraphicDocument;

/// Default maximum number of snapshots kept.
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// Linear history of document snapshots.
#[derive(Debug, Clone)]
pub struct History {
    /// Snapshots, oldest first.
    entries: Vec<GraphicDocument>,
    /// Position of the snapshot matching the live document.
    index: usize,
    /// Maximum number of snapshots kept.
    capacity: usize,
}

impl History {
    /// Create a history seeded with `initial` as its only checkpoint.
    #[must_use]
    pub fn new(initial: &GraphicDocument) -> Self {
        Self::with_capacity(initial, DEFAULT_HISTORY_CAPACITY)
    }

    /// Create a history with a custom snapshot limit (at least 1).
    #[must_use]
    pub fn with_capacity(initial: &GraphicDocument, capacity: usize) -> Self {
        Self {
            entries: vec![initial.clone()],
            index: 0,
            capacity: capacity.max(1),
        }
    }

    /// Push a checkpoint of `document`.
    ///
    /// Discards any redo tail beyond the current index, then evicts the
    /// oldest snapshot if the limit is exceeded.
    pub fn checkpoint(&mut self, document: &GraphicDocument) {
        self.entries.truncate(self.index + 1);
        self.entries.push(document.clone());
        if self.entries.len() > self.capacity {
            let excess = self.entries.len() - self.capacity;
            self.entries.drain(..excess);
            tracing::trace!("History full, evicted {excess} oldest snapshot(s)");
        }
        self.index = self.entries.len() - 1;
    }

    /// Step back one snapshot and return a copy of it.
    ///
    /// Returns `None` at the oldest snapshot.
    pub fn undo(&mut self) -> Option<GraphicDocument> {
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        Some(self.entries[self.index].clone())
    }

    /// Step forward one snapshot and return a copy of it.
    ///
    /// Returns `None` at the newest snapshot.
    pub fn redo(&mut self) -> Option<GraphicDocument> {
        if self.index + 1 >= self.entries.len() {
            return None;
        }
        self.index += 1;
        Some(self.entries[self.index].clone())
    }

    /// Check if undo is available.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    /// Check if redo is available.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    /// Number of stored snapshots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; a history holds at least its seed snapshot.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index of the current snapshot.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Read-only access to a snapshot.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&GraphicDocument> {
        self.entries.get(index)
    }
}
