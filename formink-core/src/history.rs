//! Undo/redo history.
//!
//! Two strategies share this one stack: the operation-log strategy snapshots
//! the structured [`AnnotationList`](crate::annotation::AnnotationList) on
//! every commit and replays it, while the raster-snapshot strategy snapshots
//! the composited surface and blits it back. The stack is generic over the
//! snapshot type, so both are the same code with different `T`.
//!
//! The raster strategy is lossy: after a restore the annotations exist only
//! as pixels and can no longer be edited as structured data. That is a
//! deliberate tradeoff (it can also capture non-reproducible raster
//! provenance, like a previously exported page), not a bug; new documents
//! default to the operation log.

use serde::{Deserialize, Serialize};

/// Which history strategy a document uses. Fixed for the document's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HistoryStrategy {
    /// Snapshot the structured annotation list; undo/redo replays it.
    #[default]
    OperationLog,
    /// Snapshot the composited raster surface; undo/redo blits it back.
    RasterSnapshot,
}

/// Maximum stack depth for the raster-snapshot strategy.
pub const RASTER_HISTORY_DEPTH: usize = 25;

impl HistoryStrategy {
    /// The stack depth bound for this strategy, if any.
    #[must_use]
    pub fn depth_bound(self) -> Option<usize> {
        match self {
            Self::OperationLog => None,
            Self::RasterSnapshot => Some(RASTER_HISTORY_DEPTH),
        }
    }
}

/// A bounded snapshot stack with a cursor.
///
/// Committing while the cursor is not at the tail discards every entry after
/// the cursor (redo entries never survive a new mutation). Undo at the
/// bottom and redo at the top are no-ops, not errors.
#[derive(Debug, Clone)]
pub struct History<T> {
    entries: Vec<T>,
    /// Index of the current entry, when any entries exist.
    cursor: usize,
    capacity: Option<usize>,
}

impl<T> Default for History<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> History<T> {
    /// Create an unbounded history (operation-log strategy).
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            cursor: 0,
            capacity: None,
        }
    }

    /// Create a history that keeps at most `capacity` snapshots, evicting
    /// the oldest on overflow (raster-snapshot strategy).
    #[must_use]
    pub fn bounded(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            cursor: 0,
            capacity: Some(capacity.max(1)),
        }
    }

    /// Create a history sized per `strategy`.
    #[must_use]
    pub fn for_strategy(strategy: HistoryStrategy) -> Self {
        match strategy.depth_bound() {
            Some(depth) => Self::bounded(depth),
            None => Self::new(),
        }
    }

    /// Push a snapshot, truncating redo entries first and evicting the
    /// oldest entry if the capacity bound is exceeded.
    pub fn commit(&mut self, state: T) {
        if !self.entries.is_empty() {
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push(state);

        if let Some(cap) = self.capacity {
            if self.entries.len() > cap {
                self.entries.remove(0);
            }
        }
        self.cursor = self.entries.len() - 1;
    }

    /// Step the cursor back and return the restored snapshot, or `None` at
    /// the bottom of the stack.
    pub fn undo(&mut self) -> Option<&T> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor)
    }

    /// Step the cursor forward and return the restored snapshot, or `None`
    /// at the top of the stack.
    pub fn redo(&mut self) -> Option<&T> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        self.entries.get(self.cursor)
    }

    /// The snapshot at the cursor, if any commit has happened.
    #[must_use]
    pub fn current(&self) -> Option<&T> {
        self.entries.get(self.cursor)
    }

    /// Whether an undo step is available.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    /// Whether a redo step is available.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.entries.is_empty() && self.cursor + 1 < self.entries.len()
    }

    /// Number of snapshots currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the stack holds no snapshots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
