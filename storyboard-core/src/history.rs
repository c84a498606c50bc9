//! # History
//!
//! A bounded, linear undo/redo stack. Each entry is a complete state (for layers, a buffer
//! [`Snapshot`](crate::buffer::Snapshot)), and a cursor marks which entry is the present.
//!
//! Pushing while some entries have been undone discards them - there is no branching. Once the
//! stack holds more than its limit, the oldest entry is dropped for good.

use std::collections::VecDeque;
use std::num::NonZeroUsize;

/// Maximum number of entries kept per layer, including the initial state.
pub const MAX_ENTRIES: usize = 50;

#[derive(Clone)]
pub struct History<T> {
    /// Never empty.
    entries: VecDeque<T>,
    /// Invariant: `cursor < entries.len()`
    cursor: usize,
    limit: NonZeroUsize,
}
impl<T> History<T> {
    /// Start a history whose only entry is `initial`, holding at most [`MAX_ENTRIES`].
    #[must_use]
    pub fn new(initial: T) -> Self {
        // Unwrap ok - constant is nonzero.
        Self::with_limit(initial, NonZeroUsize::new(MAX_ENTRIES).unwrap())
    }
    #[must_use]
    pub fn with_limit(initial: T, limit: NonZeroUsize) -> Self {
        let mut entries = VecDeque::with_capacity(limit.get().min(8));
        entries.push_back(initial);
        Self {
            entries,
            cursor: 0,
            limit,
        }
    }
    /// Record a new present state.
    ///
    /// Any undone entries past the cursor are discarded first. If this brings the length over
    /// the limit, the oldest entry is evicted and the cursor shifts with it, so the new entry
    /// stays the present.
    pub fn push(&mut self, entry: T) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push_back(entry);
        self.cursor += 1;

        while self.entries.len() > self.limit.get() {
            self.entries.pop_front();
            self.cursor -= 1;
        }
    }
    /// Step back one entry, returning the new present. `None` if already at the oldest entry.
    pub fn undo(&mut self) -> Option<&T> {
        self.cursor = self.cursor.checked_sub(1)?;
        Some(self.current())
    }
    /// Step forward one entry, returning the new present. `None` if already at the newest entry.
    pub fn redo(&mut self) -> Option<&T> {
        if self.can_redo() {
            self.cursor += 1;
            Some(self.current())
        } else {
            None
        }
    }
    /// The present entry.
    #[must_use]
    pub fn current(&self) -> &T {
        // Cursor is always in bounds.
        &self.entries[self.cursor]
    }
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }
    /// Number of entries, including any that have been undone. Never zero.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    /// Always `false`, provided for symmetry with [`Self::len`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
    /// Index of the present entry.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }
    #[must_use]
    pub fn limit(&self) -> NonZeroUsize {
        self.limit
    }
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &T> + '_ {
        self.entries.iter()
    }
}
