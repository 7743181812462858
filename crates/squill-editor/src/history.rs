//! Undo history — a linear stack of `(text, cursor)` snapshots.
//!
//! [`UndoStack::save`] is called with the *pre-edit* state right before an
//! edit applies, truncating any redo tail past the current offset. The
//! stack therefore holds the chain of states an undo walks back through;
//! the live document itself is usually not on the stack. The first undo
//! after fresh edits pushes the live state as a *redo anchor* so that
//! `undo; redo` is the identity, without the offset ever advancing past it.
//!
//! Insert-mode coalescing is the caller's concern: the editor saves only
//! the pre-session state for a whole insert-mode burst (rune, Enter, Tab,
//! Backspace micro-edits), so one undo reverts the burst and one redo
//! replays it. The editor's tests pin that behavior.
//!
//! `undo(n)` moves back up to `n` snapshots, `redo(n)` forward up to `n`,
//! both clamping at the ends. A fresh edit after an undo truncates the
//! forward tail — there is no branch history.

use crate::position::Position;

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// One undoable state: the whole document plus the cursor to restore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub text: String,
    pub cursor: Position,
}

impl Snapshot {
    #[must_use]
    pub fn new(text: impl Into<String>, cursor: Position) -> Self {
        Self {
            text: text.into(),
            cursor,
        }
    }
}

// ---------------------------------------------------------------------------
// UndoStack
// ---------------------------------------------------------------------------

/// Linear undo history with truncate-on-branch.
///
/// `offset` is the index of the last committed snapshot; `-1` means the
/// whole stack is ahead of us (everything undone).
#[derive(Debug, Default)]
pub struct UndoStack {
    entries: Vec<Snapshot>,
    offset: isize,
}

impl UndoStack {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            offset: -1,
        }
    }

    /// Number of snapshots currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when an undo would restore something.
    #[must_use]
    pub const fn can_undo(&self) -> bool {
        self.offset >= 0
    }

    /// True when a redo would advance somewhere.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.offset + 2 <= self.entries.len() as isize - 1
    }

    /// Record the pre-edit state. Truncates everything past `offset + 1`
    /// (the redo tail of an earlier undo), then appends.
    pub fn save(&mut self, snapshot: Snapshot) {
        let keep = usize::try_from(self.offset + 1)
            .unwrap_or(0)
            .min(self.entries.len());
        self.entries.truncate(keep);
        self.entries.push(snapshot);
        self.offset = self.entries.len() as isize - 1;
    }

    /// Step back up to `n` snapshots. `live` is the current document state,
    /// pushed as the redo anchor when the stack tip has no forward state
    /// yet. Returns the snapshot to restore, or `None` when there is
    /// nothing to undo.
    pub fn undo(&mut self, n: usize, live: Snapshot) -> Option<Snapshot> {
        if !self.can_undo() {
            return None;
        }

        // First undo after fresh edits: remember the live state so redo can
        // come back to it.
        if self.offset + 1 == self.entries.len() as isize
            && self.entries.last().is_some_and(|tip| *tip != live)
        {
            self.entries.push(live);
        }

        let target = (self.offset - (n.max(1) as isize - 1)).max(0) as usize;
        let snapshot = self.entries[target].clone();
        self.offset = target as isize - 1;
        Some(snapshot)
    }

    /// Step forward up to `n` snapshots, clamping at the tip. Returns the
    /// snapshot to restore, or `None` when nothing was undone.
    pub fn redo(&mut self, n: usize) -> Option<Snapshot> {
        if !self.can_redo() {
            return None;
        }

        let tip = self.entries.len() as isize - 1;
        let target = (self.offset + n.max(1) as isize + 1).min(tip) as usize;
        let snapshot = self.entries[target].clone();
        self.offset = target as isize - 1;
        Some(snapshot)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
