//! The document buffer.
//!
//! Owns the text and its two-level span structure `lines[row][col]`, keeps
//! them in lockstep, and drives the background motion indexing: every
//! [`set_text`](Buffer::set_text) re-segments all lines, bumps the edit
//! generation, clears the index map, and respawns the word-kind workers
//! with a snapshot.
//!
//! Splicing goes through [`replace_text`](Buffer::replace_text), which
//! normalizes the range to row-major order, validates it, and returns the
//! removed substring so operators can hand exactly the deleted text to the
//! clipboard. Reading goes through [`get_text`](Buffer::get_text), whose
//! range is *inclusive* of the `until` column — the convention visual-mode
//! selections use, with the sentinel reading as the line break.
//!
//! All cursor math bottoms out in [`max_col`](Buffer::max_col) /
//! [`clamp`](Buffer::clamp): the rightmost legal column is
//! `len(spans) - 2 + block_offset`, where the mode's block offset says
//! whether the sentinel slot is reachable.

use std::sync::Arc;

use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;
use tracing::debug;

use crate::motion::MotionIndex;
use crate::position::Position;
use crate::span::{SpanLine, DEFAULT_TAB_WIDTH};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A caller-supplied cursor outside the document. Internal editing never
/// produces this — the editor clamps before calling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BufferError {
    #[error("position {0} is outside the document")]
    OutOfBounds(Position),
}

fn non_whitespace() -> &'static Regex {
    static RG: OnceLock<Regex> = OnceLock::new();
    RG.get_or_init(|| Regex::new(r"\S").expect("non-whitespace regex"))
}

// ---------------------------------------------------------------------------
// Buffer
// ---------------------------------------------------------------------------

/// The document: text, span lines, and the motion-index machinery.
#[derive(Debug)]
pub struct Buffer {
    text: String,
    lines: Vec<SpanLine>,
    index: MotionIndex,
    tab_width: usize,
    one_line: bool,
}

impl Buffer {
    /// An empty multi-line buffer with the default tab width.
    #[must_use]
    pub fn new() -> Self {
        let mut buffer = Self {
            text: String::new(),
            lines: Vec::new(),
            index: MotionIndex::new(),
            tab_width: DEFAULT_TAB_WIDTH,
            one_line: false,
        };
        buffer.set_text("");
        buffer
    }

    /// An empty one-line buffer (prompt mode): any newline-bearing input is
    /// truncated to its first line.
    #[must_use]
    pub fn new_one_line() -> Self {
        let mut buffer = Self::new();
        buffer.one_line = true;
        buffer
    }

    /// Change the tab width. Takes effect on the next re-segmentation.
    pub fn set_tab_width(&mut self, tab_width: usize) {
        self.tab_width = tab_width.max(1);
        let text = self.text.clone();
        self.set_text(&text);
    }

    #[must_use]
    pub const fn tab_width(&self) -> usize {
        self.tab_width
    }

    #[must_use]
    pub const fn is_one_line(&self) -> bool {
        self.one_line
    }

    // -- Access --------------------------------------------------------------

    /// The whole document.
    #[inline]
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// All segmented lines. Never empty — an empty document is one empty
    /// line.
    #[inline]
    #[must_use]
    pub fn lines(&self) -> &[SpanLine] {
        &self.lines
    }

    /// One line's spans.
    #[inline]
    #[must_use]
    pub fn line(&self, row: usize) -> Option<&SpanLine> {
        self.lines.get(row)
    }

    /// Number of rows. Always at least 1.
    #[inline]
    #[must_use]
    pub fn rows(&self) -> usize {
        self.lines.len()
    }

    /// The motion-index handle shared with the workers.
    #[inline]
    #[must_use]
    pub const fn index(&self) -> &MotionIndex {
        &self.index
    }

    /// Span count of the widest line (the off-row column sentinel for
    /// backward index scans).
    #[must_use]
    pub fn widest_col(&self) -> usize {
        self.lines.iter().map(SpanLine::len).max().unwrap_or(1)
    }

    // -- Cursor bounds -------------------------------------------------------

    /// Rightmost legal column on `row` given the mode's block offset.
    #[must_use]
    pub fn max_col(&self, row: usize, block_offset: usize) -> usize {
        let len = self.lines.get(row).map_or(1, SpanLine::len) as isize;
        (len - 2 + block_offset as isize).max(0) as usize
    }

    /// Clamp a position into the document under the given block offset.
    #[must_use]
    pub fn clamp(&self, pos: Position, block_offset: usize) -> Position {
        let row = pos.row.min(self.rows() - 1);
        Position::new(row, pos.col.min(self.max_col(row, block_offset)))
    }

    /// True when the position addresses an existing span slot (sentinel
    /// included).
    #[must_use]
    pub fn contains(&self, pos: Position) -> bool {
        self.lines
            .get(pos.row)
            .is_some_and(|line| pos.col < line.len())
    }

    /// Column of the first non-whitespace grapheme on `row` (0 when the
    /// line is blank).
    #[must_use]
    pub fn first_non_whitespace_col(&self, row: usize) -> usize {
        let Some(line) = self.lines.get(row) else {
            return 0;
        };
        let text = line.text();
        match non_whitespace().find(&text) {
            Some(m) => line.byte_to_col_mapper()[m.start()],
            None => 0,
        }
    }

    /// Sticky-column vertical targeting: the cursor position on
    /// `target_row` whose printable x does not exceed the current cursor's
    /// printable x. Rows clamp into the document; columns clamp to the
    /// rightmost legal column for the block offset.
    #[must_use]
    pub fn line_cursor(
        &self,
        current: Position,
        target_row: isize,
        block_offset: usize,
    ) -> Position {
        let row = target_row.clamp(0, self.rows() as isize - 1) as usize;

        let current_width = self
            .lines
            .get(current.row)
            .map_or(0, |line| line.x_at(current.col.min(line.sentinel_col())));

        let target = &self.lines[row];
        let max_offset = (target.len() as isize - 2 + block_offset as isize).max(0) as usize;

        let mut col = 0;
        let mut width = 0;
        for span in target.spans().iter().take(max_offset) {
            if span.is_sentinel() || width + span.width > current_width {
                break;
            }
            col += 1;
            width += span.width;
        }

        Position::new(row, col)
    }

    // -- Editing -------------------------------------------------------------

    /// Replace the entire document. Re-segments every line, bumps the edit
    /// generation, clears the motion indexes, and respawns the word-kind
    /// workers with a snapshot. In one-line mode the text is truncated at
    /// the first newline.
    pub fn set_text(&mut self, text: &str) {
        let text = if self.one_line {
            text.split('\n').next().unwrap_or_default()
        } else {
            text
        };

        let generation = self.index.bump_generation();
        self.text = text.to_string();
        self.lines = self
            .text
            .split('\n')
            .map(|line| SpanLine::segment(line, self.tab_width))
            .collect();
        debug!(generation, rows = self.lines.len(), "buffer set_text");

        self.index.clear();
        self.index.spawn_word_workers(
            generation,
            Arc::new(self.text.clone()),
            Arc::new(self.lines.clone()),
        );
    }

    /// Splice `s` over `[from, until)` (row-major order enforced here) and
    /// re-segment. Returns the removed substring.
    ///
    /// # Errors
    ///
    /// [`BufferError::OutOfBounds`] when either position addresses a
    /// nonexistent span slot.
    pub fn replace_text(
        &mut self,
        s: &str,
        from: Position,
        until: Position,
    ) -> Result<String, BufferError> {
        let (from, until) = Position::ordered(from, until);
        for pos in [from, until] {
            if !self.contains(pos) {
                return Err(BufferError::OutOfBounds(pos));
            }
        }

        let removed = self.slice_exclusive(from, until);

        let old_lines: Vec<&str> = self.text.split('\n').collect();
        let mut b = String::with_capacity(self.text.len() + s.len());

        // Lines before the splice.
        for line in &old_lines[..from.row] {
            b.push_str(line);
            b.push('\n');
        }
        // From-row prefix, the new text, then the until-row suffix.
        for span in &self.lines[from.row].spans()[..from.col] {
            b.push_str(&span.cluster);
        }
        b.push_str(s);
        for span in &self.lines[until.row].spans()[until.col..] {
            b.push_str(&span.cluster);
        }
        if until.row < old_lines.len() - 1 {
            b.push('\n');
        }
        // Lines after the splice.
        for (i, line) in old_lines.iter().enumerate().skip(until.row + 1) {
            b.push_str(line);
            if i < old_lines.len() - 1 {
                b.push('\n');
            }
        }

        self.set_text(&b);
        Ok(removed)
    }

    /// The text between two positions, *inclusive* of the `until` column.
    /// Sentinels read as `"\n"`. Positions are clamped into the document.
    #[must_use]
    pub fn get_text(&self, from: Position, until: Position) -> String {
        let (from, until) = Position::ordered(from, until);
        let from = self.clamp_to_sentinel(from);
        let until = self.clamp_to_sentinel(until);

        let mut b = String::new();
        for (i, line) in self.lines[from.row..=until.row].iter().enumerate() {
            let row = from.row + i;
            for (col, span) in line.spans().iter().enumerate() {
                if row == from.row && col < from.col {
                    continue;
                }
                if row == until.row && col > until.col {
                    continue;
                }
                if span.is_sentinel() {
                    b.push('\n');
                } else {
                    b.push_str(&span.cluster);
                }
            }
        }

        b
    }

    /// The exclusive `[from, until)` slice — exactly what
    /// [`replace_text`](Self::replace_text) removes.
    fn slice_exclusive(&self, from: Position, until: Position) -> String {
        if from == until {
            return String::new();
        }

        let mut b = String::new();
        if from.row == until.row {
            for span in &self.lines[from.row].spans()[from.col..until.col] {
                b.push_str(&span.cluster);
            }
            return b;
        }

        for span in &self.lines[from.row].spans()[from.col..] {
            b.push_str(&span.cluster);
        }
        b.push('\n');
        for line in &self.lines[from.row + 1..until.row] {
            b.push_str(&line.text());
            b.push('\n');
        }
        for span in &self.lines[until.row].spans()[..until.col] {
            b.push_str(&span.cluster);
        }
        b
    }

    fn clamp_to_sentinel(&self, pos: Position) -> Position {
        let row = pos.row.min(self.rows() - 1);
        Position::new(row, pos.col.min(self.lines[row].sentinel_col()))
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::MotionKind;

    fn buffer(text: &str) -> Buffer {
        let mut b = Buffer::new();
        b.set_text(text);
        b
    }

    fn p(row: usize, col: usize) -> Position {
        Position::new(row, col)
    }

    // -- Construction & segmentation ------------------------------------------

    #[test]
    fn empty_document_is_one_empty_line() {
        let b = Buffer::new();
        assert_eq!(b.rows(), 1);
        assert!(b.line(0).unwrap().is_empty());
    }

    #[test]
    fn lines_follow_text() {
        let b = buffer("foo\nbar");
        assert_eq!(b.rows(), 2);
        assert_eq!(b.line(0).unwrap().text(), "foo");
        assert_eq!(b.line(1).unwrap().text(), "bar");
    }

    #[test]
    fn one_line_mode_truncates_at_newline() {
        let mut b = Buffer::new_one_line();
        b.set_text("first\nsecond\nthird");
        assert_eq!(b.text(), "first");
        assert_eq!(b.rows(), 1);
    }

    #[test]
    fn byte_sums_match_line_lengths() {
        let b = buffer("héllo\nwörld 中文");
        for (row, line) in b.lines().iter().enumerate() {
            let text: &str = b.text().split('\n').nth(row).unwrap();
            assert_eq!(line.byte_len(), text.len());
        }
    }

    // -- max_col / clamp -------------------------------------------------------

    #[test]
    fn max_col_excludes_sentinel_in_normal() {
        let b = buffer("abc");
        assert_eq!(b.max_col(0, 0), 2);
        assert_eq!(b.max_col(0, 1), 3); // sentinel reachable
    }

    #[test]
    fn max_col_on_empty_line_is_zero() {
        let b = buffer("");
        assert_eq!(b.max_col(0, 0), 0);
        assert_eq!(b.max_col(0, 1), 0);
    }

    #[test]
    fn clamp_snaps_row_and_col() {
        let b = buffer("abc\nde");
        assert_eq!(b.clamp(p(9, 9), 0), p(1, 1));
        assert_eq!(b.clamp(p(0, 99), 1), p(0, 3));
    }

    // -- replace_text ----------------------------------------------------------

    #[test]
    fn insert_at_cursor() {
        let mut b = buffer("foo bar");
        let removed = b.replace_text("X", p(0, 3), p(0, 3)).unwrap();
        assert_eq!(removed, "");
        assert_eq!(b.text(), "fooX bar");
    }

    #[test]
    fn delete_range_returns_removed() {
        let mut b = buffer("foo bar");
        let removed = b.replace_text("", p(0, 0), p(0, 4)).unwrap();
        assert_eq!(removed, "foo ");
        assert_eq!(b.text(), "bar");
    }

    #[test]
    fn empty_replace_is_identity() {
        let mut b = buffer("foo bar");
        b.replace_text("", p(0, 3), p(0, 3)).unwrap();
        assert_eq!(b.text(), "foo bar");
    }

    #[test]
    fn replace_normalizes_reversed_range() {
        let mut b = buffer("abcdef");
        let removed = b.replace_text("", p(0, 4), p(0, 1)).unwrap();
        assert_eq!(removed, "bcd");
        assert_eq!(b.text(), "aef");
    }

    #[test]
    fn replace_across_lines() {
        let mut b = buffer("alpha\nbeta\ngamma");
        let removed = b.replace_text("-", p(0, 3), p(2, 2)).unwrap();
        assert_eq!(removed, "ha\nbeta\nga");
        assert_eq!(b.text(), "alp-mma");
    }

    #[test]
    fn deleting_through_sentinel_joins_lines() {
        let mut b = buffer("ab\ncd");
        // Backspace at (1,0): from = sentinel of row 0, until = (1,0).
        let removed = b.replace_text("", p(0, 2), p(1, 0)).unwrap();
        assert_eq!(removed, "\n");
        assert_eq!(b.text(), "abcd");
    }

    #[test]
    fn newline_insert_splits_line() {
        let mut b = buffer("abcd");
        b.replace_text("\n", p(0, 2), p(0, 2)).unwrap();
        assert_eq!(b.text(), "ab\ncd");
        assert_eq!(b.rows(), 2);
    }

    #[test]
    fn out_of_bounds_is_an_error() {
        let mut b = buffer("abc");
        assert_eq!(
            b.replace_text("x", p(5, 0), p(5, 0)),
            Err(BufferError::OutOfBounds(p(5, 0)))
        );
        assert_eq!(
            b.replace_text("x", p(0, 9), p(0, 9)),
            Err(BufferError::OutOfBounds(p(0, 9)))
        );
        assert_eq!(b.text(), "abc");
    }

    #[test]
    fn replace_identity_round_trip() {
        // get(a,b); reinsert at a; delete the original range → unchanged.
        let mut b = buffer("select * from t");
        let a = p(0, 7);
        let c = p(0, 9);
        let slice = b.slice_exclusive(a, c);
        b.replace_text(&slice, a, a).unwrap();
        b.replace_text("", p(0, 9), p(0, 11)).unwrap();
        assert_eq!(b.text(), "select * from t");
    }

    // -- get_text ---------------------------------------------------------------

    #[test]
    fn get_text_is_inclusive_of_until_col() {
        let b = buffer("abcdef");
        assert_eq!(b.get_text(p(0, 0), p(0, 3)), "abcd");
    }

    #[test]
    fn get_text_joins_rows_with_newlines() {
        let b = buffer("ab\ncd");
        assert_eq!(b.get_text(p(0, 0), p(1, 1)), "ab\ncd");
    }

    #[test]
    fn get_text_sentinel_reads_as_line_break() {
        let b = buffer("ab\ncd");
        // Through row 0's sentinel (col 2) down to (1,0).
        assert_eq!(b.get_text(p(0, 0), p(1, 0)), "ab\nc");
        // Whole-line range in VLine style: (0,0) to row 0 sentinel.
        assert_eq!(b.get_text(p(0, 0), p(0, 2)), "ab\n");
    }

    #[test]
    fn get_text_last_line_sentinel_keeps_line_break() {
        // Line-wise ranges keep their trailing break even on the last row,
        // so paste can recognize line-wise clipboard content.
        let b = buffer("ab\ncd");
        assert_eq!(b.get_text(p(1, 0), p(1, 2)), "cd\n");
    }

    #[test]
    fn get_text_orders_and_clamps() {
        let b = buffer("abc");
        assert_eq!(b.get_text(p(0, 2), p(0, 0)), "abc");
        assert_eq!(b.get_text(p(0, 0), p(9, 9)), "abc\n");
    }

    // -- first_non_whitespace_col ----------------------------------------------

    #[test]
    fn first_non_whitespace() {
        let b = buffer("   indented\n\t\ttabs\nplain\n   ");
        assert_eq!(b.first_non_whitespace_col(0), 3);
        assert_eq!(b.first_non_whitespace_col(1), 2);
        assert_eq!(b.first_non_whitespace_col(2), 0);
        assert_eq!(b.first_non_whitespace_col(3), 0); // blank line
    }

    // -- line_cursor (sticky column) ---------------------------------------------

    #[test]
    fn line_cursor_keeps_printable_x() {
        let b = buffer("abcdef\nxy\nlonger line");
        // From (0,4), moving to row 1 clamps to its last column.
        assert_eq!(b.line_cursor(p(0, 4), 1, 0), p(1, 1));
        // Moving to row 2 restores the full offset.
        assert_eq!(b.line_cursor(p(0, 4), 2, 0), p(2, 4));
    }

    #[test]
    fn line_cursor_accounts_for_wide_glyphs() {
        let b = buffer("abcd\n中文字");
        // x=3 on row 0 lands after the first wide glyph (x advances by 2).
        assert_eq!(b.line_cursor(p(0, 3), 1, 0), p(1, 1));
    }

    #[test]
    fn line_cursor_clamps_rows() {
        let b = buffer("ab\ncd");
        assert_eq!(b.line_cursor(p(0, 0), -5, 0), p(0, 0));
        assert_eq!(b.line_cursor(p(0, 0), 99, 0).row, 1);
    }

    #[test]
    fn line_cursor_block_offset_reaches_sentinel() {
        let b = buffer("abc\nx");
        // Insert mode from the sentinel of row 0 (x=3) to row 1: may sit on
        // row 1's sentinel (col 1).
        assert_eq!(b.line_cursor(p(0, 3), 1, 1), p(1, 1));
        // Normal mode cannot: clamps to col 0.
        assert_eq!(b.line_cursor(p(0, 3), 1, 0), p(1, 0));
    }

    // -- Background index integration -------------------------------------------

    #[test]
    fn set_text_rebuilds_word_index() {
        let b = buffer("foo bar");
        b.index().wait_converged();
        let next = b
            .index()
            .next(MotionKind::WordStart, 1, Position::ZERO, false);
        assert_eq!(next, Some(p(0, 4)));
    }

    #[test]
    fn edits_invalidate_and_rebuild() {
        let mut b = buffer("foo bar");
        b.index().wait_converged();
        b.replace_text("", p(0, 0), p(0, 4)).unwrap();
        b.index().wait_converged();
        // Only "bar" remains; no word start after column 0.
        assert_eq!(
            b.index()
                .next(MotionKind::WordStart, 1, Position::ZERO, false),
            None
        );
    }
}
