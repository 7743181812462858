//! Modal editing semantics.
//!
//! The editor is always in exactly one [`Mode`]. Each mode changes how keys
//! are interpreted, which keymap group is consulted, and how far right the
//! cursor may sit:
//!
//! | Mode    | Group | Sentinel reachable | Purpose                        |
//! |---------|-------|--------------------|--------------------------------|
//! | Normal  | `n`   | no                 | Navigation, operators          |
//! | Insert  | `i`   | yes                | Typing text                    |
//! | Replace | `r`   | no                 | Overwrite one grapheme         |
//! | Visual  | `v`   | yes                | Character-wise selection       |
//! | VLine   | `v`   | yes                | Line-wise selection            |
//!
//! "Sentinel reachable" is the `block_offset` rule: in insert and the visual
//! modes the cursor may occupy the end-of-line sentinel slot (one past the
//! last grapheme); in normal and replace modes it may not. Rather than
//! duplicating that at every motion, [`Mode::block_offset`] feeds the single
//! `max_col` computation in the buffer.

use std::fmt;

// ---------------------------------------------------------------------------
// Mode
// ---------------------------------------------------------------------------

/// The current editing mode. Pure data — transitions live in the dispatcher.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Default mode. Keys are commands, not text input.
    #[default]
    Normal,
    /// Text entry. Runes go into the buffer.
    Insert,
    /// Single-grapheme overwrite: the next rune replaces the grapheme under
    /// the cursor and the editor returns to Normal. Esc cancels.
    Replace,
    /// Character-wise selection anchored at `visual_start`.
    Visual,
    /// Line-wise selection; operators consume whole lines.
    VLine,
}

impl Mode {
    /// Status-line name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Insert => "INSERT",
            Self::Replace => "REPLACE",
            Self::Visual => "VISUAL",
            Self::VLine => "V-LINE",
        }
    }

    /// The keymap group key for this mode. The one-line editor prefixes it
    /// with `o` (`on`, `oi`, ...).
    #[must_use]
    pub const fn group(self) -> &'static str {
        match self {
            Self::Normal => "n",
            Self::Insert => "i",
            Self::Replace => "r",
            Self::Visual | Self::VLine => "v",
        }
    }

    /// 1 when the cursor may occupy the end-of-line sentinel slot, else 0.
    /// Added to `len(spans) - 2` to get the rightmost legal column.
    #[inline]
    #[must_use]
    pub const fn block_offset(self) -> usize {
        match self {
            Self::Insert | Self::Visual | Self::VLine => 1,
            Self::Normal | Self::Replace => 0,
        }
    }

    /// True in either visual sub-mode.
    #[inline]
    #[must_use]
    pub const fn is_visual(self) -> bool {
        matches!(self, Self::Visual | Self::VLine)
    }

    /// The terminal cursor shape for this mode.
    #[must_use]
    pub const fn cursor_shape(self) -> CursorShape {
        match self {
            Self::Normal | Self::Visual | Self::VLine => CursorShape::SteadyBlock,
            Self::Insert => CursorShape::SteadyBar,
            Self::Replace => CursorShape::SteadyUnderline,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

// ---------------------------------------------------------------------------
// CursorShape
// ---------------------------------------------------------------------------

/// Cursor shape for terminal display. Local so the editor core stays
/// decoupled from any terminal backend; the screen collaborator maps it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CursorShape {
    /// `█` — solid block cursor.
    SteadyBlock,
    /// `▏` — thin vertical bar.
    SteadyBar,
    /// `▁` — underline cursor.
    SteadyUnderline,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- Groups -------------------------------------------------------------

    #[test]
    fn groups() {
        assert_eq!(Mode::Normal.group(), "n");
        assert_eq!(Mode::Insert.group(), "i");
        assert_eq!(Mode::Replace.group(), "r");
        assert_eq!(Mode::Visual.group(), "v");
        assert_eq!(Mode::VLine.group(), "v");
    }

    // -- Block offset ---------------------------------------------------------

    #[test]
    fn sentinel_reachable_in_insert_and_visual() {
        assert_eq!(Mode::Insert.block_offset(), 1);
        assert_eq!(Mode::Visual.block_offset(), 1);
        assert_eq!(Mode::VLine.block_offset(), 1);
    }

    #[test]
    fn sentinel_unreachable_in_normal_and_replace() {
        assert_eq!(Mode::Normal.block_offset(), 0);
        assert_eq!(Mode::Replace.block_offset(), 0);
    }

    // -- Shapes & names -------------------------------------------------------

    #[test]
    fn cursor_shapes() {
        assert_eq!(Mode::Normal.cursor_shape(), CursorShape::SteadyBlock);
        assert_eq!(Mode::Insert.cursor_shape(), CursorShape::SteadyBar);
        assert_eq!(Mode::Replace.cursor_shape(), CursorShape::SteadyUnderline);
    }

    #[test]
    fn display_names() {
        assert_eq!(format!("{}", Mode::VLine), "V-LINE");
        assert_eq!(format!("{}", Mode::Normal), "NORMAL");
    }

    #[test]
    fn default_is_normal() {
        assert_eq!(Mode::default(), Mode::Normal);
    }

    #[test]
    fn is_visual() {
        assert!(Mode::Visual.is_visual());
        assert!(Mode::VLine.is_visual());
        assert!(!Mode::Normal.is_visual());
    }
}
