//! The action taxonomy.
//!
//! Keymap bindings resolve to action *names* (`"editor.move_left"`); this
//! module maps them to the [`Action`] enum and classifies each action for
//! the dispatcher. Three disjoint classes matter:
//!
//! - **Operators** consume a motion's target and act on the range: change,
//!   delete, yank, visual, visual-line.
//! - **Motions** produce a cursor position. Sub-flags: *operatorless*
//!   (usable without a pending operator), *countless* (ignores a pending
//!   count — the leading `0` is start-of-line, not a count), and
//!   *rune-argument* (must consume one more rune before running: `f`, `t`,
//!   `i"`, ...).
//! - **Other** actions execute immediately: mode switches, undo/redo,
//!   paste, page scrolls, line edits, done/exit.

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// Every dispatchable action.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    #[default]
    None,

    // -- Operators ----------------------------------------------------------
    Change,
    Delete,
    Yank,
    Visual,
    VisualLine,

    // -- Motions ------------------------------------------------------------
    MoveLeft,
    MoveRight,
    MoveUp,
    MoveDown,
    MoveStartOfLine,
    MoveEndOfLine,
    MoveFirstNonWhitespace,
    MoveFirstLine,
    MoveLastLine,
    MoveStartOfWord,
    MoveEndOfWord,
    MoveBackStartOfWord,
    MoveBackEndOfWord,
    MoveStartOfBigWord,
    MoveEndOfBigWord,
    MoveBackStartOfBigWord,
    MoveBackEndOfBigWord,
    Find,
    FindBack,
    Til,
    TilBack,
    MoveNextSearch,
    MovePrevSearch,
    EnableSearch,
    Flash,
    Inside,
    Around,
    MoveMatchBlock,

    // -- Other --------------------------------------------------------------
    Insert,
    InsertAfter,
    InsertEndOfLine,
    InsertBelow,
    InsertAbove,
    Replace,
    Undo,
    Redo,
    PasteAfter,
    PasteBefore,
    MoveHalfPageUp,
    MoveHalfPageDown,
    DeleteUnderCursor,
    DeleteLine,
    DeleteUntilEndOfLine,
    ChangeUntilEndOfLine,
    MoveNextFind,
    MovePrevFind,
    SwitchVisualStart,
    Done,
    Exit,
}

impl Action {
    /// The unqualified action name as it appears in keymap files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Change => "change",
            Self::Delete => "delete",
            Self::Yank => "yank",
            Self::Visual => "visual",
            Self::VisualLine => "visual_line",
            Self::MoveLeft => "move_left",
            Self::MoveRight => "move_right",
            Self::MoveUp => "move_up",
            Self::MoveDown => "move_down",
            Self::MoveStartOfLine => "move_start_of_line",
            Self::MoveEndOfLine => "move_end_of_line",
            Self::MoveFirstNonWhitespace => "move_first_non_whitespace",
            Self::MoveFirstLine => "move_first_line",
            Self::MoveLastLine => "move_last_line",
            Self::MoveStartOfWord => "move_start_of_word",
            Self::MoveEndOfWord => "move_end_of_word",
            Self::MoveBackStartOfWord => "move_back_start_of_word",
            Self::MoveBackEndOfWord => "move_back_end_of_word",
            Self::MoveStartOfBigWord => "move_start_of_big_word",
            Self::MoveEndOfBigWord => "move_end_of_big_word",
            Self::MoveBackStartOfBigWord => "move_back_start_of_big_word",
            Self::MoveBackEndOfBigWord => "move_back_end_of_big_word",
            Self::Find => "find",
            Self::FindBack => "find_back",
            Self::Til => "til",
            Self::TilBack => "til_back",
            Self::MoveNextSearch => "move_next_search",
            Self::MovePrevSearch => "move_prev_search",
            Self::EnableSearch => "enable_search",
            Self::Flash => "flash",
            Self::Inside => "inside",
            Self::Around => "around",
            Self::MoveMatchBlock => "move_match_block",
            Self::Insert => "insert",
            Self::InsertAfter => "insert_after",
            Self::InsertEndOfLine => "insert_end_of_line",
            Self::InsertBelow => "insert_below",
            Self::InsertAbove => "insert_above",
            Self::Replace => "replace",
            Self::Undo => "undo",
            Self::Redo => "redo",
            Self::PasteAfter => "paste_after",
            Self::PasteBefore => "paste_before",
            Self::MoveHalfPageUp => "move_half_page_up",
            Self::MoveHalfPageDown => "move_half_page_down",
            Self::DeleteUnderCursor => "delete_under_cursor",
            Self::DeleteLine => "delete_line",
            Self::DeleteUntilEndOfLine => "delete_until_end_of_line",
            Self::ChangeUntilEndOfLine => "change_until_end_of_line",
            Self::MoveNextFind => "move_next_find",
            Self::MovePrevFind => "move_prev_find",
            Self::SwitchVisualStart => "switch_visual_start",
            Self::Done => "done",
            Self::Exit => "exit",
        }
    }

    /// Resolve a namespaced action name (`"editor.move_left"`). Unknown
    /// names resolve to [`Action::None`] — an unbound or foreign-namespace
    /// action is simply not ours to run.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        let Some(bare) = name.strip_prefix("editor.") else {
            return Self::None;
        };
        match bare {
            "change" => Self::Change,
            "delete" => Self::Delete,
            "yank" => Self::Yank,
            "visual" => Self::Visual,
            "visual_line" => Self::VisualLine,
            "move_left" => Self::MoveLeft,
            "move_right" => Self::MoveRight,
            "move_up" => Self::MoveUp,
            "move_down" => Self::MoveDown,
            "move_start_of_line" => Self::MoveStartOfLine,
            "move_end_of_line" => Self::MoveEndOfLine,
            "move_first_non_whitespace" => Self::MoveFirstNonWhitespace,
            "move_first_line" => Self::MoveFirstLine,
            "move_last_line" => Self::MoveLastLine,
            "move_start_of_word" => Self::MoveStartOfWord,
            "move_end_of_word" => Self::MoveEndOfWord,
            "move_back_start_of_word" => Self::MoveBackStartOfWord,
            "move_back_end_of_word" => Self::MoveBackEndOfWord,
            "move_start_of_big_word" => Self::MoveStartOfBigWord,
            "move_end_of_big_word" => Self::MoveEndOfBigWord,
            "move_back_start_of_big_word" => Self::MoveBackStartOfBigWord,
            "move_back_end_of_big_word" => Self::MoveBackEndOfBigWord,
            "find" => Self::Find,
            "find_back" => Self::FindBack,
            "til" => Self::Til,
            "til_back" => Self::TilBack,
            "move_next_search" => Self::MoveNextSearch,
            "move_prev_search" => Self::MovePrevSearch,
            "enable_search" => Self::EnableSearch,
            "flash" => Self::Flash,
            "inside" => Self::Inside,
            "around" => Self::Around,
            "move_match_block" => Self::MoveMatchBlock,
            "insert" => Self::Insert,
            "insert_after" => Self::InsertAfter,
            "insert_end_of_line" => Self::InsertEndOfLine,
            "insert_below" => Self::InsertBelow,
            "insert_above" => Self::InsertAbove,
            "replace" => Self::Replace,
            "undo" => Self::Undo,
            "redo" => Self::Redo,
            "paste_after" => Self::PasteAfter,
            "paste_before" => Self::PasteBefore,
            "move_half_page_up" => Self::MoveHalfPageUp,
            "move_half_page_down" => Self::MoveHalfPageDown,
            "delete_under_cursor" => Self::DeleteUnderCursor,
            "delete_line" => Self::DeleteLine,
            "delete_until_end_of_line" => Self::DeleteUntilEndOfLine,
            "change_until_end_of_line" => Self::ChangeUntilEndOfLine,
            "move_next_find" => Self::MoveNextFind,
            "move_prev_find" => Self::MovePrevFind,
            "switch_visual_start" => Self::SwitchVisualStart,
            "done" => Self::Done,
            "exit" => Self::Exit,
            _ => Self::None,
        }
    }

    // -- Classification -----------------------------------------------------

    /// Operators wait for (or consume) a motion target.
    #[must_use]
    pub const fn is_operator(self) -> bool {
        matches!(
            self,
            Self::Change | Self::Delete | Self::Yank | Self::Visual | Self::VisualLine
        )
    }

    /// Motions produce a cursor position.
    #[must_use]
    pub const fn is_motion(self) -> bool {
        matches!(
            self,
            Self::MoveLeft
                | Self::MoveRight
                | Self::MoveUp
                | Self::MoveDown
                | Self::MoveStartOfLine
                | Self::MoveEndOfLine
                | Self::MoveFirstNonWhitespace
                | Self::MoveFirstLine
                | Self::MoveLastLine
                | Self::MoveStartOfWord
                | Self::MoveEndOfWord
                | Self::MoveBackStartOfWord
                | Self::MoveBackEndOfWord
                | Self::MoveStartOfBigWord
                | Self::MoveEndOfBigWord
                | Self::MoveBackStartOfBigWord
                | Self::MoveBackEndOfBigWord
                | Self::Find
                | Self::FindBack
                | Self::Til
                | Self::TilBack
                | Self::MoveNextSearch
                | Self::MovePrevSearch
                | Self::EnableSearch
                | Self::Flash
                | Self::Inside
                | Self::Around
                | Self::MoveMatchBlock
        )
    }

    /// Motions that ignore a pending count. A leading `0` with no count is
    /// start-of-line; with a count pending it is a count digit instead.
    #[must_use]
    pub const fn is_countless_motion(self) -> bool {
        matches!(self, Self::MoveStartOfLine | Self::MoveFirstNonWhitespace)
    }

    /// Motions valid without a pending operator. `i`/`a` text objects only
    /// make sense in operator-pending or visual context.
    #[must_use]
    pub const fn is_operatorless_motion(self) -> bool {
        self.is_motion() && !matches!(self, Self::Inside | Self::Around)
    }

    /// Motions that must consume one more rune before they can run.
    #[must_use]
    pub const fn waits_for_rune(self) -> bool {
        matches!(
            self,
            Self::Find | Self::FindBack | Self::Til | Self::TilBack | Self::Inside | Self::Around
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: &[Action] = &[
        Action::Change,
        Action::Delete,
        Action::Yank,
        Action::Visual,
        Action::VisualLine,
        Action::MoveLeft,
        Action::MoveRight,
        Action::MoveUp,
        Action::MoveDown,
        Action::MoveStartOfLine,
        Action::MoveEndOfLine,
        Action::MoveFirstNonWhitespace,
        Action::MoveFirstLine,
        Action::MoveLastLine,
        Action::MoveStartOfWord,
        Action::MoveEndOfWord,
        Action::MoveBackStartOfWord,
        Action::MoveBackEndOfWord,
        Action::MoveStartOfBigWord,
        Action::MoveEndOfBigWord,
        Action::MoveBackStartOfBigWord,
        Action::MoveBackEndOfBigWord,
        Action::Find,
        Action::FindBack,
        Action::Til,
        Action::TilBack,
        Action::MoveNextSearch,
        Action::MovePrevSearch,
        Action::EnableSearch,
        Action::Flash,
        Action::Inside,
        Action::Around,
        Action::MoveMatchBlock,
        Action::Insert,
        Action::InsertAfter,
        Action::InsertEndOfLine,
        Action::InsertBelow,
        Action::InsertAbove,
        Action::Replace,
        Action::Undo,
        Action::Redo,
        Action::PasteAfter,
        Action::PasteBefore,
        Action::MoveHalfPageUp,
        Action::MoveHalfPageDown,
        Action::DeleteUnderCursor,
        Action::DeleteLine,
        Action::DeleteUntilEndOfLine,
        Action::ChangeUntilEndOfLine,
        Action::MoveNextFind,
        Action::MovePrevFind,
        Action::SwitchVisualStart,
        Action::Done,
        Action::Exit,
    ];

    // -- Name round-trip ------------------------------------------------------

    #[test]
    fn names_round_trip() {
        for &action in ALL {
            let name = format!("editor.{}", action.as_str());
            assert_eq!(Action::from_name(&name), action, "{name}");
        }
    }

    #[test]
    fn unknown_names_are_none() {
        assert_eq!(Action::from_name("editor.frobnicate"), Action::None);
        assert_eq!(Action::from_name("move_left"), Action::None); // no namespace
        assert_eq!(Action::from_name("other.move_left"), Action::None);
        assert_eq!(Action::from_name(""), Action::None);
    }

    // -- Classes are disjoint -------------------------------------------------

    #[test]
    fn classes_are_disjoint() {
        for &action in ALL {
            assert!(
                !(action.is_operator() && action.is_motion()),
                "{action:?} is both operator and motion"
            );
        }
    }

    #[test]
    fn operators() {
        assert!(Action::Delete.is_operator());
        assert!(Action::Visual.is_operator());
        assert!(!Action::MoveLeft.is_operator());
        assert!(!Action::Undo.is_operator());
    }

    // -- Motion sub-flags -----------------------------------------------------

    #[test]
    fn countless_motions() {
        assert!(Action::MoveStartOfLine.is_countless_motion());
        assert!(Action::MoveFirstNonWhitespace.is_countless_motion());
        assert!(!Action::MoveLeft.is_countless_motion());
        assert!(!Action::MoveLastLine.is_countless_motion());
    }

    #[test]
    fn text_objects_need_an_operator() {
        assert!(!Action::Inside.is_operatorless_motion());
        assert!(!Action::Around.is_operatorless_motion());
        assert!(Action::MoveStartOfWord.is_operatorless_motion());
        assert!(Action::EnableSearch.is_operatorless_motion());
    }

    #[test]
    fn rune_argument_motions() {
        for action in [
            Action::Find,
            Action::FindBack,
            Action::Til,
            Action::TilBack,
            Action::Inside,
            Action::Around,
        ] {
            assert!(action.waits_for_rune(), "{action:?}");
        }
        assert!(!Action::MoveStartOfWord.waits_for_rune());
        assert!(!Action::EnableSearch.waits_for_rune());
    }
}
