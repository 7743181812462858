//! The editor — dispatcher state machine, operators, and motion runners.
//!
//! One [`Editor`] instance drives the multi-line query pane; the search and
//! flash prompts construct a second, one-line instance that owns key focus
//! until it resolves. Per keystroke, [`handle_key`](Editor::handle_key):
//!
//! 1. takes the insert/replace quick paths (runes, Enter, Tab, Backspace,
//!    Esc bypass keymaps entirely),
//! 2. feeds the rune argument of a waiting motion (`f`, `t`, `i"`, ...),
//! 3. runs an operator immediately in the visual modes,
//! 4. arms an operator in normal mode,
//! 5. resolves a motion and applies the pending operator (or a plain cursor
//!    move) to its target,
//! 6. executes any other action,
//! 7. waits when deeper keymap prefixes exist,
//! 8. accumulates digits into the pending count,
//! 9. otherwise resets the pending state.
//!
//! Prompt-backed motions (search, flash) return
//! [`MotionResult::Pending`]: the dispatcher parks the pending operator and
//! resumes it when the prompt resolves. The child prompt reports its
//! outcome through a polled field rather than a callback cycle — the parent
//! forwards each key and then inspects the child.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::action::Action;
use crate::buffer::Buffer;
use crate::clipboard::{Clipboard, MemoryClipboard};
use crate::decor::Decoration;
use crate::highlight::{HighlightProvider, HighlightSpan};
use crate::history::{Snapshot, UndoStack};
use crate::key::{KeyCode, KeyEvent};
use crate::mode::Mode;
use crate::motion::{Anchor, MotionKind, MotionSpan};
use crate::position::Position;
use crate::screen::Rect;
use crate::span::SpanLine;

/// How long the yank selection stays highlighted before it commits.
pub const YANK_FLASH: Duration = Duration::from_millis(100);

/// Label runes handed out to flash matches, nearest match first.
pub const FLASH_ALPHABET: &str = "abcdefghijkmnpqrtwxyzABCDEFGHJKLMNPQRTUVWXY";

const MATCH_BLOCKS: [char; 9] = ['{', '}', '[', ']', '(', ')', '"', '\'', '`'];

/// `+1` for openers scanning forward, `-1` for closers scanning backward,
/// `None` for the directionless quote pairs.
fn block_direction(r: char) -> Option<i32> {
    match r {
        '{' | '[' | '(' => Some(1),
        '}' | ']' | ')' => Some(-1),
        _ => None,
    }
}

fn matching_rune(r: char) -> char {
    match r {
        '{' => '}',
        '}' => '{',
        '[' => ']',
        ']' => '[',
        '(' => ')',
        ')' => '(',
        other => other,
    }
}

// ---------------------------------------------------------------------------
// Collaborator traits & small state types
// ---------------------------------------------------------------------------

/// Key-sequence resolution: the pending keys of a group map to zero or more
/// action names plus a flag saying longer bound sequences exist.
pub trait Keymapper {
    fn get(&self, keys: &[String], group: &str) -> (Vec<String>, bool);
}

impl Keymapper for squill_keymap::Keymap {
    fn get(&self, keys: &[String], group: &str) -> (Vec<String>, bool) {
        squill_keymap::Keymap::get(self, keys, group)
    }
}

/// A motion either produced a target or is waiting on external input (the
/// embedded prompt, a rune argument).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionResult {
    Position(Position),
    Pending,
}

/// What kind of prompt currently owns key focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PromptKind {
    Search,
    Flash,
}

/// How a one-line prompt editor resolved, polled by the parent.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PromptOutcome {
    Done(String),
    Cancelled,
}

/// Flash jump state: label assignments plus the query length typed so far.
#[derive(Debug, Default)]
pub(crate) struct FlashState {
    pub(crate) labels: HashMap<char, Position>,
    pub(crate) reverse: HashMap<Position, char>,
    query_len: usize,
}

impl FlashState {
    fn clear(&mut self) {
        self.labels.clear();
        self.reverse.clear();
        self.query_len = 0;
    }
}

// ---------------------------------------------------------------------------
// Editor
// ---------------------------------------------------------------------------

type DoneFn = Box<dyn FnMut(&str)>;
type ExitFn = Box<dyn FnMut()>;
type ModalFn = Box<dyn FnMut(&str)>;
type DelayDrawFn = Box<dyn FnMut(Instant)>;

/// The modal editor over one document.
pub struct Editor {
    pub(crate) keymap: Arc<dyn Keymapper>,
    pub(crate) clipboard: Arc<dyn Clipboard>,
    pub(crate) highlighter: Option<Box<dyn HighlightProvider>>,

    pub(crate) buffer: Buffer,
    pub(crate) undo: UndoStack,
    pub(crate) cursor: Position,
    pub(crate) visual_start: Position,
    /// Viewport offsets: (first visible row, horizontal offset in cells).
    pub(crate) offsets: (usize, usize),
    pub(crate) rect: Rect,
    pub(crate) mode: Mode,
    pub(crate) one_line: bool,
    pub(crate) disabled: bool,

    pub(crate) pending: Vec<String>,
    pub(crate) pending_count: usize,
    pub(crate) pending_action: Action,
    last_motion: Action,
    waiting_for_motion: bool,
    insert_group_open: bool,
    last_find_backward: bool,

    pub(crate) highlights: Vec<HighlightSpan>,
    pub(crate) decorations: HashMap<(usize, usize), Decoration>,
    pub(crate) flash: FlashState,

    pub(crate) prompt: Option<Box<Editor>>,
    prompt_kind: Option<PromptKind>,
    outcome: Option<PromptOutcome>,

    pub(crate) yank_pending: bool,
    pub(crate) yank_deadline: Option<Instant>,

    on_done: Option<DoneFn>,
    on_exit: Option<ExitFn>,
    view_modal: Option<ModalFn>,
    delay_draw: Option<DelayDrawFn>,
}

impl Editor {
    /// A multi-line editor with an in-process clipboard and no highlighter.
    #[must_use]
    pub fn new(keymap: Arc<dyn Keymapper>) -> Self {
        Self {
            keymap,
            clipboard: Arc::new(MemoryClipboard::new()),
            highlighter: None,
            buffer: Buffer::new(),
            undo: UndoStack::new(),
            cursor: Position::ZERO,
            visual_start: Position::ZERO,
            offsets: (0, 0),
            rect: Rect::new(0, 0, 80, 24),
            mode: Mode::Normal,
            one_line: false,
            disabled: false,
            pending: Vec::new(),
            pending_count: 0,
            pending_action: Action::None,
            last_motion: Action::None,
            waiting_for_motion: false,
            insert_group_open: false,
            last_find_backward: false,
            highlights: Vec::new(),
            decorations: HashMap::new(),
            flash: FlashState::default(),
            prompt: None,
            prompt_kind: None,
            outcome: None,
            yank_pending: false,
            yank_deadline: None,
            on_done: None,
            on_exit: None,
            view_modal: None,
            delay_draw: None,
        }
    }

    // -- Builders ------------------------------------------------------------

    /// Switch to one-line (prompt) mode: newline input truncates, the mode
    /// indicator replaces the status line.
    #[must_use]
    pub fn one_line(mut self) -> Self {
        self.one_line = true;
        self.buffer = Buffer::new_one_line();
        self
    }

    #[must_use]
    pub fn with_clipboard(mut self, clipboard: Arc<dyn Clipboard>) -> Self {
        self.clipboard = clipboard;
        self
    }

    #[must_use]
    pub fn with_highlighter(mut self, provider: Box<dyn HighlightProvider>) -> Self {
        self.highlighter = provider.into();
        self
    }

    /// Called with the document when the user confirms it (Enter).
    #[must_use]
    pub fn with_on_done(mut self, f: DoneFn) -> Self {
        self.on_done = Some(f);
        self
    }

    /// Called when the user cancels out of the editor.
    #[must_use]
    pub fn with_on_exit(mut self, f: ExitFn) -> Self {
        self.on_exit = Some(f);
        self
    }

    /// Called to display a transient host modal.
    #[must_use]
    pub fn with_view_modal(mut self, f: ModalFn) -> Self {
        self.view_modal = Some(f);
        self
    }

    /// Called to request a redraw at a deadline (yank flash timing).
    #[must_use]
    pub fn with_delay_draw(mut self, f: DelayDrawFn) -> Self {
        self.delay_draw = Some(f);
        self
    }

    // -- Accessors -----------------------------------------------------------

    #[inline]
    #[must_use]
    pub fn text(&self) -> &str {
        self.buffer.text()
    }

    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> Position {
        self.cursor
    }

    #[inline]
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    #[inline]
    #[must_use]
    pub const fn visual_start(&self) -> Position {
        self.visual_start
    }

    #[inline]
    #[must_use]
    pub const fn offsets(&self) -> (usize, usize) {
        self.offsets
    }

    #[inline]
    #[must_use]
    pub const fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    /// True while an embedded prompt owns key focus.
    #[inline]
    #[must_use]
    pub const fn prompt_active(&self) -> bool {
        self.prompt.is_some()
    }

    pub fn set_rect(&mut self, rect: Rect) {
        self.rect = rect;
    }

    #[inline]
    #[must_use]
    pub const fn rect(&self) -> Rect {
        self.rect
    }

    /// Block input and hide the cursor (the host is running a query).
    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    pub fn set_tab_width(&mut self, tab_width: usize) {
        self.buffer.set_tab_width(tab_width);
        self.cursor = self.buffer.clamp(self.cursor, self.block_offset());
    }

    // -- Document ------------------------------------------------------------

    /// Replace the whole document and move the cursor (clamped into the new
    /// span structure).
    pub fn set_text(&mut self, text: &str, cursor: Position) {
        self.buffer.set_text(text);
        self.after_text_change(cursor);
    }

    /// Rows visible for text: the inner height minus the status line in
    /// multi-line mode.
    #[must_use]
    pub(crate) fn text_height(&self) -> usize {
        if self.one_line {
            self.rect.h
        } else {
            self.rect.h.saturating_sub(1)
        }
    }

    fn after_text_change(&mut self, cursor: Position) {
        self.cursor = self
            .buffer
            .line_cursor(cursor, cursor.row as isize, self.block_offset());
        if !self.one_line {
            if let Some(provider) = &self.highlighter {
                self.highlights = provider.highlight(self.buffer.text());
            }
        }
    }

    /// Effective count: `max(1, pending_count)`.
    #[must_use]
    pub(crate) fn effective_count(&self) -> usize {
        self.pending_count.max(1)
    }

    /// Whether the cursor may occupy the sentinel slot right now: the mode
    /// allows it, or a visual operator is pending.
    pub(crate) fn block_offset(&self) -> usize {
        if self.mode.block_offset() == 1
            || matches!(self.pending_action, Action::Visual | Action::VisualLine)
        {
            1
        } else {
            0
        }
    }

    fn sentinel_col(&self, row: usize) -> usize {
        self.buffer.line(row).map_or(0, SpanLine::sentinel_col)
    }

    // -- Editing core ----------------------------------------------------------

    /// Splice with an undo snapshot: captures the pre-edit state, applies
    /// the edit, saves the snapshot, re-clamps the cursor to the splice
    /// start. Out-of-range arguments are clamped to the sentinel first;
    /// a failed splice leaves undo history untouched.
    fn edit_replace(&mut self, s: &str, from: Position, until: Position) -> String {
        let from = self.buffer.clamp(from, 1);
        let until = self.buffer.clamp(until, 1);
        let snapshot = Snapshot::new(self.buffer.text(), self.cursor);
        match self.buffer.replace_text(s, from, until) {
            Ok(removed) => {
                self.undo.save(snapshot);
                let (from, _) = Position::ordered(from, until);
                self.after_text_change(from);
                removed
            }
            Err(err) => {
                debug!(%err, "replace skipped");
                String::new()
            }
        }
    }

    /// Insert-mode micro-edit: only the first edit of an insert burst saves
    /// a snapshot, so the whole burst undoes (and redoes) as one group.
    fn edit_replace_coalesced(&mut self, s: &str, from: Position, until: Position) {
        let from = self.buffer.clamp(from, 1);
        let until = self.buffer.clamp(until, 1);
        let snapshot = Snapshot::new(self.buffer.text(), self.cursor);
        if self.buffer.replace_text(s, from, until).is_ok() {
            if !self.insert_group_open {
                self.undo.save(snapshot);
                self.insert_group_open = true;
            }
            let (from, _) = Position::ordered(from, until);
            self.after_text_change(from);
        }
    }

    pub(crate) fn change_mode(&mut self, mode: Mode) {
        if self.mode == Mode::Insert && mode != Mode::Insert {
            self.insert_group_open = false;
        }
        self.mode = mode;
    }

    // -- Dispatch ---------------------------------------------------------------

    /// Resolve one keystroke. See the module docs for the branch order.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if self.disabled {
            return;
        }

        // The embedded prompt owns key focus until it resolves.
        if self.prompt.is_some() {
            self.forward_to_prompt(key);
            return;
        }

        // Unkeymappable quick paths.
        match self.mode {
            Mode::Replace => {
                if key.code == KeyCode::Escape {
                    self.change_mode(Mode::Normal);
                    return;
                }
                if let Some(ch) = key.plain_rune() {
                    let from = self.cursor;
                    let until = Position::new(from.row, from.col + 1);
                    self.edit_replace(&ch.to_string(), from, until);
                    self.change_mode(Mode::Normal);
                    return;
                }
            }
            Mode::Insert => {
                if self.insert_quick_path(key) {
                    return;
                }
            }
            _ => {}
        }

        let is_digit = key.plain_rune().is_some_and(|c| c.is_ascii_digit());
        let name = key.name();
        self.pending.push(name.clone());
        debug!(key = %name, mode = %self.mode, "dispatch");

        let group = if self.one_line {
            format!("o{}", self.mode.group())
        } else {
            self.mode.group().to_string()
        };

        let keymap = Arc::clone(&self.keymap);
        let (resolved, mut any_start_with) = keymap.get(&self.pending, &group);
        let action_names = if resolved.is_empty() {
            vec![String::new()]
        } else {
            resolved
        };

        for action_name in &action_names {
            let mut action = Action::from_name(action_name);

            // Not found with an operator pending: retry the tail for a motion
            // (`d` `w` resolves `w` on its own).
            if action == Action::None && self.pending_action != Action::None && self.pending.len() > 1
            {
                let (retry, deeper) = keymap.get(&self.pending[1..], &group);
                for retry_name in &retry {
                    let candidate = Action::from_name(retry_name);
                    if candidate.is_motion() {
                        action = candidate;
                        any_start_with = deeper;
                        break;
                    }
                }
            }

            // A motion is waiting for its rune argument.
            if self.waiting_for_motion && key.plain_rune().is_none() {
                self.reset_action();
                return;
            } else if self.waiting_for_motion && self.last_motion.waits_for_rune() {
                if let Some(ch) = key.plain_rune() {
                    self.accept_rune(self.last_motion, ch);
                    action = self.last_motion;
                }
            }

            // Operators run immediately in the visual modes.
            if action.is_operator()
                && self.mode.is_visual()
                && !matches!(action, Action::Visual | Action::VisualLine)
            {
                let prev_mode = self.mode;
                if self.mode == Mode::VLine {
                    if self.cursor > self.visual_start {
                        std::mem::swap(&mut self.cursor, &mut self.visual_start);
                    }
                    self.cursor.col = 0;
                    self.visual_start.col = self.sentinel_col(self.visual_start.row);
                }
                let target = self.visual_start;
                self.run_operator(action, target);
                if self.mode == prev_mode {
                    self.change_mode(Mode::Normal);
                }
                self.reset_action();
                return;
            }

            // Arm an operator; VisualLine toggles immediately instead.
            if action.is_operator() && action != Action::VisualLine {
                self.pending_action = action;
                return;
            }

            // Motions, gated by the countless/operatorless flags.
            if action.is_motion()
                && (!action.is_countless_motion() || self.pending_count == 0)
                && (action.is_operatorless_motion() || self.pending_action != Action::None)
            {
                match self.run_motion(action) {
                    MotionResult::Pending => {
                        self.last_motion = action;
                        return;
                    }
                    MotionResult::Position(target) => {
                        let op = self.pending_action;
                        self.run_operator(op, target);
                        self.reset_action();
                        return;
                    }
                }
            }

            // Everything else.
            if self.run_action(action) {
                self.reset_action();
                return;
            }

            // Longer bound sequences start with the pending keys: wait.
            if any_start_with {
                return;
            }

            // Digits accumulate into the count and leave pending.
            if is_digit {
                if let Some(ch) = key.plain_rune() {
                    self.pending_count =
                        self.pending_count * 10 + (ch as usize - '0' as usize);
                }
                self.pending.pop();
                return;
            }
        }

        self.reset_action();
    }

    /// Clear the transient triple `(pending_action, pending_count,
    /// pending_keys)` plus the rune-wait state.
    pub(crate) fn reset_action(&mut self) {
        self.pending_action = Action::None;
        self.last_motion = Action::None;
        self.pending.clear();
        self.pending_count = 0;
        self.waiting_for_motion = false;
    }

    /// Insert-mode keys that bypass the keymap. Returns whether the key was
    /// consumed.
    fn insert_quick_path(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Escape => {
                self.change_mode(Mode::Normal);
                if self.cursor.col == self.sentinel_col(self.cursor.row) && self.cursor.col > 0 {
                    self.cursor.col -= 1;
                }
                true
            }
            KeyCode::Enter => {
                if self.one_line {
                    self.done();
                    return true;
                }
                let at = self.cursor;
                self.edit_replace_coalesced("\n", at, at);
                self.cursor = self.buffer.clamp(Position::new(at.row + 1, 0), 1);
                true
            }
            KeyCode::Tab => {
                let at = self.cursor;
                self.edit_replace_coalesced("\t", at, at);
                self.cursor = self.buffer.clamp(Position::new(at.row, at.col + 1), 1);
                true
            }
            KeyCode::Backspace => {
                if self.cursor == Position::ZERO {
                    return true;
                }
                let (from, until) = if self.cursor.col == 0 {
                    let above = self.cursor.row - 1;
                    (
                        Position::new(above, self.sentinel_col(above)),
                        Position::new(self.cursor.row, 0),
                    )
                } else {
                    (
                        Position::new(self.cursor.row, self.cursor.col - 1),
                        self.cursor,
                    )
                };
                self.edit_replace_coalesced("", from, until);
                true
            }
            KeyCode::Char(_) => {
                let Some(ch) = key.plain_rune() else {
                    return false;
                };
                let at = self.cursor;
                self.edit_replace_coalesced(&ch.to_string(), at, at);
                self.cursor = self.buffer.clamp(Position::new(at.row, at.col + 1), 1);
                true
            }
            _ => false,
        }
    }

    // -- Operators ---------------------------------------------------------------

    /// Apply an operator (or a plain cursor move for [`Action::None`]) to a
    /// motion target.
    pub(crate) fn run_operator(&mut self, op: Action, target: Position) {
        match op {
            Action::Change => self.change_until(target),
            Action::Delete => self.delete_until(target),
            Action::Yank => self.yank_until(target),
            Action::Visual => self.visual_until(target),
            _ => self.move_cursor_to(target),
        }
    }

    pub(crate) fn move_cursor_to(&mut self, target: Position) {
        self.cursor = self
            .buffer
            .line_cursor(target, target.row as isize, self.block_offset());
    }

    /// The operator range for a target: ordered, and in character-wise
    /// visual mode extended one column so the selection end is included.
    fn operator_range(&self, target: Position) -> (Position, Position) {
        let (from, mut until) = Position::ordered(self.cursor, target);
        if self.mode == Mode::Visual {
            until.col = (until.col + 1).min(self.sentinel_col(until.row));
        }
        (from, until)
    }

    fn delete_range(&mut self, from: Position, until: Position) {
        let removed = self.edit_replace("", from, until);
        self.clipboard.write(removed);
    }

    fn delete_until(&mut self, target: Position) {
        let (from, until) = self.operator_range(target);
        self.delete_range(from, until);
    }

    fn change_until(&mut self, target: Position) {
        let (from, until) = self.operator_range(target);
        self.change_mode(Mode::Insert);
        self.insert_group_open = false;
        self.delete_range(from, until);
    }

    /// Yank. From a visual selection the clipboard is written immediately
    /// and the mode returns to Normal; from normal mode the range flashes
    /// as a visual selection and commits on the first draw past the
    /// deadline.
    fn yank_until(&mut self, target: Position) {
        if self.mode.is_visual() {
            let (from, until) = Position::ordered(self.cursor, target);
            self.clipboard.write(self.buffer.get_text(from, until));
            self.change_mode(Mode::Normal);
            return;
        }

        self.visual_start = self.cursor;
        self.move_cursor_to(target);
        self.change_mode(Mode::Visual);
        self.yank_pending = true;
        let deadline = Instant::now() + YANK_FLASH;
        self.yank_deadline = Some(deadline);
        if let Some(delay) = &mut self.delay_draw {
            delay(deadline);
        }
    }

    /// Commit a pending normal-mode yank: write the flashed selection to
    /// the clipboard and drop back to Normal. Called by `draw` once the
    /// deadline passes; hosts and tests may call it directly.
    pub fn flush_pending_yank(&mut self) {
        self.yank_deadline = None;
        if !self.yank_pending {
            return;
        }
        self.yank_pending = false;
        if !self.mode.is_visual() {
            return;
        }
        self.change_mode(Mode::Normal);
        let (from, until) = Position::ordered(self.visual_start, self.cursor);
        self.clipboard.write(self.buffer.get_text(from, until));
        self.buffer.index().reset_transient();
    }

    fn visual_until(&mut self, target: Position) {
        if self.mode == Mode::Visual {
            self.change_mode(Mode::Normal);
            return;
        }
        self.visual_start = self.cursor;
        self.move_cursor_to(target);
        self.change_mode(Mode::Visual);
    }

    // -- Motions ---------------------------------------------------------------

    /// Compute a motion's target, or report that it is waiting on external
    /// input (a rune argument or a prompt).
    pub(crate) fn run_motion(&mut self, action: Action) -> MotionResult {
        let count = self.effective_count();
        let cursor = self.cursor;
        let index = self.buffer.index().clone();
        let widest = self.buffer.widest_col();

        let target = match action {
            Action::MoveLeft => {
                if cursor.col < 1 {
                    cursor
                } else {
                    Position::new(cursor.row, cursor.col.saturating_sub(count))
                }
            }
            Action::MoveRight => Position::new(cursor.row, cursor.col + count),
            Action::MoveUp => {
                self.buffer
                    .line_cursor(cursor, cursor.row as isize - count as isize, self.block_offset())
            }
            Action::MoveDown => {
                self.buffer
                    .line_cursor(cursor, cursor.row as isize + count as isize, self.block_offset())
            }
            Action::MoveStartOfLine => {
                if cursor.col < 1 {
                    cursor
                } else {
                    Position::new(cursor.row, 0)
                }
            }
            Action::MoveEndOfLine => {
                let sentinel = self.sentinel_col(cursor.row);
                if cursor.col >= sentinel {
                    cursor
                } else {
                    Position::new(cursor.row, sentinel)
                }
            }
            Action::MoveFirstNonWhitespace => Position::new(
                cursor.row,
                self.buffer.first_non_whitespace_col(cursor.row),
            ),
            Action::MoveFirstLine => {
                let row = if self.pending_count > 0 {
                    self.pending_count as isize - 1
                } else {
                    0
                };
                self.buffer.line_cursor(cursor, row, self.block_offset())
            }
            Action::MoveLastLine => {
                let row = if self.pending_count > 0 {
                    self.pending_count as isize - 1
                } else {
                    self.buffer.rows() as isize - 1
                };
                self.buffer.line_cursor(cursor, row, self.block_offset())
            }
            Action::MoveStartOfWord => index
                .next(MotionKind::WordStart, count, cursor, false)
                .unwrap_or(cursor),
            Action::MoveEndOfWord => {
                let mut c = index
                    .next(MotionKind::WordEnd, count, cursor, false)
                    .unwrap_or(cursor);
                if self.operator_extends_target() {
                    c.col += 1;
                }
                c
            }
            Action::MoveBackStartOfWord => index
                .prev(MotionKind::WordStart, count, cursor, false, widest)
                .unwrap_or(cursor),
            Action::MoveBackEndOfWord => index
                .prev(MotionKind::WordEnd, count, cursor, false, widest)
                .unwrap_or(cursor),
            Action::MoveStartOfBigWord => index
                .next(MotionKind::BigWordStart, count, cursor, false)
                .unwrap_or(cursor),
            Action::MoveEndOfBigWord => index
                .next(MotionKind::BigWordEnd, count, cursor, false)
                .unwrap_or(cursor),
            Action::MoveBackStartOfBigWord => index
                .prev(MotionKind::BigWordStart, count, cursor, false, widest)
                .unwrap_or(cursor),
            Action::MoveBackEndOfBigWord => index
                .prev(MotionKind::BigWordEnd, count, cursor, false, widest)
                .unwrap_or(cursor),
            Action::MoveNextSearch => index
                .next(MotionKind::Search, count, cursor, false)
                .unwrap_or(cursor),
            Action::MovePrevSearch => index
                .prev(MotionKind::Search, count, cursor, false, widest)
                .unwrap_or(cursor),
            Action::MoveMatchBlock => self.matching_block(cursor),
            Action::Find => {
                if !self.waiting_for_motion {
                    return self.wait_for_rune();
                }
                match index.next(MotionKind::Find, count, cursor, false) {
                    Some(mut c) => {
                        if self.operator_extends_target() && c != cursor {
                            c.col += 1;
                        }
                        c
                    }
                    None => cursor,
                }
            }
            Action::FindBack => {
                if !self.waiting_for_motion {
                    return self.wait_for_rune();
                }
                index
                    .prev(MotionKind::Find, count, cursor, false, widest)
                    .unwrap_or(cursor)
            }
            Action::Til => {
                if !self.waiting_for_motion {
                    return self.wait_for_rune();
                }
                match index.next(MotionKind::Til, count, cursor, false) {
                    Some(mut c) => {
                        if self.operator_extends_target() && c != cursor {
                            c.col += 1;
                        }
                        c
                    }
                    None => cursor,
                }
            }
            Action::TilBack => {
                if !self.waiting_for_motion {
                    return self.wait_for_rune();
                }
                match index.prev(MotionKind::TilBack, count, cursor, false, widest) {
                    Some(mut c) => {
                        if self.operator_extends_target() && c != cursor {
                            c.col += 1;
                        }
                        c
                    }
                    None => cursor,
                }
            }
            Action::EnableSearch => return self.open_prompt(PromptKind::Search),
            Action::Flash => return self.open_prompt(PromptKind::Flash),
            Action::Inside | Action::Around => {
                if !self.waiting_for_motion {
                    return self.wait_for_rune();
                }
                self.inside_or_around_target()
            }
            _ => cursor,
        };

        MotionResult::Position(target)
    }

    /// True when a pending operator wants the exclusive-range bump: change
    /// and delete act through the target column, visual and yank include it
    /// by other means.
    fn operator_extends_target(&self) -> bool {
        !matches!(
            self.pending_action,
            Action::None | Action::Visual | Action::Yank
        )
    }

    fn wait_for_rune(&mut self) -> MotionResult {
        self.waiting_for_motion = true;
        MotionResult::Pending
    }

    /// Feed the rune argument of a waiting motion: builds the transient
    /// index the motion then navigates.
    pub(crate) fn accept_rune(&mut self, motion: Action, ch: char) {
        let query = ch.to_string();
        let lines = self.buffer.lines().to_vec();
        let index = self.buffer.index().clone();
        match motion {
            Action::Til => {
                index.build_literal(MotionKind::Til, &query, Anchor::Before, &lines, None);
            }
            Action::TilBack => {
                index.build_literal(MotionKind::TilBack, &query, Anchor::After, &lines, None);
            }
            Action::Find | Action::FindBack => {
                index.build_literal(MotionKind::Find, &query, Anchor::At, &lines, None);
                self.last_find_backward = motion == Action::FindBack;
            }
            Action::Inside => self.build_surround(ch, true),
            Action::Around => self.build_surround(ch, false),
            _ => {}
        }
    }

    /// The target of `i<rune>` / `a<rune>` once the surround pair is built:
    /// the cursor jumps to the opening edge and the closing edge becomes
    /// the operator target.
    fn inside_or_around_target(&mut self) -> Position {
        let Some(pair) = self.buffer.index().snapshot(MotionKind::Surround) else {
            return self.cursor;
        };
        if pair.len() != 2 {
            return self.cursor;
        }

        // Visual-mode clamping so the opening edge may sit on the sentinel.
        let saved = self.mode;
        self.mode = Mode::Visual;
        self.move_cursor_to(pair[0].pos());
        self.mode = saved;

        let mut target = pair[1].pos();
        if self.operator_extends_target() {
            target.col += 1;
        }
        target
    }

    // -- Surround & match blocks --------------------------------------------------

    /// Build the `s` index: the two positions enclosing the cursor for the
    /// delimiter rune (`"`, brackets, `w`/`W` for the word under cursor).
    fn build_surround(&self, rune: char, inside: bool) {
        let index = self.buffer.index();
        let widest = self.buffer.widest_col();

        if rune == 'w' || rune == 'W' {
            let (start_kind, end_kind) = if rune == 'w' {
                (MotionKind::WordStart, MotionKind::WordEnd)
            } else {
                (MotionKind::BigWordStart, MotionKind::BigWordEnd)
            };
            let opening = index.prev(start_kind, 1, self.cursor, true, widest);
            let closing = index.next(end_kind, 1, self.cursor, true);
            if let (Some(o), Some(c)) = (opening, closing) {
                index.set(
                    MotionKind::Surround,
                    vec![
                        MotionSpan::new(o.row, o.col, o.col),
                        MotionSpan::new(c.row, c.col, c.col),
                    ],
                );
            }
            return;
        }

        if !MATCH_BLOCKS.contains(&rune) {
            return;
        }
        let rune = if block_direction(rune) == Some(-1) {
            matching_rune(rune)
        } else {
            rune
        };
        if !index.build_literal(
            MotionKind::Surround,
            &rune.to_string(),
            Anchor::At,
            self.buffer.lines(),
            None,
        ) {
            return;
        }

        let total = index
            .snapshot(MotionKind::Surround)
            .map_or(0, |v| v.len());
        let mut opening = Position::ZERO;
        let mut closing = Position::ZERO;
        let mut found_pair = false;
        let mut hops = 1;
        let mut left = true;

        for _ in 0..total {
            let candidate = if left {
                index.prev(MotionKind::Surround, hops, self.cursor, true, widest)
            } else {
                index.next(MotionKind::Surround, hops, self.cursor, false)
            };
            let Some(o) = candidate else {
                if left {
                    // Nothing on the left at all: search right instead.
                    left = false;
                    hops = 1;
                    continue;
                }
                index.remove(MotionKind::Surround);
                return;
            };

            opening = o;
            closing = self.matching_block(o);
            if closing == opening {
                index.remove(MotionKind::Surround);
                return;
            }

            // A pair that closes before the cursor does not enclose it: try
            // the next opening to the left, or switch to the right side.
            if left && closing < self.cursor {
                let further = index.prev(MotionKind::Surround, hops + 1, self.cursor, false, widest);
                if further == Some(o) {
                    left = false;
                    hops = 1;
                    continue;
                }
                hops += 1;
                continue;
            }

            found_pair = true;
            break;
        }

        if !found_pair {
            index.remove(MotionKind::Surround);
            return;
        }

        let offset = usize::from(inside);
        index.set(
            MotionKind::Surround,
            vec![
                MotionSpan::new(opening.row, opening.col + offset, opening.col + offset),
                MotionSpan::new(
                    closing.row,
                    closing.col.saturating_sub(offset),
                    closing.col.saturating_sub(offset),
                ),
            ],
        );
    }

    /// The position matching the block rune under `from`: bracket pairs
    /// scan with nesting depth in their direction, quote pairs pair up
    /// consecutive occurrences. Anything else returns `from` unchanged.
    pub(crate) fn matching_block(&self, from: Position) -> Position {
        if !self.buffer.contains(from) {
            return from;
        }
        let Some(rune) = self.buffer.line(from.row).and_then(|l| l.rune_at(from.col)) else {
            return from;
        };
        if !MATCH_BLOCKS.contains(&rune) {
            return from;
        }

        let Some(direction) = block_direction(rune) else {
            return self.matching_quote(rune, from);
        };
        let target = matching_rune(rune);
        let mut depth = 1i32;

        if direction > 0 {
            for row in from.row..self.buffer.rows() {
                let line = &self.buffer.lines()[row];
                for col in 0..line.len() {
                    if row == from.row && col <= from.col {
                        continue;
                    }
                    match line.rune_at(col) {
                        Some(c) if c == rune => depth += 1,
                        Some(c) if c == target => {
                            depth -= 1;
                            if depth == 0 {
                                return Position::new(row, col);
                            }
                        }
                        _ => {}
                    }
                }
            }
        } else {
            for row in (0..=from.row).rev() {
                let line = &self.buffer.lines()[row];
                for col in (0..line.len()).rev() {
                    if row == from.row && col >= from.col {
                        continue;
                    }
                    match line.rune_at(col) {
                        Some(c) if c == rune => depth += 1,
                        Some(c) if c == target => {
                            depth -= 1;
                            if depth == 0 {
                                return Position::new(row, col);
                            }
                        }
                        _ => {}
                    }
                }
            }
        }
        from
    }

    /// Directionless pairs (quotes, backticks): occurrences pair up in
    /// document order, so the partner of the 2k-th occurrence is the
    /// 2k+1-th and vice versa.
    fn matching_quote(&self, rune: char, from: Position) -> Position {
        let mut positions = Vec::new();
        for (row, line) in self.buffer.lines().iter().enumerate() {
            for col in 0..line.len() {
                if line.rune_at(col) == Some(rune) {
                    positions.push(Position::new(row, col));
                }
            }
        }
        let Some(i) = positions.iter().position(|p| *p == from) else {
            return from;
        };
        let partner = if i % 2 == 0 { i + 1 } else { i - 1 };
        positions.get(partner).copied().unwrap_or(from)
    }
}

// ---------------------------------------------------------------------------
// Prompts (search / flash)
// ---------------------------------------------------------------------------

impl Editor {
    /// Construct the one-line child editor, hand it key focus, and park the
    /// pending operator until it resolves.
    fn open_prompt(&mut self, kind: PromptKind) -> MotionResult {
        let mut child = Editor::new(Arc::clone(&self.keymap))
            .one_line()
            .with_clipboard(Arc::clone(&self.clipboard));
        child.change_mode(Mode::Insert);
        child.set_rect(Rect::new(
            self.rect.x,
            self.rect.y + self.rect.h.saturating_sub(1),
            self.rect.w,
            1,
        ));
        child.set_text("", Position::ZERO);

        if kind == PromptKind::Flash {
            self.clear_flash();
        }
        self.prompt = Some(Box::new(child));
        self.prompt_kind = Some(kind);
        self.waiting_for_motion = true;
        MotionResult::Pending
    }

    /// Forward a key to the prompt, then poll how it resolved. Flash also
    /// re-runs its text-changed hook after every keystroke.
    fn forward_to_prompt(&mut self, key: KeyEvent) {
        let Some(child) = self.prompt.as_mut() else {
            return;
        };
        child.handle_key(key);
        let outcome = child.outcome.take();
        let child_text = child.text().to_string();
        let kind = self.prompt_kind;

        match outcome {
            Some(PromptOutcome::Done(query)) => {
                self.prompt = None;
                self.prompt_kind = None;
                match kind {
                    Some(PromptKind::Search) => {
                        self.buffer.index().build_literal(
                            MotionKind::Search,
                            &query,
                            Anchor::At,
                            self.buffer.lines(),
                            None,
                        );
                        let target = self
                            .buffer
                            .index()
                            .next(MotionKind::Search, self.effective_count(), self.cursor, false)
                            .unwrap_or(self.cursor);
                        let op = self.pending_action;
                        self.run_operator(op, target);
                    }
                    Some(PromptKind::Flash) | None => self.clear_flash(),
                }
                self.reset_action();
            }
            Some(PromptOutcome::Cancelled) => {
                self.prompt = None;
                self.prompt_kind = None;
                if kind == Some(PromptKind::Flash) {
                    self.clear_flash();
                }
                self.reset_action();
            }
            None => {
                if kind == Some(PromptKind::Flash) {
                    self.flash_on_text_changed(&child_text);
                }
            }
        }
    }

    /// Flash text-changed hook: once the typed text grows past the last
    /// query and the new rune matches an assigned label, jump there;
    /// otherwise rebuild the viewport index and reassign labels by screen
    /// distance from the cursor.
    fn flash_on_text_changed(&mut self, text: &str) {
        if text.is_empty() {
            self.clear_flash();
            return;
        }

        let typed = text.chars().count();
        if typed > self.flash.query_len && !self.flash.labels.is_empty() {
            if let Some(last) = text.chars().last() {
                if let Some(&target) = self.flash.labels.get(&last) {
                    self.prompt = None;
                    self.prompt_kind = None;
                    let op = self.pending_action;
                    self.run_operator(op, target);
                    self.reset_action();
                    self.clear_flash();
                    return;
                }
            }
        }

        self.flash.labels.clear();
        self.flash.reverse.clear();
        self.flash.query_len = typed;

        let first = self.offsets.0;
        let last = first + self.text_height();
        let found = self.buffer.index().build_literal(
            MotionKind::Flash,
            text,
            Anchor::At,
            self.buffer.lines(),
            Some((first, last)),
        );
        if !found {
            return;
        }
        let Some(matches) = self.buffer.index().snapshot(MotionKind::Flash) else {
            return;
        };

        // A label rune that equals the rune right after a match would make
        // "continue typing" and "select label" ambiguous: skip those.
        let mut invalid: HashSet<char> = HashSet::new();
        for m in &matches {
            if let Some(line) = self.buffer.line(m.row) {
                if m.end + 1 < line.sentinel_col() {
                    if let Some(r) = line.rune_at(m.end + 1) {
                        invalid.insert(r);
                    }
                }
            }
        }

        let mut closest = matches;
        let cursor = self.cursor;
        closest.sort_by_key(|m| cursor.col.abs_diff(m.start) + cursor.row.abs_diff(m.row));

        let mut next = 0;
        for label in FLASH_ALPHABET.chars() {
            if next >= closest.len() {
                break;
            }
            if invalid.contains(&label) {
                continue;
            }
            let pos = closest[next].pos();
            self.flash.labels.insert(label, pos);
            self.flash.reverse.insert(pos, label);
            next += 1;
        }
    }

    fn clear_flash(&mut self) {
        self.flash.clear();
        self.buffer.index().remove(MotionKind::Flash);
    }
}

// ---------------------------------------------------------------------------
// Other actions
// ---------------------------------------------------------------------------

impl Editor {
    /// Execute a non-operator, non-motion action. Returns whether the
    /// action was one of ours.
    pub(crate) fn run_action(&mut self, action: Action) -> bool {
        match action {
            Action::Done => self.done(),
            Action::Exit => self.exit(),
            Action::Insert => self.change_mode(Mode::Insert),
            Action::InsertAfter => {
                self.change_mode(Mode::Insert);
                let target = Position::new(self.cursor.row, self.cursor.col + self.effective_count());
                self.move_cursor_to(target);
            }
            Action::InsertEndOfLine => {
                self.change_mode(Mode::Insert);
                let target = Position::new(self.cursor.row, self.sentinel_col(self.cursor.row));
                self.move_cursor_to(target);
            }
            Action::InsertBelow => self.insert_below(),
            Action::InsertAbove => self.insert_above(),
            Action::Replace => self.change_mode(Mode::Replace),
            Action::Undo => self.undo_action(),
            Action::Redo => self.redo_action(),
            Action::PasteAfter => self.paste_after(),
            Action::PasteBefore => self.paste_before(),
            Action::MoveHalfPageUp => self.move_half_page(-1),
            Action::MoveHalfPageDown => self.move_half_page(1),
            Action::DeleteUnderCursor => self.delete_under_cursor(),
            Action::DeleteLine => {
                for _ in 0..self.effective_count() {
                    self.delete_line();
                }
            }
            Action::DeleteUntilEndOfLine => self.delete_until_end_of_line(),
            Action::ChangeUntilEndOfLine => {
                let target = Position::new(self.cursor.row, self.sentinel_col(self.cursor.row));
                self.change_until(target);
            }
            Action::MoveNextFind => self.repeat_find(1),
            Action::MovePrevFind => self.repeat_find(-1),
            Action::SwitchVisualStart => {
                if self.mode == Mode::Visual {
                    std::mem::swap(&mut self.visual_start, &mut self.cursor);
                }
            }
            Action::VisualLine => {
                if self.mode == Mode::VLine {
                    self.change_mode(Mode::Normal);
                } else {
                    self.visual_start = Position::new(self.cursor.row, 0);
                    self.change_mode(Mode::VLine);
                }
            }
            _ => return false,
        }
        true
    }

    /// Enter confirms the document. One-line prompts report their outcome
    /// to the polling parent; the main editor hands the text to the host,
    /// refusing to confirm an empty document.
    fn done(&mut self) {
        let text = self.buffer.text().to_string();
        if !self.one_line && text.trim().is_empty() {
            if let Some(modal) = &mut self.view_modal {
                modal("nothing to execute");
            }
            return;
        }
        if let Some(done) = &mut self.on_done {
            done(&text);
        } else if self.one_line {
            self.outcome = Some(PromptOutcome::Done(text));
        }
    }

    /// Esc cancels: prompts report cancellation, the main editor drops to
    /// Normal and clears the transient motion indexes.
    fn exit(&mut self) {
        if self.one_line {
            self.outcome = Some(PromptOutcome::Cancelled);
            return;
        }
        self.change_mode(Mode::Normal);
        self.buffer.index().reset_transient();
        if let Some(exit) = &mut self.on_exit {
            exit();
        }
    }

    fn insert_below(&mut self) {
        let row = self.cursor.row;
        let eol = Position::new(row, self.sentinel_col(row));
        self.change_mode(Mode::Insert);
        self.insert_group_open = false;
        self.edit_replace_coalesced("\n", eol, eol);
        self.cursor = self.buffer.clamp(Position::new(row + 1, 0), 1);
    }

    fn insert_above(&mut self) {
        let start = Position::new(self.cursor.row, 0);
        self.change_mode(Mode::Insert);
        self.insert_group_open = false;
        self.edit_replace_coalesced("\n", start, start);
        self.cursor = start;
    }

    fn undo_action(&mut self) {
        let count = self.effective_count();
        let live = Snapshot::new(self.buffer.text(), self.cursor);
        if let Some(snapshot) = self.undo.undo(count, live) {
            self.apply_snapshot(snapshot);
        }
    }

    fn redo_action(&mut self) {
        let count = self.effective_count();
        if let Some(snapshot) = self.undo.redo(count) {
            self.apply_snapshot(snapshot);
        }
    }

    fn apply_snapshot(&mut self, snapshot: Snapshot) {
        self.buffer.set_text(&snapshot.text);
        self.after_text_change(snapshot.cursor);
    }

    /// `p`. Line-wise clipboard content (trailing line break) opens below
    /// the cursor row; character-wise content lands after the cursor.
    fn paste_after(&mut self) {
        let text = self.clipboard.read();
        if text.is_empty() {
            return;
        }
        if text.ends_with('\n') {
            if self.cursor.row + 1 >= self.buffer.rows() {
                // Below the last line: open a new one instead of splicing
                // at a row that does not exist.
                let eol = Position::new(self.cursor.row, self.sentinel_col(self.cursor.row));
                let body = text.strip_suffix('\n').unwrap_or(&text);
                self.edit_replace(&format!("\n{body}"), eol, eol);
                self.cursor = self.buffer.clamp(Position::new(self.cursor.row + 1, 0), 0);
            } else {
                let at = Position::new(self.cursor.row + 1, 0);
                self.edit_replace(&text, at, at);
            }
        } else {
            let col = (self.cursor.col + 1).min(self.sentinel_col(self.cursor.row));
            let at = Position::new(self.cursor.row, col);
            self.edit_replace(&text, at, at);
        }
    }

    /// `P`. Line-wise content opens at the start of the cursor row;
    /// character-wise content lands one column left of the cursor.
    fn paste_before(&mut self) {
        let text = self.clipboard.read();
        if text.is_empty() {
            return;
        }
        let at = if text.ends_with('\n') {
            Position::new(self.cursor.row, 0)
        } else {
            Position::new(self.cursor.row, self.cursor.col.saturating_sub(1))
        };
        self.edit_replace(&text, at, at);
    }

    /// Ctrl-D / Ctrl-U: move half the text height, preserving the cursor's
    /// distance from the top of the viewport.
    fn move_half_page(&mut self, direction: isize) {
        let h = self.text_height().max(1);
        let rows = self.buffer.rows();
        if direction > 0 && self.cursor.row >= rows - 1 {
            return;
        }
        if direction < 0 && self.cursor.row < 1 {
            return;
        }

        let target = self.cursor.row as isize + direction * (h / 2) as isize;
        let distance_from_top = self.cursor.row.saturating_sub(self.offsets.0);
        self.cursor = self
            .buffer
            .line_cursor(self.cursor, target, self.mode.block_offset());

        let mut offset = self.cursor.row.saturating_sub(distance_from_top);
        offset = offset.min(rows.saturating_sub(h));
        self.offsets.0 = offset;
    }

    /// `x`: delete `count` graphemes under and after the cursor.
    fn delete_under_cursor(&mut self) {
        let sentinel = self.sentinel_col(self.cursor.row);
        let until_col = (self.cursor.col + self.effective_count()).min(sentinel);
        let until = Position::new(self.cursor.row, until_col);
        let from = self.cursor;
        self.edit_replace("", from, until);
    }

    /// `dd`. The last remaining line is cleared rather than removed: the
    /// document never has zero rows, and the cursor lands at the origin.
    fn delete_line(&mut self) {
        let rows = self.buffer.rows();
        let row = self.cursor.row;

        if rows == 1 {
            if self.buffer.line(0).is_some_and(SpanLine::is_empty) {
                return;
            }
            self.edit_replace("", Position::ZERO, Position::new(0, self.sentinel_col(0)));
            self.cursor = Position::ZERO;
            return;
        }

        let (from, until) = if row == rows - 1 {
            (
                Position::new(row - 1, self.sentinel_col(row - 1)),
                Position::new(row, self.sentinel_col(row)),
            )
        } else {
            (Position::new(row, 0), Position::new(row + 1, 0))
        };
        self.edit_replace("", from, until);
    }

    /// `D`: delete from the cursor through the end of the line.
    fn delete_until_end_of_line(&mut self) {
        if self.buffer.line(self.cursor.row).is_some_and(SpanLine::is_empty) {
            return;
        }
        let until = Position::new(self.cursor.row, self.sentinel_col(self.cursor.row));
        let from = self.cursor;
        self.edit_replace("", from, until);
    }

    /// `;` / `,`: repeat the last find/till in (or against) its direction.
    fn repeat_find(&mut self, direction: isize) {
        let count = self.effective_count();
        let index = self.buffer.index().clone();
        let widest = self.buffer.widest_col();

        let forward = |kind: MotionKind, this: &mut Self| {
            if let Some(pos) = index.next(kind, count, this.cursor, false) {
                this.move_cursor_to(pos);
            }
        };
        let backward = |kind: MotionKind, this: &mut Self| {
            if let Some(pos) = index.prev(kind, count, this.cursor, false, widest) {
                this.move_cursor_to(pos);
            }
        };

        let ahead = (direction > 0) != self.last_find_backward;
        if index.has(MotionKind::Find) {
            if ahead {
                forward(MotionKind::Find, self);
            } else {
                backward(MotionKind::Find, self);
            }
        } else if index.has(MotionKind::Til) {
            if direction > 0 {
                forward(MotionKind::Til, self);
            } else {
                backward(MotionKind::Til, self);
            }
        } else if index.has(MotionKind::TilBack) {
            if direction > 0 {
                backward(MotionKind::TilBack, self);
            } else {
                forward(MotionKind::TilBack, self);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
