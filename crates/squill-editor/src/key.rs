//! Key events and their terminal event names.
//!
//! The terminal backend is an external collaborator, so this crate defines
//! its own small key types rather than depending on any particular input
//! library. The dispatcher never matches on `KeyCode` directly for bindable
//! keys — it converts every event to its *event name* and walks the keymap
//! trie with it:
//!
//! - a plain rune is its own name (`l`, `G`, `$`, ...)
//! - a rune with Ctrl is `ctrl+<rune>`
//! - named keys use lowercased names: `esc`, `enter`, `tab`, `backspace`,
//!   `left`, `right`, `up`, `down`

use bitflags::bitflags;

// ---------------------------------------------------------------------------
// Key types
// ---------------------------------------------------------------------------

/// Identity of a key. Printable characters use [`Char`](KeyCode::Char);
/// named keys have dedicated variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    /// A Unicode scalar value (printable).
    Char(char),
    Enter,
    Tab,
    Backspace,
    Escape,
    Up,
    Down,
    Left,
    Right,
}

bitflags! {
    /// Keyboard modifier flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0000_0001;
        const ALT   = 0b0000_0010;
        const CTRL  = 0b0000_0100;
    }
}

/// A keyboard event: key identity plus active modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// A plain (unmodified) key event.
    #[inline]
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::empty(),
        }
    }

    /// A plain rune event.
    #[inline]
    #[must_use]
    pub const fn rune(ch: char) -> Self {
        Self::new(KeyCode::Char(ch))
    }

    /// A Ctrl-modified rune event.
    #[inline]
    #[must_use]
    pub const fn ctrl(ch: char) -> Self {
        Self {
            code: KeyCode::Char(ch),
            modifiers: Modifiers::CTRL,
        }
    }

    /// The rune this event carries, if it is an unmodified rune event.
    /// Ctrl-modified runes are named keys, not text input.
    #[must_use]
    pub fn plain_rune(self) -> Option<char> {
        match self.code {
            KeyCode::Char(ch) if !self.modifiers.contains(Modifiers::CTRL) => Some(ch),
            _ => None,
        }
    }

    /// The event name used for keymap lookup.
    #[must_use]
    pub fn name(self) -> String {
        match self.code {
            KeyCode::Char(ch) => {
                if self.modifiers.contains(Modifiers::CTRL) {
                    format!("ctrl+{ch}")
                } else {
                    ch.to_string()
                }
            }
            KeyCode::Enter => "enter".to_string(),
            KeyCode::Tab => "tab".to_string(),
            KeyCode::Backspace => "backspace".to_string(),
            KeyCode::Escape => "esc".to_string(),
            KeyCode::Up => "up".to_string(),
            KeyCode::Down => "down".to_string(),
            KeyCode::Left => "left".to_string(),
            KeyCode::Right => "right".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
