//! Screen collaborator — the only drawing surface.
//!
//! The terminal library is external; the editor draws through this trait
//! and describes styling with the small local [`Style`]/[`Color`] types.
//! The host maps them onto whatever cell representation its backend uses.
//!
//! [`MemoryScreen`] is a grid-backed implementation for tests and headless
//! hosts: it records every `set_content` call so assertions can read back
//! rendered rows.

use std::collections::HashMap;

use crate::mode::CursorShape;

// ---------------------------------------------------------------------------
// Color & Style
// ---------------------------------------------------------------------------

/// A terminal color. `Default` means "whatever the terminal's default is";
/// the renderer uses it to detect cells that still need the mode-dependent
/// background (current-line highlight).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Color {
    #[default]
    Default,
    Rgb(u8, u8, u8),
}

impl Color {
    /// Build from a `0xRRGGBB` literal.
    #[inline]
    #[must_use]
    pub const fn hex(rgb: u32) -> Self {
        Self::Rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
    }
}

/// Named colors the renderer glue uses.
pub mod palette {
    use super::Color;

    pub const WHITE: Color = Color::hex(0xffffff);
    pub const GRAY: Color = Color::hex(0x808080);
    pub const SLATE: Color = Color::hex(0x708090);
    pub const ORANGE: Color = Color::hex(0xffa500);
    pub const YELLOW: Color = Color::hex(0xffff00);
    pub const GREEN: Color = Color::hex(0x00ff00);
    pub const PINK: Color = Color::hex(0xffc0cb);
    pub const RED: Color = Color::hex(0xff0000);
    /// Search-match background.
    pub const CONTRAST: Color = Color::hex(0x0f4b6e);
    /// Visual-selection / secondary match background.
    pub const MORE_CONTRAST: Color = Color::hex(0x1d3b53);
}

/// Underline rendering for a cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Underline {
    #[default]
    None,
    /// Curly underline, used for syntax errors.
    Curly,
}

/// A cell style: foreground, background, underline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Style {
    pub fg: Color,
    pub bg: Color,
    pub underline: Underline,
}

impl Style {
    /// Style with only a foreground set.
    #[inline]
    #[must_use]
    pub const fn fg(color: Color) -> Self {
        Self {
            fg: color,
            bg: Color::Default,
            underline: Underline::None,
        }
    }

    /// Replace the background.
    #[inline]
    #[must_use]
    pub const fn on(self, bg: Color) -> Self {
        Self { bg, ..self }
    }

    /// Add a curly underline.
    #[inline]
    #[must_use]
    pub const fn curly(self) -> Self {
        Self {
            underline: Underline::Curly,
            ..self
        }
    }
}

// ---------------------------------------------------------------------------
// Rect
// ---------------------------------------------------------------------------

/// The editor's inner drawing rectangle in screen coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: usize,
    pub y: usize,
    pub w: usize,
    pub h: usize,
}

impl Rect {
    #[inline]
    #[must_use]
    pub const fn new(x: usize, y: usize, w: usize, h: usize) -> Self {
        Self { x, y, w, h }
    }
}

// ---------------------------------------------------------------------------
// Screen
// ---------------------------------------------------------------------------

/// The terminal abstraction the editor draws on.
pub trait Screen {
    /// Paint one cell: primary rune, trailing combining runes, style.
    fn set_content(&mut self, x: usize, y: usize, ch: char, combining: &[char], style: Style);

    /// Place the hardware cursor.
    fn show_cursor(&mut self, x: usize, y: usize);

    /// Hide the hardware cursor (disabled editor, prompt owns focus).
    fn hide_cursor(&mut self);

    /// Set the hardware cursor shape for the current mode.
    fn set_cursor_style(&mut self, shape: CursorShape);
}

// ---------------------------------------------------------------------------
// MemoryScreen
// ---------------------------------------------------------------------------

/// A recording screen for tests and headless hosts.
#[derive(Debug, Default)]
pub struct MemoryScreen {
    cells: HashMap<(usize, usize), (char, Style)>,
    cursor: Option<(usize, usize)>,
    shape: Option<CursorShape>,
}

impl MemoryScreen {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The rune and style last painted at a cell.
    #[must_use]
    pub fn cell(&self, x: usize, y: usize) -> Option<(char, Style)> {
        self.cells.get(&(x, y)).copied()
    }

    /// Read back `w` cells of row `y` starting at `x` as a string, with
    /// unpainted cells rendered as spaces.
    #[must_use]
    pub fn row_text(&self, x: usize, y: usize, w: usize) -> String {
        (x..x + w)
            .map(|col| self.cells.get(&(col, y)).map_or(' ', |(ch, _)| *ch))
            .collect()
    }

    /// Where the hardware cursor was last shown, if visible.
    #[must_use]
    pub const fn cursor(&self) -> Option<(usize, usize)> {
        self.cursor
    }

    /// The last cursor shape set.
    #[must_use]
    pub const fn cursor_shape(&self) -> Option<CursorShape> {
        self.shape
    }
}

impl Screen for MemoryScreen {
    fn set_content(&mut self, x: usize, y: usize, ch: char, _combining: &[char], style: Style) {
        self.cells.insert((x, y), (ch, style));
    }

    fn show_cursor(&mut self, x: usize, y: usize) {
        self.cursor = Some((x, y));
    }

    fn hide_cursor(&mut self) {
        self.cursor = None;
    }

    fn set_cursor_style(&mut self, shape: CursorShape) {
        self.shape = Some(shape);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_unpacks_channels() {
        assert_eq!(Color::hex(0x7aa2f7), Color::Rgb(0x7a, 0xa2, 0xf7));
    }

    #[test]
    fn style_builders_compose() {
        let s = Style::fg(palette::WHITE).on(palette::GRAY).curly();
        assert_eq!(s.fg, palette::WHITE);
        assert_eq!(s.bg, palette::GRAY);
        assert_eq!(s.underline, Underline::Curly);
    }

    #[test]
    fn memory_screen_records_cells() {
        let mut screen = MemoryScreen::new();
        screen.set_content(2, 1, 'q', &[], Style::default());
        screen.set_content(3, 1, '!', &[], Style::default());
        assert_eq!(screen.row_text(2, 1, 3), "q! ");
        assert_eq!(screen.cell(2, 1).unwrap().0, 'q');
    }

    #[test]
    fn memory_screen_tracks_cursor() {
        let mut screen = MemoryScreen::new();
        screen.show_cursor(4, 2);
        assert_eq!(screen.cursor(), Some((4, 2)));
        screen.hide_cursor();
        assert_eq!(screen.cursor(), None);
    }
}
