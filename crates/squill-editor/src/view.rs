//! Renderer glue — viewport bookkeeping and draw calls.
//!
//! [`Editor::draw`] adjusts the viewport offsets so the cursor stays
//! visible, runs the decorator pipeline, and converts spans + decorations
//! into `set_content` calls on the screen collaborator. Offsets clamp on
//! every draw: the row offset stays within `[cursor.row - h + 1,
//! cursor.row]` without leaving trailing blank rows, the column offset
//! keeps the cursor's printable x inside the window.
//!
//! The multi-line editor draws a status line (mode, pending keys, cursor
//! position) on its last row and a relative-numbered gutter; the one-line
//! editor draws a compact `(n)`-style mode indicator instead. When the
//! embedded prompt is active it draws over the bottom row and owns the
//! hardware cursor.

use std::time::Instant;

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::action::Action;
use crate::decor;
use crate::editor::Editor;
use crate::mode::Mode;
use crate::screen::{palette, Color, Screen, Style};

/// Draw `text` at `(x, y)`, clipped to `max_w` printable cells. Returns the
/// width actually drawn.
fn print_str(screen: &mut dyn Screen, x: usize, y: usize, max_w: usize, text: &str, style: Style) -> usize {
    let mut drawn = 0;
    for cluster in text.graphemes(true) {
        let width = cluster.width().max(1);
        if drawn + width > max_w {
            break;
        }
        let mut chars = cluster.chars();
        let Some(first) = chars.next() else { continue };
        let combining: Vec<char> = chars.collect();
        screen.set_content(x + drawn, y, first, &combining, style);
        drawn += width;
    }
    drawn
}

impl Editor {
    /// Render one frame. Commits an expired yank flash first, then fixes
    /// the viewport offsets, rebuilds decorations, and paints.
    pub fn draw(&mut self, screen: &mut dyn Screen) {
        if let Some(deadline) = self.yank_deadline {
            if Instant::now() >= deadline {
                self.flush_pending_yank();
            }
        }

        let rect = self.rect;
        if rect.w == 0 || rect.h == 0 {
            return;
        }
        let (mut x, y) = (rect.x, rect.y);
        let mut w = rect.w;
        let mut h = rect.h;

        if self.one_line {
            let indicator = format!("({}) ", self.mode.group());
            print_str(screen, x, y, 4, &indicator, Style::fg(palette::YELLOW));
            x += 4;
            w = w.saturating_sub(4);
        } else {
            self.draw_status_line(screen, x, y, w, h);
            h -= 1;
        }
        if w == 0 || h == 0 {
            return;
        }

        // Keep the cursor row inside the window, without trailing blank rows.
        let rows = self.buffer.rows();
        if self.cursor.row < self.offsets.0 {
            self.offsets.0 = self.cursor.row;
        }
        if self.cursor.row >= self.offsets.0 + h {
            self.offsets.0 = self.cursor.row - h + 1;
        }
        if self.offsets.0 + h > rows {
            self.offsets.0 = rows.saturating_sub(h);
        }

        // Keep the cursor's printable x inside the window.
        let cursor_x = self.buffer.lines()[self.cursor.row].x_at(self.cursor.col);
        if cursor_x < self.offsets.1 {
            self.offsets.1 = cursor_x.saturating_sub(1);
        }
        let digits = rows.to_string().len();
        let gutter = if self.one_line { 0 } else { digits + 1 };
        if cursor_x > self.offsets.1 + w {
            self.offsets.1 = cursor_x - w + 1;
        }

        let cells = decor::build(self, self.offsets.1, self.offsets.0, w, h);
        self.decorations = cells;

        let last_line = (self.offsets.0 + h).min(rows);
        let mut text_y = y;
        for row in self.offsets.0..last_line {
            self.draw_row(screen, row, x, text_y, w, gutter);
            text_y += 1;
        }

        // The prompt overlays the bottom row and owns the hardware cursor.
        if let Some(mut child) = self.prompt.take() {
            child.draw(screen);
            self.prompt = Some(child);
        } else if self.disabled {
            screen.hide_cursor();
        } else {
            screen.set_cursor_style(self.mode.cursor_shape());
            let cx = x + gutter + cursor_x - self.offsets.1.min(cursor_x);
            let cy = y + self.cursor.row - self.offsets.0;
            screen.show_cursor(cx, cy);
        }
    }

    /// Mode name, pending keys, and cursor position on the bottom row.
    fn draw_status_line(&self, screen: &mut dyn Screen, x: usize, y: usize, w: usize, h: usize) {
        let sy = y + h - 1;
        let mode_color = match self.mode {
            Mode::Insert => palette::GREEN,
            Mode::Replace => palette::PINK,
            _ => palette::GRAY,
        };

        let mut sx = x;
        sx += print_str(screen, sx, sy, w, self.mode.display_name(), Style::fg(mode_color));
        sx += print_str(
            screen,
            sx,
            sy,
            (x + w).saturating_sub(sx),
            " mode",
            Style::fg(palette::WHITE),
        );

        if !self.pending.is_empty() || self.pending_count > 0 || self.pending_action != Action::None
        {
            let count = if self.pending_count > 0 {
                self.pending_count.to_string()
            } else {
                String::new()
            };
            let label = format!("({count}{})", self.pending.concat());
            sx += 1;
            sx += print_str(
                screen,
                sx,
                sy,
                (x + w).saturating_sub(sx),
                &label,
                Style::fg(palette::YELLOW),
            );
        }

        let line_len = self
            .buffer
            .line(self.cursor.row)
            .map_or(1, crate::span::SpanLine::len);
        let pos = format!(
            "x: {}/{} y: {}/{}",
            self.cursor.col + 1,
            line_len,
            self.cursor.row + 1,
            self.buffer.rows(),
        );
        let px = (x + w).saturating_sub(pos.width());
        if px > sx {
            print_str(screen, px, sy, pos.width(), &pos, Style::fg(palette::WHITE));
        }
    }

    /// One text row: current-line background, gutter number, then spans
    /// with their decorations, clipped against the horizontal offset.
    fn draw_row(
        &self,
        screen: &mut dyn Screen,
        row: usize,
        x: usize,
        text_y: usize,
        w: usize,
        gutter: usize,
    ) {
        let on_cursor_row = row == self.cursor.row && self.prompt.is_none() && !self.disabled;
        let line_bg = if !self.one_line && on_cursor_row {
            palette::GRAY
        } else {
            Color::Default
        };

        if !self.one_line && on_cursor_row {
            for i in 0..w {
                screen.set_content(
                    x + i,
                    text_y,
                    ' ',
                    &[],
                    Style::fg(palette::WHITE).on(palette::GRAY),
                );
            }
        }

        let mut text_x = x;
        if !self.one_line {
            let digits = gutter.saturating_sub(1);
            let number = if row == self.cursor.row {
                row + 1
            } else {
                row.abs_diff(self.cursor.row)
            };
            let color = if on_cursor_row {
                palette::ORANGE
            } else {
                palette::SLATE
            };
            let label = format!("{number:>digits$}");
            print_str(screen, x, text_y, gutter, &label, Style::fg(color).on(line_bg));
            text_x += gutter;
        }

        let left_edge = x + self.offsets.1;
        let right_edge = left_edge + w;
        let line = &self.buffer.lines()[row];

        for (col, span) in line.spans().iter().enumerate() {
            let deco = self.decorations.get(&(row, col));

            if span.is_sentinel() {
                let Some(d) = deco else { break };
                if text_x < left_edge || text_x >= right_edge {
                    break;
                }
                let sx = text_x - self.offsets.1;
                let mut style = d.style;
                if style.bg == Color::Default {
                    style.bg = line_bg;
                }
                screen.set_content(sx, text_y, ' ', &[], style);
                if !d.text.is_empty() {
                    print_str(screen, sx, text_y, right_edge.saturating_sub(text_x), &d.text, style);
                }
                break;
            }

            // Horizontal clipping.
            if text_x + span.width <= left_edge {
                text_x += span.width;
                continue;
            }
            if text_x >= right_edge {
                break;
            }

            let is_tab = span.rune() == Some('\t');
            let mut width = span.width;
            let mut sx = text_x;
            let mut filler: Option<char> = None;
            if text_x < left_edge {
                // Straddling the left edge: draw only the visible tail.
                width = text_x + width - left_edge;
                sx = left_edge;
                if !is_tab {
                    filler = Some('<');
                }
            } else if text_x + width > right_edge {
                // Straddling the right edge: draw only the visible head.
                width = right_edge - text_x;
                if !is_tab {
                    filler = Some('>');
                }
            }
            let sx = sx - self.offsets.1;

            let mut style = deco.map_or(Style::default(), |d| d.style);
            if style.bg == Color::Default {
                style.bg = line_bg;
            }

            if deco.is_none() || deco.is_some_and(|d| d.text.is_empty()) {
                if is_tab {
                    for i in 0..width {
                        screen.set_content(sx + i, text_y, ' ', &[], style);
                    }
                } else if let Some(fill) = filler {
                    for i in 0..width {
                        screen.set_content(sx + i, text_y, fill, &[], style);
                    }
                } else {
                    let mut chars = span.cluster.chars();
                    if let Some(first) = chars.next() {
                        let combining: Vec<char> = chars.collect();
                        screen.set_content(sx, text_y, first, &combining, style);
                    }
                }
            }

            if let Some(d) = deco {
                if !d.text.is_empty() {
                    // Background across the grapheme width, then the text.
                    for i in 0..width {
                        screen.set_content(sx + i, text_y, ' ', &[], style);
                    }
                    print_str(screen, sx, text_y, span.width.max(1), &d.text, style);
                }
            }

            text_x += span.width;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::KeyEvent;
    use crate::position::Position;
    use crate::screen::{MemoryScreen, Rect};
    use std::sync::Arc;

    fn editor_at(text: &str, cursor: Position, rect: Rect) -> Editor {
        let mut ed = Editor::new(Arc::new(squill_keymap::Keymap::with_default_bindings()));
        ed.set_rect(rect);
        ed.set_text(text, cursor);
        ed
    }

    fn many_lines(n: usize) -> String {
        (0..n).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n")
    }

    /// The §-style viewport invariant: the cursor cell sits inside the
    /// visible rectangle and the offsets leave no trailing blank rows.
    fn assert_viewport_invariant(ed: &Editor, h: usize) {
        let (row_off, col_off) = ed.offsets();
        assert!(ed.cursor().row >= row_off, "cursor above viewport");
        assert!(ed.cursor().row < row_off + h, "cursor below viewport");
        let rows = ed.buffer().rows();
        assert!(row_off <= rows.saturating_sub(1));
        assert!(row_off + h >= rows.min(row_off + h), "trailing blank rows");
        if rows > h {
            assert!(row_off + h <= rows, "offset leaves blank rows");
        } else {
            assert_eq!(row_off, 0);
        }
        let x = ed.buffer().lines()[ed.cursor().row].x_at(ed.cursor().col);
        assert!(x >= col_off || x == 0);
    }

    // -- Viewport -------------------------------------------------------------

    #[test]
    fn cursor_visible_after_jump_to_last_line() {
        let rect = Rect::new(0, 0, 30, 6); // 5 text rows
        let mut ed = editor_at(&many_lines(40), Position::ZERO, rect);
        let mut screen = MemoryScreen::new();

        ed.handle_key(KeyEvent::rune('G'));
        ed.draw(&mut screen);
        assert_eq!(ed.cursor().row, 39);
        assert_eq!(ed.offsets().0, 35);
        assert_viewport_invariant(&ed, 5);

        for ch in "gg".chars() {
            ed.handle_key(KeyEvent::rune(ch));
        }
        ed.draw(&mut screen);
        assert_eq!(ed.offsets().0, 0);
        assert_viewport_invariant(&ed, 5);
    }

    #[test]
    fn viewport_never_leaves_trailing_blank_rows() {
        let rect = Rect::new(0, 0, 30, 8); // 7 text rows
        let mut ed = editor_at(&many_lines(10), Position::ZERO, rect);
        let mut screen = MemoryScreen::new();

        ed.handle_key(KeyEvent::rune('G'));
        ed.draw(&mut screen);
        // 10 rows, 7 visible: the most the offset may be is 3.
        assert_eq!(ed.offsets().0, 3);

        ed.offsets = (9, 0); // force a bad offset; draw must repair it
        for ch in "gg".chars() {
            ed.handle_key(KeyEvent::rune(ch));
        }
        ed.draw(&mut screen);
        assert_eq!(ed.offsets().0, 0);
    }

    #[test]
    fn horizontal_offset_follows_long_line() {
        let rect = Rect::new(0, 0, 12, 3);
        let long = "abcdefghijklmnopqrstuvwxyz";
        let mut ed = editor_at(long, Position::ZERO, rect);
        let mut screen = MemoryScreen::new();

        ed.handle_key(KeyEvent::rune('$'));
        ed.draw(&mut screen);
        let (_, col_off) = ed.offsets();
        assert!(col_off > 0, "window must scroll right");
        let x = ed.buffer().lines()[0].x_at(ed.cursor().col);
        assert!(x >= col_off && x <= col_off + 12);
    }

    // -- Rendering ------------------------------------------------------------

    #[test]
    fn draws_text_after_the_gutter() {
        let rect = Rect::new(0, 0, 20, 3);
        let mut ed = editor_at("select 1\nfrom t", Position::ZERO, rect);
        let mut screen = MemoryScreen::new();
        ed.draw(&mut screen);
        // Gutter is 1 digit + 1 space wide.
        assert_eq!(screen.row_text(2, 0, 8), "select 1");
        assert_eq!(screen.row_text(2, 1, 6), "from t");
    }

    #[test]
    fn gutter_numbers_are_relative_except_cursor_row() {
        let rect = Rect::new(0, 0, 20, 5);
        let mut ed = editor_at("a\nb\nc", Position::new(1, 0), rect);
        let mut screen = MemoryScreen::new();
        ed.draw(&mut screen);
        assert_eq!(screen.cell(0, 0).unwrap().0, '1'); // one above
        assert_eq!(screen.cell(0, 1).unwrap().0, '2'); // cursor row, absolute
        assert_eq!(screen.cell(0, 2).unwrap().0, '1'); // one below
    }

    #[test]
    fn one_line_mode_draws_indicator_and_no_gutter() {
        let rect = Rect::new(0, 0, 20, 1);
        let mut ed = Editor::new(Arc::new(squill_keymap::Keymap::with_default_bindings()))
            .one_line();
        ed.set_rect(rect);
        ed.set_text("abc", Position::ZERO);
        let mut screen = MemoryScreen::new();
        ed.draw(&mut screen);
        assert_eq!(screen.row_text(0, 0, 4), "(n) ");
        assert_eq!(screen.row_text(4, 0, 3), "abc");
    }

    #[test]
    fn status_line_shows_mode_name() {
        let rect = Rect::new(0, 0, 30, 4);
        let mut ed = editor_at("x", Position::ZERO, rect);
        let mut screen = MemoryScreen::new();
        ed.draw(&mut screen);
        assert_eq!(screen.row_text(0, 3, 11), "NORMAL mode");
    }

    #[test]
    fn status_line_shows_pending_keys() {
        let rect = Rect::new(0, 0, 30, 4);
        let mut ed = editor_at("foo bar", Position::ZERO, rect);
        ed.buffer().index().wait_converged();
        ed.handle_key(KeyEvent::rune('2'));
        ed.handle_key(KeyEvent::rune('d'));
        let mut screen = MemoryScreen::new();
        ed.draw(&mut screen);
        assert_eq!(screen.row_text(12, 3, 4), "(2d)");
    }

    #[test]
    fn hardware_cursor_tracks_position() {
        let rect = Rect::new(0, 0, 20, 3);
        let mut ed = editor_at("abcdef", Position::new(0, 3), rect);
        let mut screen = MemoryScreen::new();
        ed.draw(&mut screen);
        // Gutter width 2, no offsets: cell x = 2 + 3.
        assert_eq!(screen.cursor(), Some((5, 0)));
        assert_eq!(
            screen.cursor_shape(),
            Some(crate::mode::CursorShape::SteadyBlock)
        );
    }

    #[test]
    fn disabled_editor_hides_cursor() {
        let rect = Rect::new(0, 0, 20, 3);
        let mut ed = editor_at("abc", Position::ZERO, rect);
        ed.set_disabled(true);
        let mut screen = MemoryScreen::new();
        ed.draw(&mut screen);
        assert_eq!(screen.cursor(), None);
    }

    #[test]
    fn wide_glyphs_render_without_panicking() {
        let rect = Rect::new(0, 0, 8, 3);
        let mut ed = editor_at("中文字符测试", Position::ZERO, rect);
        let mut screen = MemoryScreen::new();
        ed.handle_key(KeyEvent::rune('$'));
        ed.draw(&mut screen);
        ed.handle_key(KeyEvent::rune('0'));
        ed.draw(&mut screen);
    }

    #[test]
    fn prompt_draws_over_bottom_row() {
        let rect = Rect::new(0, 0, 20, 5);
        let mut ed = editor_at("foo bar", Position::ZERO, rect);
        ed.handle_key(KeyEvent::rune('/'));
        assert!(ed.prompt_active());
        for ch in "ba".chars() {
            ed.handle_key(KeyEvent::rune(ch));
        }
        let mut screen = MemoryScreen::new();
        ed.draw(&mut screen);
        // The prompt's one-line indicator + typed query on the bottom row.
        assert_eq!(screen.row_text(0, 4, 4), "(i) ");
        assert_eq!(screen.row_text(4, 4, 2), "ba");
    }

    #[test]
    fn tab_renders_as_blank_cells() {
        let rect = Rect::new(0, 0, 20, 3);
        let mut ed = editor_at("\tx", Position::ZERO, rect);
        let mut screen = MemoryScreen::new();
        ed.draw(&mut screen);
        // Gutter 2 wide, then 4 tab cells, then 'x'.
        assert_eq!(screen.row_text(2, 0, 5), "    x");
    }
}
