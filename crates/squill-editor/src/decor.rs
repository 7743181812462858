//! The decorator pipeline.
//!
//! Decorators run in a fixed order — syntax highlight, search, visual
//! selection, flash labels — each writing into the per-cell map
//! `(row, col) → Decoration`. Later decorators overwrite earlier ones, so
//! a flash label wins over a search match wins over a syntax color. The
//! renderer consults the finished map per visible cell: it paints the
//! decoration background across the whole grapheme width, then the glyph
//! (original, or the decoration's replacement text).

use std::collections::HashMap;

use crate::editor::Editor;
use crate::mode::Mode;
use crate::motion::MotionKind;
use crate::position::Position;
use crate::screen::{palette, Color, Style};

/// One decorated cell: a style, and optionally replacement text drawn over
/// the original glyph (flash labels, the end-of-line error annotation).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Decoration {
    pub style: Style,
    pub text: String,
}

impl Decoration {
    fn bg(color: Color) -> Self {
        Self {
            style: Style::fg(Color::Default).on(color),
            text: String::new(),
        }
    }
}

/// Run the pipeline for the viewport `(x, y, w, h)` (x in printable cells,
/// y in rows) and return the finished cell map.
pub(crate) fn build(
    editor: &Editor,
    _x: usize,
    y: usize,
    _w: usize,
    h: usize,
) -> HashMap<(usize, usize), Decoration> {
    let mut cells = HashMap::new();
    highlight_decorator(editor, &mut cells);
    search_decorator(editor, y, h, &mut cells);
    visual_decorator(editor, y, h, &mut cells);
    flash_decorator(editor, y, h, &mut cells);
    cells
}

// ---------------------------------------------------------------------------
// Syntax highlight
// ---------------------------------------------------------------------------

/// Map provider byte ranges onto cells through a byte → (row, col) table.
/// The `error` kind additionally annotates the end of its line.
fn highlight_decorator(editor: &Editor, cells: &mut HashMap<(usize, usize), Decoration>) {
    if editor.highlights.is_empty() {
        return;
    }

    // byte offset → (row, col), newline bytes owned by the sentinel.
    let mut mapper: Vec<(usize, usize)> = Vec::with_capacity(editor.buffer.text().len() + 1);
    for (row, line) in editor.buffer.lines().iter().enumerate() {
        for (col, span) in line.spans().iter().enumerate() {
            for _ in 0..span.bytes {
                mapper.push((row, col));
            }
        }
        mapper.push((row, line.sentinel_col()));
    }

    for span in &editor.highlights {
        let Some(style) = crate::highlight::style_for_kind(&span.kind) else {
            continue;
        };
        for byte in span.start..span.end.min(mapper.len()) {
            let (row, col) = mapper[byte];
            cells.insert((row, col), Decoration { style, text: String::new() });

            if span.kind == "error" {
                let sentinel = editor
                    .buffer
                    .line(row)
                    .map_or(0, crate::span::SpanLine::sentinel_col);
                cells.insert(
                    (row, sentinel),
                    Decoration {
                        style: Style::fg(palette::RED).curly(),
                        text: "     syntax error".to_string(),
                    },
                );
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Search / find / till
// ---------------------------------------------------------------------------

/// Highlight the active transient index: till, till-back, find, or search
/// (first one present wins). Till kinds also mark the actual match rune —
/// their entries anchor one cell away from it.
fn search_decorator(
    editor: &Editor,
    y: usize,
    h: usize,
    cells: &mut HashMap<(usize, usize), Decoration>,
) {
    let index = editor.buffer.index();
    let has_til = index.has(MotionKind::Til);
    let has_til_back = index.has(MotionKind::TilBack);

    let entries = index
        .snapshot(MotionKind::Til)
        .or_else(|| index.snapshot(MotionKind::TilBack))
        .or_else(|| index.snapshot(MotionKind::Find))
        .or_else(|| index.snapshot(MotionKind::Search));
    let Some(entries) = entries else { return };

    for entry in &entries {
        if entry.row < y {
            continue;
        }
        if entry.row >= y + h {
            break;
        }

        if has_til {
            cells.insert(
                (entry.row, entry.start + 1),
                Decoration::bg(palette::CONTRAST),
            );
        } else if has_til_back && entry.start > 0 {
            cells.insert(
                (entry.row, entry.start - 1),
                Decoration::bg(palette::CONTRAST),
            );
        }
        for col in entry.start..=entry.end {
            cells.insert((entry.row, col), Decoration::bg(palette::MORE_CONTRAST));
        }
    }
}

// ---------------------------------------------------------------------------
// Visual selection
// ---------------------------------------------------------------------------

/// Paint the active selection: the character-wise range between the visual
/// start and the cursor, or whole rows in VLine.
fn visual_decorator(
    editor: &Editor,
    y: usize,
    h: usize,
    cells: &mut HashMap<(usize, usize), Decoration>,
) {
    if !editor.mode.is_visual() {
        return;
    }

    let (from, until) = Position::ordered(editor.visual_start, editor.cursor);

    for row in from.row..=until.row {
        if row < y {
            continue;
        }
        if row >= y + h {
            break;
        }
        let Some(line) = editor.buffer.line(row) else {
            continue;
        };

        for col in 0..line.len() {
            let selected = match editor.mode {
                Mode::VLine => true,
                _ => {
                    (row == from.row && row == until.row && col >= from.col && col <= until.col)
                        || (row == from.row && row < until.row && col >= from.col)
                        || (row > from.row && row < until.row)
                        || (row == until.row && row > from.row && col <= until.col)
                }
            };
            if selected {
                cells.insert((row, col), Decoration::bg(palette::MORE_CONTRAST));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Flash labels
// ---------------------------------------------------------------------------

/// Paint flash matches, then the assigned label rune at the trailing cell
/// of each labeled match.
fn flash_decorator(
    editor: &Editor,
    y: usize,
    h: usize,
    cells: &mut HashMap<(usize, usize), Decoration>,
) {
    let Some(entries) = editor.buffer.index().snapshot(MotionKind::Flash) else {
        return;
    };

    for entry in &entries {
        if entry.row < y || entry.row >= y + h {
            continue;
        }
        for col in entry.start..=entry.end {
            cells.insert((entry.row, col), Decoration::bg(palette::CONTRAST));
        }
    }

    for entry in &entries {
        if entry.row < y || entry.row >= y + h {
            continue;
        }
        if let Some(label) = editor.flash.reverse.get(&Position::new(entry.row, entry.start)) {
            cells.insert(
                (entry.row, entry.end + 1),
                Decoration {
                    style: Style::fg(Color::Default).on(palette::MORE_CONTRAST),
                    text: label.to_string(),
                },
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
