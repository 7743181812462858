//! Syntax-highlight collaborator and the closed style palette.
//!
//! The provider is opaque: given the buffer text it returns byte-ranged
//! capture kinds (`"keyword"`, `"string"`, `"function.call"`, ...). The
//! editor never parses SQL itself — in the workspace the host wires a
//! tree-sitter-backed provider here; one-line prompts run without one.
//!
//! [`style_for_kind`] is the closed palette map from capture kind to cell
//! style. Unknown kinds draw unstyled. The `"error"` kind additionally gets
//! an end-of-line annotation from the decorator pipeline.

use crate::screen::{palette, Color, Style};

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

/// One highlighted byte range of the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightSpan {
    /// Byte offset of the first byte, inclusive.
    pub start: usize,
    /// Byte offset past the last byte, exclusive.
    pub end: usize,
    /// Capture kind, e.g. `"keyword"` or `"error"`.
    pub kind: String,
}

impl HighlightSpan {
    #[must_use]
    pub fn new(start: usize, end: usize, kind: &str) -> Self {
        Self {
            start,
            end,
            kind: kind.to_string(),
        }
    }
}

/// The opaque highlight function `(text) -> [(byte_start, byte_end, kind)]`.
pub trait HighlightProvider {
    fn highlight(&self, text: &str) -> Vec<HighlightSpan>;
}

impl<F> HighlightProvider for F
where
    F: Fn(&str) -> Vec<HighlightSpan>,
{
    fn highlight(&self, text: &str) -> Vec<HighlightSpan> {
        self(text)
    }
}

// ---------------------------------------------------------------------------
// Palette
// ---------------------------------------------------------------------------

/// Style for a capture kind, `None` for kinds outside the closed palette.
#[must_use]
pub fn style_for_kind(kind: &str) -> Option<Style> {
    let style = match kind {
        "variable" => Style::fg(Color::hex(0xc0caf5)),
        "function.call" => Style::fg(Color::hex(0x7aa2f7)),
        "keyword.operator" | "operator" | "punctuation.delimiter" => {
            Style::fg(Color::hex(0x89ddff))
        }
        "keyword" | "keyword.modifier" => Style::fg(Color::hex(0x9d7cd8)),
        "type" | "type.builtin" => Style::fg(Color::hex(0x2ac3de)),
        "variable.member" => Style::fg(Color::hex(0x73daca)),
        "string" => Style::fg(Color::hex(0x9ece6a)),
        "punctuation.bracket" => Style::fg(Color::hex(0xa9b1d6)),
        "error" => Style::fg(palette::RED).curly(),
        _ => return None,
    };
    Some(style)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
