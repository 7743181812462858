//! Grapheme spans — the atoms of cursor motion.
//!
//! A line is segmented into *spans*, one per grapheme cluster, each carrying
//! the cluster text, its printable width in terminal cells, and its UTF-8
//! byte length. Every line ends with a **sentinel span**: an empty cluster
//! of width 1 marking the "one past the last grapheme" slot that the cursor
//! may occupy in insert and visual modes.
//!
//! Segmentation is pure and deterministic. Invariants, verified by tests:
//!
//! - round-trip: concatenating the clusters reproduces the line
//! - `sum(bytes)` equals the line's UTF-8 byte length
//! - `sum(width)` equals the terminal display width, with `\t` expanded to
//!   the configured tab width
//!
//! Three coordinate systems meet here, and [`SpanLine`] converts between
//! them: span columns (cursor space), byte offsets (regex space), and
//! printable x (screen space).

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Tab width used when none is configured.
pub const DEFAULT_TAB_WIDTH: usize = 4;

// ---------------------------------------------------------------------------
// Span
// ---------------------------------------------------------------------------

/// One grapheme cluster with its printable and byte widths.
///
/// The sentinel span has an empty cluster, width 1, and zero bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    /// The cluster's code points. Empty for the sentinel.
    pub cluster: String,
    /// Printable width in terminal cells.
    pub width: usize,
    /// UTF-8 byte length of the cluster.
    pub bytes: usize,
}

impl Span {
    /// True for the end-of-line sentinel.
    #[inline]
    #[must_use]
    pub fn is_sentinel(&self) -> bool {
        self.cluster.is_empty()
    }

    /// First code point of the cluster, `None` for the sentinel.
    #[inline]
    #[must_use]
    pub fn rune(&self) -> Option<char> {
        self.cluster.chars().next()
    }
}

// ---------------------------------------------------------------------------
// SpanLine
// ---------------------------------------------------------------------------

/// A segmented line: its spans plus the trailing sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanLine {
    spans: Vec<Span>,
}

impl SpanLine {
    /// Segment one line (no newline) into spans plus the sentinel.
    #[must_use]
    pub fn segment(line: &str, tab_width: usize) -> Self {
        let mut spans: Vec<Span> = line
            .graphemes(true)
            .map(|cluster| {
                let width = if cluster == "\t" {
                    tab_width
                } else {
                    cluster.width()
                };
                Span {
                    cluster: cluster.to_string(),
                    width,
                    bytes: cluster.len(),
                }
            })
            .collect();
        spans.push(Span {
            cluster: String::new(),
            width: 1,
            bytes: 0,
        });
        Self { spans }
    }

    /// The spans, sentinel included.
    #[inline]
    #[must_use]
    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    /// Number of span slots, sentinel included. Always at least 1.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// True when the line has no graphemes (only the sentinel).
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.spans.len() == 1
    }

    /// The sentinel column — the highest valid cursor column.
    #[inline]
    #[must_use]
    pub fn sentinel_col(&self) -> usize {
        self.spans.len() - 1
    }

    /// The span at `col`, if the column exists.
    #[inline]
    #[must_use]
    pub fn get(&self, col: usize) -> Option<&Span> {
        self.spans.get(col)
    }

    /// First code point of the cluster at `col`. `None` for the sentinel or
    /// an out-of-range column.
    #[inline]
    #[must_use]
    pub fn rune_at(&self, col: usize) -> Option<char> {
        self.spans.get(col).and_then(Span::rune)
    }

    /// Reassemble the line text (sentinel contributes nothing).
    #[must_use]
    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.cluster.as_str()).collect()
    }

    /// Total UTF-8 byte length of the line.
    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.spans.iter().map(|s| s.bytes).sum()
    }

    /// Byte offset of the start of `col` (prefix sum of byte widths).
    /// Columns past the sentinel clamp to the line's byte length.
    #[must_use]
    pub fn col_to_byte(&self, col: usize) -> usize {
        self.spans.iter().take(col).map(|s| s.bytes).sum()
    }

    /// The inverse mapping, one entry per byte of the line: which column a
    /// byte offset falls inside. Built per query — callers that map many
    /// offsets (the index workers) reuse one mapper per line.
    #[must_use]
    pub fn byte_to_col_mapper(&self) -> Vec<usize> {
        let mut mapper = vec![0; self.byte_len()];
        let mut byte = 0;
        for (col, span) in self.spans.iter().enumerate() {
            for slot in mapper.iter_mut().skip(byte).take(span.bytes) {
                *slot = col;
            }
            byte += span.bytes;
        }
        mapper
    }

    /// Printable x of the left edge of `col` (prefix sum of widths).
    #[must_use]
    pub fn x_at(&self, col: usize) -> usize {
        self.spans.iter().take(col).map(|s| s.width).sum()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
