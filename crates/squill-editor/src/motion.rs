//! Motion indexes — sorted cursor-target lists per motion kind.
//!
//! For each motion kind the index holds a sorted list of
//! `(row, start_col, end_col)` entries. The word kinds (`w`, `e`, `W`, `E`)
//! are rebuilt by background workers after every edit; the transient kinds
//! (find, till, search, surround, flash) are built synchronously on demand
//! and cleared when their motion finishes.
//!
//! # Regex grammar (part of the contract)
//!
//! The word class is `[a-zA-Z0-9_À-ÿ]`:
//!
//! - `w` — start of a word run preceded by non-word or line start, plus the
//!   start of any standalone non-word non-whitespace run
//! - `e` — end of a word run followed by non-word or line end, plus the end
//!   of standalone punctuation runs
//! - `W` — run of non-whitespace preceded by whitespace or line start
//! - `E` — run of non-whitespace followed by whitespace or line end
//!
//! Matches are byte offsets into each line; the per-line byte→column mapper
//! from [`SpanLine`] turns them into span columns.
//!
//! # Cancellation
//!
//! Every edit bumps a generation counter. Workers snapshot the text and
//! spans, scan, then compare generations and only publish when still
//! current; a stale worker drops its result on the floor. The map itself is
//! the single shared structure, serialized through its mutex.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;

use regex::Regex;
use std::sync::OnceLock;
use tracing::trace;

use crate::position::Position;
use crate::span::SpanLine;

// ---------------------------------------------------------------------------
// MotionKind
// ---------------------------------------------------------------------------

/// The key space of the index map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotionKind {
    /// `w` — word starts.
    WordStart,
    /// `e` — word ends.
    WordEnd,
    /// `W` — big-word starts.
    BigWordStart,
    /// `E` — big-word ends.
    BigWordEnd,
    /// `f` — literal rune matches on each line.
    Find,
    /// `t` — matches anchored one before the rune.
    Til,
    /// `T` — matches anchored one after the rune.
    TilBack,
    /// `n` — compiled search query over the buffer.
    Search,
    /// `s` — the enclosing surround pair.
    Surround,
    /// `Z` — flash query, viewport only.
    Flash,
}

impl MotionKind {
    /// Kinds rebuilt by background workers on every edit.
    pub const BACKGROUND: [Self; 4] = [
        Self::WordStart,
        Self::WordEnd,
        Self::BigWordStart,
        Self::BigWordEnd,
    ];

    /// Only the search motion wraps around the buffer.
    #[inline]
    #[must_use]
    pub const fn wraps(self) -> bool {
        matches!(self, Self::Search)
    }
}

/// One index entry: a row plus the start and end columns of the match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionSpan {
    pub row: usize,
    pub start: usize,
    pub end: usize,
}

impl MotionSpan {
    #[inline]
    #[must_use]
    pub const fn new(row: usize, start: usize, end: usize) -> Self {
        Self { row, start, end }
    }

    /// The cursor target of this entry.
    #[inline]
    #[must_use]
    pub const fn pos(self) -> Position {
        Position::new(self.row, self.start)
    }
}

/// Where a literal-index entry sits relative to its match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// The match itself (`f`, `n`, `Z`, `s`).
    At,
    /// One rune before the match (`t`).
    Before,
    /// One rune after the match (`T`).
    After,
}

// ---------------------------------------------------------------------------
// Word regexes
// ---------------------------------------------------------------------------

const WORD: &str = "a-zA-Z0-9_À-ÿ";

fn word_start_runs() -> &'static Regex {
    static RG: OnceLock<Regex> = OnceLock::new();
    RG.get_or_init(|| Regex::new(&format!("(?:^|[^{WORD}])([{WORD}])")).expect("word-start regex"))
}

fn symbol_start_runs() -> &'static Regex {
    static RG: OnceLock<Regex> = OnceLock::new();
    RG.get_or_init(|| {
        Regex::new(&format!(r"(?:^|[{WORD}\s])([^{WORD}\s])")).expect("symbol-start regex")
    })
}

fn word_end_runs() -> &'static Regex {
    static RG: OnceLock<Regex> = OnceLock::new();
    RG.get_or_init(|| Regex::new(&format!("([{WORD}])(?:[^{WORD}]|$)")).expect("word-end regex"))
}

fn symbol_end_runs() -> &'static Regex {
    static RG: OnceLock<Regex> = OnceLock::new();
    RG.get_or_init(|| {
        Regex::new(&format!(r"([^{WORD}\s])(?:[{WORD}\s]|$)")).expect("symbol-end regex")
    })
}

fn big_word_start_runs() -> &'static Regex {
    static RG: OnceLock<Regex> = OnceLock::new();
    RG.get_or_init(|| Regex::new(r"(?:^|\s)(\S)").expect("big-word-start regex"))
}

fn big_word_end_runs() -> &'static Regex {
    static RG: OnceLock<Regex> = OnceLock::new();
    RG.get_or_init(|| Regex::new(r"(\S)(?:\s|$)").expect("big-word-end regex"))
}

// ---------------------------------------------------------------------------
// MotionIndex
// ---------------------------------------------------------------------------

/// The shared motion-index map plus the edit-generation gate.
///
/// Cheap to clone — clones share the same map, generation, and worker
/// bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct MotionIndex {
    entries: Arc<Mutex<HashMap<MotionKind, Vec<MotionSpan>>>>,
    generation: Arc<AtomicU64>,
    inflight: Arc<(Mutex<usize>, Condvar)>,
}

impl MotionIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current edit generation.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Bump the generation (one edit happened) and return the new value.
    pub fn bump_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Drop every index (fresh document).
    pub fn clear(&self) {
        if let Ok(mut map) = self.entries.lock() {
            map.clear();
        }
    }

    /// Drop the transient indexes (`n`, `t`, `T`, `f`, `Z`), e.g. on Esc.
    pub fn reset_transient(&self) {
        if let Ok(mut map) = self.entries.lock() {
            for kind in [
                MotionKind::Search,
                MotionKind::Til,
                MotionKind::TilBack,
                MotionKind::Find,
                MotionKind::Flash,
            ] {
                map.remove(&kind);
            }
        }
    }

    /// True when the kind has at least one entry.
    #[must_use]
    pub fn has(&self, kind: MotionKind) -> bool {
        self.entries
            .lock()
            .map(|map| map.get(&kind).is_some_and(|v| !v.is_empty()))
            .unwrap_or(false)
    }

    /// A copy of the kind's entries, for decorators and surround logic.
    #[must_use]
    pub fn snapshot(&self, kind: MotionKind) -> Option<Vec<MotionSpan>> {
        self.entries
            .lock()
            .ok()
            .and_then(|map| map.get(&kind).filter(|v| !v.is_empty()).cloned())
    }

    /// Install entries for a kind directly (surround pairs).
    pub fn set(&self, kind: MotionKind, spans: Vec<MotionSpan>) {
        if let Ok(mut map) = self.entries.lock() {
            if spans.is_empty() {
                map.remove(&kind);
            } else {
                map.insert(kind, spans);
            }
        }
    }

    /// Remove a kind outright.
    pub fn remove(&self, kind: MotionKind) {
        if let Ok(mut map) = self.entries.lock() {
            map.remove(&kind);
        }
    }

    // -- Background workers -------------------------------------------------

    /// Spawn one worker per word kind for the given snapshot. `generation`
    /// is the edit generation the snapshot belongs to; a worker observing a
    /// newer generation discards its result.
    pub fn spawn_word_workers(
        &self,
        generation: u64,
        text: Arc<String>,
        lines: Arc<Vec<SpanLine>>,
    ) {
        for kind in MotionKind::BACKGROUND {
            let index = self.clone();
            let text = Arc::clone(&text);
            let lines = Arc::clone(&lines);
            {
                let (count, _) = &*self.inflight;
                if let Ok(mut n) = count.lock() {
                    *n += 1;
                }
            }
            thread::spawn(move || {
                let result = scan_word_kind(kind, &text, &lines, &index, generation);
                if let Some(spans) = result {
                    index.publish(generation, kind, spans);
                }
                let (count, converged) = &*index.inflight;
                if let Ok(mut n) = count.lock() {
                    *n = n.saturating_sub(1);
                }
                converged.notify_all();
            });
        }
    }

    /// Publish a worker result unless the generation moved on.
    fn publish(&self, generation: u64, kind: MotionKind, spans: Vec<MotionSpan>) {
        if self.generation() > generation {
            trace!(?kind, generation, "discarding stale motion index");
            return;
        }
        if let Ok(mut map) = self.entries.lock() {
            map.insert(kind, spans);
        }
    }

    /// Block until every in-flight worker finished. Used by tests and
    /// benchmarks that need deterministic index state; the editor itself
    /// never waits.
    pub fn wait_converged(&self) {
        let (count, converged) = &*self.inflight;
        let Ok(mut n) = count.lock() else { return };
        while *n > 0 {
            match converged.wait(n) {
                Ok(guard) => n = guard,
                Err(_) => return,
            }
        }
    }

    // -- Transient builders -------------------------------------------------

    /// Build a literal index from an escaped query. `rows` restricts the
    /// scan (flash scans only the viewport); `None` scans every line.
    /// Returns whether anything matched; no matches clears the kind.
    pub fn build_literal(
        &self,
        kind: MotionKind,
        query: &str,
        anchor: Anchor,
        lines: &[SpanLine],
        rows: Option<(usize, usize)>,
    ) -> bool {
        if query.is_empty() {
            self.remove(kind);
            return false;
        }

        let escaped = regex::escape(query);
        let pattern = match anchor {
            Anchor::At => escaped,
            Anchor::Before => format!("([^{escaped}]){escaped}"),
            Anchor::After => format!("{escaped}([^{escaped}])"),
        };
        let Ok(rg) = Regex::new(&pattern) else {
            self.remove(kind);
            return false;
        };

        let (first, last) = match rows {
            Some((first, last)) => (first.min(lines.len()), last.min(lines.len())),
            None => (0, lines.len()),
        };

        let mut spans = Vec::new();
        for (row, line) in lines.iter().enumerate().take(last).skip(first) {
            let text = line.text();
            if text.is_empty() {
                continue;
            }
            let mapper = line.byte_to_col_mapper();
            for caps in rg.captures_iter(&text) {
                let entry = match anchor {
                    Anchor::At => {
                        let m = caps.get(0).expect("whole match");
                        MotionSpan::new(row, mapper[m.start()], mapper[m.end() - 1])
                    }
                    Anchor::Before | Anchor::After => {
                        let Some(g) = caps.get(1) else { continue };
                        MotionSpan::new(row, mapper[g.start()], mapper[g.start()])
                    }
                };
                spans.push(entry);
            }
        }

        let found = !spans.is_empty();
        self.set(kind, spans);
        found
    }

    // -- Navigation ---------------------------------------------------------

    /// The `n`-th entry strictly after the cursor (`inclusive` permits
    /// equality). Wrapping kinds wrap around the buffer; others return
    /// `None` past the last entry.
    #[must_use]
    pub fn next(
        &self,
        kind: MotionKind,
        n: usize,
        cursor: Position,
        inclusive: bool,
    ) -> Option<Position> {
        let map = self.entries.lock().ok()?;
        let list = map.get(&kind).filter(|v| !v.is_empty())?;
        if list.len() == 1 {
            return Some(list[0].pos());
        }

        let hops = n.max(1) - 1;
        let mut col = cursor.col as isize;
        if inclusive {
            col -= 1;
        }

        for (i, entry) in list.iter().enumerate() {
            if entry.row < cursor.row {
                continue;
            }
            if entry.row > cursor.row {
                col = -1;
            }
            if entry.start as isize > col {
                let idx = (i + hops) % list.len();
                return Some(list[idx].pos());
            }
        }

        if kind.wraps() {
            return Some(list[hops % list.len()].pos());
        }
        None
    }

    /// The `n`-th entry strictly before the cursor. `widest_col` is the
    /// widest line's span count, used as the off-row column sentinel when
    /// the scan crosses onto an earlier row.
    #[must_use]
    pub fn prev(
        &self,
        kind: MotionKind,
        n: usize,
        cursor: Position,
        inclusive: bool,
        widest_col: usize,
    ) -> Option<Position> {
        let map = self.entries.lock().ok()?;
        let list = map.get(&kind).filter(|v| !v.is_empty())?;
        if list.len() == 1 {
            return Some(list[0].pos());
        }

        let hops = (n.max(1) - 1) as isize;
        let mut col = cursor.col as isize;
        if inclusive {
            col += 1;
        }

        for i in (0..list.len()).rev() {
            let entry = list[i];
            if entry.row > cursor.row {
                continue;
            }
            if entry.row < cursor.row {
                col = widest_col as isize;
                if inclusive {
                    col += 1;
                }
            }
            if (entry.start as isize) < col {
                let idx = (i as isize - hops).rem_euclid(list.len() as isize) as usize;
                return Some(list[idx].pos());
            }
        }

        if kind.wraps() {
            let idx = (list.len() as isize - 1 - hops).rem_euclid(list.len() as isize) as usize;
            return Some(list[idx].pos());
        }
        None
    }
}

// ---------------------------------------------------------------------------
// Word scanning
// ---------------------------------------------------------------------------

/// Scan the whole snapshot for one word kind. Returns `None` when the
/// generation moved on mid-scan.
fn scan_word_kind(
    kind: MotionKind,
    text: &str,
    lines: &[SpanLine],
    index: &MotionIndex,
    generation: u64,
) -> Option<Vec<MotionSpan>> {
    let mut spans = Vec::new();

    for (row, line) in text.split('\n').enumerate() {
        if index.generation() > generation {
            return None;
        }
        if line.is_empty() {
            continue;
        }
        let Some(span_line) = lines.get(row) else {
            break;
        };
        let mapper = span_line.byte_to_col_mapper();

        match kind {
            MotionKind::WordStart => {
                collect_group(word_start_runs(), line, row, &mapper, &mut spans);
                collect_group(symbol_start_runs(), line, row, &mapper, &mut spans);
            }
            MotionKind::WordEnd => {
                collect_group(word_end_runs(), line, row, &mapper, &mut spans);
                collect_group(symbol_end_runs(), line, row, &mapper, &mut spans);
            }
            MotionKind::BigWordStart => {
                collect_group(big_word_start_runs(), line, row, &mapper, &mut spans);
            }
            MotionKind::BigWordEnd => {
                collect_group(big_word_end_runs(), line, row, &mapper, &mut spans);
            }
            _ => return None,
        }
    }

    spans.sort_by_key(|s| (s.row, s.start));
    Some(spans)
}

/// Collect capture-group-1 positions of every match into `spans`.
fn collect_group(
    rg: &Regex,
    line: &str,
    row: usize,
    mapper: &[usize],
    spans: &mut Vec<MotionSpan>,
) {
    for caps in rg.captures_iter(line) {
        if let Some(g) = caps.get(1) {
            if g.start() < g.end() {
                let col = mapper[g.start()];
                spans.push(MotionSpan::new(row, col, mapper[g.end() - 1]));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::DEFAULT_TAB_WIDTH;

    fn segment_all(text: &str) -> Vec<SpanLine> {
        text.split('\n')
            .map(|line| SpanLine::segment(line, DEFAULT_TAB_WIDTH))
            .collect()
    }

    fn built(text: &str) -> MotionIndex {
        let index = MotionIndex::new();
        let generation = index.bump_generation();
        let lines = Arc::new(segment_all(text));
        index.spawn_word_workers(generation, Arc::new(text.to_string()), lines);
        index.wait_converged();
        index
    }

    fn starts(index: &MotionIndex, kind: MotionKind) -> Vec<(usize, usize)> {
        index
            .snapshot(kind)
            .unwrap_or_default()
            .iter()
            .map(|s| (s.row, s.start))
            .collect()
    }

    // -- Word starts (w) ------------------------------------------------------

    #[test]
    fn word_starts_simple() {
        let index = built("foo bar");
        assert_eq!(starts(&index, MotionKind::WordStart), vec![(0, 0), (0, 4)]);
    }

    #[test]
    fn word_starts_include_standalone_symbols() {
        let index = built("x=y+z");
        assert_eq!(
            starts(&index, MotionKind::WordStart),
            vec![(0, 0), (0, 1), (0, 2), (0, 3), (0, 4)]
        );
    }

    #[test]
    fn word_starts_cross_lines() {
        let index = built("one\ntwo");
        assert_eq!(starts(&index, MotionKind::WordStart), vec![(0, 0), (1, 0)]);
    }

    #[test]
    fn word_starts_accented_letters_are_word_class() {
        // é is in the À-ÿ range: "café" is one word.
        let index = built("café bar");
        assert_eq!(starts(&index, MotionKind::WordStart), vec![(0, 0), (0, 5)]);
    }

    #[test]
    fn punctuation_run_is_one_start() {
        let index = built("a::b");
        assert_eq!(
            starts(&index, MotionKind::WordStart),
            vec![(0, 0), (0, 1), (0, 3)]
        );
    }

    // -- Word ends (e) --------------------------------------------------------

    #[test]
    fn word_ends_simple() {
        let index = built("foo bar");
        assert_eq!(starts(&index, MotionKind::WordEnd), vec![(0, 2), (0, 6)]);
    }

    #[test]
    fn word_ends_with_punctuation() {
        let index = built("hello.world");
        assert_eq!(
            starts(&index, MotionKind::WordEnd),
            vec![(0, 4), (0, 5), (0, 10)]
        );
    }

    // -- Big words (W / E) ----------------------------------------------------

    #[test]
    fn big_word_starts_ignore_punctuation() {
        let index = built("hello.world next");
        assert_eq!(
            starts(&index, MotionKind::BigWordStart),
            vec![(0, 0), (0, 12)]
        );
    }

    #[test]
    fn big_word_ends() {
        let index = built("hello.world next");
        assert_eq!(
            starts(&index, MotionKind::BigWordEnd),
            vec![(0, 10), (0, 15)]
        );
    }

    #[test]
    fn big_word_start_at_line_start_is_found() {
        let index = built("abc def");
        assert_eq!(
            starts(&index, MotionKind::BigWordStart),
            vec![(0, 0), (0, 4)]
        );
    }

    // -- Unicode column mapping ----------------------------------------------

    #[test]
    fn columns_are_span_indices_not_bytes() {
        // é is 2 bytes; "bar" starts at byte 5 but column 5 is still right
        // because mapper converts. 中 is 3 bytes wide ones.
        let index = built("中文 ok");
        assert_eq!(
            starts(&index, MotionKind::BigWordStart),
            vec![(0, 0), (0, 3)]
        );
    }

    // -- Literal indexes ------------------------------------------------------

    #[test]
    fn find_index_lists_every_occurrence() {
        let index = MotionIndex::new();
        let lines = segment_all("abcxyzx");
        let found = index.build_literal(MotionKind::Find, "x", Anchor::At, &lines, None);
        assert!(found);
        assert_eq!(starts(&index, MotionKind::Find), vec![(0, 3), (0, 6)]);
    }

    #[test]
    fn till_index_anchors_one_before() {
        let index = MotionIndex::new();
        let lines = segment_all("abcxyz");
        index.build_literal(MotionKind::Til, "x", Anchor::Before, &lines, None);
        assert_eq!(starts(&index, MotionKind::Til), vec![(0, 2)]);
    }

    #[test]
    fn till_back_index_anchors_one_after() {
        let index = MotionIndex::new();
        let lines = segment_all("abcxyz");
        index.build_literal(MotionKind::TilBack, "x", Anchor::After, &lines, None);
        assert_eq!(starts(&index, MotionKind::TilBack), vec![(0, 4)]);
    }

    #[test]
    fn no_match_clears_kind() {
        let index = MotionIndex::new();
        let lines = segment_all("abc");
        assert!(!index.build_literal(MotionKind::Find, "q", Anchor::At, &lines, None));
        assert!(!index.has(MotionKind::Find));
    }

    #[test]
    fn regex_metacharacters_are_escaped() {
        let index = MotionIndex::new();
        let lines = segment_all("a.b.c");
        index.build_literal(MotionKind::Find, ".", Anchor::At, &lines, None);
        assert_eq!(starts(&index, MotionKind::Find), vec![(0, 1), (0, 3)]);
    }

    #[test]
    fn row_range_restricts_scan() {
        let index = MotionIndex::new();
        let lines = segment_all("x\nx\nx\nx");
        index.build_literal(MotionKind::Flash, "x", Anchor::At, &lines, Some((1, 3)));
        assert_eq!(starts(&index, MotionKind::Flash), vec![(1, 0), (2, 0)]);
    }

    #[test]
    fn multi_rune_query_spans_columns() {
        let index = MotionIndex::new();
        let lines = segment_all("foo bar baz");
        index.build_literal(MotionKind::Search, "ba", Anchor::At, &lines, None);
        let spans = index.snapshot(MotionKind::Search).unwrap();
        assert_eq!(spans[0], MotionSpan::new(0, 4, 5));
        assert_eq!(spans[1], MotionSpan::new(0, 8, 9));
    }

    // -- Navigation -----------------------------------------------------------

    #[test]
    fn next_finds_first_entry_after_cursor() {
        let index = built("foo bar baz");
        let pos = index
            .next(MotionKind::WordStart, 1, Position::ZERO, false)
            .unwrap();
        assert_eq!(pos, Position::new(0, 4));
    }

    #[test]
    fn next_with_count_hops_entries() {
        let index = built("foo bar baz");
        let pos = index
            .next(MotionKind::WordStart, 2, Position::ZERO, false)
            .unwrap();
        assert_eq!(pos, Position::new(0, 8));
    }

    #[test]
    fn next_inclusive_accepts_current_position() {
        let index = built("foo bar");
        let pos = index
            .next(MotionKind::WordStart, 1, Position::new(0, 4), true)
            .unwrap();
        assert_eq!(pos, Position::new(0, 4));
    }

    #[test]
    fn next_non_wrapping_kind_stops_at_end() {
        let index = built("foo bar");
        assert_eq!(
            index.next(MotionKind::WordStart, 1, Position::new(0, 4), false),
            None
        );
    }

    #[test]
    fn search_next_wraps() {
        let index = MotionIndex::new();
        let lines = segment_all("foo bar baz");
        index.build_literal(MotionKind::Search, "ba", Anchor::At, &lines, None);

        let first = index
            .next(MotionKind::Search, 1, Position::ZERO, false)
            .unwrap();
        assert_eq!(first, Position::new(0, 4));
        let second = index.next(MotionKind::Search, 1, first, false).unwrap();
        assert_eq!(second, Position::new(0, 8));
        let wrapped = index.next(MotionKind::Search, 1, second, false).unwrap();
        assert_eq!(wrapped, Position::new(0, 4));
    }

    #[test]
    fn prev_finds_entry_before_cursor() {
        let index = built("foo bar baz");
        let pos = index
            .prev(MotionKind::WordStart, 1, Position::new(0, 8), false, 12)
            .unwrap();
        assert_eq!(pos, Position::new(0, 4));
    }

    #[test]
    fn prev_crosses_rows_with_widest_col() {
        let index = built("alpha beta\ngamma");
        let pos = index
            .prev(MotionKind::WordStart, 1, Position::new(1, 0), false, 11)
            .unwrap();
        assert_eq!(pos, Position::new(0, 6));
    }

    #[test]
    fn single_entry_short_circuits() {
        let index = MotionIndex::new();
        let lines = segment_all("abcxyz");
        index.build_literal(MotionKind::Find, "x", Anchor::At, &lines, None);
        // One entry: returned no matter where the cursor is.
        assert_eq!(
            index.next(MotionKind::Find, 1, Position::new(0, 3), false),
            Some(Position::new(0, 3))
        );
        assert_eq!(
            index.prev(MotionKind::Find, 1, Position::ZERO, false, 7),
            Some(Position::new(0, 3))
        );
    }

    // -- Generation gating ----------------------------------------------------

    #[test]
    fn stale_publish_is_discarded() {
        let index = MotionIndex::new();
        let generation = index.bump_generation();
        index.bump_generation(); // an edit arrives before the worker returns
        index.publish(
            generation,
            MotionKind::WordStart,
            vec![MotionSpan::new(0, 0, 0)],
        );
        assert!(!index.has(MotionKind::WordStart));
    }

    #[test]
    fn current_publish_lands() {
        let index = MotionIndex::new();
        let generation = index.bump_generation();
        index.publish(
            generation,
            MotionKind::WordStart,
            vec![MotionSpan::new(0, 0, 0)],
        );
        assert!(index.has(MotionKind::WordStart));
    }

    #[test]
    fn reset_transient_keeps_word_indexes() {
        let index = built("foo bar");
        let lines = segment_all("foo bar");
        index.build_literal(MotionKind::Find, "b", Anchor::At, &lines, None);
        index.reset_transient();
        assert!(!index.has(MotionKind::Find));
        assert!(index.has(MotionKind::WordStart));
    }
}
