//! # squill-editor — modal editor engine for squill
//!
//! This crate is the core of squill's SQL workspace: a Vim-style modal
//! editor over a Unicode text buffer, shared between the query pane and the
//! one-line prompts (search, flash). The pieces, leaves first:
//!
//! - **[`span`]** — grapheme-cluster segmentation with printable and byte
//!   widths, the end-of-line sentinel, and the per-line coordinate mappers
//! - **[`position`]** — `Position` (row, col) addressing span indices
//! - **[`mode`]** — `Normal`/`Insert`/`Replace`/`Visual`/`VLine` semantics
//! - **[`action`]** — the action taxonomy: operators, motions, the rest
//! - **[`key`]** — key events and their terminal event names
//! - **[`history`]** — snapshot undo stack with truncate-on-branch
//! - **[`motion`]** — background-built and on-demand motion indexes
//! - **[`buffer`]** — the document: text, spans, edits, worker respawn
//! - **[`decor`]** — the decorator pipeline (highlight, search, visual, flash)
//! - **[`editor`]** — the dispatcher state machine tying it all together
//! - **[`view`]** — viewport bookkeeping and draw calls on the screen
//!
//! External collaborators are traits: [`screen::Screen`] for drawing,
//! [`clipboard::Clipboard`] for yank/paste, [`highlight::HighlightProvider`]
//! for syntax spans, and [`editor::Keymapper`] for key-sequence resolution
//! (implemented by `squill-keymap`).

pub mod action;
pub mod buffer;
pub mod clipboard;
pub mod decor;
pub mod editor;
pub mod highlight;
pub mod history;
pub mod key;
pub mod mode;
pub mod motion;
pub mod position;
pub mod screen;
pub mod span;
pub mod view;
