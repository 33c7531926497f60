//! Block model for Notion page content.
//!
//! This module defines the typed blocks produced by the Markdown parser and
//! consumed by the page assembler and the renderers. Every type knows how to
//! express itself as the JSON shape the block API expects.

mod block;
mod language;
mod rich_text;
mod table;

pub use block::{limit_children, Block, CalloutKind, Color, MAX_CHILDREN, TRUNCATION_NOTICE};
pub use language::{normalize_language, LANGUAGES, PLAIN_TEXT};
pub use rich_text::{
    chunk_utf16, merge_adjacent, plain_text, split_long_runs, to_notion_array, utf16_len,
    Annotations, TextRun, MAX_RICH_TEXT_RUNS, MAX_TEXT_LENGTH,
};
pub use table::{Cell, Table};
