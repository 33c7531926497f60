//! Parsing options and configuration.

use crate::model::{MAX_CHILDREN, MAX_RICH_TEXT_RUNS};

/// Placeholder written when a conversion produces no blocks.
pub const EMPTY_PLACEHOLDER: &str = "(Empty page)";

/// Default maximum number of data rows in one table block. The header row
/// is a child of the table too, so one position goes to it.
pub const DEFAULT_MAX_TABLE_ROWS: usize = MAX_CHILDREN - 1;

/// Options for parsing Markdown into blocks.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Strip renderer numbering noise (`11、`, `13.1、`) from list items
    pub strip_numbering_artifacts: bool,

    /// Apply Unicode NFC normalization before tokenizing
    pub normalize_unicode: bool,

    /// Keep arrow-notation lines (`A -> B`) free of inline formatting
    pub preserve_arrow_lines: bool,

    /// Maximum data rows per table block (larger tables are split)
    pub max_table_rows: usize,

    /// Maximum runs per paragraph block (larger paragraphs are split)
    pub max_paragraph_runs: usize,

    /// Text of the paragraph emitted for empty input
    pub placeholder: String,
}

impl ParseOptions {
    /// Create new parse options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable numbering-artifact cleanup.
    pub fn with_numbering_cleanup(mut self, enabled: bool) -> Self {
        self.strip_numbering_artifacts = enabled;
        self
    }

    /// Enable or disable Unicode normalization.
    pub fn with_unicode_normalization(mut self, enabled: bool) -> Self {
        self.normalize_unicode = enabled;
        self
    }

    /// Enable or disable verbatim arrow lines.
    pub fn with_arrow_lines(mut self, preserve: bool) -> Self {
        self.preserve_arrow_lines = preserve;
        self
    }

    /// Set the table split threshold, at most [`DEFAULT_MAX_TABLE_ROWS`].
    pub fn with_max_table_rows(mut self, rows: usize) -> Self {
        self.max_table_rows = rows.clamp(1, DEFAULT_MAX_TABLE_ROWS);
        self
    }

    /// Set the placeholder text for empty documents.
    pub fn with_placeholder(mut self, text: impl Into<String>) -> Self {
        self.placeholder = text.into();
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            strip_numbering_artifacts: true,
            normalize_unicode: true,
            preserve_arrow_lines: true,
            max_table_rows: DEFAULT_MAX_TABLE_ROWS,
            max_paragraph_runs: MAX_RICH_TEXT_RUNS,
            placeholder: EMPTY_PLACEHOLDER.to_string(),
        }
    }
}
