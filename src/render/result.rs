//! Rendering result with statistics.

use serde::{Deserialize, Serialize};

use crate::model::Block;

/// Result of rendering blocks, including content and statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderResult {
    /// The rendered Markdown
    pub content: String,

    /// Block statistics
    pub stats: ConversionStats,
}

impl RenderResult {
    /// Create a new render result.
    pub fn new(content: String, stats: ConversionStats) -> Self {
        Self { content, stats }
    }

    /// Get the content length in bytes.
    pub fn content_len(&self) -> usize {
        self.content.len()
    }
}

/// Per-kind counts of a converted block sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Top-level blocks
    pub top_level_blocks: u32,

    /// All blocks including nested children
    pub total_blocks: u32,

    /// Number of paragraphs
    pub paragraph_count: u32,

    /// Number of headings
    pub heading_count: u32,

    /// Number of bulleted, numbered and to-do items
    pub list_item_count: u32,

    /// Number of quotes
    pub quote_count: u32,

    /// Number of callouts
    pub callout_count: u32,

    /// Number of code blocks
    pub code_count: u32,

    /// Number of images
    pub image_count: u32,

    /// Number of tables
    pub table_count: u32,

    /// Number of dividers
    pub divider_count: u32,

    /// Deepest native nesting below a top-level block
    pub max_depth: u32,

    /// Approximate word count (whitespace-separated tokens)
    pub word_count: u32,

    /// Character count (excluding whitespace)
    pub char_count: u32,
}

impl ConversionStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect statistics for a block sequence.
    pub fn from_blocks(blocks: &[Block]) -> Self {
        let mut stats = Self::new();
        stats.top_level_blocks = blocks.len() as u32;
        for block in blocks {
            stats.max_depth = stats.max_depth.max(block.nesting_depth() as u32);
            stats.add_block(block);
        }
        stats
    }

    /// Count one block and its descendants.
    pub fn add_block(&mut self, block: &Block) {
        self.total_blocks += 1;
        match block {
            Block::Paragraph { .. } => self.paragraph_count += 1,
            Block::Heading { .. } => self.heading_count += 1,
            Block::BulletedListItem { .. }
            | Block::NumberedListItem { .. }
            | Block::ToDo { .. } => self.list_item_count += 1,
            Block::Quote { .. } => self.quote_count += 1,
            Block::Callout { .. } => self.callout_count += 1,
            Block::Code { .. } => self.code_count += 1,
            Block::Image { .. } => self.image_count += 1,
            Block::Table(_) => self.table_count += 1,
            Block::Divider => self.divider_count += 1,
        }
        self.count_text(&block.plain_text());
        for child in block.children() {
            self.add_block(child);
        }
    }

    /// Add word and character counts from text.
    pub fn count_text(&mut self, text: &str) {
        self.word_count += text.split_whitespace().count() as u32;
        self.char_count += text.chars().filter(|c| !c.is_whitespace()).count() as u32;
    }

    /// Merge another stats instance into this one.
    pub fn merge(&mut self, other: &ConversionStats) {
        self.top_level_blocks += other.top_level_blocks;
        self.total_blocks += other.total_blocks;
        self.paragraph_count += other.paragraph_count;
        self.heading_count += other.heading_count;
        self.list_item_count += other.list_item_count;
        self.quote_count += other.quote_count;
        self.callout_count += other.callout_count;
        self.code_count += other.code_count;
        self.image_count += other.image_count;
        self.table_count += other.table_count;
        self.divider_count += other.divider_count;
        self.max_depth = self.max_depth.max(other.max_depth);
        self.word_count += other.word_count;
        self.char_count += other.char_count;
    }
}
