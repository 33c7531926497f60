//! # html2notion
//!
//! Convert cleaned page HTML into Markdown and Notion blocks, and write
//! those blocks to a new Notion page.
//!
//! The pipeline has three pure stages and one effectful one:
//!
//! 1. [`html`]: HTML to a restricted Markdown dialect
//! 2. [`parser`]: Markdown to typed [`Block`]s with rich text
//! 3. [`render`]: blocks back to Markdown or to block JSON
//! 4. [`notion`]: blocks to a page through the API, in batches
//!
//! ## Quick Start
//!
//! ```
//! use html2notion::{html_to_blocks, Block};
//!
//! let blocks = html_to_blocks("<h2>Setup</h2><ul><li>Install</li><li>Run</li></ul>");
//! assert_eq!(blocks.len(), 3);
//! assert!(matches!(blocks[0], Block::Heading { level: 2, .. }));
//! ```
//!
//! ## Features
//!
//! - **Rich text**: bold, italic, strikethrough, inline code and links
//! - **Structure**: headings, nested lists, task lists, quotes, callouts,
//!   code blocks, images, dividers and tables with spans
//! - **Round trip**: blocks serialize back to the Markdown they came from
//! - **Batched upload**: pages of any length within the per-request limits

pub mod convert;
pub mod detect;
pub mod error;
pub mod html;
pub mod model;
pub mod notion;
pub mod parser;
pub mod render;

// Re-export commonly used types
pub use convert::{
    ConvertOptions, ConvertResult, ConverterRegistry, DocumentConverter, OutputFormat,
};
pub use detect::{detect_format, detect_format_from_path, SourceFormat};
pub use error::{Error, Result};
pub use html::{HtmlDocument, HtmlOptions, SpanFill};
pub use model::{Annotations, Block, CalloutKind, Cell, Color, Table, TextRun};
pub use notion::{
    extract_page_id, AssemblerOptions, CreatedPage, NotionApi, PageAssembler,
    PageCreationRequest, PageId, Progress, Stage,
};
#[cfg(feature = "http")]
pub use notion::{ClientConfig, HttpClient};
pub use parser::{MarkdownParser, ParseOptions};
pub use render::{ConversionStats, JsonFormat, RenderOptions};

use std::path::Path;

/// Convert HTML to Markdown.
///
/// # Example
///
/// ```
/// let markdown = html2notion::html_to_markdown("<p>Hello <b>world</b></p>");
/// assert_eq!(markdown, "Hello **world**");
/// ```
pub fn html_to_markdown(html: &str) -> String {
    html::to_markdown(html)
}

/// Convert HTML to blocks.
pub fn html_to_blocks(html: &str) -> Vec<Block> {
    Html2Notion::new().convert_html(html).blocks
}

/// Parse Markdown into blocks.
///
/// # Example
///
/// ```
/// use html2notion::{markdown_to_blocks, Block};
///
/// let blocks = markdown_to_blocks("# Title\n\n---");
/// assert_eq!(blocks[1], Block::Divider);
/// ```
pub fn markdown_to_blocks(markdown: &str) -> Vec<Block> {
    parser::parse_markdown(markdown)
}

/// Serialize blocks back to Markdown.
pub fn blocks_to_markdown(blocks: &[Block]) -> String {
    render::to_markdown(blocks, &RenderOptions::default())
}

/// Serialize blocks as Notion block JSON.
///
/// # Example
///
/// ```
/// use html2notion::{blocks_to_json, markdown_to_blocks, JsonFormat};
///
/// let json = blocks_to_json(&markdown_to_blocks("---"), JsonFormat::Compact)?;
/// assert!(json.contains("\"type\":\"divider\""));
/// # Ok::<(), html2notion::Error>(())
/// ```
pub fn blocks_to_json(blocks: &[Block], format: JsonFormat) -> Result<String> {
    render::to_json(blocks, format)
}

/// Convert an HTML or Markdown file to Markdown.
///
/// The converter is chosen by extension, or by content when the extension
/// is unknown.
///
/// # Example
///
/// ```no_run
/// let result = html2notion::convert_file("page.html").unwrap();
/// println!("{}", result.content);
/// ```
pub fn convert_file<P: AsRef<Path>>(path: P) -> Result<ConvertResult> {
    convert_file_with_options(path, &ConvertOptions::default())
}

/// Convert an HTML or Markdown file with custom options.
pub fn convert_file_with_options<P: AsRef<Path>>(
    path: P,
    options: &ConvertOptions,
) -> Result<ConvertResult> {
    ConverterRegistry::with_defaults().convert(path.as_ref(), options)
}

/// Builder for converting documents into blocks.
///
/// # Example
///
/// ```
/// use html2notion::{Html2Notion, JsonFormat};
///
/// let conversion = Html2Notion::new()
///     .with_max_table_rows(50)
///     .without_numbering_cleanup()
///     .convert_html("<title>Notes</title><h1>Notes</h1><p>Text</p>");
///
/// assert_eq!(conversion.title.as_deref(), Some("Notes"));
/// let json = conversion.to_json(JsonFormat::Compact)?;
/// # Ok::<(), html2notion::Error>(())
/// ```
pub struct Html2Notion {
    html_options: HtmlOptions,
    parse_options: ParseOptions,
    render_options: RenderOptions,
}

impl Html2Notion {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            html_options: HtmlOptions::default(),
            parse_options: ParseOptions::default(),
            render_options: RenderOptions::default(),
        }
    }

    /// Resolve relative links and images against `url`.
    pub fn with_base_url(mut self, url: url::Url) -> Self {
        self.html_options = self.html_options.with_base_url(url);
        self
    }

    /// Set what fills table positions covered by a span.
    pub fn with_span_fill(mut self, fill: SpanFill) -> Self {
        self.html_options = self.html_options.with_span_fill(fill);
        self
    }

    /// Set the maximum rows per table block.
    pub fn with_max_table_rows(mut self, rows: usize) -> Self {
        self.parse_options = self.parse_options.with_max_table_rows(rows);
        self
    }

    /// Keep renderer numbering noise (`11、`, `13.1、`) on list items.
    pub fn without_numbering_cleanup(mut self) -> Self {
        self.parse_options = self.parse_options.with_numbering_cleanup(false);
        self
    }

    /// Set the text of the paragraph emitted for empty documents.
    pub fn with_placeholder(mut self, text: impl Into<String>) -> Self {
        self.parse_options = self.parse_options.with_placeholder(text);
        self
    }

    /// Set Markdown rendering options.
    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.render_options = options;
        self
    }

    /// Convert HTML.
    pub fn convert_html(&self, html: &str) -> Conversion {
        let document = html::convert_html(html, &self.html_options);
        let blocks =
            MarkdownParser::with_options(self.parse_options.clone()).parse(&document.markdown);
        Conversion {
            title: document.title,
            markdown: document.markdown,
            blocks,
            render_options: self.render_options.clone(),
        }
    }

    /// Convert Markdown.
    pub fn convert_markdown(&self, markdown: &str) -> Conversion {
        let blocks = MarkdownParser::with_options(self.parse_options.clone()).parse(markdown);
        Conversion {
            title: None,
            markdown: markdown.to_string(),
            blocks,
            render_options: self.render_options.clone(),
        }
    }

    /// Options for a [`PageAssembler`] that converts the same way.
    pub fn assembler_options(&self) -> AssemblerOptions {
        AssemblerOptions::new()
            .with_html_options(self.html_options.clone())
            .with_parse_options(self.parse_options.clone())
    }
}

impl Default for Html2Notion {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of converting one document.
#[derive(Debug, Clone)]
pub struct Conversion {
    /// Suggested page title
    pub title: Option<String>,

    /// Markdown the blocks were parsed from
    pub markdown: String,

    /// Converted blocks
    pub blocks: Vec<Block>,

    render_options: RenderOptions,
}

impl Conversion {
    /// Serialize the blocks back to Markdown.
    pub fn to_markdown(&self) -> String {
        render::to_markdown(&self.blocks, &self.render_options)
    }

    /// Serialize the blocks as Notion block JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        render::to_json(&self.blocks, format)
    }

    /// Block statistics.
    pub fn stats(&self) -> ConversionStats {
        ConversionStats::from_blocks(&self.blocks)
    }

    /// A page creation request for these blocks.
    ///
    /// `title` falls back to the suggested title when empty.
    pub fn into_request(self, title: &str, parent_id: &str) -> PageCreationRequest {
        let title = if title.trim().is_empty() {
            self.title.unwrap_or_default()
        } else {
            title.to_string()
        };
        PageCreationRequest::new(title, parent_id, self.blocks)
    }
}
