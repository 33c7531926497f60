//! Document converter module providing a plugin architecture for input formats.
//!
//! This module defines a converter system that dispatches conversions on file
//! extension. Each converter turns its input into Notion blocks and then
//! renders them as Markdown, block JSON or plain text.
//!
//! # Example
//!
//! ```no_run
//! use html2notion::convert::{ConverterRegistry, ConvertOptions, HtmlConverter};
//! use std::sync::Arc;
//! use std::path::Path;
//!
//! fn main() -> html2notion::Result<()> {
//!     let mut registry = ConverterRegistry::new();
//!     registry.register(Arc::new(HtmlConverter::new()));
//!
//!     let result = registry.convert(Path::new("page.html"), &ConvertOptions::default())?;
//!     println!("{}", result.content);
//!     Ok(())
//! }
//! ```

mod html;
mod markdown;

pub use html::HtmlConverter;
pub use markdown::MarkdownConverter;

use crate::detect::{detect_format, SourceFormat};
use crate::error::{Error, Result};
use crate::html::HtmlOptions;
use crate::model::Block;
use crate::parser::ParseOptions;
use crate::render::{to_json, ConversionStats, JsonFormat, RenderOptions};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Options for document conversion.
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Markdown tokenizer options
    pub parse: ParseOptions,

    /// HTML stage options
    pub html: HtmlOptions,

    /// Rendering options for Markdown output
    pub render: RenderOptions,

    /// Whether to collect statistics during conversion
    pub collect_stats: bool,

    /// Output format
    pub output_format: OutputFormat,
}

impl ConvertOptions {
    /// Create new conversion options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set tokenizer options.
    pub fn with_parse_options(mut self, options: ParseOptions) -> Self {
        self.parse = options;
        self
    }

    /// Set HTML options.
    pub fn with_html_options(mut self, options: HtmlOptions) -> Self {
        self.html = options;
        self
    }

    /// Set rendering options.
    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.render = options;
        self
    }

    /// Enable statistics collection.
    pub fn with_stats(mut self, collect: bool) -> Self {
        self.collect_stats = collect;
        self
    }

    /// Set output format.
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }
}

/// Output format for conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Markdown format
    #[default]
    Markdown,

    /// Plain text
    Text,

    /// Notion block JSON
    Json,
}

impl OutputFormat {
    /// MIME type of content in this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "text/markdown",
            OutputFormat::Text => "text/plain",
            OutputFormat::Json => "application/json",
        }
    }
}

/// Result of document conversion.
#[derive(Debug, Clone)]
pub struct ConvertResult {
    /// Converted content
    pub content: String,

    /// Suggested page title, if the source carried one
    pub title: Option<String>,

    /// The converted blocks
    pub blocks: Vec<Block>,

    /// Conversion statistics (if collected)
    pub stats: Option<ConversionStats>,

    /// MIME type of the output
    pub mime_type: &'static str,
}

impl ConvertResult {
    /// Create a new conversion result.
    pub fn new(content: String, blocks: Vec<Block>) -> Self {
        Self {
            content,
            title: None,
            blocks,
            stats: None,
            mime_type: "text/markdown",
        }
    }

    /// Set the title suggestion.
    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title;
        self
    }

    /// Set conversion statistics.
    pub fn with_stats(mut self, stats: ConversionStats) -> Self {
        self.stats = Some(stats);
        self
    }

    /// Set MIME type.
    pub fn with_mime_type(mut self, mime_type: &'static str) -> Self {
        self.mime_type = mime_type;
        self
    }

    /// Get content length in bytes.
    pub fn content_len(&self) -> usize {
        self.content.len()
    }
}

/// Trait for document converters.
///
/// Implement this trait to add support for a new input format.
pub trait DocumentConverter: Send + Sync {
    /// Get the supported file extensions for this converter.
    ///
    /// Extensions should be lowercase without the leading dot (e.g., `["html"]`).
    fn supported_extensions(&self) -> &[&str];

    /// Get the name of this converter.
    fn name(&self) -> &str;

    /// Convert source text.
    fn convert_str(&self, input: &str, options: &ConvertOptions) -> Result<ConvertResult>;

    /// Convert a file at the given path.
    fn convert(&self, path: &Path, options: &ConvertOptions) -> Result<ConvertResult> {
        let bytes = std::fs::read(path)?;
        self.convert_bytes(&bytes, options)
    }

    /// Convert from UTF-8 bytes.
    fn convert_bytes(&self, bytes: &[u8], options: &ConvertOptions) -> Result<ConvertResult> {
        let input = std::str::from_utf8(bytes)?;
        self.convert_str(input, options)
    }

    /// Check if this converter supports the given extension.
    fn supports_extension(&self, ext: &str) -> bool {
        let ext_lower = ext.to_lowercase();
        self.supported_extensions().iter().any(|e| *e == ext_lower)
    }
}

/// Render converted blocks in the requested output format.
///
/// `markdown` is used verbatim for Markdown output when the converter already
/// produced it; otherwise the blocks are serialized back to Markdown.
pub(crate) fn finish(
    blocks: Vec<Block>,
    markdown: Option<String>,
    options: &ConvertOptions,
) -> Result<ConvertResult> {
    let content = match options.output_format {
        OutputFormat::Markdown => match markdown {
            Some(markdown) => markdown,
            None => crate::render::to_markdown(&blocks, &options.render),
        },
        OutputFormat::Text => plain_text(&blocks),
        OutputFormat::Json => to_json(&blocks, JsonFormat::Pretty)?,
    };

    let mut result =
        ConvertResult::new(content, Vec::new()).with_mime_type(options.output_format.mime_type());
    if options.collect_stats {
        result = result.with_stats(ConversionStats::from_blocks(&blocks));
    }
    result.blocks = blocks;
    Ok(result)
}

fn plain_text(blocks: &[Block]) -> String {
    fn walk(blocks: &[Block], out: &mut Vec<String>) {
        for block in blocks {
            let text = block.plain_text();
            if !text.is_empty() {
                out.push(text);
            }
            walk(block.children(), out);
        }
    }

    let mut lines = Vec::new();
    walk(blocks, &mut lines);
    lines.join("\n\n")
}

/// Registry for document converters.
///
/// The registry maps file extensions to converters and provides
/// convenient methods for converting documents.
pub struct ConverterRegistry {
    converters: HashMap<String, Arc<dyn DocumentConverter>>,
    by_name: HashMap<String, Arc<dyn DocumentConverter>>,
}

impl ConverterRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            converters: HashMap::new(),
            by_name: HashMap::new(),
        }
    }

    /// Create a registry with default converters (HTML and Markdown).
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(HtmlConverter::new()));
        registry.register(Arc::new(MarkdownConverter::new()));
        registry
    }

    /// Register a converter.
    ///
    /// The converter will be registered for all its supported extensions.
    pub fn register(&mut self, converter: Arc<dyn DocumentConverter>) {
        for ext in converter.supported_extensions() {
            self.converters
                .insert(ext.to_lowercase(), converter.clone());
        }
        self.by_name
            .insert(converter.name().to_lowercase(), converter);
    }

    /// Get a converter by file extension.
    pub fn get_by_extension(&self, ext: &str) -> Option<Arc<dyn DocumentConverter>> {
        self.converters.get(&ext.to_lowercase()).cloned()
    }

    /// Get a converter by name.
    pub fn get_by_name(&self, name: &str) -> Option<Arc<dyn DocumentConverter>> {
        self.by_name.get(&name.to_lowercase()).cloned()
    }

    /// Get the converter for a source format.
    pub fn get_by_format(&self, format: SourceFormat) -> Option<Arc<dyn DocumentConverter>> {
        self.get_by_extension(format.extension())
    }

    /// Check if an extension is supported.
    pub fn supports(&self, ext: &str) -> bool {
        self.converters.contains_key(&ext.to_lowercase())
    }

    /// Get all supported extensions.
    pub fn supported_extensions(&self) -> Vec<&str> {
        self.converters.keys().map(|s| s.as_str()).collect()
    }

    /// Convert a file using the appropriate converter.
    ///
    /// Files without a registered extension are sniffed.
    pub fn convert(&self, path: &Path, options: &ConvertOptions) -> Result<ConvertResult> {
        let by_ext = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(|ext| self.get_by_extension(ext));

        match by_ext {
            Some(converter) => converter.convert(path, options),
            None => {
                let bytes = std::fs::read(path)?;
                self.convert_sniffed(&bytes, options)
            }
        }
    }

    /// Convert bytes using the specified extension to determine the converter.
    pub fn convert_bytes(
        &self,
        bytes: &[u8],
        ext: &str,
        options: &ConvertOptions,
    ) -> Result<ConvertResult> {
        let converter = self
            .get_by_extension(ext)
            .ok_or_else(|| Error::Other(format!("No converter for extension: {}", ext)))?;

        converter.convert_bytes(bytes, options)
    }

    /// Convert bytes after sniffing whether they are HTML or Markdown.
    pub fn convert_sniffed(&self, bytes: &[u8], options: &ConvertOptions) -> Result<ConvertResult> {
        let format = detect_format(bytes);
        log::debug!("Detected {} input", format);
        let converter = self
            .get_by_format(format)
            .ok_or_else(|| Error::Other(format!("No converter for {} input", format)))?;

        converter.convert_bytes(bytes, options)
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
