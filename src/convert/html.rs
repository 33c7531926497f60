//! HTML document converter implementation.

use crate::error::Result;
use crate::html::convert_html;
use crate::parser::MarkdownParser;

use super::{finish, ConvertOptions, ConvertResult, DocumentConverter};

/// HTML document converter.
///
/// Runs the HTML stage and then the block tokenizer over its Markdown.
#[derive(Debug, Clone, Default)]
pub struct HtmlConverter {
    _private: (),
}

impl HtmlConverter {
    /// Create a new HTML converter.
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl DocumentConverter for HtmlConverter {
    fn supported_extensions(&self) -> &[&str] {
        &["html", "htm", "xhtml"]
    }

    fn name(&self) -> &str {
        "html"
    }

    fn convert_str(&self, input: &str, options: &ConvertOptions) -> Result<ConvertResult> {
        let document = convert_html(input, &options.html);
        let blocks = MarkdownParser::with_options(options.parse.clone()).parse(&document.markdown);
        log::debug!(
            "HTML converter produced {} top-level blocks",
            blocks.len()
        );
        Ok(finish(blocks, Some(document.markdown), options)?.with_title(document.title))
    }
}
