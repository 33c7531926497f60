//! Markdown document converter implementation.

use crate::error::Result;
use crate::model::{plain_text, Block};
use crate::parser::MarkdownParser;

use super::{finish, ConvertOptions, ConvertResult, DocumentConverter};

/// Markdown document converter.
///
/// Markdown output is the parsed blocks serialized back, so the content is
/// normalized to the dialect the tokenizer reads.
#[derive(Debug, Clone, Default)]
pub struct MarkdownConverter {
    _private: (),
}

impl MarkdownConverter {
    /// Create a new Markdown converter.
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl DocumentConverter for MarkdownConverter {
    fn supported_extensions(&self) -> &[&str] {
        &["md", "markdown", "mdown", "txt"]
    }

    fn name(&self) -> &str {
        "markdown"
    }

    fn convert_str(&self, input: &str, options: &ConvertOptions) -> Result<ConvertResult> {
        let blocks = MarkdownParser::with_options(options.parse.clone()).parse(input);
        let title = blocks.iter().find_map(|block| match block {
            Block::Heading { level: 1, text } => {
                Some(plain_text(text)).filter(|t| !t.trim().is_empty())
            }
            _ => None,
        });
        Ok(finish(blocks, None, options)?.with_title(title))
    }
}
