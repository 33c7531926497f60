//! HTML to Markdown conversion.
//!
//! Cleaned page HTML is parsed with html5ever into an immutable element tree
//! and written out as the restricted Markdown dialect the block tokenizer
//! reads. Vendor panels are expected as `<blockquote data-panel-type="...">`
//! and become callout lines; tables with row and column spans are flattened
//! through a dense grid.

mod table;
mod tree;
mod writer;

pub use table::{resolve_span_grid, SpanCell, SpanFill};
pub use tree::{parse_html, Element, HtmlNode, DOCUMENT_TAG};

use url::Url;

use writer::MarkdownWriter;

/// Options for HTML conversion.
#[derive(Debug, Clone, Default)]
pub struct HtmlOptions {
    /// Base for resolving relative link and image URLs
    pub base_url: Option<Url>,

    /// Content of grid positions covered by a table span
    pub span_fill: SpanFill,
}

impl HtmlOptions {
    /// Create new HTML options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base URL for relative links.
    pub fn with_base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Set the span filler.
    pub fn with_span_fill(mut self, fill: SpanFill) -> Self {
        self.span_fill = fill;
        self
    }
}

/// Result of converting an HTML document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlDocument {
    /// Suggested page title
    pub title: Option<String>,

    /// Converted Markdown
    pub markdown: String,
}

/// Convert HTML to Markdown with default options.
pub fn to_markdown(html: &str) -> String {
    to_markdown_with_options(html, &HtmlOptions::default())
}

/// Convert HTML to Markdown.
pub fn to_markdown_with_options(html: &str, options: &HtmlOptions) -> String {
    convert_html(html, options).markdown
}

/// Convert HTML to Markdown, also extracting a title suggestion.
pub fn convert_html(html: &str, options: &HtmlOptions) -> HtmlDocument {
    let root = parse_html(html);
    let markdown = MarkdownWriter::new(options).write(&root);
    let title = extract_title(&root);
    log::debug!(
        "Converted {} bytes of HTML into {} bytes of Markdown",
        html.len(),
        markdown.len()
    );
    HtmlDocument { title, markdown }
}

/// Title from `<title>`, falling back to the first `<h1>`.
pub fn extract_title(root: &Element) -> Option<String> {
    let clean = |el: &Element| {
        let text = el.text_content();
        let title = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if title.is_empty() {
            None
        } else {
            Some(title)
        }
    };
    root.find("title")
        .and_then(clean)
        .or_else(|| root.find("h1").and_then(clean))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_blocks() {
        let html = "<h1>Title</h1><p>Some <strong>bold</strong> text.</p><hr><h4>Deep</h4>";
        assert_eq!(
            to_markdown(html),
            "# Title\n\nSome **bold** text.\n\n---\n\n#### Deep"
        );
    }

    #[test]
    fn test_relative_links_resolved() {
        let options =
            HtmlOptions::new().with_base_url(Url::parse("https://wiki.example.com/a/b").unwrap());
        let markdown =
            to_markdown_with_options("<p><a href='../c'>next</a> <a href='#top'>top</a></p>", &options);
        assert_eq!(markdown, "[next](https://wiki.example.com/c) top");
    }

    #[test]
    fn test_relative_link_without_base_is_text() {
        assert_eq!(to_markdown("<p><a href='/x'>x</a></p>"), "x");
    }

    #[test]
    fn test_image_becomes_own_line() {
        let markdown = to_markdown("<p>See <img src='https://e.com/a.png' alt='chart'> here</p>");
        assert_eq!(markdown, "See\n![chart](https://e.com/a.png)\nhere");
    }

    #[test]
    fn test_span_table() {
        let html = "<table><tr><th colspan='2'>Wide</th></tr><tr><td>a</td><td>b</td></tr></table>";
        assert_eq!(
            to_markdown(html),
            "| Wide |   |\n| --- | --- |\n| a | b |"
        );
    }

    #[test]
    fn test_list_item_cannot_start_a_rule() {
        let markdown = to_markdown("<ul><li>--</li><li>next</li></ul>");
        assert_eq!(markdown, "- \\--\n- next");
    }

    #[test]
    fn test_heading_trailing_hash_kept() {
        assert_eq!(to_markdown("<h2>C #</h2>"), r"## C \#");
    }

    #[test]
    fn test_pre_fence_longer_than_content() {
        let markdown = to_markdown("<pre>```\nnested\n```</pre>");
        assert_eq!(markdown, "````\n```\nnested\n```\n````");
    }

    #[test]
    fn test_title_extraction() {
        let root = parse_html("<html><head><title> Page  Name </title></head><body><h1>H</h1></body></html>");
        assert_eq!(extract_title(&root).as_deref(), Some("Page Name"));

        let root = parse_html("<h1>Only heading</h1>");
        assert_eq!(extract_title(&root).as_deref(), Some("Only heading"));

        assert_eq!(extract_title(&parse_html("<p>none</p>")), None);
    }

    #[test]
    fn test_head_not_rendered() {
        let html = "<html><head><title>T</title></head><body><p>body</p></body></html>";
        assert_eq!(to_markdown(html), "body");
    }
}
