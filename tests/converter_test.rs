//! Integration tests for the converter module.

use std::io::Write;
use std::sync::Arc;
use html2notion::convert::{
    ConvertOptions, ConvertResult, ConverterRegistry, DocumentConverter, HtmlConverter,
    MarkdownConverter, OutputFormat,
};
use html2notion::error::{Error, Result};
use html2notion::model::Block;

/// Mock converter for testing.
struct MockConverter {
    extensions: Vec<&'static str>,
    name: &'static str,
}

impl MockConverter {
    fn new(extensions: Vec<&'static str>, name: &'static str) -> Self {
        Self { extensions, name }
    }
}

impl DocumentConverter for MockConverter {
    fn supported_extensions(&self) -> &[&str] {
        &self.extensions
    }

    fn name(&self) -> &str {
        self.name
    }

    fn convert_str(&self, input: &str, _options: &ConvertOptions) -> Result<ConvertResult> {
        Ok(ConvertResult::new(
            format!("Converted {} bytes by {}", input.len(), self.name),
            vec![Block::Divider],
        ))
    }
}

fn temp_file(suffix: &str, content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_converter_registry_new() {
    let registry = ConverterRegistry::new();
    assert!(registry.supported_extensions().is_empty());
    assert!(!registry.supports("html"));
}

#[test]
fn test_converter_registry_with_defaults() {
    let registry = ConverterRegistry::default();
    let mut extensions = registry.supported_extensions();
    extensions.sort_unstable();
    assert_eq!(
        extensions,
        vec!["htm", "html", "markdown", "md", "mdown", "txt", "xhtml"]
    );
}

#[test]
fn test_converter_registry_register() {
    let mut registry = ConverterRegistry::new();
    registry.register(Arc::new(MockConverter::new(vec!["rst", "rest"], "rst")));

    assert!(registry.supports("rst"));
    assert!(registry.supports("REST"));
    assert!(registry.get_by_name("rst").is_some());
}

#[test]
fn test_later_registration_overrides_extension() {
    let mut registry = ConverterRegistry::with_defaults();
    registry.register(Arc::new(MockConverter::new(vec!["md"], "mock")));

    let result = registry
        .convert_bytes(b"# x", "md", &ConvertOptions::default())
        .unwrap();
    assert_eq!(result.content, "Converted 3 bytes by mock");
    assert_eq!(registry.get_by_extension("markdown").unwrap().name(), "markdown");
}

#[test]
fn test_mock_converter_reads_file() {
    let mut registry = ConverterRegistry::new();
    registry.register(Arc::new(MockConverter::new(vec!["rst"], "rst")));

    let file = temp_file(".rst", "Title\n=====");
    let result = registry.convert(file.path(), &ConvertOptions::default()).unwrap();
    assert_eq!(result.content, "Converted 11 bytes by rst");
    assert_eq!(result.blocks, vec![Block::Divider]);
}

#[test]
fn test_convert_html_file() {
    let file = temp_file(
        ".html",
        "<html><head><title>Release notes</title></head><body>\
         <h2>Changes</h2><ul><li>Faster <code>parse</code></li><li>Fixes</li></ul>\
         </body></html>",
    );
    let result = html2notion::convert_file(file.path()).unwrap();

    assert_eq!(result.title.as_deref(), Some("Release notes"));
    assert_eq!(result.content, "## Changes\n\n- Faster `parse`\n- Fixes");
    assert_eq!(result.blocks.len(), 3);
    assert_eq!(result.mime_type, "text/markdown");
}

#[test]
fn test_convert_file_without_extension_is_sniffed() {
    let file = temp_file("", "<div><p>Sniffed</p></div>");
    let result = html2notion::convert_file(file.path()).unwrap();
    assert_eq!(result.content, "Sniffed");
    assert!(result.title.is_none());
}

#[test]
fn test_convert_markdown_to_json_with_stats() {
    let options = ConvertOptions::new()
        .with_format(OutputFormat::Json)
        .with_stats(true);
    let result = MarkdownConverter::new()
        .convert_str("# Title\n\n- a\n  - b\n\n---", &options)
        .unwrap();

    let json: serde_json::Value = serde_json::from_str(&result.content).unwrap();
    assert_eq!(json[0]["type"], "heading_1");
    assert_eq!(
        json[1]["bulleted_list_item"]["children"][0]["type"],
        "bulleted_list_item"
    );
    assert_eq!(json[2]["type"], "divider");

    let stats = result.stats.unwrap();
    assert_eq!(stats.top_level_blocks, 3);
    assert_eq!(stats.total_blocks, 4);
    assert_eq!(stats.list_item_count, 2);
}

#[test]
fn test_html_converter_uses_options() {
    let options = ConvertOptions::new().with_html_options(
        html2notion::HtmlOptions::new()
            .with_base_url(url::Url::parse("https://docs.example.com/guide/").unwrap()),
    );
    let result = HtmlConverter::new()
        .convert_str("<p><a href='setup'>Setup</a></p>", &options)
        .unwrap();
    assert_eq!(result.content, "[Setup](https://docs.example.com/guide/setup)");
}

#[test]
fn test_output_format_default() {
    assert_eq!(OutputFormat::default(), OutputFormat::Markdown);
    assert_eq!(OutputFormat::Text.mime_type(), "text/plain");
}

#[test]
fn test_registry_convert_missing_file() {
    let registry = ConverterRegistry::with_defaults();
    let result = registry.convert(
        std::path::Path::new("/nonexistent/page.html"),
        &ConvertOptions::default(),
    );
    assert!(matches!(result, Err(Error::Io(_))));
}

#[test]
fn test_registry_convert_bytes_unsupported() {
    let registry = ConverterRegistry::with_defaults();
    let result = registry.convert_bytes(b"data", "docx", &ConvertOptions::default());
    assert!(result.is_err());
}
