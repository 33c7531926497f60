//! Source format detection.

use crate::error::Result;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Number of bytes inspected when sniffing content.
const SNIFF_LEN: usize = 1024;

/// Tags that only appear at the start of an HTML document or fragment.
const HTML_MARKERS: &[&str] = &[
    "<!doctype html",
    "<html",
    "<head",
    "<body",
    "<meta",
    "<div",
    "<p>",
    "<p ",
    "<h1",
    "<h2",
    "<h3",
    "<table",
    "<ul",
    "<ol",
    "<article",
    "<section",
];

/// Input format accepted by the converters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceFormat {
    /// Cleaned page HTML
    Html,
    /// The restricted Markdown dialect
    Markdown,
}

impl SourceFormat {
    /// Canonical file extension.
    pub fn extension(&self) -> &'static str {
        match self {
            SourceFormat::Html => "html",
            SourceFormat::Markdown => "md",
        }
    }

    /// Format implied by a file extension, if any.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "html" | "htm" | "xhtml" => Some(SourceFormat::Html),
            "md" | "markdown" | "mdown" | "txt" => Some(SourceFormat::Markdown),
            _ => None,
        }
    }
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceFormat::Html => write!(f, "HTML"),
            SourceFormat::Markdown => write!(f, "Markdown"),
        }
    }
}

/// Detect the format of a file.
///
/// A known extension wins; otherwise the first bytes of the file are sniffed.
///
/// # Example
/// ```no_run
/// use html2notion::detect::{detect_format_from_path, SourceFormat};
///
/// let format = detect_format_from_path("page.html").unwrap();
/// assert_eq!(format, SourceFormat::Html);
/// ```
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<SourceFormat> {
    let path = path.as_ref();
    if let Some(format) = path
        .extension()
        .and_then(|e| e.to_str())
        .and_then(SourceFormat::from_extension)
    {
        return Ok(format);
    }

    let file = File::open(path)?;
    let mut header = Vec::with_capacity(SNIFF_LEN);
    BufReader::new(file)
        .take(SNIFF_LEN as u64)
        .read_to_end(&mut header)?;
    Ok(detect_format(&header))
}

/// Sniff HTML vs Markdown from the leading bytes.
///
/// Anything that does not open with an HTML tag is treated as Markdown.
pub fn detect_format(data: &[u8]) -> SourceFormat {
    let head = &data[..data.len().min(SNIFF_LEN)];
    let text = String::from_utf8_lossy(head);
    let text = text.trim_start_matches('\u{feff}').trim_start();

    if !text.starts_with('<') {
        return SourceFormat::Markdown;
    }
    let lower = text.to_ascii_lowercase();
    if lower.starts_with("<!--")
        || HTML_MARKERS.iter().any(|m| lower.starts_with(m))
        || lower.contains("</")
    {
        SourceFormat::Html
    } else {
        SourceFormat::Markdown
    }
}

/// Check if bytes look like HTML.
pub fn is_html_bytes(data: &[u8]) -> bool {
    detect_format(data) == SourceFormat::Html
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_detect_html_document() {
        assert_eq!(
            detect_format(b"<!DOCTYPE html><html><body></body></html>"),
            SourceFormat::Html
        );
        assert_eq!(detect_format(b"\xef\xbb\xbf  <div>x</div>"), SourceFormat::Html);
        assert_eq!(detect_format(b"<custom>x</custom>"), SourceFormat::Html);
    }

    #[test]
    fn test_detect_markdown() {
        assert_eq!(detect_format(b"# Title\n\nBody"), SourceFormat::Markdown);
        assert_eq!(detect_format(b""), SourceFormat::Markdown);
        assert_eq!(detect_format(b"<not closed"), SourceFormat::Markdown);
        assert!(!is_html_bytes(b"- item"));
    }

    #[test]
    fn test_extension_mapping() {
        assert_eq!(SourceFormat::from_extension("HTM"), Some(SourceFormat::Html));
        assert_eq!(
            SourceFormat::from_extension("markdown"),
            Some(SourceFormat::Markdown)
        );
        assert_eq!(SourceFormat::from_extension("pdf"), None);
        assert_eq!(SourceFormat::Html.extension(), "html");
    }

    #[test]
    fn test_detect_from_path_sniffs_unknown_extension() {
        let mut file = tempfile::Builder::new().suffix(".page").tempfile().unwrap();
        file.write_all(b"<html><body><p>x</p></body></html>").unwrap();
        assert_eq!(detect_format_from_path(file.path()).unwrap(), SourceFormat::Html);
    }
}
